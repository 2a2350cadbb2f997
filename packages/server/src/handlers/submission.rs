use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::submission;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::parse_json;
use crate::extractors::path::AppPath;
use crate::handlers::assignment::find_assignment_for_update;
use crate::models::assignment::parse_deadline;
use crate::models::submission::*;
use crate::notification;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/assignments/{id}/submission",
    tag = "Submissions",
    operation_id = "submitAssignment",
    summary = "Submit an assignment",
    description = "Stores the submission URL for the authenticated account. The first submission is created with one retry used; later ones overwrite the URL and bump the retry counter until the assignment's attempt limit is reached. Submissions after the deadline are rejected. A notification is published once the submission is stored.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = SubmissionRequest,
    responses(
        (status = 201, description = "First submission stored", body = SubmissionResponse),
        (status = 200, description = "Resubmission stored", body = SubmissionResponse),
        (status = 400, description = "Past deadline, no attempts left or invalid URL (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 417, description = "Submission could not be stored (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user, body), fields(account_id = auth_user.account_id))]
pub async fn submit_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(assignment_id): AppPath<i32>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let txn = state.db.begin().await?;

    // Locking the assignment serialises submissions against it, so the
    // retry check below cannot race with another submission.
    let assignment = find_assignment_for_update(&txn, assignment_id).await?;
    let payload: SubmissionRequest = parse_json(&body)?;
    validate_submission(&payload)?;

    let deadline = parse_deadline(&assignment.deadline)
        .map_err(|_| AppError::Validation("Error parsing deadline date".into()))?;

    let existing = submission::Entity::find()
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .filter(submission::Column::AccountId.eq(auth_user.account_id))
        .order_by_asc(submission::Column::Id)
        .one(&txn)
        .await?;

    let now = chrono::Utc::now();
    let decision = decide_submission(
        deadline,
        now,
        assignment.no_of_attempts,
        existing.as_ref().map(|s| s.submission_retries),
    )?;

    let url = payload.submission_url.trim().to_string();
    let (status, model) = match (decision, existing) {
        (SubmissionDecision::Resubmit { retries }, Some(existing)) => {
            let mut active: submission::ActiveModel = existing.into();
            active.submission_url = Set(url);
            active.submission_retries = Set(retries);
            active.updated_at = Set(now);
            let model = active.update(&txn).await.map_err(AppError::persistence)?;
            (StatusCode::OK, model)
        }
        _ => {
            let new_submission = submission::ActiveModel {
                submission_url: Set(url),
                submission_retries: Set(1),
                assignment_id: Set(assignment_id),
                account_id: Set(auth_user.account_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let model = new_submission
                .insert(&txn)
                .await
                .map_err(AppError::persistence)?;
            (StatusCode::CREATED, model)
        }
    };

    txn.commit().await.map_err(AppError::persistence)?;
    info!(
        assignment_id,
        submission_id = model.id,
        retries = model.submission_retries,
        "Submission stored"
    );

    notification::publish_submission(&state, &auth_user.email, &assignment, &model).await;

    Ok((status, Json(model.into())))
}
