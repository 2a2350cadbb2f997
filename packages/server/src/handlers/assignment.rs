use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::assignment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::assignment::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/assignments",
    tag = "Assignments",
    operation_id = "createAssignment",
    summary = "Create an assignment",
    description = "Creates an assignment owned by the authenticated account. Points and number of attempts must both lie in 1-100.",
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
        (status = 417, description = "Assignment could not be stored (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(account_id = auth_user.account_id, name = %payload.name))]
pub async fn create_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_assignment(&payload)?;

    let now = chrono::Utc::now();
    let new_assignment = assignment::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        points: Set(payload.points),
        no_of_attempts: Set(payload.no_of_attempts),
        deadline: Set(payload.deadline.trim().to_string()),
        account_id: Set(auth_user.account_id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };

    let model = new_assignment
        .insert(&state.db)
        .await
        .map_err(AppError::persistence)?;
    info!(id = model.id, "Assignment created");

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/v1/assignments",
    tag = "Assignments",
    operation_id = "listAssignments",
    summary = "List all assignments",
    description = "Returns every assignment regardless of owner, ordered by id.",
    responses(
        (status = 200, description = "All assignments", body = Vec<AssignmentResponse>),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_assignments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, AppError> {
    let assignments = assignment::Entity::find()
        .filter(assignment::Column::DeletedAt.is_null())
        .order_by_asc(assignment::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "getAssignment",
    summary = "Get an assignment by ID",
    description = "Only the owner of an assignment may read it.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = AssignmentResponse),
        (status = 400, description = "Non-numeric id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn get_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let model = find_assignment(&state.db, id).await?;
    auth_user.require_owner(model.account_id, "view")?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "updateAssignment",
    summary = "Replace an assignment",
    description = "Replaces every field of an assignment. Only the owner may update it; the body is validated like on create.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 417, description = "Assignment could not be stored (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(account_id = auth_user.account_id))]
pub async fn update_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<AssignmentRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_assignment_for_update(&txn, id).await?;
    auth_user.require_owner(existing.account_id, "update")?;
    validate_assignment(&payload)?;

    let mut active: assignment::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.points = Set(payload.points);
    active.no_of_attempts = Set(payload.no_of_attempts);
    active.deadline = Set(payload.deadline.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(AppError::persistence)?;
    txn.commit().await.map_err(AppError::persistence)?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "deleteAssignment",
    summary = "Delete an assignment",
    description = "Marks the assignment as deleted. It disappears from every read, update and submission path. Only the owner may delete it.",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 400, description = "Non-numeric id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or wrong credentials (UNAUTHORIZED)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found (NOT_FOUND)", body = ErrorBody),
        (status = 417, description = "Deletion could not be stored (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("basic" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn delete_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_assignment_for_update(&txn, id).await?;
    auth_user.require_owner(existing.account_id, "delete")?;

    let mut active: assignment::ActiveModel = existing.into();
    active.deleted_at = Set(Some(chrono::Utc::now()));
    active.update(&txn).await.map_err(AppError::persistence)?;
    txn.commit().await.map_err(AppError::persistence)?;

    info!(id, "Assignment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/v1/assignments/{id}",
    tag = "Assignments",
    operation_id = "patchAssignment",
    summary = "Partial updates are not supported",
    description = "Always answers 405. Use PUT to replace an assignment.",
    params(("id" = String, Path, description = "Assignment ID")),
    responses(
        (status = 405, description = "PATCH is not allowed (METHOD_NOT_ALLOWED)", body = ErrorBody),
    ),
)]
pub async fn patch_assignment() -> AppError {
    AppError::MethodNotAllowed("PATCH is not allowed, use PUT instead".into())
}

/// Look up an assignment that has not been deleted.
pub(crate) async fn find_assignment<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .filter(assignment::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}

pub(crate) async fn find_assignment_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<assignment::Model, AppError> {
    assignment::Entity::find_by_id(id)
        .filter(assignment::Column::DeletedAt.is_null())
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
}
