use common::SubmissionNotification;
use tracing::{debug, info, warn};

use crate::entity::{assignment, submission};
use crate::state::AppState;

pub fn build_notification(
    email: &str,
    assignment: &assignment::Model,
    submission: &submission::Model,
) -> SubmissionNotification {
    SubmissionNotification {
        name: SubmissionNotification::name_from_email(email),
        assignment_name: assignment.name.clone(),
        assignment_id: assignment.id,
        submission_id: submission.id,
        retry: submission.submission_retries,
        email: email.to_string(),
        submitted_at: submission.updated_at,
        download_url: submission.submission_url.clone(),
    }
}

/// Publish a submission notification if a queue is configured.
///
/// Failures are logged and never reach the caller.
pub async fn publish_submission(
    state: &AppState,
    email: &str,
    assignment: &assignment::Model,
    submission: &submission::Model,
) {
    let Some(ref mq) = state.mq else {
        debug!(submission_id = submission.id, "Notifications disabled, skipping publish");
        return;
    };

    let notification = build_notification(email, assignment, submission);
    let topic = &state.config.notification.topic;

    match mq::publish_json(mq, topic, &notification).await {
        Ok(()) => info!(
            topic = %topic,
            submission_id = submission.id,
            retry = notification.retry,
            "Submission notification published"
        ),
        Err(e) => warn!(
            topic = %topic,
            submission_id = submission.id,
            error = %e,
            "Failed to publish submission notification"
        ),
    }
}
