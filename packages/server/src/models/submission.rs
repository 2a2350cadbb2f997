use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::submission;
use crate::error::AppError;

/// Request body for submitting an assignment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmissionRequest {
    /// Where the submitted artifact can be downloaded from.
    #[schema(example = "https://example.com/submissions/hw1.zip")]
    pub submission_url: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 1)]
    pub assignment_id: i32,
    #[schema(example = "https://example.com/submissions/hw1.zip")]
    pub submission_url: String,
    pub submission_date: DateTime<Utc>,
    pub submission_updated: DateTime<Utc>,
    /// Number of submissions made so far, including this one.
    #[schema(example = 1)]
    pub submission_retries: i32,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            assignment_id: m.assignment_id,
            submission_url: m.submission_url,
            submission_date: m.created_at,
            submission_updated: m.updated_at,
            submission_retries: m.submission_retries,
        }
    }
}

pub fn validate_submission(req: &SubmissionRequest) -> Result<(), AppError> {
    let url = req.submission_url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') && url.len() <= 2048 => Ok(()),
        _ => Err(AppError::Validation(
            "submission_url must be an absolute http(s) URL".into(),
        )),
    }
}

/// What to do with an incoming submission.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmissionDecision {
    /// First submission by this account: store it with one retry used.
    Create,
    /// Overwrite the existing submission and bump its counter to `retries`.
    Resubmit { retries: i32 },
}

/// Apply the deadline and attempt-limit rules.
///
/// `existing_retries` is the counter of this account's previous submission, if any.
pub fn decide_submission(
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    max_attempts: i32,
    existing_retries: Option<i32>,
) -> Result<SubmissionDecision, AppError> {
    if now > deadline {
        return Err(AppError::Validation(
            "Assignment deadline has passed".into(),
        ));
    }

    match existing_retries {
        None => Ok(SubmissionDecision::Create),
        Some(retries) if retries >= max_attempts => Err(AppError::Validation(
            "Maximum no of attempts reached! No more retries available".into(),
        )),
        Some(retries) => Ok(SubmissionDecision::Resubmit {
            retries: retries + 1,
        }),
    }
}
