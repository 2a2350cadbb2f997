use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message published after a submission is persisted.
///
/// Key names are consumed by the downstream mailer and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionNotification {
    /// Local part of the submitter's email address.
    pub name: String,
    #[serde(rename = "assName")]
    pub assignment_name: String,
    #[serde(rename = "assignmentId")]
    pub assignment_id: i32,
    #[serde(rename = "submissionId")]
    pub submission_id: i32,
    /// Retry counter after this submission (1 for the first one).
    pub retry: i32,
    pub email: String,
    #[serde(rename = "time")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

impl SubmissionNotification {
    /// Derive the display name from an email address.
    ///
    /// Returns an empty string when the address does not contain exactly one `@`.
    pub fn name_from_email(email: &str) -> String {
        match email.split_once('@') {
            Some((local, domain)) if !domain.contains('@') => local.to_string(),
            _ => String::new(),
        }
    }
}
