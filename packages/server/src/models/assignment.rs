use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::assignment;
use crate::error::AppError;

/// Request body for creating or replacing an assignment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignmentRequest {
    /// Display name of the assignment.
    #[schema(example = "Assignment 01")]
    pub name: String,
    /// Points awarded (1-100).
    #[schema(example = 10)]
    pub points: i32,
    /// Number of submissions allowed per account (1-100).
    #[serde(rename = "noofattempts")]
    #[schema(example = 3)]
    pub no_of_attempts: i32,
    /// Submission deadline as an RFC 3339 timestamp.
    #[schema(example = "2030-08-29T09:12:33.001Z")]
    pub deadline: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Assignment 01")]
    pub name: String,
    #[schema(example = 10)]
    pub points: i32,
    #[serde(rename = "noofattempts")]
    #[schema(example = 3)]
    pub no_of_attempts: i32,
    #[schema(example = "2030-08-29T09:12:33.001Z")]
    pub deadline: String,
    pub assignment_created: DateTime<Utc>,
    pub assignment_updated: DateTime<Utc>,
}

impl From<assignment::Model> for AssignmentResponse {
    fn from(m: assignment::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            points: m.points,
            no_of_attempts: m.no_of_attempts,
            deadline: m.deadline,
            assignment_created: m.created_at,
            assignment_updated: m.updated_at,
        }
    }
}

/// Parse an assignment deadline. Offsets other than `Z` are normalised to UTC.
pub fn parse_deadline(deadline: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(deadline.trim()).map(|d| d.with_timezone(&Utc))
}

pub fn validate_assignment(req: &AssignmentRequest) -> Result<(), AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > 255 {
        return Err(AppError::Validation(
            "Assignment name must be 1-255 characters".into(),
        ));
    }
    if !(1..=100).contains(&req.points) {
        return Err(AppError::Validation(
            "Assignment points should be between 1 and 100".into(),
        ));
    }
    if !(1..=100).contains(&req.no_of_attempts) {
        return Err(AppError::Validation(
            "No of attempts should be between 1 and 100".into(),
        ));
    }
    if parse_deadline(&req.deadline).is_err() {
        return Err(AppError::Validation(
            "Deadline must be an RFC 3339 timestamp, e.g. 2030-08-29T09:12:33.001Z".into(),
        ));
    }
    Ok(())
}
