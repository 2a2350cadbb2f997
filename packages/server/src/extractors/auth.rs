use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use sea_orm::*;
use tracing::debug;

use crate::entity::account;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::hash;

/// Account authenticated through the `Authorization: Basic <base64(email:password)>` header.
///
/// Add this as a handler parameter to require authentication.
/// Ownership checks happen via `require_owner()` in the handler body.
pub struct AuthUser {
    pub account_id: i32,
    pub email: String,
}

impl AuthUser {
    /// Returns `Ok(())` if this account owns the resource, `Err(PermissionDenied)` otherwise.
    pub fn require_owner(&self, owner_id: i32, action: &str) -> Result<(), AppError> {
        if self.account_id == owner_id {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "You are not authorized to {action} this assignment"
            )))
        }
    }
}

/// Email and password decoded from a Basic authorization header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

/// Decode a `Basic` authorization header value. The scheme name is case-insensitive.
pub fn parse_basic_auth(header: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim().as_bytes()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;

    if email.is_empty() {
        return None;
    }

    Some(BasicCredentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let credentials = parse_basic_auth(header).ok_or(AppError::Unauthorized)?;

        let Some(account) = account::Entity::find()
            .filter(account::Column::Email.eq(credentials.email.as_str()))
            .one(&state.db)
            .await?
        else {
            debug!(email = %credentials.email, "Unknown account");
            return Err(AppError::Unauthorized);
        };

        let is_valid = hash::verify_password(&credentials.password, &account.password)
            .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

        if !is_valid {
            debug!(account_id = account.id, "Password mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            account_id: account.id,
            email: account.email,
        })
    }
}
