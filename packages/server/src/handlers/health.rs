use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header};
use tracing::{error, instrument, warn};

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    operation_id = "healthCheck",
    summary = "Check service health",
    description = "Pings the database. Only `GET` without a request body is accepted; every other method answers 405.",
    responses(
        (status = 200, description = "Service and database are reachable"),
        (status = 400, description = "A request body was sent"),
        (status = 405, description = "Method other than GET"),
        (status = 503, description = "Database is unreachable"),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn health_check(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> StatusCode {
    if method != Method::GET {
        warn!("Health check with unsupported method");
        return StatusCode::METHOD_NOT_ALLOWED;
    }

    if has_body(&headers) {
        warn!("Health check with a request body");
        return StatusCode::BAD_REQUEST;
    }

    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!(error = %e, "Database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn has_body(headers: &HeaderMap) -> bool {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .is_some_and(|len| len > 0);

    declared_length || headers.contains_key(header::TRANSFER_ENCODING)
}
