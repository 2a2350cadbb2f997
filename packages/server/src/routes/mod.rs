mod v1;

use axum::{Router, routing::any};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", any(handlers::health::health_check))
        .nest("/v1", v1::routes())
}
