pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notification;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::routing::get;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Assignment Service API",
        version = "1.0.0",
        description = "Assignments owned by accounts, with deadline- and attempt-limited submissions"
    ),
    paths(
        handlers::health::health_check,
        handlers::assignment::create_assignment,
        handlers::assignment::list_assignments,
        handlers::assignment::get_assignment,
        handlers::assignment::update_assignment,
        handlers::assignment::delete_assignment,
        handlers::assignment::patch_assignment,
        handlers::submission::submit_assignment,
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Assignments", description = "Assignment CRUD operations"),
        (name = "Submissions", description = "Submitting assignments"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    routes::api_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .route("/metrics", get(metrics::export))
        .with_state(state)
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
}
