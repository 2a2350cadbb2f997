use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/assignments", assignment_routes())
}

fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::assignment::list_assignments)
                .post(handlers::assignment::create_assignment),
        )
        .route(
            "/{id}",
            get(handlers::assignment::get_assignment)
                .put(handlers::assignment::update_assignment)
                .delete(handlers::assignment::delete_assignment)
                .patch(handlers::assignment::patch_assignment),
        )
        .route(
            "/{id}/submission",
            post(handlers::submission::submit_assignment),
        )
}
