use axum::extract::{MatchedPath, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use crate::state::AppState;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EndpointLabels {
    pub endpoint: &'static str,
}

/// Per-endpoint request counters, exported as `assignment_requests_total`.
pub struct Metrics {
    registry: Registry,
    requests: Family<EndpointLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("assignment");
        let requests = Family::<EndpointLabels, Counter>::default();
        registry.register(
            "requests",
            "Requests received per endpoint",
            requests.clone(),
        );

        Self { registry, requests }
    }

    pub fn record(&self, endpoint: &'static str) {
        self.requests
            .get_or_create(&EndpointLabels { endpoint })
            .inc();
    }

    pub fn request_count(&self, endpoint: &'static str) -> u64 {
        self.requests
            .get_or_create(&EndpointLabels { endpoint })
            .get()
    }

    /// Render every metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

/// Name of the counter for a routed request, `None` for unmetered routes.
pub fn endpoint_for(method: &Method, path: &str) -> Option<&'static str> {
    let endpoint = match (path, method.as_str()) {
        ("/healthz", _) => "healthz",
        ("/v1/assignments", "POST") => "create_assignment",
        ("/v1/assignments", "GET") => "get_all_assignments",
        ("/v1/assignments/{id}", "GET") => "get_assignment",
        ("/v1/assignments/{id}", "PUT") => "update_assignment",
        ("/v1/assignments/{id}", "DELETE") => "delete_assignment",
        ("/v1/assignments/{id}", "PATCH") => "patch_assignment",
        ("/v1/assignments/{id}/submission", "POST") => "submit_assignment",
        _ => return None,
    };
    Some(endpoint)
}

/// Count every request before authentication or validation can reject it.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(path) = req.extensions().get::<MatchedPath>() {
        if let Some(endpoint) = endpoint_for(req.method(), path.as_str()) {
            state.metrics.record(endpoint);
        }
    }
    next.run(req).await
}

pub async fn export(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
