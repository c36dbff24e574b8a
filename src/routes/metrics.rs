//! Metrics exposition endpoint.

use crate::metrics::TEXT_CONTENT_TYPE;
use crate::state::AppState;
use crate::utils::HTTPError;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::error;

/// Creates the metrics route, bound to `path` and answering GET only.
///
/// HEAD is routed explicitly, otherwise axum would answer it as a GET.
pub fn routes(path: &str) -> Router<AppState> {
    Router::new().route(
        path,
        get(metrics_handler)
            .head(method_not_allowed)
            .fallback(method_not_allowed),
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        [(header::ALLOW, "GET")],
        HTTPError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
    )
}

/// Returns all collected metrics in Prometheus text format.
///
/// This endpoint should be restricted to the scraper at the network level.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.collector.render() {
        Ok(metrics_text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render metrics")
                .into_response()
        }
    }
}
