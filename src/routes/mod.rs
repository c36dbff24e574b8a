//! HTTP route definitions and handlers.
//!
//! The exposition server has exactly one route, the scrape endpoint. Anything
//! else falls through to a 404.

mod metrics;
pub mod middleware;

use std::time::Duration;

use crate::state::AppState;
use crate::utils::HTTPError;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;

/// Creates the application router for the scrape endpoint at `path`.
///
/// Every request, the fallback included, is logged and bounded by
/// `write_deadline`. `path` must already be resolved.
pub fn create_router(state: AppState, path: &str, write_deadline: Duration) -> Router {
    Router::new()
        .merge(metrics::routes(path))
        .fallback(not_found)
        .layer(from_fn_with_state(
            write_deadline,
            middleware::enforce_write_deadline,
        ))
        .layer(from_fn(middleware::log_request))
        .with_state(state)
}

async fn not_found() -> HTTPError {
    HTTPError::new(StatusCode::NOT_FOUND, "Not found")
}
