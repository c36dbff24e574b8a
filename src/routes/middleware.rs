//! Middleware wrapped around every route, including the fallback.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::utils::HTTPError;

/// Records method and URL, then hands the request on unchanged.
pub async fn log_request(request: Request, next: Next) -> Response {
    debug!(method = %request.method(), url = %request.uri(), "Request");
    next.run(request).await
}

/// Aborts the response with 503 when the handler does not finish within `deadline`.
pub async fn enforce_write_deadline(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let url = request.uri().clone();
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(url = %url, deadline_secs = deadline.as_secs_f64(), "Response deadline exceeded");
            HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, "Response deadline exceeded")
                .into_response()
        }
    }
}
