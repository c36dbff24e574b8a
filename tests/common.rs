#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use updateip_metrics::config::MetricsServerConfig;
use updateip_metrics::connection::WRITE_TIMEOUT;
use updateip_metrics::metrics::{MetricsCollector, MetricsProvider};
use updateip_metrics::routes::create_router;
use updateip_metrics::state::AppState;

/// Builds the exposition router at `path` with the given providers registered.
pub fn build_app(path: &str, providers: &[&dyn MetricsProvider]) -> (Router, Arc<MetricsCollector>) {
    let mut collector = MetricsCollector::new().expect("default instruments should register");
    for provider in providers {
        collector
            .register_provider(*provider)
            .expect("provider should register");
    }
    let collector = Arc::new(collector);
    let resolved = MetricsServerConfig {
        path: path.to_string(),
        ..Default::default()
    }
    .resolve()
    .expect("path should be routable");

    (
        create_router(AppState::new(collector.clone()), &resolved.path, WRITE_TIMEOUT),
        collector,
    )
}

pub fn request(path: &str, method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
