mod common;

use std::time::Duration;

use axum::http::{header, Method, StatusCode};
use common::{body_text, build_app, request};
use tower::ServiceExt;
use updateip_metrics::metrics::{TEXT_CONTENT_TYPE, EVENT_RECEIVE_COUNTER};
use updateip_metrics::providers::DnsUpdateProvider;

#[tokio::test]
async fn scrape_without_providers_shows_default_counter() {
    let (app, _) = build_app("", &[]);

    let response = app
        .oneshot(request("/metrics", Method::GET))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        TEXT_CONTENT_TYPE
    );
    let body = body_text(response).await;
    assert!(body.contains("# HELP updateip_count_event_receive Count of events received"));
    assert!(body.contains("# TYPE updateip_count_event_receive counter"));
    assert!(body.lines().any(|l| l == "updateip_count_event_receive 0"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, _) = build_app("", &[]);

    let response = app
        .oneshot(request("/health", Method::GET))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_get_methods_are_not_allowed() {
    let (app, _) = build_app("", &[]);

    for method in [Method::HEAD, Method::POST, Method::PUT, Method::DELETE] {
        let response = app
            .clone()
            .oneshot(request("/metrics", method.clone()))
            .await
            .expect("request should succeed");
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{} should be rejected",
            method
        );
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET",
            "{} should advertise GET only",
            method
        );
    }
}

#[tokio::test]
async fn custom_path_replaces_default() {
    let (app, _) = build_app("/internal/stats", &[]);

    let moved = app
        .clone()
        .oneshot(request("/internal/stats", Method::GET))
        .await
        .unwrap();
    assert_eq!(moved.status(), StatusCode::OK);

    let old = app.oneshot(request("/metrics", Method::GET)).await.unwrap();
    assert_eq!(old.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provider_metrics_are_exposed_with_histogram_series() {
    let aws = DnsUpdateProvider::new("aws").unwrap();
    let (app, _) = build_app("/metrics", &[&aws]);

    aws.record_update();
    aws.set_status(true);
    aws.observe("update", Duration::from_millis(30));
    aws.observe("update", Duration::from_millis(40));
    aws.observe("lookup", Duration::from_millis(2));

    let response = app.oneshot(request("/metrics", Method::GET)).await.unwrap();
    let body = body_text(response).await;

    assert!(body.lines().any(|l| l == "updateip_aws_update 1"));
    assert!(body.lines().any(|l| l == "updateip_aws_status 1"));
    assert!(body.contains("# TYPE updateip_aws_func_time histogram"));
    assert!(body
        .lines()
        .any(|l| l == "updateip_aws_func_time_bucket{where=\"update\",le=\"+Inf\"} 2"));
    assert!(body
        .lines()
        .any(|l| l == "updateip_aws_func_time_count{where=\"update\"} 2"));
    assert!(body
        .lines()
        .any(|l| l == "updateip_aws_func_time_count{where=\"lookup\"} 1"));
    assert!(body.contains("updateip_aws_func_time_sum{where=\"update\"}"));
}

#[tokio::test]
async fn concurrent_increments_show_up_in_scrape() {
    let (app, collector) = build_app("/metrics", &[]);

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let counter = collector.event_received();
            tokio::spawn(async move { counter.inc() })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.counter_value(EVENT_RECEIVE_COUNTER, &[]), Some(100.0));

    let body = body_text(app.oneshot(request("/metrics", Method::GET)).await.unwrap()).await;
    assert!(body.lines().any(|l| l == "updateip_count_event_receive 100"));
}
