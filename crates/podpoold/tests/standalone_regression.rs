//! End-to-end regression tests.
//!
//! Drives the full router over an in-memory runtime: startup top-up, bound
//! enforcement, validation, degraded mode, and the unserialized
//! check-then-act window on concurrent scale requests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use podpool_api::build_router;
use podpool_core::{ContainerStatus, ScalerConfig};
use podpool_runtime::{CallCounts, MemoryRuntime, RuntimeHandle};
use podpool_scaler::Scaler;
use serde_json::Value;
use tower::ServiceExt;

fn config(min: u32, max: u32) -> Arc<ScalerConfig> {
    Arc::new(ScalerConfig {
        min_containers: min,
        max_containers: max,
        ..ScalerConfig::default()
    })
}

fn seeded(running: usize) -> Arc<MemoryRuntime> {
    let memory = Arc::new(MemoryRuntime::new());
    for i in 1..=running {
        memory.seed(
            &format!("scaled_app_{i}_{i}"),
            ContainerStatus::Running,
            "nginx:alpine",
        );
    }
    memory
}

async fn send(router: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn startup_tops_up_to_minimum() {
    let memory = Arc::new(MemoryRuntime::new());
    let scaler = Scaler::new(RuntimeHandle::Connected(memory.clone()), config(1, 3));

    let report = scaler.reconcile_startup().await;
    assert_eq!(report.previous_count, 0);
    assert_eq!(report.created.len(), 1);
    assert!(report.error.is_none());

    let router = build_router(scaler);
    let (status, body) = send(&router, "GET", "/status", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running_containers"], 1);
    assert_eq!(body["total_containers"], 1);
    assert_eq!(body["containers"][0]["status"], "running");
}

#[tokio::test]
async fn scale_up_at_maximum_is_refused() {
    let memory = seeded(3);
    let router = build_router(Scaler::new(
        RuntimeHandle::Connected(memory.clone()),
        config(1, 3),
    ));

    let (status, body) = send(&router, "POST", "/scale/up", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["current_count"], 3);
    assert_eq!(memory.calls().runs, 0);
}

#[tokio::test]
async fn scale_set_outside_bounds_touches_nothing() {
    let memory = Arc::new(MemoryRuntime::new());
    let router = build_router(Scaler::new(
        RuntimeHandle::Connected(memory.clone()),
        config(1, 3),
    ));

    let (status, body) = send(&router, "POST", "/scale/set", Body::from(r#"{"count": 5}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Count must be between 1 and 3");
    assert_eq!(memory.calls(), CallCounts::default());
}

#[tokio::test]
async fn scale_round_trip_through_router() {
    let memory = seeded(1);
    let router = build_router(Scaler::new(
        RuntimeHandle::Connected(memory.clone()),
        config(1, 4),
    ));

    let (status, body) = send(&router, "POST", "/scale/set", Body::from(r#"{"count": "3"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_count"], 3);

    let (status, body) = send(&router, "POST", "/scale/down", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous_count"], 3);
    assert_eq!(body["current_count"], 2);

    let (_, body) = send(&router, "GET", "/status", Body::empty()).await;
    assert_eq!(body["running_containers"], 2);
    assert_eq!(memory.running_names().len(), 2);
}

#[tokio::test]
async fn unreachable_runtime_still_serves() {
    let router = build_router(Scaler::new(
        RuntimeHandle::unavailable("connection refused"),
        config(1, 3),
    ));

    let (status, body) = send(&router, "GET", "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["docker"], "disconnected");

    let (status, body) = send(&router, "GET", "/status", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running_containers"], 0);
    assert_eq!(body["inventory_error"], "connection refused");

    let (status, body) = send(&router, "POST", "/scale/up", Body::empty()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn concurrent_scale_up_can_overshoot_maximum() {
    let memory = seeded(2);
    let scaler = Scaler::new(RuntimeHandle::Connected(memory.clone()), config(1, 3));

    let (a, b) = tokio::join!(scaler.scale_up(), scaler.scale_up());
    assert!(a.is_ok());
    assert!(b.is_ok());

    // Both requests read a count of 2 before either created a container.
    assert_eq!(memory.running_names().len(), 4);
}
