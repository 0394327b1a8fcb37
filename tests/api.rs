//! End-to-end tests of the diagnostics HTTP surface.
//!
//! Each test builds the unified router around its own registry and drives it
//! with `tower::ServiceExt::oneshot`, so no sockets are opened.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use time::macros::datetime;
use tower::ServiceExt;

use mock_diagnostics::api::{create_router, AppState};
use mock_diagnostics::diagnostics::{DiagnosticsRegistry, FixedClock, FixedPing, ServerId};

const NO_STATIC: &str = "/nonexistent-static-dir";

fn deterministic_app() -> (Router, Arc<DiagnosticsRegistry>) {
    let registry = Arc::new(DiagnosticsRegistry::with_sources(
        Arc::new(FixedPing(137)),
        Arc::new(FixedClock(datetime!(2024-03-10 08:00:00 UTC))),
    ));
    let app = create_router(AppState::new(Arc::clone(&registry)), NO_STATIC);
    (app, registry)
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn fresh_servers_report_zero_state() {
    let (app, _) = deterministic_app();

    for id in ServerId::all() {
        let response = send(&app, "GET", &format!("/api/{id}/diagnostics")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "requests": 0, "lastPing": 0, "lastRequest": null, "status": "Online" })
        );
    }
}

#[tokio::test]
async fn record_request_updates_diagnostics() {
    let (app, _) = deterministic_app();

    let response = send(&app, "POST", "/api/server2/request").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "success": true }));

    let response = send(&app, "GET", "/api/server2/diagnostics").await;
    assert_eq!(
        json_body(response).await,
        json!({
            "requests": 1,
            "lastPing": 137,
            "lastRequest": "2024-03-10T08:00:00Z",
            "status": "Online",
        })
    );
}

#[tokio::test]
async fn lagging_scenario_then_reset() {
    let (app, _) = deterministic_app();

    for _ in 0..1500 {
        let response = send(&app, "POST", "/api/server1/request").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = json_body(send(&app, "GET", "/api/server1/diagnostics").await).await;
    assert_eq!(body["requests"], 1500);
    assert_eq!(body["status"], "Lagging");

    let response = send(&app, "POST", "/api/server1/reset").await;
    assert_eq!(json_body(response).await, json!({ "success": true }));

    let body = json_body(send(&app, "GET", "/api/server1/diagnostics").await).await;
    assert_eq!(body["requests"], 0);
    assert_eq!(body["lastPing"], 0);
    assert_eq!(body["lastRequest"], Value::Null);
    assert_eq!(body["status"], "Online");
}

#[tokio::test]
async fn overloaded_after_5001_requests() {
    let (app, registry) = deterministic_app();
    for _ in 0..5000 {
        registry.record_request("server3").unwrap();
    }

    let body = json_body(send(&app, "GET", "/api/server3/diagnostics").await).await;
    assert_eq!(body["status"], "Lagging");

    send(&app, "POST", "/api/server3/request").await;
    let body = json_body(send(&app, "GET", "/api/server3/diagnostics").await).await;
    assert_eq!(body["requests"], 5001);
    assert_eq!(body["status"], "Overloaded");
}

#[tokio::test]
async fn unknown_server_is_404_and_leaves_state_untouched() {
    let (app, registry) = deterministic_app();
    registry.record_request("server1").unwrap();
    let before = registry.snapshot_all();

    for (method, uri) in [
        ("GET", "/api/server9/diagnostics"),
        ("POST", "/api/server9/request"),
        ("POST", "/api/server9/reset"),
        ("GET", "/api/Server1/diagnostics"),
        ("POST", "/api/SERVER1/reset"),
    ] {
        let response = send(&app, method, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json_body(response).await, json!({ "error": "Server not found" }));
    }

    assert_eq!(registry.snapshot_all(), before);
}

#[tokio::test]
async fn server_listing_includes_every_server() {
    let (app, registry) = deterministic_app();
    registry.record_request("server2").unwrap();

    let body = json_body(send(&app, "GET", "/api/servers").await).await;
    let servers = body["servers"].as_array().unwrap();
    let ids: Vec<_> = servers.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["server1", "server2", "server3"]);
    assert_eq!(servers[1]["requests"], 1);
    assert_eq!(servers[0]["requests"], 0);
}

#[tokio::test]
async fn network_specs_returns_host_summary() {
    let (app, _) = deterministic_app();

    let response = send(&app, "GET", "/api/network/specs").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    for key in ["ip", "hostname", "os", "uptime"] {
        assert!(body[key].is_string(), "missing {key}");
    }
    assert_eq!(body["connections"], "N/A");
}

#[tokio::test]
async fn homepage_is_html() {
    let (app, _) = deterministic_app();

    let response = send(&app, "GET", "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Diagnostics Backend Running"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (app, _) = deterministic_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/server1/diagnostics")
                .header("origin", "http://example.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn static_files_are_served_from_directory() {
    let dir = std::env::temp_dir().join(format!("mock-diagnostics-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("-Main_.html"), "<h1>frontend</h1>").unwrap();

    let app = create_router(AppState::default(), &dir);
    let response = send(&app, "GET", "/-Main_.html").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>frontend</h1>");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn metrics_endpoint_renders_registry_counters() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let registry = Arc::new(DiagnosticsRegistry::new());
    let app = create_router(AppState::new(Arc::clone(&registry)).with_metrics(handle), NO_STATIC);

    metrics::with_local_recorder(&recorder, || {
        registry.record_request("server1").unwrap();
        registry.reset("server2").unwrap();
    });

    let body = tokio_test::block_on(async {
        let response = send(&app, "GET", "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    });

    assert!(body.contains(r#"diagnostics_requests_recorded_total{server="server1"} 1"#));
    assert!(body.contains(r#"diagnostics_resets_total{server="server2"} 1"#));
}
