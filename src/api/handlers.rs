//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::json;

use crate::diagnostics::{DiagnosticsRegistry, DiagnosticsSnapshot, ServerId};
use crate::error::ApiError;
use crate::metrics::record_http_latency;
use crate::netinfo::{self, NetworkSpecs};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Simulated diagnostics for every known server.
    pub registry: Arc<DiagnosticsRegistry>,
    /// Prometheus render handle, absent when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    /// Process start, used as a fallback for host uptime.
    pub started: Instant,
    /// Redirect target for the frontend root.
    pub frontend_entry: String,
}

impl AppState {
    /// Create new app state around a registry.
    pub fn new(registry: Arc<DiagnosticsRegistry>) -> Self {
        Self {
            registry,
            metrics: None,
            started: Instant::now(),
            frontend_entry: "/-Main_.html".to_string(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set the frontend redirect target.
    pub fn with_frontend_entry(mut self, entry: impl Into<String>) -> Self {
        self.frontend_entry = entry.into();
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .field("metrics", &self.metrics.is_some())
            .field("started", &self.started)
            .field("frontend_entry", &self.frontend_entry)
            .finish()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(DiagnosticsRegistry::new()))
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Mutation acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
}

/// One entry of the server listing.
#[derive(Debug, Serialize)]
pub struct ServerEntry {
    /// Server identifier.
    pub id: ServerId,
    /// Diagnostics fields, flattened.
    #[serde(flatten)]
    pub diagnostics: DiagnosticsSnapshot,
}

/// Server listing response.
#[derive(Debug, Serialize)]
pub struct ServersResponse {
    /// Every known server in declaration order.
    pub servers: Vec<ServerEntry>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// `GET /api/{server}/diagnostics`.
pub async fn diagnostics(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<DiagnosticsSnapshot>, ApiError> {
    Ok(Json(state.registry.get_diagnostics(&server)?))
}

/// `POST /api/{server}/request`.
pub async fn record_request(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.registry.record_request(&server)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /api/{server}/reset`.
pub async fn reset(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.registry.reset(&server)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `GET /api/servers` - every server's diagnostics.
pub async fn servers(State(state): State<AppState>) -> Json<ServersResponse> {
    let servers = state
        .registry
        .snapshot_all()
        .into_iter()
        .map(|diagnostics| ServerEntry {
            id: diagnostics.id,
            diagnostics,
        })
        .collect();
    Json(ServersResponse { servers })
}

/// `GET /api/network/specs` - host introspection.
pub async fn network_specs(State(state): State<AppState>) -> Result<Json<NetworkSpecs>, ApiError> {
    let started = state.started;
    let specs = tokio::task::spawn_blocking(move || netinfo::collect(started))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::NetworkSpecs(e.to_string()))?;
    Ok(Json(specs))
}

/// `GET /metrics` - Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Metrics recorder not installed" })),
        )
            .into_response(),
    }
}

/// Backend homepage listing the available endpoints.
pub async fn homepage() -> Html<String> {
    let mut endpoints = String::new();
    for id in ServerId::all() {
        endpoints.push_str(&format!("          <li><code>GET /api/{id}/diagnostics</code></li>\n"));
    }
    endpoints.push_str("          <li><code>POST /api/server1/request</code> (or server2/server3)</li>\n");
    endpoints.push_str("          <li><code>POST /api/server1/reset</code> (or server2/server3)</li>\n");
    endpoints.push_str("          <li><code>GET /api/servers</code></li>\n");
    endpoints.push_str("          <li><code>GET /api/network/specs</code></li>\n");

    Html(format!(
        r#"<html>
      <head>
        <title>Diagnostics Backend</title>
        <style>
          body {{ background: #181c24; color: #fff; font-family: Arial, sans-serif; padding: 2rem; }}
          h1 {{ color: #4caf50; }}
          code {{ background: #232526; color: #90caf9; padding: 2px 6px; border-radius: 4px; }}
          ul {{ margin-top: 1.5rem; }}
        </style>
      </head>
      <body>
        <h1>Diagnostics Backend Running</h1>
        <p>This backend provides diagnostics and testing endpoints for your project.</p>
        <h2>Available Endpoints</h2>
        <ul>
{endpoints}        </ul>
        <p style="margin-top:2rem;color:#90caf9;">Status: <b>Online</b></p>
      </body>
    </html>
"#
    ))
}

/// Frontend root redirect.
pub async fn frontend_root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.frontend_entry)
}

/// JSON 404 for unmatched routes and missing static files.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Middleware recording handler latency per matched route.
pub async fn track_latency(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "fallback".to_string());
    let start = Instant::now();
    let response = next.run(request).await;
    record_http_latency(start, &endpoint);
    response
}
