//! HTTP API route definitions.

use std::any::Any;
use std::path::Path;

use axum::{
    handler::HandlerWithoutStateExt,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::error;

use super::handlers::{
    diagnostics, frontend_root, health, homepage, metrics, network_specs, not_found,
    record_request, reset, servers, track_latency, AppState,
};
use crate::error::ApiError;

/// Routes backed by the diagnostics registry and host introspection.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/servers", get(servers))
        .route("/api/network/specs", get(network_specs))
        .route("/api/:server/diagnostics", get(diagnostics))
        .route("/api/:server/request", post(record_request))
        .route("/api/:server/reset", post(reset))
}

/// Create the unified backend router: API, homepage, metrics and static fallback.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api_routes())
        .route_layer(middleware::from_fn(track_latency))
        .fallback_service(ServeDir::new(static_dir).not_found_service(not_found.into_service()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create the frontend-only router: `/` redirects to the entry page, everything
/// else is served from `static_dir`.
pub fn frontend_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(frontend_root))
        .fallback_service(ServeDir::new(static_dir).not_found_service(not_found.into_service()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", details);
    ApiError::Internal(details).into_response()
}
