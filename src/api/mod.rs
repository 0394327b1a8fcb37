//! HTTP API module for diagnostics, network info, health and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, frontend_router};
