//! Mock server diagnostics backend.
//!
//! Simulates a small fixed set of servers, each with a request counter, a
//! randomly generated ping and a status tier derived from the counter:
//!
//! ```text
//! requests <= 1000         Online
//! 1000 < requests <= 5000  Lagging
//! requests > 5000          Overloaded
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`diagnostics`]: Server identifiers, status tiers and the registry
//! - [`netinfo`]: Host introspection for the network specs endpoint
//! - [`api`]: HTTP API, homepage and static frontend
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Shutdown signal and heartbeat

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod netinfo;
pub mod utils;

pub use config::Config;
pub use diagnostics::DiagnosticsRegistry;
pub use error::{AppError, Result};
