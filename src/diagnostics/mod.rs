//! Simulated server diagnostics.
//!
//! This module handles:
//! - Server identifiers and status tiers
//! - The per-server diagnostics registry
//! - Injectable ping and clock sources

pub mod registry;
pub mod sources;
pub mod types;

pub use registry::DiagnosticsRegistry;
pub use sources::{Clock, FixedClock, FixedPing, PingSource, RandomPing, SystemClock};
pub use types::{DiagnosticsSnapshot, ServerDiagnostics, ServerId, Status};
