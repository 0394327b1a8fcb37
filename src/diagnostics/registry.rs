//! In-memory registry of simulated per-server diagnostics.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use crate::error::RegistryError;
use crate::metrics;

use super::sources::{Clock, PingSource, RandomPing, SystemClock};
use super::types::{DiagnosticsSnapshot, ServerDiagnostics, ServerId, Status};

/// Diagnostics registry.
///
/// Every known server gets its own lock, so a record or reset on one server
/// never contends with another. Operations never hold a lock across an await.
#[derive(Debug)]
pub struct DiagnosticsRegistry {
    entries: BTreeMap<ServerId, Mutex<ServerDiagnostics>>,
    ping: Arc<dyn PingSource>,
    clock: Arc<dyn Clock>,
}

impl DiagnosticsRegistry {
    /// Registry with random pings and the system clock.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(RandomPing), Arc::new(SystemClock))
    }

    /// Registry with injected ping and clock sources.
    pub fn with_sources(ping: Arc<dyn PingSource>, clock: Arc<dyn Clock>) -> Self {
        let entries = ServerId::all()
            .map(|id| (id, Mutex::new(ServerDiagnostics::default())))
            .collect();
        Self {
            entries,
            ping,
            clock,
        }
    }

    /// Resolve a wire identifier to a known server.
    pub fn resolve(&self, server: &str) -> Result<ServerId, RegistryError> {
        ServerId::from_str(server).map_err(|_| {
            warn!(server, "Unknown server requested");
            metrics::inc_unknown_server();
            RegistryError::NotFound(server.to_string())
        })
    }

    /// Current diagnostics for `server`.
    pub fn get_diagnostics(&self, server: &str) -> Result<DiagnosticsSnapshot, RegistryError> {
        let id = self.resolve(server)?;
        Ok(self.snapshot(id))
    }

    /// Record one simulated request against `server`.
    #[instrument(skip(self))]
    pub fn record_request(&self, server: &str) -> Result<DiagnosticsSnapshot, RegistryError> {
        let id = self.resolve(server)?;
        let ping_ms = self.ping.next_ping_ms();
        let at = self.clock.now();

        let (snapshot, previous) = {
            let mut state = self.lock(id);
            let previous = state.status();
            state.record(ping_ms, at);
            (state.snapshot(id), previous)
        };

        metrics::inc_requests_recorded(id);
        if snapshot.status != previous {
            log_escalation(id, previous, snapshot.status, snapshot.requests);
        }
        debug!(requests = snapshot.requests, ping_ms, "Recorded request");
        Ok(snapshot)
    }

    /// Reset `server` to its startup state.
    #[instrument(skip(self))]
    pub fn reset(&self, server: &str) -> Result<DiagnosticsSnapshot, RegistryError> {
        let id = self.resolve(server)?;
        let snapshot = {
            let mut state = self.lock(id);
            state.reset();
            state.snapshot(id)
        };

        metrics::inc_resets(id);
        debug!("Reset diagnostics");
        Ok(snapshot)
    }

    /// Snapshot of a known server.
    pub fn snapshot(&self, id: ServerId) -> DiagnosticsSnapshot {
        self.lock(id).snapshot(id)
    }

    /// Snapshots of every server in declaration order.
    pub fn snapshot_all(&self) -> Vec<DiagnosticsSnapshot> {
        ServerId::all().map(|id| self.snapshot(id)).collect()
    }

    fn lock(&self, id: ServerId) -> MutexGuard<'_, ServerDiagnostics> {
        // Every ServerId is inserted in the constructor.
        self.entries[&id]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DiagnosticsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn log_escalation(id: ServerId, from: Status, to: Status, requests: u64) {
    match to {
        Status::Overloaded | Status::Lagging => {
            warn!(server = %id, %from, %to, requests, "Server status escalated")
        }
        Status::Online => debug!(server = %id, %from, %to, requests, "Server status changed"),
    }
}
