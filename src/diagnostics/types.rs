//! Diagnostics data model: server identifiers, status tiers and snapshots.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use time::OffsetDateTime;

/// Request count above which a server is reported as lagging.
pub const LAGGING_THRESHOLD: u64 = 1000;

/// Request count above which a server is reported as overloaded.
pub const OVERLOADED_THRESHOLD: u64 = 5000;

/// Known simulated servers.
///
/// Parsing is exact and case-sensitive: `"server1"` is known, `"Server1"` is not.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServerId {
    /// First simulated server.
    Server1,
    /// Second simulated server.
    Server2,
    /// Third simulated server.
    Server3,
}

impl ServerId {
    /// All known servers in declaration order.
    pub fn all() -> impl Iterator<Item = ServerId> {
        ServerId::iter()
    }

    /// Wire name of the server, as used in URL paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerId::Server1 => "server1",
            ServerId::Server2 => "server2",
            ServerId::Server3 => "server3",
        }
    }
}

/// Health tier derived from the cumulative request count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
pub enum Status {
    /// Normal operation.
    #[default]
    Online,
    /// More than [`LAGGING_THRESHOLD`] requests recorded.
    Lagging,
    /// More than [`OVERLOADED_THRESHOLD`] requests recorded.
    Overloaded,
}

impl Status {
    /// Derive the tier from a request count. Both thresholds are exclusive.
    pub fn from_request_count(requests: u64) -> Self {
        if requests > OVERLOADED_THRESHOLD {
            Status::Overloaded
        } else if requests > LAGGING_THRESHOLD {
            Status::Lagging
        } else {
            Status::Online
        }
    }
}

/// Mutable per-server state held by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDiagnostics {
    /// Requests recorded since start or last reset.
    pub request_count: u64,
    /// Simulated ping of the last request, 0 when none recorded.
    pub last_ping_ms: u32,
    /// When the last request was recorded.
    pub last_request: Option<OffsetDateTime>,
}

impl ServerDiagnostics {
    /// Current tier; always recomputed from the live counter.
    pub fn status(&self) -> Status {
        Status::from_request_count(self.request_count)
    }

    /// Apply one simulated request.
    pub fn record(&mut self, ping_ms: u32, at: OffsetDateTime) {
        self.request_count = self.request_count.saturating_add(1);
        self.last_ping_ms = ping_ms;
        self.last_request = Some(at);
    }

    /// Return to the startup state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Copy the state out for a response.
    pub fn snapshot(&self, id: ServerId) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            id,
            requests: self.request_count,
            last_ping: self.last_ping_ms,
            last_request: self.last_request,
            status: self.status(),
        }
    }
}

/// Point-in-time view of one server, serialized as the diagnostics body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    /// Server this snapshot belongs to.
    #[serde(skip)]
    pub id: ServerId,
    /// Request count.
    pub requests: u64,
    /// Last simulated ping in milliseconds.
    pub last_ping: u32,
    /// RFC 3339 timestamp of the last request, `null` if none.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_request: Option<OffsetDateTime>,
    /// Derived status tier.
    pub status: Status,
}
