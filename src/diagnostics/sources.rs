//! Injectable sources for simulated latency and wall-clock time.

use rand::Rng;
use time::OffsetDateTime;

/// Smallest simulated ping in milliseconds.
pub const MIN_PING_MS: u32 = 20;

/// Largest simulated ping in milliseconds.
pub const MAX_PING_MS: u32 = 499;

/// Produces the simulated ping for a recorded request.
pub trait PingSource: Send + Sync + std::fmt::Debug {
    /// Next ping in milliseconds.
    fn next_ping_ms(&self) -> u32;
}

/// Uniformly random ping in `[MIN_PING_MS, MAX_PING_MS]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPing;

impl PingSource for RandomPing {
    fn next_ping_ms(&self) -> u32 {
        rand::thread_rng().gen_range(MIN_PING_MS..=MAX_PING_MS)
    }
}

/// Always returns the same ping. Useful for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPing(pub u32);

impl PingSource for FixedPing {
    fn next_ping_ms(&self) -> u32 {
        self.0
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current UTC time.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
