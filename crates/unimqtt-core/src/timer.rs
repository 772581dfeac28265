// ── Single-shot timers ──
//
// At most one pending deadline per kind; scheduling a kind again moves
// its deadline. The bridge loop sleeps until the earliest one.

use std::collections::HashMap;
use std::time::Duration;

use strum::{AsRefStr, Display};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    /// Quiet window after the last retained client replay.
    RetainedDrain,
    /// Client-session stage waiting for the bus to become ready.
    ClientRetry,
    /// Wireless re-fetch after an enable/disable command.
    WirelessRefetch,
}

/// Delays for each timer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub retained_drain: Duration,
    pub client_retry: Duration,
    pub wireless_refetch: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            retained_drain: Duration::from_secs(2),
            client_retry: Duration::from_secs(1),
            wireless_refetch: Duration::from_secs(5),
        }
    }
}

impl Timings {
    pub fn delay(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::RetainedDrain => self.retained_drain,
            TimerKind::ClientRetry => self.client_retry,
            TimerKind::WirelessRefetch => self.wireless_refetch,
        }
    }
}

#[derive(Debug, Default)]
pub struct Timers {
    pending: HashMap<TimerKind, Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire `delay` from now, replacing any pending deadline.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.pending.insert(kind, Instant::now() + delay);
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<(TimerKind, Instant)> {
        self.pending
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(kind, at)| (*kind, *at))
    }

    /// Disarm `kind`. Returns whether it was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.pending.remove(&kind).is_some()
    }
}

/// Sleep until `next` fires; never resolves when nothing is pending.
pub(crate) async fn expiry(next: Option<(TimerKind, Instant)>) -> TimerKind {
    match next {
        Some((kind, at)) => {
            tokio::time::sleep_until(at).await;
            kind
        }
        None => std::future::pending().await,
    }
}
