// ── Presence tracker ──
//
// Per-network client counts plus the hostnames replayed from retained
// broker state that the next full snapshot has to confirm or retire.
// The tracker never publishes; it returns `PresenceChange`s and a
// `Summary` for the bridge to render.

use indexmap::{IndexMap, IndexSet};
use tracing::warn;

use crate::model::ClientSession;
use crate::registry::Registry;

/// A client appearing on or leaving a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceChange {
    pub network: String,
    pub hostname: String,
    pub present: bool,
    pub mac: Option<String>,
    /// Epoch milliseconds.
    pub ts: i64,
}

/// Count and enabled flag for one known network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCount {
    pub name: String,
    pub count: u32,
    pub enabled: bool,
}

/// Counts for every known network plus their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub networks: Vec<NetworkCount>,
    pub total: u32,
}

#[derive(Debug, Default)]
pub struct PresenceTracker {
    counts: IndexMap<String, u32>,
    retained: IndexMap<String, IndexSet<String>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for `network`; zero if never seen.
    pub fn count(&self, network: &str) -> u32 {
        self.counts.get(network).copied().unwrap_or(0)
    }

    /// Number of retained hostnames still waiting for confirmation.
    pub fn pending_candidates(&self) -> usize {
        self.retained.values().map(IndexSet::len).sum()
    }

    /// Rebuild all counts from a complete session list.
    ///
    /// Emits presence for every session, then absence for every retained
    /// candidate the snapshot did not confirm. The candidate set is empty
    /// afterwards.
    pub fn apply_full_snapshot(&mut self, sessions: &[ClientSession], ts: i64) -> Vec<PresenceChange> {
        self.counts.clear();
        let mut seen: IndexSet<(&str, &str)> = IndexSet::new();
        let mut changes = Vec::with_capacity(sessions.len());

        for session in sessions {
            if !seen.insert((session.network.as_str(), session.mac.as_str())) {
                continue;
            }
            *self.counts.entry(session.network.clone()).or_insert(0) += 1;

            if let Some(candidates) = self.retained.get_mut(&session.network) {
                candidates.shift_remove(&session.hostname);
            }

            changes.push(PresenceChange {
                network: session.network.clone(),
                hostname: session.hostname.clone(),
                present: true,
                mac: Some(session.mac.clone()),
                ts,
            });
        }

        for (network, hostnames) in self.retained.drain(..) {
            for hostname in hostnames {
                changes.push(PresenceChange {
                    network: network.clone(),
                    hostname,
                    present: false,
                    mac: None,
                    ts,
                });
            }
        }

        changes
    }

    pub fn apply_connect(
        &mut self,
        network: &str,
        hostname: &str,
        mac: Option<&str>,
        ts: i64,
    ) -> PresenceChange {
        let count = self.counts.entry(network.to_owned()).or_insert(0);
        *count = count.saturating_add(1);

        PresenceChange {
            network: network.to_owned(),
            hostname: hostname.to_owned(),
            present: true,
            mac: mac.map(str::to_owned),
            ts,
        }
    }

    /// Decrement with a floor of zero. A disconnect nobody was counted for
    /// is logged as a phantom and leaves the count at zero.
    pub fn apply_disconnect(
        &mut self,
        network: &str,
        hostname: &str,
        mac: Option<&str>,
        ts: i64,
    ) -> PresenceChange {
        let count = self.counts.entry(network.to_owned()).or_insert(0);
        if *count == 0 {
            warn!(network, hostname, "phantom disconnect: no client counted on this network");
        } else {
            *count -= 1;
        }

        PresenceChange {
            network: network.to_owned(),
            hostname: hostname.to_owned(),
            present: false,
            mac: mac.map(str::to_owned),
            ts,
        }
    }

    /// Record a hostname replayed as present from retained broker state.
    pub fn retain_candidate(&mut self, network: &str, hostname: &str) {
        self.retained
            .entry(network.to_owned())
            .or_default()
            .insert(hostname.to_owned());
    }

    /// Zero the count of a network that left the registry. The entry stays
    /// so its final zero can be published.
    pub fn retire(&mut self, network: &str) {
        self.counts.insert(network.to_owned(), 0);
    }

    /// Tracked networks with clients that are not in the registry.
    pub fn orphaned(&self, registry: &Registry) -> Vec<String> {
        self.counts
            .iter()
            .filter(|&(name, &count)| count > 0 && registry.wireless(name).is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Count and enabled flag for each registry network, in registry order.
    pub fn summary(&self, registry: &Registry) -> Summary {
        let networks: Vec<NetworkCount> = registry
            .networks()
            .map(|n| NetworkCount {
                name: n.name.clone(),
                count: self.count(&n.name),
                enabled: n.enabled,
            })
            .collect();
        let total = networks.iter().map(|n| n.count).sum();
        Summary { networks, total }
    }
}
