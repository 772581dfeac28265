// ── Client session domain types ──

use serde::{Deserialize, Serialize};

/// One wireless client association from a session snapshot.
///
/// Exists only while a snapshot is being applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    /// ESSID the client is associated with.
    pub network: String,
    pub hostname: String,
    pub mac: String,
    /// Unix seconds when the client associated, if the controller reported it.
    pub assoc_time: Option<i64>,
}
