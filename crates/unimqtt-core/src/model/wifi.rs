// ── Wireless network domain types ──

use serde::{Deserialize, Serialize};

/// A wireless network (WLAN configuration) as last fetched.
///
/// Replaced wholesale on every fetch; never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirelessNetwork {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}
