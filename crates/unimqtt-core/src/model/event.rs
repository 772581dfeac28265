// ── Controller event domain types ──
//
// The event stream delivers keys like `EVT_WU_Connected`. They are turned
// into dotted snake-case names (`wu.connected`) and classified by what the
// bridge does with them.

use serde::{Deserialize, Serialize};

/// What the forwarder does with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// `*.connected`: a client joined a network.
    Connected,
    /// `*.disconnected`: a client left a network.
    Disconnected,
    /// `*.roam`: client moved between access points.
    Roam,
    /// `*.roam_radio`: client changed radio on the same access point.
    RoamRadio,
    /// `ap.detect_rogue_ap`
    RogueAp,
    /// `ad.update_available`
    UpdateAvailable,
    /// `sta:sync`, `device:sync` and other state dumps.
    Sync,
    Other,
}

impl EventKind {
    /// Classify a raw event key.
    pub fn classify(key: &str) -> Self {
        if key.contains(':') {
            return Self::Sync;
        }
        let Some(name) = event_name(key) else {
            return Self::Other;
        };
        match name.as_str() {
            "ap.detect_rogue_ap" => return Self::RogueAp,
            "ad.update_available" => return Self::UpdateAvailable,
            _ => {}
        }
        match name.split_once('.').map(|(_, action)| action) {
            Some("connected") => Self::Connected,
            Some("disconnected") => Self::Disconnected,
            Some("roam") => Self::Roam,
            Some("roam_radio") => Self::RoamRadio,
            _ => Self::Other,
        }
    }

    /// Roaming and advisory events are observed but never published.
    pub fn is_advisory(self) -> bool {
        matches!(
            self,
            Self::Roam | Self::RoamRadio | Self::RogueAp | Self::UpdateAvailable
        )
    }
}

/// `EVT_WU_Connected` → `wu.connected`, `EVT_AP_DetectRogueAP` →
/// `ap.detect_rogue_ap`. Returns `None` for keys without the `EVT_`
/// subsystem prefix.
pub fn event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("EVT_")?;
    let (subsystem, action) = rest.split_once('_')?;
    if subsystem.is_empty() || action.is_empty() {
        return None;
    }
    Some(format!(
        "{}.{}",
        subsystem.to_ascii_lowercase(),
        snake_case(action)
    ))
}

fn snake_case(camel: &str) -> String {
    let chars: Vec<char> = camel.chars().collect();
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// The fields of a controller event the forwarder acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerEvent {
    pub kind: EventKind,
    /// Raw event key as sent by the controller.
    pub key: String,
    /// ESSID for wireless client events.
    pub network: Option<String>,
    pub hostname: Option<String>,
    /// Client MAC (the event's `user` field).
    pub mac: Option<String>,
    /// Event time in epoch milliseconds.
    pub time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_subsystem_and_action() {
        assert_eq!(event_name("EVT_WU_Connected").as_deref(), Some("wu.connected"));
        assert_eq!(event_name("EVT_WG_Disconnected").as_deref(), Some("wg.disconnected"));
        assert_eq!(event_name("EVT_WU_RoamRadio").as_deref(), Some("wu.roam_radio"));
        assert_eq!(
            event_name("EVT_AP_DetectRogueAP").as_deref(),
            Some("ap.detect_rogue_ap")
        );
        assert_eq!(event_name("sta:sync"), None);
        assert_eq!(event_name("EVT_"), None);
    }

    #[test]
    fn classification() {
        assert_eq!(EventKind::classify("EVT_WU_Connected"), EventKind::Connected);
        assert_eq!(EventKind::classify("EVT_WG_Disconnected"), EventKind::Disconnected);
        assert_eq!(EventKind::classify("EVT_WU_Roam"), EventKind::Roam);
        assert_eq!(EventKind::classify("EVT_WU_RoamRadio"), EventKind::RoamRadio);
        assert_eq!(EventKind::classify("EVT_AP_DetectRogueAP"), EventKind::RogueAp);
        assert_eq!(EventKind::classify("EVT_AD_UpdateAvailable"), EventKind::UpdateAvailable);
        assert_eq!(EventKind::classify("sta:sync"), EventKind::Sync);
        assert_eq!(EventKind::classify("EVT_SW_Restarted"), EventKind::Other);
    }

    #[test]
    fn advisory_kinds() {
        assert!(EventKind::Roam.is_advisory());
        assert!(EventKind::UpdateAvailable.is_advisory());
        assert!(!EventKind::Connected.is_advisory());
        assert!(!EventKind::Sync.is_advisory());
    }
}
