// ── API-to-domain type conversions ──
//
// Bridges the controller's loosely typed records into the bridge's
// domain model. Records the bridge cannot address (unnamed devices,
// wired clients) convert to `None`.

use unimqtt_api::{LegacyClientEntry, LegacyDevice, LegacyWlanConf, UnifiEvent};

use crate::model::{ClientSession, ControllerEvent, Device, EventKind, LedOverride, WirelessNetwork};

impl From<LegacyWlanConf> for WirelessNetwork {
    fn from(w: LegacyWlanConf) -> Self {
        Self {
            id: w.id,
            name: w.name,
            enabled: w.enabled,
        }
    }
}

/// Devices without a name cannot be addressed by topic.
pub fn device(d: LegacyDevice) -> Option<Device> {
    let name = d.name.filter(|n| !n.is_empty())?;
    Some(Device {
        led_override: LedOverride::from_controller(d.led_override.as_deref()),
        id: d.id,
        name,
    })
}

/// Wired clients (no ESSID) are not tracked. Hostname falls back to the
/// alias, then the MAC.
pub fn client_session(c: LegacyClientEntry) -> Option<ClientSession> {
    if c.is_wired == Some(true) {
        return None;
    }
    let network = c.essid.filter(|e| !e.is_empty())?;
    let hostname = c
        .hostname
        .or(c.name)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| c.mac.clone());
    Some(ClientSession {
        network,
        hostname,
        mac: c.mac,
        assoc_time: c.assoc_time,
    })
}

impl From<&UnifiEvent> for ControllerEvent {
    fn from(e: &UnifiEvent) -> Self {
        let mac = e.field("user").map(str::to_owned);
        let hostname = e
            .field("hostname")
            .filter(|h| !h.is_empty())
            .map(str::to_owned)
            .or_else(|| mac.clone());
        Self {
            kind: EventKind::classify(&e.key),
            key: e.key.clone(),
            network: e.field("ssid").filter(|s| !s.is_empty()).map(str::to_owned),
            hostname,
            mac,
            time: e.field_i64("time"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(value: serde_json::Value) -> LegacyClientEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unnamed_devices_are_skipped() {
        let d: LegacyDevice =
            serde_json::from_value(json!({"_id": "d1", "mac": "aa", "led_override": "off"})).unwrap();
        assert!(device(d).is_none());

        let d: LegacyDevice = serde_json::from_value(
            json!({"_id": "d1", "mac": "aa", "name": "office", "led_override": "off"}),
        )
        .unwrap();
        let dev = device(d).unwrap();
        assert_eq!(dev.name, "office");
        assert_eq!(dev.led_override, LedOverride::Off);
    }

    #[test]
    fn wired_clients_are_ignored() {
        assert!(client_session(entry(json!({"mac": "m", "is_wired": true, "essid": "x"}))).is_none());
        assert!(client_session(entry(json!({"mac": "m", "hostname": "nas"}))).is_none());
    }

    #[test]
    fn hostname_falls_back_to_name_then_mac() {
        let s = client_session(entry(json!({"mac": "m1", "essid": "home", "name": "phone"}))).unwrap();
        assert_eq!(s.hostname, "phone");
        let s = client_session(entry(json!({"mac": "m2", "essid": "home"}))).unwrap();
        assert_eq!(s.hostname, "m2");
    }

    #[test]
    fn connect_event_fields() {
        let event: UnifiEvent = serde_json::from_value(json!({
            "key": "EVT_WU_Connected",
            "subsystem": "wlan",
            "site_id": "s",
            "user": "aa:bb",
            "ssid": "home",
            "hostname": "laptop1",
            "time": 1_700_000_000_123_i64
        }))
        .unwrap();
        let ev = ControllerEvent::from(&event);
        assert_eq!(ev.kind, EventKind::Connected);
        assert_eq!(ev.network.as_deref(), Some("home"));
        assert_eq!(ev.hostname.as_deref(), Some("laptop1"));
        assert_eq!(ev.mac.as_deref(), Some("aa:bb"));
        assert_eq!(ev.time, Some(1_700_000_000_123));
    }
}
