// ── Identifier registry ──
//
// Name → record maps for wireless networks and devices. Each refresh
// replaces a map wholesale; iteration follows the order of the last
// fetch so summaries come out stable.

use indexmap::IndexMap;

use crate::error::{CoreError, TargetKind};
use crate::model::{Device, WirelessNetwork};

#[derive(Debug, Default)]
pub struct Registry {
    wireless: IndexMap<String, WirelessNetwork>,
    devices: IndexMap<String, Device>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all wireless networks. Returns the names that were known
    /// before and are absent from `networks`.
    pub fn refresh_wireless(&mut self, networks: Vec<WirelessNetwork>) -> Vec<String> {
        let fresh: IndexMap<String, WirelessNetwork> = networks
            .into_iter()
            .map(|n| (n.name.clone(), n))
            .collect();
        let dropped = self
            .wireless
            .keys()
            .filter(|name| !fresh.contains_key(*name))
            .cloned()
            .collect();
        self.wireless = fresh;
        dropped
    }

    /// Replace all devices. Returns the names that disappeared.
    pub fn refresh_devices(&mut self, devices: Vec<Device>) -> Vec<String> {
        let fresh: IndexMap<String, Device> = devices
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        let dropped = self
            .devices
            .keys()
            .filter(|name| !fresh.contains_key(*name))
            .cloned()
            .collect();
        self.devices = fresh;
        dropped
    }

    pub fn resolve_wireless(&self, name: &str) -> Result<&str, CoreError> {
        self.wireless
            .get(name)
            .map(|n| n.id.as_str())
            .ok_or_else(|| CoreError::UnknownTarget {
                kind: TargetKind::WirelessNetwork,
                name: name.to_owned(),
            })
    }

    pub fn resolve_device(&self, name: &str) -> Result<&str, CoreError> {
        self.devices
            .get(name)
            .map(|d| d.id.as_str())
            .ok_or_else(|| CoreError::UnknownTarget {
                kind: TargetKind::Device,
                name: name.to_owned(),
            })
    }

    pub fn wireless(&self, name: &str) -> Option<&WirelessNetwork> {
        self.wireless.get(name)
    }

    /// Wireless networks in fetch order.
    pub fn networks(&self) -> impl Iterator<Item = &WirelessNetwork> {
        self.wireless.values()
    }

    /// Devices in fetch order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Forget everything. Done when the controller comes back online.
    pub fn clear(&mut self) {
        self.wireless.clear();
        self.devices.clear();
    }
}
