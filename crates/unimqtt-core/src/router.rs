// ── Command routing ──
//
// `<name>/set/device/<device>/led` and `<name>/set/wifi/<network>/enabled`.
// Unknown names are dropped with a warning; controller failures are
// logged and not retried.

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::api::{ApiReply, ControllerApi, Purpose};
use crate::bridge::Bridge;
use crate::bus::Bus;
use crate::error::CoreError;
use crate::model::LedOverride;
use crate::payload;
use crate::timer::TimerKind;

impl<B: Bus, A: ControllerApi + Clone + 'static> Bridge<B, A> {
    /// Set a device's LED override, then re-fetch devices to confirm.
    pub fn set_led(&mut self, device: &str, value: &Value) {
        let mode = LedOverride::from_payload(value);
        let id = match self.registry.resolve_device(device) {
            Ok(id) => id.to_owned(),
            Err(e) => {
                warn!(error = %e, "dropping LED command");
                return;
            }
        };

        debug!(device, device_id = %id, %mode, "unifi > rest/device");
        let device = device.to_owned();
        self.request(move |api| async move {
            let result = api.set_led_override(&id, mode).await;
            ApiReply::LedSet { device, result }
        });
    }

    pub(crate) fn on_led_set(&mut self, device: &str, result: Result<(), CoreError>) {
        match result {
            Ok(()) => self.fetch_devices(Purpose::Refresh),
            Err(e) => error!(device, error = %e, "setting LED override failed"),
        }
    }

    /// Enable or disable a wireless network. The controller takes a while
    /// to apply it, so the re-fetch is delayed.
    pub fn set_wifi_enabled(&mut self, network: &str, value: &Value) {
        let enabled = payload::truthy(value);
        let id = match self.registry.resolve_wireless(network) {
            Ok(id) => id.to_owned(),
            Err(e) => {
                warn!(error = %e, "dropping wireless command");
                return;
            }
        };

        debug!(network, network_id = %id, enabled, "unifi > upd/wlanconf");
        let network = network.to_owned();
        self.request(move |api| async move {
            let result = api.set_wireless_enabled(&id, enabled).await;
            ApiReply::WirelessSet { network, result }
        });
    }

    pub(crate) fn on_wireless_set(&mut self, network: &str, result: Result<(), CoreError>) {
        match result {
            Ok(()) => self.schedule(TimerKind::WirelessRefetch),
            Err(e) => error!(network, error = %e, "updating wireless network failed"),
        }
    }
}
