// ── Controller API seam ──
//
// What the bridge needs from the controller, already converted to domain
// types. Implemented for `LegacyClient`; tests substitute a recording fake.
// The bridge runs each call as its own task and gets the outcome back as
// an `ApiReply`.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;
use unimqtt_api::LegacyClient;

use crate::convert;
use crate::error::CoreError;
use crate::model::{ClientSession, Device, LedOverride, WirelessNetwork};

pub trait ControllerApi: Send + Sync {
    fn wireless_networks(
        &self,
    ) -> impl Future<Output = Result<Vec<WirelessNetwork>, CoreError>> + Send;

    fn devices(&self) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;

    fn client_sessions(&self) -> impl Future<Output = Result<Vec<ClientSession>, CoreError>> + Send;

    fn set_led_override(
        &self,
        device_id: &str,
        mode: LedOverride,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_wireless_enabled(
        &self,
        network_id: &str,
        enabled: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ControllerApi for LegacyClient {
    async fn wireless_networks(&self) -> Result<Vec<WirelessNetwork>, CoreError> {
        let wlans = self.list_wlans().await?;
        Ok(wlans.into_iter().map(WirelessNetwork::from).collect())
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let raw = self.list_devices().await?;
        let total = raw.len();
        let devices: Vec<Device> = raw.into_iter().filter_map(convert::device).collect();
        if devices.len() < total {
            debug!(skipped = total - devices.len(), "skipped unnamed devices");
        }
        Ok(devices)
    }

    async fn client_sessions(&self) -> Result<Vec<ClientSession>, CoreError> {
        let raw = self.list_clients().await?;
        Ok(raw.into_iter().filter_map(convert::client_session).collect())
    }

    async fn set_led_override(&self, device_id: &str, mode: LedOverride) -> Result<(), CoreError> {
        Ok(LegacyClient::set_led_override(self, device_id, mode.as_ref()).await?)
    }

    async fn set_wireless_enabled(&self, network_id: &str, enabled: bool) -> Result<(), CoreError> {
        Ok(self.set_wlan_enabled(network_id, enabled).await?)
    }
}

impl<T: ControllerApi> ControllerApi for Arc<T> {
    async fn wireless_networks(&self) -> Result<Vec<WirelessNetwork>, CoreError> {
        (**self).wireless_networks().await
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        (**self).devices().await
    }

    async fn client_sessions(&self) -> Result<Vec<ClientSession>, CoreError> {
        (**self).client_sessions().await
    }

    async fn set_led_override(&self, device_id: &str, mode: LedOverride) -> Result<(), CoreError> {
        (**self).set_led_override(device_id, mode).await
    }

    async fn set_wireless_enabled(&self, network_id: &str, enabled: bool) -> Result<(), CoreError> {
        (**self).set_wireless_enabled(network_id, enabled).await
    }
}

// ── Replies ──────────────────────────────────────────────────────────

/// Why a wireless or device fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// A stage of the full resync with this generation number.
    Reconcile { generation: u64 },
    /// A one-off re-fetch after a command.
    Refresh,
}

/// Outcome of a controller call, delivered back to the bridge loop.
#[derive(Debug)]
pub enum ApiReply {
    Wireless {
        purpose: Purpose,
        result: Result<Vec<WirelessNetwork>, CoreError>,
    },
    Devices {
        purpose: Purpose,
        result: Result<Vec<Device>, CoreError>,
    },
    Clients {
        generation: u64,
        result: Result<Vec<ClientSession>, CoreError>,
    },
    LedSet {
        device: String,
        result: Result<(), CoreError>,
    },
    WirelessSet {
        network: String,
        result: Result<(), CoreError>,
    },
}
