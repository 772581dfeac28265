// Legacy API device endpoints
//
// Device inventory via stat/device and the LED override attribute via
// rest/device/{id}.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyDevice;

impl LegacyClient {
    /// List all devices.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self) -> Result<Vec<LegacyDevice>, Error> {
        let url = self.site_url("stat/device")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Set a device's LED override mode (`"on"`, `"off"` or `"default"`).
    ///
    /// `PUT /api/s/{site}/rest/device/{id}` with `{"led_override": mode}`
    pub async fn set_led_override(&self, device_id: &str, mode: &str) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/device/{device_id}"))?;
        debug!(device_id, mode, "setting device LED override");
        let _: Vec<serde_json::Value> = self.put(url, &json!({ "led_override": mode })).await?;
        Ok(())
    }
}
