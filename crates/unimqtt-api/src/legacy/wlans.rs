// Legacy API wireless network endpoints
//
// WLAN configurations via rest/wlanconf (read) and upd/wlanconf/{id}
// (partial update).

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyWlanConf;

impl LegacyClient {
    /// List all wireless network configurations.
    ///
    /// `GET /api/s/{site}/rest/wlanconf`
    pub async fn list_wlans(&self) -> Result<Vec<LegacyWlanConf>, Error> {
        let url = self.site_url("rest/wlanconf")?;
        debug!("listing wireless networks");
        self.get(url).await
    }

    /// Enable or disable a wireless network.
    ///
    /// `POST /api/s/{site}/upd/wlanconf/{id}` with `{"enabled": bool}`
    pub async fn set_wlan_enabled(&self, wlan_id: &str, enabled: bool) -> Result<(), Error> {
        let url = self.site_url(&format!("upd/wlanconf/{wlan_id}"))?;
        debug!(wlan_id, enabled, "updating wireless network");
        let _: Vec<serde_json::Value> = self.post(url, &json!({ "enabled": enabled })).await?;
        Ok(())
    }
}
