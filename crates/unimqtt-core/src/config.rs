// ── Runtime bridge configuration ──
//
// These types describe *how* to reach the broker and the controller.
// They never touch disk: `unimqtt-config` resolves files, environment and
// keyring into a `BridgeConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use unimqtt_api::SessionCredentials;
use url::Url;

use crate::error::CoreError;
use crate::timer::Timings;

/// TLS verification strategy for the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Skip verification (self-signed controller certificates).
    DangerAcceptInvalid,
}

/// How to reach the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller root, e.g. `https://127.0.0.1:8443`.
    pub url: Url,
    pub site: String,
    pub credentials: SessionCredentials,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

/// How to reach the broker. Built from an `mqtt://` style URL.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl MqttConfig {
    /// Parse a broker URL.
    ///
    /// `mqtt://` and `tcp://` default to port 1883, `mqtts://` and `ssl://`
    /// to 8883 over TLS. Userinfo, if present, becomes the credentials.
    pub fn from_url(url: &Url, client_id: &str) -> Result<Self, CoreError> {
        let (tls, default_port) = match url.scheme() {
            "mqtt" | "tcp" => (false, 1883),
            "mqtts" | "ssl" => (true, 8883),
            other => {
                return Err(CoreError::Config {
                    message: format!("unsupported MQTT URL scheme '{other}'"),
                });
            }
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::Config {
                message: format!("MQTT URL '{url}' has no host"),
            })?
            .to_owned();

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(str::to_owned);
        let password = url.password().map(|p| SecretString::from(p.to_owned()));

        Ok(Self {
            host,
            port: url.port().unwrap_or(default_port),
            tls,
            username,
            password,
            client_id: client_id.to_owned(),
            keep_alive: Duration::from_secs(30),
        })
    }
}

/// Everything the bridge needs to run.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Instance name: topic prefix and MQTT client id.
    pub name: String,
    pub mqtt: MqttConfig,
    pub controller: ControllerConfig,
    pub timings: Timings,
}
