//! Configuration for the unimqtt daemon.
//!
//! Layered loading (defaults, TOML file, `UNIMQTT_*` environment, command
//! line), controller password resolution (config value or OS keyring), and
//! translation to `unimqtt_core::BridgeConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use unimqtt_api::SessionCredentials;
use unimqtt_core::{BridgeConfig, ControllerConfig, MqttConfig, TlsVerification, Timings};

const KEYRING_SERVICE: &str = "unimqtt";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for {user}@{host}")]
    NoPassword { user: String, host: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Fully merged daemon configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Instance name: topic prefix and MQTT client id.
    pub name: String,

    /// Broker URL (`mqtt://`, `mqtts://`, `tcp://`, `ssl://`).
    pub mqtt_url: String,

    pub unifi_host: String,
    pub unifi_port: u16,
    pub unifi_user: String,

    /// Controller password. Falls back to the OS keyring when unset.
    #[serde(default, skip_serializing, deserialize_with = "secret")]
    pub unifi_password: Option<SecretString>,

    pub unifi_site: String,

    /// Accept self-signed controller certificates.
    pub insecure: bool,

    /// Log level used when `RUST_LOG` is unset.
    pub verbosity: String,

    /// Controller request timeout in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "unifi".into(),
            mqtt_url: "mqtt://127.0.0.1".into(),
            unifi_host: "127.0.0.1".into(),
            unifi_port: 8443,
            unifi_user: "admin".into(),
            unifi_password: None,
            unifi_site: "default".into(),
            insecure: false,
            verbosity: "info".into(),
            timeout: 30,
        }
    }
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Command-line values. Unset fields leave lower layers untouched.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mqtt_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unifi_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unifi_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unifi_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unifi_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unifi_site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "unimqtt").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unimqtt");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Merge defaults, the TOML file, `UNIMQTT_*` variables and `overrides`,
/// in rising precedence. A missing file is not an error.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading configuration");

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("UNIMQTT_").ignore(&["config"]))
        .merge(Serialized::defaults(overrides))
        .extract()?;
    Ok(config)
}

// ── Resolution ──────────────────────────────────────────────────────

impl Config {
    /// Controller password: the configured value, else the keyring entry
    /// `unimqtt` / `<user>@<host>`.
    pub fn resolve_password(&self) -> Result<SecretString, ConfigError> {
        if let Some(ref pw) = self.unifi_password {
            return Ok(pw.clone());
        }

        let account = format!("{}@{}", self.unifi_user, self.unifi_host);
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &account) {
            if let Ok(pw) = entry.get_password() {
                debug!(account, "controller password from keyring");
                return Ok(SecretString::from(pw));
            }
        }

        Err(ConfigError::NoPassword {
            user: self.unifi_user.clone(),
            host: self.unifi_host.clone(),
        })
    }

    /// Controller root URL.
    pub fn controller_url(&self) -> Result<url::Url, ConfigError> {
        let raw = format!("https://{}:{}", self.unifi_host, self.unifi_port);
        raw.parse().map_err(|e: url::ParseError| ConfigError::Validation {
            field: "unifi_host".into(),
            reason: format!("{raw}: {e}"),
        })
    }

    pub fn into_bridge_config(self) -> Result<BridgeConfig, ConfigError> {
        if self.name.is_empty() || self.name.contains(['#', '+', '/']) {
            return Err(ConfigError::Validation {
                field: "name".into(),
                reason: format!("'{}' is not usable as a topic prefix", self.name),
            });
        }

        let mqtt_url: url::Url =
            self.mqtt_url
                .parse()
                .map_err(|e: url::ParseError| ConfigError::Validation {
                    field: "mqtt_url".into(),
                    reason: format!("{}: {e}", self.mqtt_url),
                })?;
        let mqtt = MqttConfig::from_url(&mqtt_url, &self.name).map_err(|e| {
            ConfigError::Validation {
                field: "mqtt_url".into(),
                reason: e.to_string(),
            }
        })?;

        let password = self.resolve_password()?;
        let url = self.controller_url()?;

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(BridgeConfig {
            mqtt,
            controller: ControllerConfig {
                url,
                site: self.unifi_site,
                credentials: SessionCredentials {
                    username: self.unifi_user,
                    password,
                },
                tls,
                timeout: Duration::from_secs(self.timeout),
            },
            name: self.name,
            timings: Timings::default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::result_large_err)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn load_in(jail: &Jail, overrides: &Overrides) -> Config {
        load(Some(&jail.directory().join("unimqtt.toml")), overrides).unwrap()
    }

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|jail| {
            let cfg = load_in(jail, &Overrides::default());
            assert_eq!(cfg.name, "unifi");
            assert_eq!(cfg.mqtt_url, "mqtt://127.0.0.1");
            assert_eq!(cfg.unifi_host, "127.0.0.1");
            assert_eq!(cfg.unifi_port, 8443);
            assert_eq!(cfg.unifi_user, "admin");
            assert!(cfg.unifi_password.is_none());
            assert_eq!(cfg.unifi_site, "default");
            assert!(!cfg.insecure);
            assert_eq!(cfg.verbosity, "info");
            assert_eq!(cfg.timeout, 30);
            Ok(())
        });
    }

    #[test]
    fn layers_rise_in_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "unimqtt.toml",
                r#"
                    name = "home"
                    unifi_host = "10.0.0.2"
                    unifi_site = "lab"
                    unifi_password = "from-file"
                "#,
            )?;
            jail.set_env("UNIMQTT_UNIFI_HOST", "10.0.0.3");
            jail.set_env("UNIMQTT_INSECURE", "true");

            let overrides = Overrides {
                unifi_site: Some("flag-site".into()),
                ..Overrides::default()
            };
            let cfg = load_in(jail, &overrides);

            assert_eq!(cfg.name, "home");
            assert_eq!(cfg.unifi_host, "10.0.0.3");
            assert!(cfg.insecure);
            assert_eq!(cfg.unifi_site, "flag-site");
            assert_eq!(cfg.unifi_password.unwrap().expose_secret(), "from-file");
            Ok(())
        });
    }

    #[test]
    fn bridge_config_from_values() {
        Jail::expect_with(|jail| {
            let overrides = Overrides {
                mqtt_url: Some("mqtts://bridge:pw@broker.lan".into()),
                unifi_host: Some("unifi.lan".into()),
                unifi_port: Some(443),
                unifi_password: Some("hunter2".into()),
                insecure: Some(true),
                timeout: Some(10),
                ..Overrides::default()
            };
            let bridge = load_in(jail, &overrides).into_bridge_config().unwrap();

            assert_eq!(bridge.name, "unifi");
            assert_eq!(bridge.mqtt.host, "broker.lan");
            assert_eq!(bridge.mqtt.port, 8883);
            assert_eq!(bridge.mqtt.client_id, "unifi");
            assert_eq!(bridge.controller.url.as_str(), "https://unifi.lan/");
            assert_eq!(bridge.controller.site, "default");
            assert_eq!(bridge.controller.credentials.username, "admin");
            assert_eq!(
                bridge.controller.credentials.password.expose_secret(),
                "hunter2"
            );
            assert_eq!(bridge.controller.tls, TlsVerification::DangerAcceptInvalid);
            assert_eq!(bridge.controller.timeout, Duration::from_secs(10));
            assert_eq!(bridge.timings, Timings::default());
            Ok(())
        });
    }

    #[test]
    fn rejects_unusable_values() {
        Jail::expect_with(|jail| {
            let bad_scheme = Overrides {
                mqtt_url: Some("http://broker".into()),
                unifi_password: Some("pw".into()),
                ..Overrides::default()
            };
            let err = load_in(jail, &bad_scheme).into_bridge_config().unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "mqtt_url"));

            let bad_name = Overrides {
                name: Some("uni/fi".into()),
                unifi_password: Some("pw".into()),
                ..Overrides::default()
            };
            let err = load_in(jail, &bad_name).into_bridge_config().unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "name"));
            Ok(())
        });
    }

    #[test]
    fn password_is_not_in_debug_output() {
        Jail::expect_with(|jail| {
            let overrides = Overrides {
                unifi_password: Some("hunter2".into()),
                ..Overrides::default()
            };
            let cfg = load_in(jail, &overrides);
            assert!(!format!("{cfg:?}").contains("hunter2"));
            Ok(())
        });
    }
}
