//! Clap derive structures for the `unimqtt` daemon.

use std::path::PathBuf;

use clap::Parser;

use unimqtt_config::Overrides;

/// unimqtt -- UniFi controller to MQTT bridge
#[derive(Debug, Parser)]
#[command(
    name = "unimqtt",
    version,
    about = "Bridge a UniFi Network controller to an MQTT broker",
    long_about = "Publishes wireless networks, client presence and device LED state \
        from a UniFi Network controller as retained MQTT topics, and accepts \
        LED and Wi-Fi enable commands under <name>/set/#."
)]
pub struct Cli {
    /// Instance name, used as topic prefix and MQTT client id [default: unifi]
    #[arg(long, short = 'n', env = "UNIMQTT_NAME")]
    pub name: Option<String>,

    /// MQTT broker URL [default: mqtt://127.0.0.1]
    #[arg(long, short = 'u', env = "UNIMQTT_MQTT_URL")]
    pub mqtt_url: Option<String>,

    /// Controller hostname or IP [default: 127.0.0.1]
    #[arg(long, short = 'a', env = "UNIMQTT_UNIFI_HOST")]
    pub unifi_host: Option<String>,

    /// Controller port [default: 8443]
    #[arg(long, short = 'p', env = "UNIMQTT_UNIFI_PORT")]
    pub unifi_port: Option<u16>,

    /// Controller username [default: admin]
    #[arg(long, short = 'c', env = "UNIMQTT_UNIFI_USER")]
    pub unifi_user: Option<String>,

    /// Controller password (falls back to the OS keyring)
    #[arg(long, short = 's', env = "UNIMQTT_UNIFI_PASSWORD", hide_env_values = true)]
    pub unifi_password: Option<String>,

    /// Controller site [default: default]
    #[arg(long, short = 'w', env = "UNIMQTT_UNIFI_SITE")]
    pub unifi_site: Option<String>,

    /// Accept self-signed controller certificates
    #[arg(long, short = 'k', env = "UNIMQTT_INSECURE")]
    pub insecure: bool,

    /// Log level when RUST_LOG is unset: error, warn, info, debug, trace [default: info]
    #[arg(long, short = 'v', env = "UNIMQTT_VERBOSITY")]
    pub verbosity: Option<String>,

    /// Controller request timeout in seconds [default: 30]
    #[arg(long, env = "UNIMQTT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, env = "UNIMQTT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            name: self.name.clone(),
            mqtt_url: self.mqtt_url.clone(),
            unifi_host: self.unifi_host.clone(),
            unifi_port: self.unifi_port,
            unifi_user: self.unifi_user.clone(),
            unifi_password: self.unifi_password.clone(),
            unifi_site: self.unifi_site.clone(),
            insecure: self.insecure.then_some(true),
            verbosity: self.verbosity.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unset_flags_leave_overrides_empty() {
        let cli = Cli::parse_from(["unimqtt", "-n", "lab", "-p", "443"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.name.as_deref(), Some("lab"));
        assert_eq!(overrides.unifi_port, Some(443));
        assert!(overrides.insecure.is_none());
    }
}
