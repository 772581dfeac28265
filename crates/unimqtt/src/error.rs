//! Startup error types with miette diagnostics.
//!
//! Once the bridge is running nothing is fatal; these cover what can stop
//! it from starting at all.

use miette::Diagnostic;
use thiserror::Error;

use unimqtt_config::ConfigError;
use unimqtt_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unimqtt::validation))]
    Validation { field: String, reason: String },

    #[error("No controller password for {user}@{host}")]
    #[diagnostic(
        code(unimqtt::no_password),
        help(
            "Pass --unifi-password (-s), set UNIMQTT_UNIFI_PASSWORD, add unifi_password \
             to the config file, or store it in the OS keyring under service 'unimqtt', \
             account '{user}@{host}'."
        )
    )]
    NoPassword { user: String, host: String },

    #[error(transparent)]
    #[diagnostic(code(unimqtt::config))]
    Config(Box<figment::Error>),

    #[error("Could not connect to {url}: {reason}")]
    #[diagnostic(
        code(unimqtt::connection_failed),
        help("Check that the address is reachable. Use --insecure (-k) for self-signed controllers.")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unimqtt::auth_failed),
        help("Verify --unifi-user and the controller password.")
    )]
    AuthFailed { message: String },

    #[error(transparent)]
    #[diagnostic(code(unimqtt::core))]
    Core(CoreError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::NoPassword { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Core(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoPassword { user, host } => Self::NoPassword { user, host },
            ConfigError::Figment(e) => Self::Config(e),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Config { message } => Self::Validation {
                field: "configuration".into(),
                reason: message,
            },
            other => Self::Core(other),
        }
    }
}
