// ── Core error types ──
//
// Errors surfaced by the bridge. Transport details from the controller
// client are folded into a handful of domain variants by the
// `From<unimqtt_api::Error>` impl; nothing here is fatal once the bridge
// loop is running.

use std::fmt;

use thiserror::Error;

/// What kind of name a command addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Device,
    WirelessNetwork,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::WirelessNetwork => f.write_str("wireless network"),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unknown {kind}: {name}")]
    UnknownTarget { kind: TargetKind, name: String },

    #[error("Malformed payload on {topic}: {reason}")]
    MalformedPayload { topic: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Controller API error: {message}")]
    Api { message: String },

    // ── Bus errors ───────────────────────────────────────────────────
    #[error("MQTT error: {message}")]
    Bus { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unimqtt_api::Error> for CoreError {
    fn from(err: unimqtt_api::Error) -> Self {
        match err {
            unimqtt_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unimqtt_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            unimqtt_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unimqtt_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unimqtt_api::Error::LegacyApi { message } => CoreError::Api { message },
            unimqtt_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            unimqtt_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
            },
        }
    }
}

impl From<rumqttc::ClientError> for CoreError {
    fn from(err: rumqttc::ClientError) -> Self {
        CoreError::Bus {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_api_error_maps_to_api() {
        let err: CoreError = unimqtt_api::Error::LegacyApi {
            message: "api.err.IdInvalid".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { ref message } if message == "api.err.IdInvalid"));
    }

    #[test]
    fn unknown_target_names_the_kind() {
        let err = CoreError::UnknownTarget {
            kind: TargetKind::WirelessNetwork,
            name: "guest".into(),
        };
        assert_eq!(err.to_string(), "Unknown wireless network: guest");
    }
}
