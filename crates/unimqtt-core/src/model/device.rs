// ── Device domain types ──

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::payload::is_zero;

/// LED override mode of an access point or switch.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LedOverride {
    On,
    Off,
    #[default]
    Default,
}

impl LedOverride {
    /// Normalize a decoded command payload.
    ///
    /// `"on"`, `true` and non-zero numbers mean on; `"off"`, `false` and
    /// zero mean off; anything else falls back to the site default.
    pub fn from_payload(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "on" => Self::On,
            Value::String(s) if s == "off" => Self::Off,
            Value::Bool(true) => Self::On,
            Value::Bool(false) => Self::Off,
            Value::Number(n) if is_zero(n) => Self::Off,
            Value::Number(_) => Self::On,
            _ => Self::Default,
        }
    }

    /// Parse the controller's `led_override` field, treating anything
    /// unrecognized as the site default.
    pub fn from_controller(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

/// A named device as last fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub led_override: LedOverride,
}
