// ── Message bus seam ──
//
// The bridge talks to the broker through `Bus`. Calls only enqueue; the
// MQTT event loop (see `crate::mqtt`) does the actual I/O and reports
// connection changes and inbound messages back as `BridgeEvent`s.

use serde_json::Value;

use crate::error::CoreError;

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub topic: String,
    pub payload: Value,
    pub retain: bool,
}

impl Publication {
    /// A retained publication. Every status topic the bridge owns is retained.
    pub fn retained(topic: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: true,
        }
    }
}

/// Non-blocking handle to the broker connection.
pub trait Bus: Send + Sync {
    fn publish(&self, publication: Publication) -> Result<(), CoreError>;
    fn subscribe(&self, filter: &str) -> Result<(), CoreError>;
    fn unsubscribe(&self, filter: &str) -> Result<(), CoreError>;
}
