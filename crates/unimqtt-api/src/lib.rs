// unimqtt-api: Async client for the UniFi controller legacy API and event stream

pub mod auth;
pub mod error;
pub mod legacy;
pub mod transport;
pub mod websocket;

pub use auth::{ControllerPlatform, SessionCredentials};
pub use error::Error;
pub use legacy::LegacyClient;
pub use legacy::models::{LegacyClientEntry, LegacyDevice, LegacyWlanConf};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{EventStream, ReconnectConfig, StreamMessage, UnifiEvent};
