// ── Domain model ──
//
// Bridge-side views of the controller's records. Only the fields the
// bridge publishes or resolves by are kept; conversion from the API
// types lives in `crate::convert`.

pub mod client;
pub mod device;
pub mod event;
pub mod wifi;

pub use client::ClientSession;
pub use device::{Device, LedOverride};
pub use event::{ControllerEvent, EventKind};
pub use wifi::WirelessNetwork;
