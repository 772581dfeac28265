// Legacy API client modules
//
// Hand-written client for the controller endpoints the bridge needs:
// wireless network configs, device inventory, active stations, and the
// two attribute updates. Every response is wrapped in the standard
// `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod auth;
pub mod client;
pub mod clients;
pub mod devices;
pub mod models;
pub mod wlans;

pub use client::LegacyClient;
