//! Bridge between a UniFi Network controller and an MQTT broker.
//!
//! This crate owns the bridge's state and behavior:
//!
//! - **[`Bridge`]**: single-threaded state machine. Bus arrivals and
//!   controller stream messages arrive as [`BridgeEvent`]s over one mpsc
//!   channel, as do the [`ApiReply`]s of controller calls the bridge spawns;
//!   delayed work runs off keyed single-shot [`timer`]s. Command
//!   routing, event forwarding and reconciliation are inherent impls in
//!   [`router`], [`forwarder`] and [`reconcile`].
//!
//! - **[`Registry`]** and **[`PresenceTracker`]**: the only state kept,
//!   rebuilt from controller snapshots on every reconnect.
//!
//! - **Seams**: [`Bus`] (implemented by [`MqttBus`] over `rumqttc`) and
//!   [`ControllerApi`] (implemented by `unimqtt_api::LegacyClient`), so the
//!   state machine can be driven with fakes.
//!
//! - **[`runtime::run`]**: wires the MQTT pump, the controller event
//!   stream and the bridge loop together for the daemon.

pub mod api;
pub mod bridge;
pub mod bus;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod forwarder;
pub mod model;
pub mod mqtt;
pub mod payload;
pub mod presence;
pub mod reconcile;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod timer;
pub mod topic;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{ApiReply, ControllerApi, Purpose};
pub use bridge::{Bridge, BridgeEvent};
pub use bus::{Bus, Publication};
pub use config::{BridgeConfig, ControllerConfig, MqttConfig, TlsVerification};
pub use error::{CoreError, TargetKind};
pub use model::{ClientSession, ControllerEvent, Device, EventKind, LedOverride, WirelessNetwork};
pub use mqtt::MqttBus;
pub use presence::{NetworkCount, PresenceChange, PresenceTracker, Summary};
pub use registry::Registry;
pub use timer::{TimerKind, Timings};
pub use topic::{Inbound, Topics};
