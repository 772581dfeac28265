// ── Event forwarding ──
//
// Client connect/disconnect events keep presence current between full
// resyncs. Roaming and advisory events are only logged.

use tracing::{debug, trace};

use crate::api::ControllerApi;
use crate::bridge::Bridge;
use crate::bus::Bus;
use crate::model::{ControllerEvent, EventKind};
use crate::payload;

impl<B: Bus, A: ControllerApi + Clone + 'static> Bridge<B, A> {
    pub fn forward(&mut self, event: &ControllerEvent) {
        match event.kind {
            EventKind::Connected | EventKind::Disconnected => self.apply_client_event(event),
            kind if kind.is_advisory() => debug!(key = %event.key, ?kind, "unifi <"),
            _ => trace!(key = %event.key, "ignoring controller event"),
        }
    }

    fn apply_client_event(&mut self, event: &ControllerEvent) {
        let (Some(network), Some(hostname)) = (event.network.as_deref(), event.hostname.as_deref())
        else {
            debug!(key = %event.key, "client event without network or hostname, ignoring");
            return;
        };
        debug!(key = %event.key, network, hostname, "unifi <");

        let ts = event.time.unwrap_or_else(payload::now_ms);
        let mac = event.mac.as_deref();
        let change = if event.kind == EventKind::Connected {
            self.presence.apply_connect(network, hostname, mac, ts)
        } else {
            self.presence.apply_disconnect(network, hostname, mac, ts)
        };

        self.publish_summary();
        self.publish_change(&change);
    }
}
