// ── Reconciliation ──
//
// Full resync on controller connect: wireless networks, then devices,
// then client sessions. Each stage is started by the previous stage's
// reply, so they never overlap; a newer resync bumps the generation and
// replies from the old one are discarded. Also the start-of-day drain of
// retained client topics, which has to finish before the first client
// snapshot is applied.

use indexmap::IndexSet;
use tracing::{debug, error, info, trace};

use crate::api::{ApiReply, ControllerApi, Purpose};
use crate::bridge::Bridge;
use crate::bus::{Bus, Publication};
use crate::error::CoreError;
use crate::model::{ClientSession, Device, WirelessNetwork};
use crate::payload;
use crate::timer::TimerKind;

impl<B: Bus, A: ControllerApi + Clone + 'static> Bridge<B, A> {
    /// Start the whole pipeline. A failed fetch stops it; the next
    /// controller connect starts over.
    pub fn reconcile(&mut self) {
        self.generation += 1;
        debug!(generation = self.generation, "starting reconciliation");
        self.fetch_wireless(Purpose::Reconcile {
            generation: self.generation,
        });
    }

    pub(crate) fn fetch_wireless(&self, purpose: Purpose) {
        debug!(?purpose, "unifi > rest/wlanconf");
        self.request(move |api| async move {
            let result = api.wireless_networks().await;
            ApiReply::Wireless { purpose, result }
        });
    }

    pub(crate) fn fetch_devices(&self, purpose: Purpose) {
        debug!(?purpose, "unifi > stat/device");
        self.request(move |api| async move {
            let result = api.devices().await;
            ApiReply::Devices { purpose, result }
        });
    }

    /// Delayed wireless re-fetch after an enable/disable command.
    pub(crate) fn refetch_wireless(&self) {
        self.fetch_wireless(Purpose::Refresh);
    }

    fn is_superseded(&self, purpose: Purpose) -> bool {
        matches!(purpose, Purpose::Reconcile { generation } if generation != self.generation)
    }

    pub(crate) fn on_wireless(
        &mut self,
        purpose: Purpose,
        result: Result<Vec<WirelessNetwork>, CoreError>,
    ) {
        if self.is_superseded(purpose) {
            debug!(?purpose, "discarding superseded wireless networks");
            return;
        }
        let networks = match result {
            Ok(networks) => networks,
            Err(e) => {
                error!(error = %e, ?purpose, "fetching wireless networks failed");
                return;
            }
        };
        debug!(count = networks.len(), "unifi got wireless networks");
        self.apply_wireless(networks);

        match purpose {
            Purpose::Reconcile { .. } => self.fetch_devices(purpose),
            Purpose::Refresh => self.publish_summary(),
        }
    }

    /// Rebuild the registry and publish each network's `enabled` flag.
    /// Networks that vanished get a final zero client count.
    fn apply_wireless(&mut self, networks: Vec<WirelessNetwork>) {
        let dropped = self.registry.refresh_wireless(networks);

        for network in self.registry.networks() {
            self.publish(Publication::retained(
                self.topics.wifi_enabled(&network.name),
                payload::status(network.enabled),
            ));
        }

        let gone: IndexSet<String> = dropped
            .into_iter()
            .chain(self.presence.orphaned(&self.registry))
            .collect();
        if !gone.is_empty() {
            let ts = payload::now_ms();
            for name in &gone {
                info!(network = %name, "wireless network gone, zeroing client count");
                self.presence.retire(name);
                self.publish(Publication::retained(
                    self.topics.wifi_client_count(name),
                    payload::status_at(0, ts),
                ));
            }
        }
    }

    pub(crate) fn on_devices(&mut self, purpose: Purpose, result: Result<Vec<Device>, CoreError>) {
        if self.is_superseded(purpose) {
            debug!(?purpose, "discarding superseded devices");
            return;
        }
        let devices = match result {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, ?purpose, "fetching devices failed");
                return;
            }
        };
        debug!(count = devices.len(), "unifi got devices");

        // Rebuild the registry and publish each LED mode.
        self.registry.refresh_devices(devices);
        for device in self.registry.devices() {
            self.publish(Publication::retained(
                self.topics.device_led(&device.name),
                payload::status(device.led_override.as_ref()),
            ));
        }

        if let Purpose::Reconcile { .. } = purpose {
            self.reconcile_clients();
        }
    }

    /// Fetch a full client snapshot. Waits for the retained drain first.
    pub(crate) fn reconcile_clients(&mut self) {
        if !self.controller_online {
            debug!("controller offline, skipping client sessions");
            return;
        }
        if !self.bus_ready {
            debug!("mqtt not ready, retrying client sessions later");
            self.schedule(TimerKind::ClientRetry);
            return;
        }

        info!("unifi > stat/sta");
        let generation = self.generation;
        self.request(move |api| async move {
            let result = api.client_sessions().await;
            ApiReply::Clients { generation, result }
        });
    }

    pub(crate) fn on_clients(&mut self, generation: u64, result: Result<Vec<ClientSession>, CoreError>) {
        if generation != self.generation {
            debug!(generation, "discarding superseded client sessions");
            return;
        }
        let sessions = match result {
            Ok(sessions) => sessions,
            Err(e) => {
                error!(error = %e, "fetching client sessions failed");
                return;
            }
        };
        debug!(count = sessions.len(), "unifi got client sessions");

        let changes = self.presence.apply_full_snapshot(&sessions, payload::now_ms());
        for change in &changes {
            self.publish_change(change);
        }
        self.publish_summary();
    }

    // ── Retained client drain ────────────────────────────────────────

    pub(crate) fn begin_drain(&mut self) {
        let filter = self.topics.retained_clients_filter();
        info!(filter = %filter, "mqtt subscribe");
        self.subscribe(&filter);
        self.schedule(TimerKind::RetainedDrain);
    }

    /// A retained `status/wifi/<network>/client/<hostname>` replay. Every
    /// replay pushes the end of the drain window out again.
    pub(crate) fn on_retained_client(&mut self, topic: &str, network: &str, hostname: &str, raw: &[u8]) {
        if self.bus_ready {
            trace!(topic, "ignoring client status after drain");
            return;
        }
        self.schedule(TimerKind::RetainedDrain);

        match payload::decode_strict(raw) {
            Ok(val) if payload::truthy(&val) => {
                debug!(network, hostname, "retained client candidate");
                self.presence.retain_candidate(network, hostname);
            }
            Ok(_) => {}
            Err(e) => {
                let err = CoreError::MalformedPayload {
                    topic: topic.to_owned(),
                    reason: e.to_string(),
                };
                error!(error = %err, payload = %String::from_utf8_lossy(raw), "discarding retained client status");
            }
        }
    }

    pub(crate) fn finish_drain(&mut self) {
        info!(
            candidates = self.presence.pending_candidates(),
            "retained clients received"
        );
        let filter = self.topics.retained_clients_filter();
        info!(filter = %filter, "mqtt unsubscribe");
        self.unsubscribe(&filter);
        self.bus_ready = true;
    }
}
