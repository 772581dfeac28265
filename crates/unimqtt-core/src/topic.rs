// ── Topic layout ──
//
// Every topic sits under the instance name:
//
//   <name>/maintenance/online
//   <name>/maintenance/controller/online
//   <name>/status/wifi/<network>/{enabled,clientCount}
//   <name>/status/wifi/<network>/client/<hostname>
//   <name>/status/device/<device>/led
//   <name>/status/clientCount
//   <name>/set/device/<device>/led          (inbound)
//   <name>/set/wifi/<network>/enabled       (inbound)

/// An inbound topic the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    SetLed { device: &'a str },
    SetWifiEnabled { network: &'a str },
    RetainedClient { network: &'a str, hostname: &'a str },
}

/// Topic builder bound to one instance name.
#[derive(Debug, Clone)]
pub struct Topics {
    prefix: String,
}

impl Topics {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn join(&self, parts: &[&str]) -> String {
        let mut topic = self.prefix.clone();
        for part in parts {
            topic.push('/');
            topic.push_str(part);
        }
        topic
    }

    // ── Outbound ─────────────────────────────────────────────────────

    pub fn online(&self) -> String {
        self.join(&["maintenance", "online"])
    }

    pub fn controller_online(&self) -> String {
        self.join(&["maintenance", "controller", "online"])
    }

    pub fn wifi_enabled(&self, network: &str) -> String {
        self.join(&["status", "wifi", network, "enabled"])
    }

    pub fn wifi_client_count(&self, network: &str) -> String {
        self.join(&["status", "wifi", network, "clientCount"])
    }

    pub fn wifi_client(&self, network: &str, hostname: &str) -> String {
        self.join(&["status", "wifi", network, "client", hostname])
    }

    pub fn device_led(&self, device: &str) -> String {
        self.join(&["status", "device", device, "led"])
    }

    pub fn client_count(&self) -> String {
        self.join(&["status", "clientCount"])
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// `<name>/set/#`
    pub fn command_filter(&self) -> String {
        self.join(&["set", "#"])
    }

    /// `<name>/status/wifi/+/client/+`, only subscribed during the drain.
    pub fn retained_clients_filter(&self) -> String {
        self.join(&["status", "wifi", "+", "client", "+"])
    }

    // ── Inbound ──────────────────────────────────────────────────────

    /// Match an inbound topic. Anything not addressed to this instance or
    /// not in the known shapes yields `None`.
    pub fn parse<'a>(&self, topic: &'a str) -> Option<Inbound<'a>> {
        let rest = topic
            .strip_prefix(self.prefix.as_str())
            .and_then(|r| r.strip_prefix('/'))?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts[..] {
            ["set", "device", device, "led"] => Some(Inbound::SetLed { device }),
            ["set", "wifi", network, "enabled"] => Some(Inbound::SetWifiEnabled { network }),
            ["status", "wifi", network, "client", hostname] => {
                Some(Inbound::RetainedClient { network, hostname })
            }
            _ => None,
        }
    }
}
