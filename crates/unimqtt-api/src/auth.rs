use secrecy::SecretString;

/// Username/password pair for the controller's session login.
///
/// Kept separate from [`LegacyClient`](crate::LegacyClient) so the event
/// stream can log in again after every dropped connection.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub username: String,
    pub password: SecretString,
}

/// The platform type of the UniFi controller.
///
/// Determines URL prefixes, login paths, and the WebSocket endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS device (UDM, UCG, etc.) -- port 443, `/proxy/network/` prefix.
    UnifiOs,
    /// Standalone Network Application (Java) -- port 8443, no prefix.
    ClassicController,
}

impl ControllerPlatform {
    /// The path prefix for legacy API endpoints.
    pub fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    /// The login endpoint path.
    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    /// The WebSocket path template. `{site}` must be replaced by the caller.
    pub fn websocket_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network/wss/s/{site}/events",
            Self::ClassicController => "/wss/s/{site}/events",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifi_os_paths_use_proxy_prefix() {
        let p = ControllerPlatform::UnifiOs;
        assert_eq!(p.legacy_prefix(), "/proxy/network");
        assert_eq!(p.login_path(), "/api/auth/login");
        assert!(p.websocket_path().starts_with("/proxy/network/"));
    }

    #[test]
    fn classic_paths_have_no_prefix() {
        let p = ControllerPlatform::ClassicController;
        assert_eq!(p.legacy_prefix(), "");
        assert_eq!(p.login_path(), "/api/login");
        assert_eq!(p.websocket_path(), "/wss/s/{site}/events");
    }
}
