//! Connection and discovery settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// TCP port controllers accept commands on.
pub const DEFAULT_PORT: u16 = 5577;

/// UDP port controllers answer discovery requests on.
pub const DISCOVERY_PORT: u16 = 48899;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeouts applied by a [`crate::Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Deadline for each write and for the reply to a state query.
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Where to send the discovery request and how long to listen for replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub broadcast_addr: SocketAddr,
    pub timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            broadcast_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DISCOVERY_PORT),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

impl DiscoveryConfig {
    /// Send requests to the given broadcast address on the standard discovery port.
    pub fn with_broadcast_ip(mut self, ip: IpAddr) -> Self {
        self.broadcast_addr = SocketAddr::new(ip, DISCOVERY_PORT);
        self
    }

    pub fn with_broadcast_addr(mut self, addr: SocketAddr) -> Self {
        self.broadcast_addr = addr;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Address of a controller's command port.
pub fn device_addr(ip: IpAddr) -> SocketAddr {
    SocketAddr::new(ip, DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.broadcast_addr.to_string(), "255.255.255.255:48899");
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_broadcast_ip_uses_discovery_port() {
        let config = DiscoveryConfig::default().with_broadcast_ip("192.168.1.255".parse().unwrap());
        assert_eq!(config.broadcast_addr.port(), DISCOVERY_PORT);
    }
}
