//! Discovery configuration.

use std::net::Ipv4Addr;
use std::time::Duration;

/// The well-known UDP port servers listen on for discovery queries.
pub const DEFAULT_DISCOVERY_PORT: u16 = 8765;

/// Default length of the listen window after the query is broadcast.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for a [`DiscoveryClient`](crate::DiscoveryClient).
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// UDP port the query is broadcast to.
    pub port: u16,

    /// Broadcast destination. `255.255.255.255` reaches the local
    /// subnet; tests point this at `127.0.0.1`.
    pub broadcast_addr: Ipv4Addr,

    /// Local address the query socket binds to (ephemeral port).
    pub bind_addr: Ipv4Addr,

    /// How long to collect replies before finishing. Elapsing is a
    /// normal outcome, not an error.
    pub timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_DISCOVERY_PORT,
            broadcast_addr: Ipv4Addr::BROADCAST,
            bind_addr: Ipv4Addr::UNSPECIFIED,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
