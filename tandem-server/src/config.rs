use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings for the signaling relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// Interval between WebSocket pings sent to every member.
    pub heartbeat: Duration,
}

impl RelayConfig {
    /// How long a member may stay silent, pongs included, before it is dropped.
    pub fn idle_timeout(&self) -> Duration {
        self.heartbeat * 2
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            heartbeat: Duration::from_secs(20),
        }
    }
}
