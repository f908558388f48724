use crate::config::RelayConfig;
use crate::room::RoomManager;
use std::sync::Arc;
use std::time::Duration;

struct SignalingInner {
    rooms: RoomManager,
    config: RelayConfig,
}

/// Shared state handed to every signaling socket through the axum router.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                rooms: RoomManager::new(),
                config,
            }),
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.inner.rooms
    }

    pub fn heartbeat(&self) -> Duration {
        self.inner.config.heartbeat
    }

    pub fn idle_timeout(&self) -> Duration {
        self.inner.config.idle_timeout()
    }
}
