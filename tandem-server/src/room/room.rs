use crate::room::handshake_cache::HandshakeCache;
use std::collections::HashMap;
use tandem_core::{ConnectionId, ProtocolError, RoomCode, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Write side of one member's signaling socket. Frames are raw JSON text.
pub type Outbox = mpsc::UnboundedSender<String>;

/// Members of one rendezvous code and the handshake state cached for late joiners.
///
/// A `Room` has no locking of its own; [`RoomManager`](crate::RoomManager) hands
/// it out behind a per-entry guard so every mutation is serialized.
pub struct Room {
    code: RoomCode,
    members: HashMap<ConnectionId, Outbox>,
    cache: HandshakeCache,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            members: HashMap::new(),
            cache: HandshakeCache::new(),
        }
    }

    /// Registers a member and replays the cache to it, and only to it.
    pub fn join(&mut self, conn_id: ConnectionId, outbox: Outbox) {
        for frame in self.cache.replay() {
            if outbox.send(frame.clone()).is_err() {
                warn!(
                    "Connection {} went away during cache replay in room {}",
                    conn_id, self.code
                );
                break;
            }
        }
        debug!(
            "Replayed {} cached frames to {} in room {}",
            self.cache.len(),
            conn_id,
            self.code
        );

        self.members.insert(conn_id, outbox);
    }

    /// Updates the cache and forwards `frame` verbatim to every other member.
    ///
    /// Returns how many members the frame was handed to. Malformed frames are
    /// rejected before the cache or any member sees them.
    pub fn relay(&mut self, sender: ConnectionId, frame: &str) -> Result<usize, ProtocolError> {
        let kind = SignalKind::classify(frame)?;

        if !self.members.contains_key(&sender) {
            warn!(
                "Dropping {} from {} which is not a member of room {}",
                kind, sender, self.code
            );
            return Ok(0);
        }

        self.cache.record(kind, frame);

        let mut delivered = 0;
        for (conn_id, outbox) in self.members.iter().filter(|(id, _)| **id != sender) {
            match outbox.send(frame.to_owned()) {
                Ok(()) => delivered += 1,
                Err(_) => error!(
                    "Failed to forward {} to {} in room {}",
                    kind, conn_id, self.code
                ),
            }
        }
        debug!(
            "Relayed {} from {} to {} members of room {}",
            kind, sender, delivered, self.code
        );

        Ok(delivered)
    }

    /// Returns `true` if the connection was a member.
    pub fn leave(&mut self, conn_id: &ConnectionId) -> bool {
        self.members.remove(conn_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn cache(&self) -> &HandshakeCache {
        &self.cache
    }
}
