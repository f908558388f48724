use crate::room::{Outbox, Room};
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ConnectionId, ProtocolError, RoomCode};
use tracing::{info, warn};

/// Registry of live rooms.
///
/// Each room sits behind its map entry's guard, so joins, relays and leaves
/// for the same code are serialized while different codes proceed in parallel.
/// A room exists exactly as long as it has at least one member.
#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomCode, Room>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, code: &RoomCode, conn_id: ConnectionId, outbox: Outbox) {
        let mut room = self.rooms.entry(code.clone()).or_insert_with(|| {
            info!("Creating new room: {}", code);
            Room::new(code.clone())
        });
        room.join(conn_id, outbox);
        info!(
            "[room {}] {} joined ({} in room)",
            code,
            conn_id,
            room.len()
        );
    }

    /// Forwards a raw frame from `sender` to the rest of its room.
    pub fn relay(
        &self,
        code: &RoomCode,
        sender: ConnectionId,
        frame: &str,
    ) -> Result<usize, ProtocolError> {
        match self.rooms.get_mut(code) {
            Some(mut room) => room.relay(sender, frame),
            None => {
                warn!("Dropping frame from {} for missing room {}", sender, code);
                Ok(0)
            }
        }
    }

    /// Removes a member; the room and its cache go with the last one.
    pub fn leave(&self, code: &RoomCode, conn_id: ConnectionId) {
        let mut remaining = 0;
        let removed = self.rooms.remove_if_mut(code, |_, room| {
            room.leave(&conn_id);
            remaining = room.len();
            room.is_empty()
        });

        info!(
            "[room {}] {} left ({} in room)",
            code, conn_id, remaining
        );
        if removed.is_some() {
            info!("Room {} is empty, removed", code);
        }
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self, code: &RoomCode) -> usize {
        self.rooms.get(code).map(|room| room.len()).unwrap_or(0)
    }

    /// Frames a joiner would be replayed right now, in order.
    pub fn cached_frames(&self, code: &RoomCode) -> Vec<String> {
        self.rooms
            .get(code)
            .map(|room| room.cache().replay().cloned().collect())
            .unwrap_or_default()
    }
}
