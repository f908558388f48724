mod config;
mod room;
mod server;
mod signaling;

pub use config::RelayConfig;
pub use room::{HandshakeCache, Outbox, Room, RoomManager};
pub use server::{RelayHandle, router, serve, spawn};
pub use signaling::{JoinParams, SignalingService, ws_handler};
