mod connection;
mod role;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use role::Role;
pub use room::RoomCode;
pub use signaling::{CandidatePayload, IceServerConfig, SignalKind, SignalMessage};
