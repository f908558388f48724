pub mod error;
pub mod model;

pub use error::{ConfigError, ProtocolError};
pub use model::{
    CandidatePayload, ConnectionId, IceServerConfig, Role, RoomCode, SignalKind, SignalMessage,
};
