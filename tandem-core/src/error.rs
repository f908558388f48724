use crate::model::SignalKind;
use thiserror::Error;

/// Caller mistakes caught before any connection is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("room code is required")]
    MissingRoomCode,

    #[error("room code `{0}` must be alphanumeric")]
    InvalidRoomCode(String),

    #[error("invalid signaling address `{0}`")]
    InvalidSignalUrl(String),
}

/// A signaling frame that could not be used. Always recovered locally.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed signaling payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected {kind} signal while {context}")]
    Unexpected {
        kind: SignalKind,
        context: &'static str,
    },
}
