use std::string::FromUtf8Error;
use std::time::Duration;
use thiserror::Error;

/// Terminal cause of a failed connection attempt, reported once to the consumer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("signaling connection failed: {0}")]
    Signaling(String),

    #[error("peer transport failed: {0}")]
    Transport(String),

    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("channel did not open within {0:?}")]
    Timeout(Duration),
}

/// Bytes on the application channel that are not UTF-8 text. Logged and dropped.
#[derive(Debug, Error)]
#[error("application payload is not UTF-8 ({len} bytes)")]
pub struct DecodeError {
    pub len: usize,
    #[source]
    source: FromUtf8Error,
}

impl DecodeError {
    pub fn decode(bytes: &[u8]) -> Result<String, DecodeError> {
        String::from_utf8(bytes.to_vec()).map_err(|source| DecodeError {
            len: bytes.len(),
            source,
        })
    }
}
