use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of codes produced by [`RoomCode::generate`].
pub const GENERATED_CODE_LEN: usize = 5;

/// Short rendezvous code shared out-of-band between two participants.
///
/// Codes are normalized on parse: surrounding whitespace is trimmed and
/// letters are upper-cased, so `" abcde "` and `"ABCDE"` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(ConfigError::MissingRoomCode);
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidRoomCode(code.to_owned()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Random code of [`GENERATED_CODE_LEN`] characters from `A-Z0-9`.
    pub fn generate() -> Self {
        let entropy = Uuid::new_v4();
        let code = entropy
            .as_bytes()
            .iter()
            .take(GENERATED_CODE_LEN)
            .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
