use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the handshake a participant drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates the data channel and sends the Offer.
    Host,
    /// Waits for the Offer and answers it.
    Joiner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => f.write_str("host"),
            Role::Joiner => f.write_str("joiner"),
        }
    }
}
