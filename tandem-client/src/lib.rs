//! Client side of a tandem session: signaling, WebRTC negotiation and a
//! non-blocking handle for a consumer running its own loop.

mod bridge;
mod config;
mod error;
mod event;
mod orchestrator;
mod session;
mod signaling;
mod state;
mod transport;

pub use bridge::{Inbox, Outbox};
pub use config::{
    ClientConfig, DEFAULT_NEGOTIATION_TIMEOUT, DEFAULT_SIGNAL_URL, DEFAULT_STUN_SERVERS,
    TurnConfig,
};
pub use error::{DecodeError, Failure};
pub use event::{Event, EventSender, LinkState, PeerEvent};
pub use session::Session;
pub use state::SessionState;
pub use transport::{CHANNEL_LABEL, PeerTransport, RtcTransport};

pub use tandem_core::{ConfigError, Role, RoomCode};
