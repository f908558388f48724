use bytes::Bytes;
use tandem_core::{CandidatePayload, SignalMessage};
use tokio::sync::mpsc;

/// Everything the orchestrator reacts to, in the order it happened.
#[derive(Debug)]
pub enum Event {
    /// A well-formed frame from the relay.
    Signal(SignalMessage),
    /// The relay socket is gone, with a reason when one is known.
    SignalClosed(Option<String>),
    Peer(PeerEvent),
}

/// Callbacks from the peer transport, flattened into events.
#[derive(Debug)]
pub enum PeerEvent {
    LocalCandidate(CandidatePayload),
    ChannelOpen,
    Message(Bytes),
    ChannelClosed,
    Link(LinkState),
}

/// Transport-level connectivity. Informational next to the channel's own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

pub type EventSender = mpsc::UnboundedSender<Event>;

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Disconnected => "disconnected",
            LinkState::Failed => "failed",
            LinkState::Closed => "closed",
        };
        f.write_str(name)
    }
}
