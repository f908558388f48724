use std::fmt;

/// Progress of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Init,
    SignalConnected,
    /// Host only.
    OfferSent,
    /// Joiner only.
    AwaitingOffer,
    AnswerExchanged,
    NegotiatingPaths,
    ChannelOpen,
    Connected,
    Failed,
    Closed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Failed | SessionState::Closed)
    }

    /// The channel is usable for application messages.
    pub fn is_open(self) -> bool {
        self == SessionState::Connected
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::SignalConnected => "signal-connected",
            SessionState::OfferSent => "offer-sent",
            SessionState::AwaitingOffer => "awaiting-offer",
            SessionState::AnswerExchanged => "answer-exchanged",
            SessionState::NegotiatingPaths => "negotiating-paths",
            SessionState::ChannelOpen => "channel-open",
            SessionState::Connected => "connected",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
