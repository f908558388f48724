mod rtc_transport;

pub use rtc_transport::{CHANNEL_LABEL, RtcTransport};

use anyhow::Result;
use async_trait::async_trait;
use tandem_core::CandidatePayload;

/// The peer-to-peer half of a session.
///
/// Implementations report asynchronous happenings (local candidates, channel
/// open, inbound messages, link changes) as [`PeerEvent`](crate::PeerEvent)s on
/// the event sender they were built with.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Creates the local end of the application channel. Host only.
    async fn open_channel(&self) -> Result<()>;

    /// Creates the local offer and applies it. Returns the SDP to send.
    async fn create_offer(&self) -> Result<String>;

    /// Applies a remote offer and returns the local answer SDP.
    async fn accept_offer(&self, sdp: String) -> Result<String>;

    async fn accept_answer(&self, sdp: String) -> Result<()>;

    async fn add_candidate(&self, candidate: CandidatePayload) -> Result<()>;

    async fn send_text(&self, text: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
