use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// One discovered network path, in the browser `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePayload {
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
    pub candidate: String,
}

/// Handshake frames exchanged through the relay, one JSON object per text frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate { candidate: CandidatePayload },
}

impl SignalMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> SignalKind {
        match self {
            SignalMessage::Offer { .. } => SignalKind::Offer,
            SignalMessage::Answer { .. } => SignalKind::Answer,
            SignalMessage::Candidate { .. } => SignalKind::Candidate,
        }
    }
}

/// The `type` tag of a frame, as far as the relay cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
    /// Well-formed frame with a `type` this protocol does not define.
    Other,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

impl SignalKind {
    /// Classifies a raw frame by decoding its `type` field.
    ///
    /// Known types must also match their full schema; unknown types only
    /// need to be a JSON object with a string `type`.
    pub fn classify(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.kind.as_str() {
            "offer" | "answer" | "candidate" => Ok(SignalMessage::parse(text)?.kind()),
            _ => Ok(SignalKind::Other),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
            SignalKind::Other => "unknown",
        };
        f.write_str(name)
    }
}
