use crate::event::{Event, EventSender, LinkState, PeerEvent};
use crate::transport::PeerTransport;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{CandidatePayload, IceServerConfig};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Label of the single application data channel.
pub const CHANNEL_LABEL: &str = "tandem";

/// [`PeerTransport`] over a WebRTC peer connection with one reliable, ordered
/// data channel.
pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    channel: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    events: EventSender,
}

impl RtcTransport {
    pub async fn new(ice_servers: &[IceServerConfig], events: EventSender) -> Result<Self> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );
        let channel = Arc::new(Mutex::new(None));

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(link) = link_state(s) {
                        let _ = tx.send(Event::Peer(PeerEvent::Link(link)));
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                // `None` marks the end of gathering, which is never signaled.
                let Some(candidate) = c else { return };
                match candidate.to_json() {
                    Ok(init) => {
                        let payload = CandidatePayload {
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                            candidate: init.candidate,
                        };
                        let _ = tx.send(Event::Peer(PeerEvent::LocalCandidate(payload)));
                    }
                    Err(e) => warn!("Failed to serialize local candidate: {}", e),
                }
            })
        }));

        let dc_tx = events.clone();
        let dc_slot = channel.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let slot = dc_slot.clone();
            Box::pin(async move {
                if dc.label() != CHANNEL_LABEL {
                    warn!("Ignoring unexpected data channel '{}'", dc.label());
                    return;
                }
                debug!("Remote data channel '{}' announced", dc.label());
                // Stored before wiring: `on_open` may fire immediately.
                *slot.lock().await = Some(dc.clone());
                wire_channel(&dc, tx);
            })
        }));

        Ok(Self {
            peer_connection,
            channel,
            events,
        })
    }

    async fn current_channel(&self) -> Option<Arc<RTCDataChannel>> {
        self.channel.lock().await.clone()
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn open_channel(&self) -> Result<()> {
        let dc = self
            .peer_connection
            .create_data_channel(CHANNEL_LABEL, None)
            .await
            .context("Failed to create data channel")?;
        *self.channel.lock().await = Some(dc.clone());
        wire_channel(&dc, self.events.clone());
        Ok(())
    }

    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(offer).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(answer).await?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: CandidatePayload) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let Some(dc) = self.current_channel().await else {
            bail!("data channel not available");
        };
        dc.send_text(text.to_owned()).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
    }
}

fn link_state(state: RTCPeerConnectionState) -> Option<LinkState> {
    match state {
        RTCPeerConnectionState::Connecting => Some(LinkState::Connecting),
        RTCPeerConnectionState::Connected => Some(LinkState::Connected),
        RTCPeerConnectionState::Disconnected => Some(LinkState::Disconnected),
        RTCPeerConnectionState::Failed => Some(LinkState::Failed),
        RTCPeerConnectionState::Closed => Some(LinkState::Closed),
        _ => None,
    }
}

/// Forwards open, message and close callbacks of `dc` as peer events.
fn wire_channel(dc: &Arc<RTCDataChannel>, events: EventSender) {
    let label = dc.label().to_owned();

    let open_tx = events.clone();
    let open_label = label.clone();
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let label = open_label.clone();
        Box::pin(async move {
            info!("Data channel '{}' open", label);
            let _ = tx.send(Event::Peer(PeerEvent::ChannelOpen));
        })
    }));

    let msg_tx = events.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();
        Box::pin(async move {
            let _ = tx.send(Event::Peer(PeerEvent::Message(msg.data)));
        })
    }));

    let close_tx = events;
    dc.on_close(Box::new(move || {
        let tx = close_tx.clone();
        let label = label.clone();
        Box::pin(async move {
            debug!("Data channel '{}' closed", label);
            let _ = tx.send(Event::Peer(PeerEvent::ChannelClosed));
        })
    }));
}
