use crate::bridge::Bridge;
use crate::error::{DecodeError, Failure};
use crate::event::{Event, LinkState, PeerEvent};
use crate::state::SessionState;
use crate::transport::PeerTransport;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::Duration;
use tandem_core::{CandidatePayload, ProtocolError, Role, RoomCode, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Per-attempt handshake state machine.
///
/// Consumes events one at a time and drives a [`PeerTransport`]. Every
/// handler returns `Break` once the session reached a terminal state.
pub(crate) struct Orchestrator<T: PeerTransport> {
    role: Role,
    room: RoomCode,
    state: SessionState,
    transport: T,
    signal: mpsc::UnboundedSender<SignalMessage>,
    bridge: Bridge,
    remote_applied: bool,
    early_candidates: Vec<CandidatePayload>,
    pending_sends: VecDeque<String>,
    released: bool,
}

impl<T: PeerTransport> Orchestrator<T> {
    pub fn new(
        role: Role,
        room: RoomCode,
        transport: T,
        signal: mpsc::UnboundedSender<SignalMessage>,
        bridge: Bridge,
    ) -> Self {
        Self {
            role,
            room,
            state: SessionState::Init,
            transport,
            signal,
            bridge,
            remote_applied: false,
            early_candidates: Vec::new(),
            pending_sends: VecDeque::new(),
            released: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ends the state machine, keeping only the consumer bridge.
    pub fn into_bridge(self) -> Bridge {
        self.bridge
    }

    /// Runs once the relay socket is up. A host publishes its offer right away.
    pub async fn start(&mut self) -> ControlFlow<()> {
        self.transition(SessionState::SignalConnected);

        match self.role {
            Role::Host => {
                let offer = match self.prepare_offer().await {
                    Ok(sdp) => sdp,
                    Err(e) => {
                        return self
                            .fail(Failure::Negotiation(format!("failed to create offer: {e:#}")))
                            .await;
                    }
                };
                if let Err(failure) = self.signal(SignalMessage::Offer { sdp: offer }) {
                    return self.fail(failure).await;
                }
                self.transition(SessionState::OfferSent);
            }
            Role::Joiner => self.transition(SessionState::AwaitingOffer),
        }
        ControlFlow::Continue(())
    }

    async fn prepare_offer(&self) -> anyhow::Result<String> {
        self.transport.open_channel().await?;
        self.transport.create_offer().await
    }

    pub async fn handle(&mut self, event: Event) -> ControlFlow<()> {
        if self.state.is_terminal() {
            return ControlFlow::Break(());
        }
        match event {
            Event::Signal(msg) => self.on_signal(msg).await,
            Event::SignalClosed(reason) => self.on_signal_closed(reason).await,
            Event::Peer(event) => self.on_peer(event).await,
        }
    }

    /// Sends now if connected, otherwise queues until the channel opens.
    pub async fn send(&mut self, text: String) -> ControlFlow<()> {
        match self.state {
            SessionState::Connected => {
                if let Err(e) = self.transport.send_text(&text).await {
                    return self
                        .fail(Failure::Transport(format!("send failed: {e:#}")))
                        .await;
                }
            }
            state if state.is_terminal() => {
                debug!("Dropping outbound message, session is {}", state);
                return ControlFlow::Break(());
            }
            _ => self.pending_sends.push_back(text),
        }
        ControlFlow::Continue(())
    }

    /// Fails the attempt if the channel is not open yet.
    pub async fn expire(&mut self, limit: Duration) -> ControlFlow<()> {
        if self.state.is_open() {
            return ControlFlow::Continue(());
        }
        self.fail(Failure::Timeout(limit)).await
    }

    /// Releases the transport and moves to `Closed`. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.release().await;
        self.early_candidates.clear();
        self.pending_sends.clear();
        self.transition(SessionState::Closed);
    }

    async fn on_signal(&mut self, msg: SignalMessage) -> ControlFlow<()> {
        match (msg, self.role, self.state) {
            (SignalMessage::Offer { sdp }, Role::Joiner, SessionState::AwaitingOffer) => {
                self.on_offer(sdp).await
            }
            (SignalMessage::Answer { sdp }, Role::Host, SessionState::OfferSent) => {
                self.on_answer(sdp).await
            }
            (SignalMessage::Candidate { candidate }, _, _) => {
                self.on_remote_candidate(candidate).await;
                ControlFlow::Continue(())
            }
            (other, _, _) => {
                let err = ProtocolError::Unexpected {
                    kind: other.kind(),
                    context: self.activity(),
                };
                warn!("[room {}] {}: {}", self.room, self.role, err);
                ControlFlow::Continue(())
            }
        }
    }

    async fn on_offer(&mut self, sdp: String) -> ControlFlow<()> {
        let answer = match self.transport.accept_offer(sdp).await {
            Ok(answer) => answer,
            Err(e) => {
                return self
                    .fail(Failure::Negotiation(format!("failed to apply offer: {e:#}")))
                    .await;
            }
        };
        self.remote_applied = true;
        if let Err(failure) = self.signal(SignalMessage::Answer { sdp: answer }) {
            return self.fail(failure).await;
        }
        self.transition(SessionState::AnswerExchanged);
        self.apply_early_candidates().await;
        ControlFlow::Continue(())
    }

    async fn on_answer(&mut self, sdp: String) -> ControlFlow<()> {
        if let Err(e) = self.transport.accept_answer(sdp).await {
            return self
                .fail(Failure::Negotiation(format!("failed to apply answer: {e:#}")))
                .await;
        }
        self.remote_applied = true;
        self.transition(SessionState::AnswerExchanged);
        self.apply_early_candidates().await;
        ControlFlow::Continue(())
    }

    async fn on_remote_candidate(&mut self, candidate: CandidatePayload) {
        if !self.remote_applied {
            debug!("Holding remote candidate until the remote description is set");
            self.early_candidates.push(candidate);
            return;
        }
        self.apply_candidate(candidate).await;
        self.advance_negotiation();
    }

    async fn apply_early_candidates(&mut self) {
        if self.early_candidates.is_empty() {
            return;
        }
        debug!("Applying {} held candidates", self.early_candidates.len());
        for candidate in std::mem::take(&mut self.early_candidates) {
            self.apply_candidate(candidate).await;
        }
        self.advance_negotiation();
    }

    async fn apply_candidate(&self, candidate: CandidatePayload) {
        if let Err(e) = self.transport.add_candidate(candidate).await {
            warn!("[room {}] Ignoring remote candidate: {:#}", self.room, e);
        }
    }

    async fn on_signal_closed(&mut self, reason: Option<String>) -> ControlFlow<()> {
        let reason = reason.unwrap_or_else(|| "relay connection closed".to_owned());
        if self.state.is_open() {
            info!("[room {}] Relay went away after connect: {}", self.room, reason);
            return ControlFlow::Continue(());
        }
        self.fail(Failure::Signaling(reason)).await
    }

    async fn on_peer(&mut self, event: PeerEvent) -> ControlFlow<()> {
        match event {
            PeerEvent::LocalCandidate(candidate) => {
                if let Err(failure) = self.signal(SignalMessage::Candidate { candidate }) {
                    return self.fail(failure).await;
                }
                self.advance_negotiation();
                ControlFlow::Continue(())
            }
            PeerEvent::ChannelOpen => self.on_channel_open().await,
            PeerEvent::Message(bytes) => {
                match DecodeError::decode(&bytes) {
                    Ok(text) => self.bridge.deliver(text),
                    Err(e) => warn!("[room {}] Dropping message: {}", self.room, e),
                }
                ControlFlow::Continue(())
            }
            PeerEvent::ChannelClosed => self.on_link_lost("data channel closed".to_owned()).await,
            PeerEvent::Link(LinkState::Connecting) => {
                self.advance_negotiation();
                ControlFlow::Continue(())
            }
            PeerEvent::Link(LinkState::Connected) => {
                debug!("Transport connected, waiting for the data channel");
                ControlFlow::Continue(())
            }
            PeerEvent::Link(state) => self.on_link_lost(format!("peer connection {state}")).await,
        }
    }

    async fn on_channel_open(&mut self) -> ControlFlow<()> {
        if self.state.is_open() {
            return ControlFlow::Continue(());
        }
        self.transition(SessionState::ChannelOpen);

        while let Some(text) = self.pending_sends.pop_front() {
            if let Err(e) = self.transport.send_text(&text).await {
                return self
                    .fail(Failure::Transport(format!("failed to flush queued message: {e:#}")))
                    .await;
            }
        }

        self.transition(SessionState::Connected);
        ControlFlow::Continue(())
    }

    async fn on_link_lost(&mut self, reason: String) -> ControlFlow<()> {
        let failure = if self.state.is_open() {
            Failure::Transport(reason)
        } else {
            Failure::Negotiation(reason)
        };
        self.fail(failure).await
    }

    /// Queues a frame for the relay. Losing the relay after connect is harmless.
    fn signal(&self, msg: SignalMessage) -> Result<(), Failure> {
        let kind = msg.kind();
        if self.signal.send(msg).is_err() {
            if self.state.is_open() {
                debug!("Relay gone, not sending {} signal", kind);
                return Ok(());
            }
            return Err(Failure::Signaling(format!("relay gone before {kind} was sent")));
        }
        Ok(())
    }

    fn advance_negotiation(&mut self) {
        if self.state == SessionState::AnswerExchanged {
            self.transition(SessionState::NegotiatingPaths);
        }
    }

    async fn fail(&mut self, failure: Failure) -> ControlFlow<()> {
        if self.state.is_terminal() {
            return ControlFlow::Break(());
        }
        error!(
            "[room {}] {} failed while {}: {}",
            self.room, self.role, self.state, failure
        );
        self.release().await;
        self.bridge.report(failure);
        self.transition(SessionState::Failed);
        ControlFlow::Break(())
    }

    async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.transport.close().await {
            warn!("[room {}] Error closing peer transport: {:#}", self.room, e);
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        info!("[room {}] {}: {} -> {}", self.room, self.role, self.state, next);
        self.state = next;
        self.bridge.publish(next);
    }

    fn activity(&self) -> &'static str {
        match (self.role, self.state) {
            (_, SessionState::Init | SessionState::SignalConnected) => "connecting",
            (Role::Host, SessionState::OfferSent) => "waiting for an answer",
            (Role::Joiner, SessionState::AwaitingOffer) => "waiting for an offer",
            (_, SessionState::ChannelOpen | SessionState::Connected) => "connected",
            _ => "negotiating paths",
        }
    }
}
