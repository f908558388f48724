use crate::bridge::{self, Bridge, Command, Inbox, Outbox};
use crate::config::ClientConfig;
use crate::error::Failure;
use crate::event::Event;
use crate::orchestrator::Orchestrator;
use crate::signaling::SignalingLink;
use crate::state::SessionState;
use crate::transport::RtcTransport;
use std::ops::ControlFlow;
use tandem_core::{ConfigError, Role, RoomCode};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};
use url::Url;

/// Consumer-side handle to one connection attempt.
///
/// Every method returns immediately; the handshake and all I/O run on the
/// runtime passed to [`Session::connect`]. The handle may live on a thread
/// that is not part of that runtime. Dropping it closes the session.
pub struct Session {
    role: Role,
    room: RoomCode,
    inbox: Inbox,
    outbox: Outbox,
    state: watch::Receiver<SessionState>,
    failure: oneshot::Receiver<Failure>,
}

impl Session {
    /// Validates the arguments and starts the attempt on `handle`.
    pub fn connect(
        handle: &Handle,
        config: ClientConfig,
        role: Role,
        room: &str,
    ) -> Result<Self, ConfigError> {
        let room = RoomCode::parse(room)?;
        let url = config.room_url(&room)?;

        let (bridge, consumer) = bridge::bridge();
        let (outbox, commands) = bridge::command_channel();

        handle.spawn(drive(url, config, role, room.clone(), bridge, commands));

        Ok(Self {
            role,
            room,
            inbox: consumer.inbox,
            outbox,
            state: consumer.state,
            failure: consumer.failure,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room(&self) -> &RoomCode {
        &self.room
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.inbox.try_recv()
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.inbox.drain()
    }

    /// Queues `message`. Messages sent before the channel opens go out once it does.
    pub fn send(&self, message: impl Into<String>) {
        self.outbox.send(message);
    }

    /// The terminal cause, if the session failed. Yields it only once.
    pub fn take_failure(&mut self) -> Option<Failure> {
        self.failure.try_recv().ok()
    }

    pub fn close(&self) {
        self.outbox.close();
    }

    /// A detached sender, for handing sends or teardown to another thread.
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background half of a session. Owns the relay socket, the peer transport
/// and the state machine until the session ends.
async fn drive(
    url: Url,
    config: ClientConfig,
    role: Role,
    room: RoomCode,
    mut bridge: Bridge,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let deadline = tokio::time::sleep(config.negotiation_timeout);
    tokio::pin!(deadline);

    let (events_tx, mut events) = mpsc::unbounded_channel::<Event>();

    info!("[room {}] {} connecting to {}", room, role, url);
    let connect = SignalingLink::connect(&url, events_tx.clone());
    tokio::pin!(connect);

    let mut early_sends = Vec::new();
    let link = loop {
        tokio::select! {
            biased;
            cmd = commands.recv() => match cmd {
                Some(Command::Send(text)) => early_sends.push(text),
                Some(Command::Close) | None => {
                    info!("[room {}] Closed before the relay answered", room);
                    bridge.publish(SessionState::Closed);
                    return;
                }
            },
            result = &mut connect => match result {
                Ok(link) => break link,
                Err(failure) => {
                    error!("[room {}] {}", room, failure);
                    bridge.fail(failure);
                    return close_when_asked(bridge, commands).await;
                }
            },
            _ = &mut deadline => {
                bridge.fail(Failure::Timeout(config.negotiation_timeout));
                return close_when_asked(bridge, commands).await;
            }
        }
    };

    let transport = match RtcTransport::new(&config.ice_servers(), events_tx).await {
        Ok(transport) => transport,
        Err(e) => {
            bridge.fail(Failure::Transport(format!("{e:#}")));
            link.shutdown();
            return close_when_asked(bridge, commands).await;
        }
    };

    let mut orch = Orchestrator::new(role, room.clone(), transport, link.sender(), bridge);
    let mut flow = orch.start().await;
    for text in early_sends {
        if flow.is_break() {
            break;
        }
        flow = orch.send(text).await;
    }

    while flow.is_continue() {
        flow = tokio::select! {
            biased;
            cmd = commands.recv() => match cmd {
                Some(Command::Send(text)) => orch.send(text).await,
                Some(Command::Close) | None => {
                    orch.close().await;
                    ControlFlow::Break(())
                }
            },
            Some(event) = events.recv() => orch.handle(event).await,
            _ = &mut deadline, if !orch.state().is_open() => {
                orch.expire(config.negotiation_timeout).await
            }
        };
    }

    // Dropping the orchestrator drops the transport and the last signal
    // sender, which lets the writer close the relay socket.
    drop(events);
    let state = orch.state();
    let bridge = orch.into_bridge();
    link.shutdown();
    debug!("[room {}] Session task finished in state {}", room, state);

    if state == SessionState::Failed {
        close_when_asked(bridge, commands).await;
    }
}

/// Keeps a failed session's state cell until the consumer closes it.
async fn close_when_asked(bridge: Bridge, mut commands: mpsc::UnboundedReceiver<Command>) {
    while let Some(cmd) = commands.recv().await {
        if cmd == Command::Close {
            bridge.publish(SessionState::Closed);
            return;
        }
    }
}
