use crate::error::Failure;
use crate::state::SessionState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

/// Requests posted from the consumer thread to the orchestrator's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Send(String),
    Close,
}

/// Consumer end of the inbound message queue.
///
/// Never blocks. Messages come out in the order the channel delivered them.
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<String>,
}

impl Inbox {
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Everything queued right now.
    pub fn drain(&mut self) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Fire-and-forget handle for sends and teardown. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Command>,
    closed: Arc<AtomicBool>,
}

impl Outbox {
    /// Queues a message in submission order. Dropped once the session is over.
    pub fn send(&self, message: impl Into<String>) {
        if self.closed.load(Ordering::Acquire) {
            debug!("Session closed, dropping outbound message");
            return;
        }
        if self.tx.send(Command::Send(message.into())).is_err() {
            debug!("Session task gone, dropping outbound message");
        }
    }

    /// Requests teardown. Only the first call has any effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.tx.send(Command::Close);
    }
}

pub(crate) fn command_channel() -> (Outbox, mpsc::UnboundedReceiver<Command>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let outbox = Outbox {
        tx,
        closed: Arc::new(AtomicBool::new(false)),
    };
    (outbox, rx)
}

/// Orchestrator end: pushes messages, publishes state, reports the failure.
pub(crate) struct Bridge {
    inbox: mpsc::UnboundedSender<String>,
    state: watch::Sender<SessionState>,
    failure: Option<oneshot::Sender<Failure>>,
}

/// Consumer end handed to the session handle.
pub(crate) struct ConsumerEnd {
    pub inbox: Inbox,
    pub state: watch::Receiver<SessionState>,
    pub failure: oneshot::Receiver<Failure>,
}

pub(crate) fn bridge() -> (Bridge, ConsumerEnd) {
    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Init);
    let (failure_tx, failure_rx) = oneshot::channel();

    let bridge = Bridge {
        inbox: inbox_tx,
        state: state_tx,
        failure: Some(failure_tx),
    };
    let consumer = ConsumerEnd {
        inbox: Inbox { rx: inbox_rx },
        state: state_rx,
        failure: failure_rx,
    };
    (bridge, consumer)
}

impl Bridge {
    pub fn deliver(&self, message: String) {
        if self.inbox.send(message).is_err() {
            debug!("Consumer gone, dropping inbound message");
        }
    }

    pub fn publish(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Hands the terminal cause to the consumer. Later calls are ignored.
    pub fn report(&mut self, failure: Failure) {
        if let Some(slot) = self.failure.take() {
            let _ = slot.send(failure);
        }
    }

    /// Reports `failure`, then publishes `Failed`.
    pub fn fail(&mut self, failure: Failure) {
        self.report(failure);
        self.publish(SessionState::Failed);
    }
}
