use crate::error::Failure;
use crate::event::{Event, EventSender};
use futures::{SinkExt, StreamExt};
use tandem_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Socket to the relay, split into a writer fed by a channel and a reader that
/// turns frames into [`Event::Signal`].
pub(crate) struct SignalingLink {
    outgoing: mpsc::UnboundedSender<SignalMessage>,
    reader: JoinHandle<()>,
    // Detached on shutdown; exits when the last sender drops.
    writer: JoinHandle<()>,
}

impl SignalingLink {
    pub async fn connect(url: &Url, events: EventSender) -> Result<Self, Failure> {
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Failure::Signaling(describe(&e)))?;
        info!("Connected to signaling relay at {}", url);

        let (mut sink, mut stream) = ws_stream.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<SignalMessage>();

        let write_events = events.clone();
        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let text = match msg.to_text() {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode {} signal: {}", msg.kind(), e);
                        continue;
                    }
                };
                debug!("Sending {} signal", msg.kind());
                if let Err(e) = sink.send(Message::text(text)).await {
                    let _ = write_events.send(Event::SignalClosed(Some(e.to_string())));
                    return;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            let mut reason = None;
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match SignalMessage::parse(text.as_str()) {
                        Ok(msg) => {
                            if events.send(Event::Signal(msg)).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Ignoring signaling frame: {}", e),
                    },
                    Ok(Message::Binary(_)) => warn!("Ignoring binary signaling frame"),
                    Ok(Message::Close(frame)) => {
                        reason = frame.map(|f| format!("closed by relay: {}", f.reason.as_str()));
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        reason = Some(e.to_string());
                        break;
                    }
                }
            }
            let _ = events.send(Event::SignalClosed(reason));
        });

        Ok(Self {
            outgoing,
            reader,
            writer,
        })
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<SignalMessage> {
        self.outgoing.clone()
    }

    /// Stops reading and lets the writer flush and close once every sender is gone.
    pub fn shutdown(self) {
        self.reader.abort();
        drop(self.outgoing);
        drop(self.writer);
    }
}

fn describe(error: &WsError) -> String {
    match error {
        WsError::Http(response) => format!("relay rejected the upgrade with {}", response.status()),
        other => other.to_string(),
    }
}
