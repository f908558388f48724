use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected frame (ms).
pub const FRAME_TIMEOUT_MS: u64 = 2000;

/// How long a client listens before concluding nothing else is coming (ms).
pub const SILENCE_MS: u64 = 300;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bare signaling client that speaks raw text frames to the relay.
pub struct WsClient {
    stream: WsStream,
}

impl WsClient {
    pub async fn connect(signal_url: &str, room: &str) -> Result<Self> {
        let url = format!("{}?room={}", signal_url, room);
        let (stream, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        Ok(Self { stream })
    }

    pub async fn send_text(&mut self, frame: &str) -> Result<()> {
        self.stream
            .send(Message::text(frame.to_owned()))
            .await
            .context("Failed to send frame")?;
        Ok(())
    }

    /// Next text frame, skipping control frames.
    pub async fn recv_text(&mut self) -> Result<String> {
        let deadline = Duration::from_millis(FRAME_TIMEOUT_MS);
        tokio::time::timeout(deadline, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                    Some(Ok(Message::Close(_))) | None => anyhow::bail!("Socket closed"),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e).context("Socket error"),
                }
            }
        })
        .await
        .context("Timeout waiting for frame")?
    }

    /// Keeps reading for `window` so pings get answered. Returns how many pings arrived.
    pub async fn listen_for(&mut self, window: Duration) -> Result<usize> {
        let deadline = tokio::time::Instant::now() + window;
        let mut pings = 0;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Err(_) => return Ok(pings),
                Ok(Some(Ok(Message::Ping(_)))) => pings += 1,
                Ok(Some(Ok(Message::Close(_)))) | Ok(None) => anyhow::bail!("Socket closed"),
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => return Err(e).context("Socket error"),
            }
        }
    }

    pub async fn recv_many(&mut self, count: usize) -> Result<Vec<String>> {
        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            frames.push(self.recv_text().await?);
        }
        Ok(frames)
    }

    /// Asserts no text frame arrives within [`SILENCE_MS`].
    pub async fn expect_silence(&mut self) -> Result<()> {
        let window = Duration::from_millis(SILENCE_MS);
        match tokio::time::timeout(window, self.recv_text()).await {
            Err(_) => Ok(()),
            Ok(Err(_)) => Ok(()),
            Ok(Ok(frame)) => anyhow::bail!("Unexpected frame: {}", frame),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.context("Failed to close socket")?;
        Ok(())
    }
}
