pub mod connection_tests;
pub mod messaging_tests;
pub mod multi_peer_tests;

use std::net::SocketAddr;
use std::time::Duration;
use tandem_core::RoomCode;
use tandem_server::{RelayConfig, RelayHandle};
use tracing_subscriber::EnvFilter;

pub const OFFER: &str = r#"{"type":"offer","sdp":"v=0 offer"}"#;
pub const ANSWER: &str = r#"{"type":"answer","sdp":"v=0 answer"}"#;
pub const C1: &str = r#"{"type":"candidate","candidate":{"sdpMid":"0","sdpMLineIndex":0,"candidate":"candidate:1"}}"#;
pub const C2: &str = r#"{"type":"candidate","candidate":{"sdpMid":"0","sdpMLineIndex":0,"candidate":"candidate:2"}}"#;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

pub async fn start_relay() -> RelayHandle {
    start_relay_with(RelayConfig::default().heartbeat).await
}

pub async fn start_relay_with(heartbeat: Duration) -> RelayHandle {
    let config = RelayConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        heartbeat,
    };
    tandem_server::spawn(config)
        .await
        .expect("Failed to start relay")
}

pub fn room(code: &str) -> RoomCode {
    RoomCode::parse(code).expect("valid room code")
}

/// Polls until the relay reports `count` members in `code`.
pub async fn wait_for_members(relay: &RelayHandle, code: &str, count: usize) -> bool {
    let code = room(code);
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(2000);

    loop {
        if relay.rooms().member_count(&code) == count {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Polls until the relay holds `count` cached frames for `code`.
pub async fn wait_for_cache(relay: &RelayHandle, code: &str, count: usize) -> bool {
    let code = room(code);
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(2000);

    loop {
        if relay.rooms().cached_frames(&code).len() == count {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
