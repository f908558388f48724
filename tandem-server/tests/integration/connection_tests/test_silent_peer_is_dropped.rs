use std::time::Duration;

use crate::integration::{init_tracing, room, start_relay_with, wait_for_members};
use crate::utils::WsClient;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_silent_peer_is_dropped() {
    init_tracing();

    let relay = start_relay_with(Duration::from_millis(100)).await;
    let url = relay.signal_url();

    let mut live = WsClient::connect(&url, "BEAT").await.expect("live connects");
    // Never polled, so it never answers a ping.
    let silent = WsClient::connect(&url, "BEAT").await.expect("silent connects");

    let listener = tokio::spawn(async move {
        let pings = live.listen_for(Duration::from_millis(1500)).await;
        (live, pings)
    });

    assert!(wait_for_members(&relay, "BEAT", 1).await, "silent peer should be dropped");

    let (live, pings) = listener.await.expect("listener task");
    let pings = pings.expect("live socket stays open");
    assert!(pings >= 3, "expected regular pings, got {}", pings);
    assert_eq!(relay.rooms().member_count(&room("BEAT")), 1);

    drop(silent);
    live.close().await.expect("close");
    assert!(wait_for_members(&relay, "BEAT", 0).await);
    assert!(!relay.rooms().contains(&room("BEAT")));

    relay.stop().await;
}
