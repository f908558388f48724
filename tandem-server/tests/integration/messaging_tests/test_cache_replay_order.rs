use crate::integration::{C1, C2, OFFER, init_tracing, start_relay, wait_for_cache, wait_for_members};
use crate::utils::WsClient;

#[tokio::test]
async fn test_cache_replay_order() {
    init_tracing();

    let relay = start_relay().await;
    let url = relay.signal_url();

    let mut a = WsClient::connect(&url, "ABCDE").await.expect("A connects");
    assert!(wait_for_members(&relay, "ABCDE", 1).await);
    a.send_text(OFFER).await.expect("A sends offer");
    a.send_text(C1).await.expect("A sends candidate");
    assert!(wait_for_cache(&relay, "ABCDE", 2).await);

    let mut b = WsClient::connect(&url, "ABCDE").await.expect("B connects");
    assert!(wait_for_members(&relay, "ABCDE", 2).await);
    a.send_text(C2).await.expect("A sends live candidate");

    let frames = b.recv_many(3).await.expect("B receives replay and live traffic");
    assert_eq!(frames, vec![OFFER, C1, C2]);
    b.expect_silence().await.expect("Nothing else for B");

    relay.stop().await;
}
