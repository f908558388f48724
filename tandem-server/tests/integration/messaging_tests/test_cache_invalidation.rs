use crate::integration::{
    ANSWER, C1, OFFER, init_tracing, room, start_relay, wait_for_cache, wait_for_members,
};
use crate::utils::WsClient;

#[tokio::test]
async fn test_cache_invalidation() {
    init_tracing();

    let relay = start_relay().await;
    let url = relay.signal_url();

    let mut a = WsClient::connect(&url, "ABCDE").await.expect("A connects");
    assert!(wait_for_members(&relay, "ABCDE", 1).await);
    a.send_text(OFFER).await.expect("A sends offer");
    a.send_text(C1).await.expect("A sends candidate");
    assert!(wait_for_cache(&relay, "ABCDE", 2).await);

    a.send_text(ANSWER).await.expect("A sends answer");
    assert!(wait_for_cache(&relay, "ABCDE", 1).await);
    assert_eq!(relay.rooms().cached_frames(&room("ABCDE")), vec![ANSWER]);

    let mut late = WsClient::connect(&url, "ABCDE").await.expect("Late joiner connects");
    assert_eq!(late.recv_text().await.expect("Replay"), ANSWER);
    late.expect_silence().await.expect("Only the answer is replayed");

    relay.stop().await;
}
