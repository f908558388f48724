use crate::integration::{OFFER, init_tracing, room, start_relay, wait_for_members};
use crate::utils::WsClient;

#[tokio::test]
async fn test_malformed_frame_is_dropped() {
    init_tracing();

    let relay = start_relay().await;
    let url = relay.signal_url();

    let mut a = WsClient::connect(&url, "ABCDE").await.expect("A connects");
    let mut b = WsClient::connect(&url, "ABCDE").await.expect("B connects");
    assert!(wait_for_members(&relay, "ABCDE", 2).await);

    a.send_text("this is not json").await.expect("A sends garbage");
    a.send_text(r#"{"type":"offer"}"#).await.expect("A sends offer without sdp");
    a.send_text(OFFER).await.expect("A sends a valid offer");

    assert_eq!(b.recv_text().await.expect("B receives"), OFFER);
    b.expect_silence().await.expect("Garbage never reaches B");
    assert_eq!(relay.rooms().cached_frames(&room("ABCDE")), vec![OFFER]);
    assert_eq!(relay.rooms().member_count(&room("ABCDE")), 2, "Nobody is disconnected");

    let bye = r#"{"type":"bye","reason":"custom"}"#;
    a.send_text(bye).await.expect("A sends unknown type");
    assert_eq!(b.recv_text().await.expect("Unknown types still flow"), bye);
    assert_eq!(relay.rooms().cached_frames(&room("ABCDE")), vec![OFFER]);

    relay.stop().await;
}
