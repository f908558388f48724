use crate::integration::{C1, init_tracing, start_relay, wait_for_members};
use crate::utils::WsClient;

#[tokio::test]
async fn test_sender_is_excluded() {
    init_tracing();

    let relay = start_relay().await;
    let url = relay.signal_url();

    let mut a = WsClient::connect(&url, "ABCDE").await.expect("A connects");
    let mut b = WsClient::connect(&url, "ABCDE").await.expect("B connects");
    let mut c = WsClient::connect(&url, "ABCDE").await.expect("C connects");
    assert!(wait_for_members(&relay, "ABCDE", 3).await);

    a.send_text(C1).await.expect("A sends");

    assert_eq!(b.recv_text().await.expect("B receives"), C1);
    assert_eq!(c.recv_text().await.expect("C receives"), C1);
    a.expect_silence().await.expect("A never hears itself");

    relay.stop().await;
}
