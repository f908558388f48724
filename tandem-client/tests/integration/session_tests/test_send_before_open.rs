use std::time::Duration;
use tandem_client::{Role, Session};
use tokio::runtime::Handle;

use crate::integration::{collect, init_tracing, local_config, start_relay, wait_open};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_send_before_open() {
    init_tracing();

    let relay = start_relay().await;
    let handle = Handle::current();

    let host = Session::connect(&handle, local_config(&relay), Role::Host, "early")
        .expect("host connects");
    host.send("first");
    host.send("second");
    assert!(!host.is_open());

    let mut joiner = Session::connect(&handle, local_config(&relay), Role::Joiner, "EARLY")
        .expect("joiner connects");
    assert!(wait_open(&host, &joiner).await);

    host.send("third");
    let received = collect(&mut joiner, 3, Duration::from_secs(5)).await;
    assert_eq!(received, vec!["first", "second", "third"]);

    relay.stop().await;
}
