use std::time::Duration;
use tandem_client::{Role, Session};
use tokio::runtime::Handle;

use crate::integration::{collect, init_tracing, local_config, start_relay, wait_open};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_end_to_end() {
    init_tracing();

    let relay = start_relay().await;
    let handle = Handle::current();

    let host = Session::connect(&handle, local_config(&relay), Role::Host, "ABCDE")
        .expect("host connects");
    let mut joiner = Session::connect(&handle, local_config(&relay), Role::Joiner, "ABCDE")
        .expect("joiner connects");

    assert!(wait_open(&host, &joiner).await, "both peers should open");

    host.send("e2e4");
    let received = collect(&mut joiner, 1, Duration::from_secs(5)).await;
    assert_eq!(received, vec!["e2e4".to_owned()]);

    // Nothing else shows up.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(joiner.try_recv().is_none());

    host.close();
    joiner.close();
    relay.stop().await;
}
