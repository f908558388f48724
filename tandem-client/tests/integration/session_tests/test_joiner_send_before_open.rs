use std::time::Duration;
use tandem_client::{Role, Session};
use tokio::runtime::Handle;

use crate::integration::{collect, init_tracing, local_config, start_relay, wait_open};

const ROUNDS: usize = 5;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_joiner_send_before_open() {
    init_tracing();

    let relay = start_relay().await;
    let handle = Handle::current();

    for round in 0..ROUNDS {
        let code = format!("JOIN{round}");
        let mut host = Session::connect(&handle, local_config(&relay), Role::Host, &code)
            .expect("host connects");
        let mut joiner = Session::connect(&handle, local_config(&relay), Role::Joiner, &code)
            .expect("joiner connects");

        // Flushed the moment the announced channel opens on the joiner side.
        joiner.send("hello");
        joiner.send("from joiner");

        assert!(wait_open(&host, &joiner).await, "round {round}: peers should open");
        let received = collect(&mut host, 2, Duration::from_secs(5)).await;
        assert_eq!(received, vec!["hello", "from joiner"], "round {round}");
        assert!(joiner.take_failure().is_none(), "round {round}");

        host.close();
        joiner.close();
    }

    relay.stop().await;
}
