use std::time::Duration;
use tandem_client::{ClientConfig, Failure, Role, Session, SessionState};
use tokio::net::TcpListener;
use tokio::runtime::Handle;

use crate::integration::{init_tracing, wait_until};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_after_failure() {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ClientConfig::new(format!("ws://{addr}/ws"));
    let mut session =
        Session::connect(&Handle::current(), config, Role::Joiner, "ABCDE").expect("valid arguments");

    assert!(
        wait_until(Duration::from_secs(5), || session.state() == SessionState::Failed).await
    );
    assert!(matches!(session.take_failure(), Some(Failure::Signaling(_))));

    session.close();
    assert!(
        wait_until(Duration::from_secs(2), || session.state() == SessionState::Closed).await,
        "close() after a failed relay connect should still reach Closed, got {}",
        session.state()
    );
}
