use tandem_client::{ClientConfig, ConfigError, Role, Session};
use tokio::runtime::Handle;

#[tokio::test]
async fn test_invalid_arguments() {
    let handle = Handle::current();
    let config = ClientConfig::default();

    let missing = Session::connect(&handle, config.clone(), Role::Joiner, "   ");
    assert_eq!(missing.err(), Some(ConfigError::MissingRoomCode));

    let invalid = Session::connect(&handle, config, Role::Joiner, "AB-CD");
    assert!(matches!(invalid.err(), Some(ConfigError::InvalidRoomCode(_))));

    let bad_url = Session::connect(&handle, ClientConfig::new("localhost:8080"), Role::Host, "ABCDE");
    assert!(matches!(bad_url.err(), Some(ConfigError::InvalidSignalUrl(_))));
}
