use std::time::Duration;
use tandem_core::{ConfigError, IceServerConfig, RoomCode};
use url::Url;

pub const DEFAULT_SIGNAL_URL: &str = "ws://127.0.0.1:8080/ws";
pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];
pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(30);

const SIGNAL_URL_VAR: &str = "TANDEM_SIGNAL_URL";
const TURN_URL_VAR: &str = "TANDEM_TURN_URL";
const TURN_USERNAME_VAR: &str = "TANDEM_TURN_USERNAME";
const TURN_CREDENTIAL_VAR: &str = "TANDEM_TURN_CREDENTIAL";

/// Relay-traversal server credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnConfig {
    pub url: String,
    pub username: String,
    pub credential: String,
}

impl TurnConfig {
    /// Only yields a config when every part is present and non-blank.
    pub fn from_parts(
        url: Option<String>,
        username: Option<String>,
        credential: Option<String>,
    ) -> Option<Self> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Some(Self {
            url: present(url)?,
            username: present(username)?,
            credential: present(credential)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay endpoint without the `room` query parameter.
    pub signal_url: String,
    pub stun_servers: Vec<String>,
    pub turn: Option<TurnConfig>,
    /// Upper bound for the channel to open after `connect`.
    pub negotiation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signal_url: DEFAULT_SIGNAL_URL.to_owned(),
            stun_servers: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
            turn: None,
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(signal_url: impl Into<String>) -> Self {
        Self {
            signal_url: signal_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by the `TANDEM_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(SIGNAL_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.signal_url = url;
        }
        config.turn = TurnConfig::from_parts(
            lookup(TURN_URL_VAR),
            lookup(TURN_USERNAME_VAR),
            lookup(TURN_CREDENTIAL_VAR),
        );
        config
    }

    pub fn with_stun_servers(mut self, servers: Vec<String>) -> Self {
        self.stun_servers = servers;
        self
    }

    pub fn with_turn(mut self, turn: Option<TurnConfig>) -> Self {
        self.turn = turn;
        self
    }

    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    /// STUN entries first, the TURN entry last.
    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = Vec::new();
        if !self.stun_servers.is_empty() {
            servers.push(IceServerConfig {
                urls: self.stun_servers.clone(),
                username: None,
                credential: None,
            });
        }
        if let Some(turn) = &self.turn {
            servers.push(IceServerConfig {
                urls: vec![turn.url.clone()],
                username: Some(turn.username.clone()),
                credential: Some(turn.credential.clone()),
            });
        }
        servers
    }

    /// Signaling URL with the room attached, e.g. `ws://host/ws?room=ABCDE`.
    pub fn room_url(&self, room: &RoomCode) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidSignalUrl(self.signal_url.clone());
        let mut url = Url::parse(self.signal_url.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "ws" | "wss") || url.host_str().is_none() {
            return Err(invalid());
        }
        url.query_pairs_mut().append_pair("room", room.as_str());
        Ok(url)
    }
}
