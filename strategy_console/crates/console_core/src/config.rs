use thiserror::Error;
use url::Url;

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8765/ws/strategy";
pub const DEFAULT_OUTBOUND_CAP: usize = 64;

pub const WS_URL_ENV: &str = "STRATEGY_WS_URL";
pub const OUTBOUND_CAP_ENV: &str = "STRATEGY_OUTBOUND_CAP";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("engine url must use ws:// or wss://, got {0}://")]
    UnsupportedScheme(String),
    #[error("invalid outbound capacity {0:?}: expected a positive integer")]
    InvalidCapacity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub ws_url: Url,
    /// Frames the connection actor will queue before `dispatch` reports a failure.
    pub outbound_capacity: usize,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let ws_url = lookup(WS_URL_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        let outbound_capacity = match lookup(OUTBOUND_CAP_ENV) {
            Some(raw) => parse_capacity(raw.trim())?,
            None => DEFAULT_OUTBOUND_CAP,
        };
        Ok(Self {
            ws_url: parse_ws_url(&ws_url)?,
            outbound_capacity,
        })
    }

    pub fn with_ws_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.ws_url = parse_ws_url(raw)?;
        Ok(self)
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity(capacity.to_string()));
        }
        self.outbound_capacity = capacity;
        Ok(self)
    }
}

fn parse_ws_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_capacity(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidCapacity(raw.to_string())),
    }
}
