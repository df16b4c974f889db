use gatepass_core::constants::DEFAULT_AUTHORITY_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default authority base URL.
pub const DEFAULT_AUTHORITY_URL: &str = "http://127.0.0.1:8000";

/// Configuration for the HTTP authority client.
///
/// # Example
///
/// ```
/// use gatepass_network::AuthorityConfig;
/// use std::time::Duration;
///
/// let config = AuthorityConfig::new("https://gate.example.org/api")
///     .with_timeout(Duration::from_secs(5))
///     .with_token("secret");
/// assert_eq!(config.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,

    /// Timeout for every request, connect included.
    #[serde(rename = "timeout_ms", with = "gatepass_core::serde_millis")]
    pub timeout: Duration,

    /// Bearer token sent on every request.
    pub token: Option<String>,

    pub user_agent: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AUTHORITY_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_AUTHORITY_TIMEOUT_MS),
            token: None,
            user_agent: concat!("gatepass/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AuthorityConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
