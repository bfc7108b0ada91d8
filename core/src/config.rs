use std::env;

use dotenvy::dotenv;

/// Production origin every call goes to unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "https://redsocks.mu:9000";

/// Environment variable pointing the client at a local or test server.
/// Production builds leave it unset and talk to `DEFAULT_BASE_URL`.
pub const BASE_URL_ENV: &str = "CAMPAIGN_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` if present, then read `CAMPAIGN_API_URL`.
    ///
    /// The production origin is the behaviour whenever the variable is unset
    /// or blank. The override exists for development and tests (the mock
    /// server); `ClientConfig::default()` never consults the environment.
    pub fn from_env() -> Self {
        if dotenv().is_err() {
            tracing::debug!("no .env file found");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self {
                base_url: url.trim().to_string(),
            },
            _ => Self::default(),
        }
    }
}
