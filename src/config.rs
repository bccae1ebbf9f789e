use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_OAUTH_BASE_URL, DEFAULT_TOKEN_URL, DEFAULT_USER_AGENT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit OAuth app credentials
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub reddit_token_url: String,
    pub reddit_oauth_base_url: String,

    // Fetching
    pub fetch_concurrency: usize,
    pub http_timeout: Option<Duration>,

    // Inbound gate
    pub site_passkey: Option<String>,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = parse_env_u64("HTTP_TIMEOUT_SECS", 0)?;

        Ok(Self {
            reddit_client_id: required_env("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required_env("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: env_or_default("REDDIT_USER_AGENT", DEFAULT_USER_AGENT),
            reddit_token_url: env_or_default("REDDIT_TOKEN_URL", DEFAULT_TOKEN_URL),
            reddit_oauth_base_url: env_or_default("REDDIT_OAUTH_BASE_URL", DEFAULT_OAUTH_BASE_URL),

            fetch_concurrency: parse_env_usize("FETCH_CONCURRENCY", DEFAULT_FETCH_CONCURRENCY)?,
            http_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),

            site_passkey: optional_env("SITE_PASSKEY"),

            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_CONCURRENCY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.reddit_client_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "REDDIT_CLIENT_ID".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.reddit_client_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "REDDIT_CLIENT_SECRET".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        for (name, value) in [
            ("REDDIT_TOKEN_URL", &self.reddit_token_url),
            ("REDDIT_OAUTH_BASE_URL", &self.reddit_oauth_base_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("not a valid URL: {e}"),
                });
            }
        }
        Ok(())
    }

    /// Configuration with placeholder credentials, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reddit_client_id: "client".to_string(),
            reddit_client_secret: "secret".to_string(),
            reddit_user_agent: DEFAULT_USER_AGENT.to_string(),
            reddit_token_url: DEFAULT_TOKEN_URL.to_string(),
            reddit_oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            http_timeout: None,
            site_passkey: None,
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
