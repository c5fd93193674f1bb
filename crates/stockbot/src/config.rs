//! Configuration for the bot and its provider clients

use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the bot and its provider clients.
///
/// Constructed once at startup and handed to the provider constructors;
/// nothing in the core reads the environment after this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Fugle market-data API key (domestic index quotes). Optional; without
    /// it IX-prefixed index commands yield no reply.
    pub fugle_api_key: Option<String>,

    /// Gemini API key for the narrative appended to analysis replies.
    /// Optional; without it analysis replies carry no narrative.
    pub gemini_api_key: Option<String>,

    /// Gemini model used for narratives
    pub gemini_model: String,

    /// Per-request timeout for all HTTP providers
    pub request_timeout: Duration,

    /// Cache TTL for domestic stock display names
    pub name_cache_ttl: Duration,

    /// Maximum requests per minute against TWSE endpoints
    pub twse_rate_limit: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            fugle_api_key: None,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            request_timeout: Duration::from_secs(10),
            name_cache_ttl: Duration::from_secs(86_400), // 1 day
            twse_rate_limit: 30,
        }
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Create config from environment variables
    /// (`FUGLE_API_KEY`, `GEMINI_API_KEY`, `GEMINI_MODEL`)
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_keys().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.twse_rate_limit == 0 {
            return Err(FetchError::Config(
                "twse_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.gemini_model.is_empty() {
            return Err(FetchError::Config(
                "gemini_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    fugle_api_key: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    request_timeout: Option<Duration>,
    name_cache_ttl: Option<Duration>,
    twse_rate_limit: Option<u32>,
}

impl BotConfigBuilder {
    /// Set the Fugle API key
    pub fn fugle_api_key(mut self, key: impl Into<String>) -> Self {
        self.fugle_api_key = Some(key.into());
        self
    }

    /// Set the Gemini API key
    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    /// Set the Gemini model
    pub fn gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = Some(model.into());
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the display-name cache TTL
    pub fn name_cache_ttl(mut self, duration: Duration) -> Self {
        self.name_cache_ttl = Some(duration);
        self
    }

    /// Set the TWSE request budget (per minute)
    pub fn twse_rate_limit(mut self, limit: u32) -> Self {
        self.twse_rate_limit = Some(limit);
        self
    }

    /// Load API keys from the environment
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("FUGLE_API_KEY") {
            self.fugle_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.gemini_model = Some(model);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();

        let config = BotConfig {
            fugle_api_key: self.fugle_api_key,
            gemini_api_key: self.gemini_api_key,
            gemini_model: self.gemini_model.unwrap_or(defaults.gemini_model),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            name_cache_ttl: self.name_cache_ttl.unwrap_or(defaults.name_cache_ttl),
            twse_rate_limit: self.twse_rate_limit.unwrap_or(defaults.twse_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert!(config.fugle_api_key.is_none());
        assert_eq!(config.twse_rate_limit, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BotConfig::builder()
            .fugle_api_key("test-key")
            .request_timeout(Duration::from_secs(5))
            .twse_rate_limit(10)
            .build()
            .expect("valid config");

        assert_eq!(config.fugle_api_key.as_deref(), Some("test-key"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.twse_rate_limit, 10);
    }

    #[test]
    fn test_validation_zero_rate_limit() {
        let config = BotConfig {
            twse_rate_limit: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }
}
