//! Error types for provider fetch operations

use thiserror::Error;

/// Errors raised by the provider collaborators.
///
/// None of these ever reach an end user: the bot logs them at the call
/// boundary and degrades to "no data" / "no reply".
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Yahoo quote feed error
    #[error("quote feed error: {0}")]
    QuoteFeed(String),

    /// A data provider returned an unusable payload
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Provider {
            provider: "twse",
            message: "unexpected stat".to_string(),
        };
        assert_eq!(err.to_string(), "twse error: unexpected stat");

        let err = FetchError::Config("FUGLE_API_KEY not set".to_string());
        assert_eq!(err.to_string(), "configuration error: FUGLE_API_KEY not set");
    }
}
