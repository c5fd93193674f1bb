//! Fugle intraday quote client
//!
//! Serves the IX-prefixed domestic indices (加權指數, 櫃買指數) that the
//! Yahoo feed does not carry under those codes.

use crate::error::{FetchError, Result};
use crate::quote::{QuoteRecord, display_name_override};
use std::time::Duration;

const BASE_URL: &str = "https://api.fugle.tw/marketdata/v1.0/stock";

/// Fugle REST client with API-key auth.
pub struct FugleClient {
    http: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

impl FugleClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Intraday quote for an index symbol. No daily history here; the
    /// composite source merges that in from the Yahoo peer when needed.
    pub async fn index_quote(&self, symbol: &str) -> Result<Option<QuoteRecord>> {
        let url = format!("{BASE_URL}/intraday/quote/{symbol}");
        let response = self
            .http
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Provider {
                provider: "fugle",
                message: format!("HTTP {}", response.status()),
            });
        }

        let data: serde_json::Value = response.json().await?;
        let Some(price) = data["closePrice"]
            .as_f64()
            .or_else(|| data["lastPrice"].as_f64())
        else {
            tracing::debug!(symbol, "fugle quote missing price data");
            return Ok(None);
        };
        let previous_close = data["previousClose"].as_f64().unwrap_or(price);

        let name = display_name_override(symbol)
            .map(str::to_string)
            .or_else(|| data["name"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("Stock {symbol}"));

        Ok(Some(QuoteRecord::new(
            symbol,
            name,
            price,
            previous_close,
            "TWD",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access and FUGLE_API_KEY
    async fn test_index_quote() {
        let api_key = std::env::var("FUGLE_API_KEY").expect("FUGLE_API_KEY set");
        let client = FugleClient::new(api_key, Duration::from_secs(10));
        let quote = client
            .index_quote("IX0001")
            .await
            .expect("fetch succeeds")
            .expect("IX0001 exists");
        assert_eq!(quote.name, "台灣加權指數");
        assert!(quote.price > 0.0);
    }
}
