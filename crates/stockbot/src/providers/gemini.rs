//! Gemini narrative client
//!
//! Turns a formatted technical block into a short natural-language read.
//! Without an API key the client is inert and analysis replies simply carry
//! no narrative.

use crate::config::BotConfig;
use crate::error::{FetchError, Result};
use crate::providers::Narrator;
use async_trait::async_trait;
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiNarrator {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl GeminiNarrator {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl Narrator for GeminiNarrator {
    async fn narrate(&self, technical_block: &str) -> Result<Option<String>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let prompt = format!(
            "根據以下資料用基本面與技術分析這檔股票目前狀況，內容要在100字內:\n{technical_block}"
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::Provider {
                provider: "gemini",
                message: format!("HTTP {}", response.status()),
            });
        }

        let data: serde_json::Value = response.json().await?;
        let text = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|t| t.trim().to_string());
        Ok(text.filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_without_api_key_is_inert() {
        let config = BotConfig::default();
        let narrator = GeminiNarrator::new(&config);
        let result = narrator.narrate("whatever").await.expect("no error");
        assert_eq!(result, None);
    }
}
