//! Yahoo Finance quote feed client

use crate::error::{FetchError, Result};
use crate::quote::{Candle, Valuation};
use chrono::{DateTime, Utc};
use std::time::Duration;
use yahoo_finance_api as yahoo;

/// Raw feed output before a display name and currency are attached.
pub(crate) struct RawQuote {
    pub price: f64,
    pub previous_close: f64,
    pub history: Vec<Candle>,
}

/// Yahoo Finance client: daily candles plus the quote-summary valuation
/// endpoint.
pub struct YahooClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl YahooClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Fetch daily candles for `range` (e.g. `"5d"`, `"2y"`).
    ///
    /// Price is the last close, previous close the one before it. An empty
    /// candle set means the symbol is unknown to the feed.
    pub(crate) async fn fetch(&self, symbol: &str, range: &str) -> Result<Option<RawQuote>> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| FetchError::QuoteFeed(e.to_string()))?;

        let response = provider
            .get_quote_range(symbol, "1d", range)
            .await
            .map_err(|e| FetchError::QuoteFeed(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| FetchError::QuoteFeed(e.to_string()))?;
        if quotes.is_empty() {
            return Ok(None);
        }

        let history: Vec<Candle> = quotes
            .iter()
            .map(|q| Candle {
                date: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now)
                    .date_naive(),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect();

        let price = quotes[quotes.len() - 1].close;
        let previous_close = if quotes.len() >= 2 {
            quotes[quotes.len() - 2].close
        } else {
            price
        };

        Ok(Some(RawQuote {
            price,
            previous_close,
            history,
        }))
    }

    /// Dividend yield and trailing P/E from the quote-summary endpoint.
    /// Anything missing stays `None`; the formatter skips absent fields.
    pub(crate) async fn valuation(&self, symbol: &str) -> Result<Option<Valuation>> {
        let url = format!("https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}");
        let response = self
            .http
            .get(&url)
            .query(&[("modules", "summaryDetail")])
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        let detail = &data["quoteSummary"]["result"][0]["summaryDetail"];
        if detail.is_null() {
            return Ok(None);
        }

        // the feed reports yield as a fraction (0.023 for 2.3%)
        let dividend_yield_pct = detail["dividendYield"]["raw"].as_f64().map(|f| f * 100.0);
        let trailing_pe = detail["trailingPE"]["raw"].as_f64();
        if dividend_yield_pct.is_none() && trailing_pe.is_none() {
            return Ok(None);
        }

        Ok(Some(Valuation {
            dividend_yield_pct,
            trailing_pe,
        }))
    }
}
