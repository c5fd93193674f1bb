//! Provider collaborator interfaces and the composite market-data source
//!
//! The bot core only sees these traits; concrete clients are constructed at
//! process startup and injected, so the core stays side-effect-free and
//! testable without touching the network or the environment.

pub mod fugle;
pub mod gemini;
pub mod twse;
pub mod yahoo;

use crate::config::BotConfig;
use crate::error::{FetchError, Result};
use crate::flow::{InstitutionalFlow, MarketFlowSummary};
use crate::quote::{QuoteRecord, Valuation, display_name_override};
use async_trait::async_trait;
use std::sync::Arc;

pub use fugle::FugleClient;
pub use gemini::GeminiNarrator;
pub use twse::TwseClient;
pub use yahoo::YahooClient;

#[cfg(test)]
use mockall::automock;

/// History range for plain quote commands: enough for a previous close.
pub const QUOTE_RANGE: &str = "5d";

/// History range for analysis commands: enough for the 240-day average.
pub const ANALYSIS_RANGE: &str = "2y";

/// Quote retrieval per market class. `Ok(None)` means "feed has nothing for
/// this symbol", which the bot treats as an omitted line, never an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn domestic_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>>;
    async fn foreign_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>>;
    async fn index_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>>;
    async fn futures_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>>;
}

/// CJK company name to ticker symbol.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompanyResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Option<String>>;
}

/// 三大法人 flow, market-wide and per symbol.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn market_flow(&self) -> Result<Option<MarketFlowSummary>>;
    async fn symbol_flow(&self, symbol: &str) -> Result<Option<InstitutionalFlow>>;
}

/// Optional AI narrative appended to technical-analysis replies.
/// `Ok(None)` means "no narrative available" and is not a failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, technical_block: &str) -> Result<Option<String>>;
}

/// The production `QuoteSource`: Yahoo for everything except IX-prefixed
/// domestic indices, which ride the Fugle feed.
pub struct MarketData {
    yahoo: YahooClient,
    fugle: Option<FugleClient>,
    twse: Arc<TwseClient>,
}

impl MarketData {
    pub fn new(config: &BotConfig, twse: Arc<TwseClient>) -> Self {
        Self {
            yahoo: YahooClient::new(config.request_timeout),
            fugle: config
                .fugle_api_key
                .clone()
                .map(|key| FugleClient::new(key, config.request_timeout)),
            twse,
        }
    }

    /// Valuation figures are only worth a round-trip for analysis replies.
    async fn maybe_valuation(&self, yahoo_symbol: &str, range: &str) -> Option<Valuation> {
        if range != ANALYSIS_RANGE {
            return None;
        }
        match self.yahoo.valuation(yahoo_symbol).await {
            Ok(valuation) => valuation,
            Err(err) => {
                tracing::debug!(symbol = yahoo_symbol, error = %err, "valuation fetch failed");
                None
            }
        }
    }
}

#[async_trait]
impl QuoteSource for MarketData {
    async fn domestic_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>> {
        // listed market first, then the OTC board (original feed convention)
        let mut yahoo_symbol = format!("{symbol}.TW");
        let mut otc = false;
        let mut raw = match self.yahoo.fetch(&yahoo_symbol, range).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(symbol, error = %err, "listed-market fetch failed, trying OTC");
                None
            }
        };
        if raw.is_none() {
            yahoo_symbol = format!("{symbol}.TWO");
            otc = true;
            raw = self.yahoo.fetch(&yahoo_symbol, range).await?;
        }
        let Some(raw) = raw else {
            return Ok(None);
        };

        let name = match display_name_override(symbol) {
            Some(name) => name.to_string(),
            None => match self.twse.stock_name(symbol, otc).await {
                Ok(Some(name)) => name,
                Ok(None) => fallback_name(symbol),
                Err(err) => {
                    tracing::warn!(symbol, error = %err, "display-name lookup failed");
                    fallback_name(symbol)
                }
            },
        };

        let valuation = self.maybe_valuation(&yahoo_symbol, range).await;
        Ok(Some(
            QuoteRecord::new(symbol, name, raw.price, raw.previous_close, "TWD")
                .with_history(raw.history)
                .with_valuation(valuation),
        ))
    }

    async fn foreign_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>> {
        let Some(raw) = self.yahoo.fetch(symbol, range).await? else {
            return Ok(None);
        };
        let name = display_name_override(symbol)
            .map_or_else(|| fallback_name(symbol), str::to_string);
        let valuation = self.maybe_valuation(symbol, range).await;
        Ok(Some(
            QuoteRecord::new(symbol, name, raw.price, raw.previous_close, "USD")
                .with_history(raw.history)
                .with_valuation(valuation),
        ))
    }

    async fn index_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>> {
        if symbol.starts_with("IX") {
            let Some(fugle) = &self.fugle else {
                return Err(FetchError::Config(
                    "FUGLE_API_KEY is not configured".to_string(),
                ));
            };
            let Some(mut record) = fugle.index_quote(symbol).await? else {
                return Ok(None);
            };
            // the intraday feed carries no daily history; borrow it from the
            // Yahoo peer where one exists so analysis can compute averages
            if range == ANALYSIS_RANGE {
                if let Some(peer) = yahoo_index_peer(symbol) {
                    match self.yahoo.fetch(peer, range).await {
                        Ok(Some(raw)) => record.history = raw.history,
                        Ok(None) => {}
                        Err(err) => {
                            tracing::debug!(symbol, error = %err, "index history fetch failed");
                        }
                    }
                }
            }
            return Ok(Some(record));
        }

        let Some(raw) = self.yahoo.fetch(symbol, range).await? else {
            return Ok(None);
        };
        let name = display_name_override(symbol)
            .map_or_else(|| fallback_name(symbol), str::to_string);
        Ok(Some(
            QuoteRecord::new(symbol, name, raw.price, raw.previous_close, "USD")
                .with_history(raw.history),
        ))
    }

    async fn futures_quote(&self, symbol: &str, range: &str) -> Result<Option<QuoteRecord>> {
        let Some(raw) = self.yahoo.fetch(symbol, range).await? else {
            return Ok(None);
        };
        let name = display_name_override(symbol)
            .map_or_else(|| fallback_name(symbol), str::to_string);
        Ok(Some(
            QuoteRecord::new(symbol, name, raw.price, raw.previous_close, "USD")
                .with_history(raw.history),
        ))
    }
}

/// Daily-history peer on the Yahoo feed for an IX-prefixed index.
fn yahoo_index_peer(symbol: &str) -> Option<&'static str> {
    match symbol {
        "IX0001" => Some("^TWII"),
        _ => None,
    }
}

fn fallback_name(symbol: &str) -> String {
    format!("Stock {symbol}")
}
