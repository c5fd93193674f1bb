//! Chat-command stock bot core
//!
//! This crate implements the message-to-reply engine of a Traditional-Chinese
//! stock bot:
//!
//! - Command grammar: `#` (price quote), `A` (technical analysis), `F`
//!   (institutional buy/sell flow), anything else is silently ignored
//! - Symbol resolution: digit-leading tickers are domestic equities, CJK
//!   operands go through the alias table and then company-name resolution,
//!   plain ASCII tickers are foreign equities
//! - Alias table: indices, index futures, FX, commodities, bonds and crypto
//!   keywords, single or basket, plus a derived help text
//! - Formatting: price lines with directional icons, the moving-average
//!   analysis block, and the 三大法人 flow tables
//!
//! Providers (quote feeds, company-name resolution, flow tables, narrative
//! generation) are injected behind traits; see [`providers`]. Provider
//! failures never reach the caller: the bot logs them and answers with
//! silence, never with a broken reply.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockbot::{BotConfig, StockBot};
//! use stockbot::providers::{GeminiNarrator, MarketData, TwseClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let twse = Arc::new(TwseClient::new(&config));
//!     let bot = StockBot::new(
//!         Arc::new(MarketData::new(&config, twse.clone())),
//!         twse.clone(),
//!         twse,
//!         Arc::new(GeminiNarrator::new(&config)),
//!     );
//!
//!     if let Some(reply) = bot.handle_message("#2330").await {
//!         println!("{reply}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod aliases;
pub mod bot;
pub mod cache;
pub mod config;
pub mod error;
pub mod flow;
pub mod format;
pub mod providers;
pub mod quote;
pub mod symbol;

// Re-export main types for convenience
pub use bot::StockBot;
pub use config::BotConfig;
pub use error::{FetchError, Result};
pub use flow::{InstitutionalFlow, MarketFlowRow, MarketFlowSummary};
pub use quote::{Candle, Direction, QuoteRecord, Valuation};
pub use symbol::{MarketClass, Resolution, SymbolRef};
