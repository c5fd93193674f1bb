//! The bot engine: command grammar, dispatch, and the error-to-silence
//! boundary
//!
//! One inbound message runs one parse → classify → fetch → format pipeline.
//! Every provider failure is logged here and degrades to an omitted line or
//! no reply at all; the transport layer never sees an error.

use crate::aliases::{AliasTable, MARKET_KEYWORD};
use crate::format;
use crate::providers::{
    ANALYSIS_RANGE, CompanyResolver, FlowSource, Narrator, QUOTE_RANGE, QuoteSource,
};
use crate::quote::QuoteRecord;
use crate::symbol::{MarketClass, Resolution, SymbolRef, classify};
use std::sync::Arc;
use tracing::warn;

/// The stock bot core.
///
/// Provider collaborators are injected at construction; the bot itself holds
/// no mutable state, so one instance serves any number of messages.
pub struct StockBot {
    aliases: AliasTable,
    quotes: Arc<dyn QuoteSource>,
    companies: Arc<dyn CompanyResolver>,
    flows: Arc<dyn FlowSource>,
    narrator: Arc<dyn Narrator>,
}

impl StockBot {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        companies: Arc<dyn CompanyResolver>,
        flows: Arc<dyn FlowSource>,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        Self {
            aliases: AliasTable::new(),
            quotes,
            companies,
            flows,
            narrator,
        }
    }

    /// Handle one inbound message. `None` means "not a command, or nothing
    /// resolved: do not reply".
    ///
    /// Prefixes are tested in priority order `#`, `A`, `F` on the trimmed
    /// input; the operand keeps no whitespace at all.
    pub async fn handle_message(&self, text: &str) -> Option<String> {
        let text = text.trim();

        if let Some(operand) = text.strip_prefix('#') {
            return self.quote_command(&strip_whitespace(operand)).await;
        }
        if let Some(operand) = text.strip_prefix('A') {
            return self.analysis_command(&strip_whitespace(operand)).await;
        }
        if let Some(operand) = text.strip_prefix('F') {
            return self.flow_command(&strip_whitespace(operand)).await;
        }

        None
    }

    /// `#<operand>`: price quote for a symbol, alias or basket.
    async fn quote_command(&self, operand: &str) -> Option<String> {
        match classify(operand, &self.aliases, self.companies.as_ref()).await? {
            Resolution::Text(reply) => Some(reply),
            Resolution::Single(symbol_ref) => {
                let record = self.fetch_quote(&symbol_ref, QUOTE_RANGE).await?;
                Some(format::price_line(&record))
            }
            Resolution::Basket(members) => {
                let mut records = Vec::with_capacity(members.len());
                for member in &members {
                    records.push(self.fetch_quote(member, QUOTE_RANGE).await);
                }
                let joined = format::price_lines(&records);
                if joined.is_empty() { None } else { Some(joined) }
            }
        }
    }

    /// `A<operand>`: technical analysis for a single target, with an optional
    /// narrative appended when the narrator has one.
    async fn analysis_command(&self, operand: &str) -> Option<String> {
        let resolution = classify(operand, &self.aliases, self.companies.as_ref()).await?;
        let symbol_ref = match resolution {
            Resolution::Text(reply) => return Some(reply),
            Resolution::Single(symbol_ref) => symbol_ref,
            // analysis targets a single symbol; baskets have no meaningful
            // moving-average block
            Resolution::Basket(_) => return None,
        };

        let record = self.fetch_quote(&symbol_ref, ANALYSIS_RANGE).await?;
        let block = format::technical_block(&record);

        match self.narrator.narrate(&block).await {
            Ok(Some(narrative)) => Some(format!("{block}\n\n{narrative}")),
            Ok(None) => Some(block),
            Err(err) => {
                warn!(symbol = %symbol_ref.symbol, error = %err, "narrative generation failed");
                Some(block)
            }
        }
    }

    /// `F<operand>`: institutional buy/sell flow. The market keyword renders
    /// the market-wide 億元 table; anything else resolves to a domestic
    /// symbol and renders the per-symbol 張 block.
    async fn flow_command(&self, operand: &str) -> Option<String> {
        if operand.is_empty() {
            return None;
        }

        if operand == MARKET_KEYWORD {
            return match self.flows.market_flow().await {
                Ok(Some(summary)) => Some(format::market_flow_block(&summary)),
                Ok(None) => None,
                Err(err) => {
                    warn!(error = %err, "market flow fetch failed");
                    None
                }
            };
        }

        match classify(operand, &self.aliases, self.companies.as_ref()).await? {
            Resolution::Text(reply) => Some(reply),
            Resolution::Single(symbol_ref)
                if symbol_ref.market == MarketClass::DomesticEquity =>
            {
                match self.flows.symbol_flow(&symbol_ref.symbol).await {
                    Ok(flow) => Some(format::flow_block(flow.as_ref())),
                    Err(err) => {
                        warn!(symbol = %symbol_ref.symbol, error = %err, "symbol flow fetch failed");
                        None
                    }
                }
            }
            // only domestic equities have 三大法人 data
            _ => None,
        }
    }

    /// Fetch one quote, routing on market class. Failures are logged and
    /// collapse to `None` so a basket keeps its surviving members.
    async fn fetch_quote(&self, symbol_ref: &SymbolRef, range: &str) -> Option<QuoteRecord> {
        let result = match symbol_ref.market {
            MarketClass::DomesticEquity => {
                self.quotes.domestic_quote(&symbol_ref.symbol, range).await
            }
            MarketClass::ForeignEquity => {
                self.quotes.foreign_quote(&symbol_ref.symbol, range).await
            }
            MarketClass::Index => self.quotes.index_quote(&symbol_ref.symbol, range).await,
            MarketClass::Futures => self.quotes.futures_quote(&symbol_ref.symbol, range).await,
        };

        match result {
            Ok(record) => record,
            Err(err) => {
                warn!(symbol = %symbol_ref.symbol, error = %err, "quote fetch failed");
                None
            }
        }
    }
}

/// Remove every whitespace character from the operand.
fn strip_whitespace(operand: &str) -> String {
    operand.chars().filter(|c| !c.is_whitespace()).collect()
}
