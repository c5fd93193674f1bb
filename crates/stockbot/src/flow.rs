//! Institutional buy/sell flow records (三大法人)
//!
//! All volume and amount fields stay in their raw thousands-separated string
//! form as delivered by the exchange; the formatter owns all scaling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily per-symbol flow by investor category, in shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionalFlow {
    pub date: NaiveDate,
    pub foreign_buy: String,
    pub foreign_sell: String,
    pub foreign_net: String,
    pub trust_buy: String,
    pub trust_sell: String,
    pub trust_net: String,
    pub dealer_self_buy: String,
    pub dealer_self_sell: String,
    pub dealer_self_net: String,
    pub dealer_hedge_buy: String,
    pub dealer_hedge_sell: String,
    pub dealer_hedge_net: String,
    pub total_net: String,
}

/// One category row of the market-wide flow table, amounts in NTD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFlowRow {
    pub label: String,
    pub buy: String,
    pub sell: String,
    pub net: String,
}

/// Market-wide flow by investor category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFlowSummary {
    pub date: NaiveDate,
    pub rows: Vec<MarketFlowRow>,
}

/// Parse a thousands-separated integer (`"1,000,000"` → 1000000).
///
/// Unparseable input yields 0 so one bad field never takes down a reply.
pub fn parse_grouped(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | ' '))
        .collect();
    cleaned.parse().unwrap_or(0)
}
