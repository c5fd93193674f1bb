//! Quote records produced by the provider layer and consumed by the formatter

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price movement relative to the previous close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// Derive the direction from prices already rounded to 2 decimals.
    pub fn from_prices(price: f64, previous_close: f64) -> Self {
        if price > previous_close {
            Self::Up
        } else if price < previous_close {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// One day of OHLCV history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Valuation figures for the technical-analysis block.
///
/// Fields are optional because most providers only carry them for equities;
/// the formatter skips anything absent or zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Dividend yield in percent (e.g. 2.3 for 2.3%)
    pub dividend_yield_pct: Option<f64>,
    /// Trailing price/earnings ratio
    pub trailing_pe: Option<f64>,
}

/// A single resolved quote, created fresh per request and never persisted.
///
/// Invariant: `price` and `previous_close` are rounded to 2 decimals at
/// construction and `direction` is derived from the rounded values, so
/// float noise can never flip the icon at the rounding boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
    pub currency: String,
    pub direction: Direction,
    pub valuation: Option<Valuation>,
    pub history: Vec<Candle>,
}

impl QuoteRecord {
    /// Build a record, rounding prices and deriving the direction.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        previous_close: f64,
        currency: impl Into<String>,
    ) -> Self {
        let price = round2(price);
        let previous_close = round2(previous_close);
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            previous_close,
            currency: currency.into(),
            direction: Direction::from_prices(price, previous_close),
            valuation: None,
            history: Vec::new(),
        }
    }

    /// Attach daily history (oldest first).
    pub fn with_history(mut self, history: Vec<Candle>) -> Self {
        self.history = history;
        self
    }

    /// Attach valuation figures.
    pub fn with_valuation(mut self, valuation: Option<Valuation>) -> Self {
        self.valuation = valuation;
        self
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fixed display names for every symbol reachable through an alias.
///
/// Feed-provided names for these symbols are ignored so a known alias never
/// renders as a raw ticker string.
pub fn display_name_override(symbol: &str) -> Option<&'static str> {
    let name = match symbol {
        "IX0001" => "台灣加權指數",
        "IX0043" => "櫃買指數",
        "^N225" => "日經225",
        "^KS11" => "韓國KOSPI",
        "^GSPC" => "S&P 500",
        "^DJI" => "道瓊工業指數",
        "^IXIC" => "那斯達克指數",
        "^SOX" => "費城半導體指數",
        "ES=F" => "S&P 500期貨",
        "YM=F" => "道瓊期貨",
        "NQ=F" => "那斯達克期貨",
        "SOX=F" => "費半期貨",
        "TWD=X" => "USD/TWD",
        "JPYTWD=X" => "JPY/TWD",
        "AUDTWD=X" => "AUD/TWD",
        "GC=F" => "黃金",
        "SI=F" => "白銀",
        "CL=F" => "原油",
        "^FVX" => "美債5年殖利率",
        "^TNX" => "美債10年殖利率",
        "^TYX" => "美債30年殖利率",
        "BTC-USD" => "比特幣",
        "ETH-USD" => "以太幣",
        _ => return None,
    };
    Some(name)
}
