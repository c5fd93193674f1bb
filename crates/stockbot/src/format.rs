//! Reply formatting
//!
//! Every function here is a pure function of already-fetched records; all
//! numeric presentation rules (rounding, sign prefixes, unit scaling) live in
//! this module and nowhere else.

use crate::flow::{InstitutionalFlow, MarketFlowSummary, parse_grouped};
use crate::quote::{QuoteRecord, round2};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

const UP_ICON: &str = "📈";
const DOWN_ICON: &str = "📉";
const FLAT_ICON: &str = "➖";

/// Rendered when a per-symbol flow lookup finds nothing.
pub const FLOW_NOT_FOUND: &str = "查無三大法人買賣超資料";

/// One share lot (張) is 1000 shares.
const SHARES_PER_LOT: i64 = 1000;

/// Market-wide flow amounts render in 億元.
const NTD_PER_YI: f64 = 100_000_000.0;

/// Format one quote as a single reply line:
/// `{name} ({symbol}): {price} {icon} {delta} ({pct}%)`.
///
/// Prices are rounded to 2 decimals before any arithmetic. Positive delta
/// and percent carry a `+` prefix; an exactly-zero delta renders the flat
/// icon, a `0.00` delta and the literal percent field `0` (not `0.00`).
pub fn price_line(quote: &QuoteRecord) -> String {
    let price = round2(quote.price);
    let previous = round2(quote.previous_close);
    let delta = price - previous;
    let percent = if previous == 0.0 {
        0.0
    } else {
        delta / previous * 100.0
    };

    let (icon, delta_text, percent_text) = if delta > 0.0 {
        (UP_ICON, format!("+{delta:.2}"), format!("+{percent:.2}"))
    } else if delta < 0.0 {
        (DOWN_ICON, format!("{delta:.2}"), format!("{percent:.2}"))
    } else {
        (FLAT_ICON, "0.00".to_string(), "0".to_string())
    };

    format!(
        "{} ({}): {} {} {} ({}%)",
        quote.name,
        quote.symbol,
        format_price(price),
        icon,
        delta_text,
        percent_text
    )
}

/// Join price lines for a basket, one line per member in input order.
/// Missing members are omitted; an all-missing basket yields an empty string.
pub fn price_lines(records: &[Option<QuoteRecord>]) -> String {
    records
        .iter()
        .flatten()
        .map(price_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the technical-analysis block: price line, optional valuation line,
/// then the 5/20 and 60/120/240 day moving-average lines.
///
/// A window longer than the available history renders `N/A` rather than a
/// partial mean.
pub fn technical_block(quote: &QuoteRecord) -> String {
    let closes: Vec<f64> = quote.history.iter().map(|c| c.close).collect();

    let mut lines = vec![price_line(quote), String::new()];
    if let Some(valuation) = valuation_line(quote) {
        lines.push(valuation);
        lines.push(String::new());
    }
    lines.push(format!(
        "5日均線: {} / 20日均線: {}",
        format_ma(&closes, 5),
        format_ma(&closes, 20)
    ));
    lines.push(format!(
        "60日均線: {} / 120日均線: {} / 240日均線: {}",
        format_ma(&closes, 60),
        format_ma(&closes, 120),
        format_ma(&closes, 240)
    ));
    lines.join("\n")
}

/// Format the per-symbol 三大法人 block in lots (張).
///
/// `None` yields the literal not-found message.
pub fn flow_block(flow: Option<&InstitutionalFlow>) -> String {
    let Some(flow) = flow else {
        return FLOW_NOT_FOUND.to_string();
    };

    let rows: [(&str, &str); 13] = [
        ("外資買進", &flow.foreign_buy),
        ("外資賣出", &flow.foreign_sell),
        ("外資買賣超", &flow.foreign_net),
        ("投信買進", &flow.trust_buy),
        ("投信賣出", &flow.trust_sell),
        ("投信買賣超", &flow.trust_net),
        ("自營商(自行買賣)買進", &flow.dealer_self_buy),
        ("自營商(自行買賣)賣出", &flow.dealer_self_sell),
        ("自營商(自行買賣)買賣超", &flow.dealer_self_net),
        ("自營商(避險)買進", &flow.dealer_hedge_buy),
        ("自營商(避險)賣出", &flow.dealer_hedge_sell),
        ("自營商(避險)買賣超", &flow.dealer_hedge_net),
        ("三大法人合計買賣超", &flow.total_net),
    ];

    let mut lines = vec![format!("{} 三大法人買賣超", flow.date.format("%Y-%m-%d"))];
    for (label, raw) in rows {
        let lots = parse_grouped(raw) / SHARES_PER_LOT;
        lines.push(format!("{label}: {lots:>8} 張"));
    }
    lines.join("\n")
}

/// Format the market-wide flow table in 億元, one section per category.
/// Net (差額) fields follow the price-delta sign rule.
pub fn market_flow_block(summary: &MarketFlowSummary) -> String {
    const SEPARATOR: &str = "────────────";

    let mut lines = vec![
        format!("{} 三大法人買賣金額統計", summary.date.format("%Y-%m-%d")),
        SEPARATOR.to_string(),
    ];
    for row in &summary.rows {
        lines.push(row.label.clone());
        lines.push(format!("買進: {:.2}", to_yi(&row.buy)));
        lines.push(format!("賣出: {:.2}", to_yi(&row.sell)));
        lines.push(format!("買賣差額: {}", signed_amount(to_yi(&row.net))));
        lines.push(SEPARATOR.to_string());
    }
    lines.push("單位: 億元".to_string());
    lines.join("\n")
}

/// Scale a raw NTD amount string to 億元.
fn to_yi(raw: &str) -> f64 {
    parse_grouped(raw) as f64 / NTD_PER_YI
}

/// Sign-prefix rule shared with price deltas: positive values carry `+`.
fn signed_amount(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

/// Render a 2-dp-rounded price the way the feed displays it: minimal
/// decimals, but always at least one (`525.0`, `510.25`).
fn format_price(price: f64) -> String {
    let text = format!("{price:.2}");
    match text.strip_suffix('0') {
        Some(trimmed) if !trimmed.ends_with('.') => trimmed.to_string(),
        _ => text,
    }
}

/// Trailing mean of the last `window` closes; `None` when history is shorter
/// than the window.
fn moving_average(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    let mut last = 0.0;
    for &close in closes {
        last = sma.next(close);
    }
    Some(last)
}

fn format_ma(closes: &[f64], window: usize) -> String {
    match moving_average(closes, window) {
        Some(value) => format!("{value:.2}"),
        None => "N/A".to_string(),
    }
}

fn valuation_line(quote: &QuoteRecord) -> Option<String> {
    let valuation = quote.valuation?;
    let mut parts = Vec::new();
    if let Some(yield_pct) = valuation.dividend_yield_pct {
        if yield_pct != 0.0 {
            parts.push(format!("殖利率: {yield_pct:.1}%"));
        }
    }
    if let Some(pe) = valuation.trailing_pe {
        if pe != 0.0 {
            parts.push(format!("本益比: {pe:.1}"));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("  "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{Candle, Valuation};
    use chrono::NaiveDate;

    fn quote(price: f64, previous: f64) -> QuoteRecord {
        QuoteRecord::new("2330", "台積電", price, previous, "TWD")
    }

    fn history(closes: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn test_price_line_up() {
        let q = QuoteRecord::new("2330", "TSMC", 525.00, 510.00, "TWD");
        assert_eq!(price_line(&q), "TSMC (2330): 525.0 📈 +15.00 (+2.94%)");
    }

    #[test]
    fn test_price_line_down() {
        let q = quote(98.5, 100.0);
        assert_eq!(price_line(&q), "台積電 (2330): 98.5 📉 -1.50 (-1.50%)");
    }

    #[test]
    fn test_price_line_flat_uses_literal_zero_percent() {
        let q = quote(100.0, 100.0);
        assert_eq!(price_line(&q), "台積電 (2330): 100.0 ➖ 0.00 (0%)");
    }

    #[test]
    fn test_price_line_zero_previous_close() {
        // no division fault; percent falls back to 0 but keeps the up prefix
        let q = quote(10.0, 0.0);
        assert_eq!(price_line(&q), "台積電 (2330): 10.0 📈 +10.00 (+0.00%)");
    }

    #[test]
    fn test_price_line_round_trip() {
        let q = quote(510.25, 500.0);
        let line = price_line(&q);

        let symbol = &line[line.find('(').expect("open paren") + 1
            ..line.find(')').expect("close paren")];
        assert_eq!(symbol, "2330");

        let after_colon = line.split(": ").nth(1).expect("price field");
        let printed: f64 = after_colon
            .split_whitespace()
            .next()
            .expect("price token")
            .parse()
            .expect("printed price parses back");
        assert!((printed - q.price).abs() < 0.01);
    }

    #[test]
    fn test_format_price_trims_to_minimal_decimals() {
        assert_eq!(format_price(525.0), "525.0");
        assert_eq!(format_price(510.25), "510.25");
        assert_eq!(format_price(520.1), "520.1");
        assert_eq!(format_price(0.0), "0.0");
    }

    #[test]
    fn test_price_lines_skips_missing_members() {
        let records = vec![
            Some(QuoteRecord::new("^GSPC", "S&P 500", 5000.0, 4900.0, "USD")),
            None,
            Some(QuoteRecord::new("^IXIC", "那斯達克指數", 16000.0, 16100.0, "USD")),
        ];
        let joined = price_lines(&records);
        let lines: Vec<&str> = joined.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("S&P 500"));
        assert!(lines[1].starts_with("那斯達克指數"));
    }

    #[test]
    fn test_price_lines_all_missing_is_empty() {
        assert_eq!(price_lines(&[None, None]), "");
    }

    #[test]
    fn test_moving_average_trailing_mean() {
        let closes: Vec<f64> = (1..=250).map(f64::from).collect();
        // mean of 246..=250
        assert_eq!(moving_average(&closes, 5), Some(248.0));
        // mean of 11..=250
        assert_eq!(moving_average(&closes, 240), Some(130.5));
        assert_eq!(moving_average(&closes[..100], 120), None);
    }

    #[test]
    fn test_technical_block_layout() {
        let closes: Vec<f64> = (1..=250).map(f64::from).collect();
        let q = quote(250.0, 249.0)
            .with_history(history(&closes))
            .with_valuation(Some(Valuation {
                dividend_yield_pct: Some(2.31),
                trailing_pe: Some(15.44),
            }));
        let block = technical_block(&q);
        let lines: Vec<&str> = block.split('\n').collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("台積電 (2330): 250.0"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "殖利率: 2.3%  本益比: 15.4");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "5日均線: 248.00 / 20日均線: 240.50");
        assert_eq!(lines[5], "60日均線: 220.50 / 120日均線: 190.50 / 240日均線: 130.50");
    }

    #[test]
    fn test_technical_block_without_valuation() {
        let q = quote(100.0, 99.0).with_history(history(&[100.0; 10]));
        let block = technical_block(&q);
        let lines: Vec<&str> = block.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "5日均線: 100.00 / 20日均線: N/A");
        assert_eq!(lines[3], "60日均線: N/A / 120日均線: N/A / 240日均線: N/A");
    }

    #[test]
    fn test_technical_block_skips_zero_valuation_fields() {
        let q = quote(100.0, 99.0)
            .with_history(history(&[100.0; 10]))
            .with_valuation(Some(Valuation {
                dividend_yield_pct: Some(0.0),
                trailing_pe: Some(12.0),
            }));
        let block = technical_block(&q);
        assert!(block.contains("本益比: 12.0"));
        assert!(!block.contains("殖利率"));
    }

    fn sample_flow() -> InstitutionalFlow {
        InstitutionalFlow {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            foreign_buy: "1,000,000".to_string(),
            foreign_sell: "400,000".to_string(),
            foreign_net: "600,000".to_string(),
            trust_buy: "50,000".to_string(),
            trust_sell: "150,000".to_string(),
            trust_net: "-100,000".to_string(),
            dealer_self_buy: "10,000".to_string(),
            dealer_self_sell: "5,000".to_string(),
            dealer_self_net: "5,000".to_string(),
            dealer_hedge_buy: "20,000".to_string(),
            dealer_hedge_sell: "30,000".to_string(),
            dealer_hedge_net: "-10,000".to_string(),
            total_net: "495,000".to_string(),
        }
    }

    #[test]
    fn test_flow_block_scales_shares_to_lots() {
        let block = flow_block(Some(&sample_flow()));
        assert!(block.starts_with("2025-08-01 三大法人買賣超"));
        assert!(block.contains("外資買進:     1000 張"));
        assert!(block.contains("投信買賣超:     -100 張"));
        assert!(block.contains("三大法人合計買賣超:      495 張"));
        assert_eq!(block.lines().count(), 14);
    }

    #[test]
    fn test_flow_block_absent_input() {
        assert_eq!(flow_block(None), FLOW_NOT_FOUND);
    }

    #[test]
    fn test_market_flow_block() {
        use crate::flow::{MarketFlowRow, MarketFlowSummary};
        let summary = MarketFlowSummary {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            rows: vec![
                MarketFlowRow {
                    label: "外資及陸資".to_string(),
                    buy: "123,456,789,000".to_string(),
                    sell: "110,000,000,000".to_string(),
                    net: "13,456,789,000".to_string(),
                },
                MarketFlowRow {
                    label: "投信".to_string(),
                    buy: "10,000,000,000".to_string(),
                    sell: "12,000,000,000".to_string(),
                    net: "-2,000,000,000".to_string(),
                },
            ],
        };
        let block = market_flow_block(&summary);
        assert!(block.contains("外資及陸資\n買進: 1234.57\n賣出: 1100.00\n買賣差額: +134.57"));
        assert!(block.contains("投信\n買進: 100.00\n賣出: 120.00\n買賣差額: -20.00"));
        assert!(block.ends_with("單位: 億元"));
    }

    #[test]
    fn test_signed_amount_zero_keeps_no_prefix() {
        assert_eq!(signed_amount(0.0), "0.00");
        assert_eq!(signed_amount(1.5), "+1.50");
        assert_eq!(signed_amount(-1.5), "-1.50");
    }
}
