//! Symbol classification: raw operand to (symbol, market class)

use crate::aliases::AliasTable;
use crate::providers::CompanyResolver;
use serde::{Deserialize, Serialize};

/// Provider-routing tag for a resolved symbol.
///
/// Historically named TW / US / IND / FUT. `Futures` also covers
/// commodities, FX pairs and crypto, which all ride the same feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketClass {
    DomesticEquity,
    ForeignEquity,
    Index,
    Futures,
}

/// A symbol together with its provider routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub symbol: String,
    pub market: MarketClass,
}

impl SymbolRef {
    pub fn new(symbol: impl Into<String>, market: MarketClass) -> Self {
        Self {
            symbol: symbol.into(),
            market,
        }
    }
}

/// Outcome of classifying an operand.
///
/// A tagged union instead of "tuple, list of tuples, or bare string":
/// downstream dispatch is one exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// One symbol
    Single(SymbolRef),
    /// An ordered basket; reply order follows this order
    Basket(Vec<SymbolRef>),
    /// A pre-rendered reply (help text); bypasses quote retrieval
    Text(String),
}

/// True if `c` is in the CJK Unified Ideographs block.
fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Classify a cleaned operand (whitespace already stripped).
///
/// Decision order:
/// 1. leading ASCII digit: domestic equity, trailing letters allowed
///    (ETF codes like 00930A);
/// 2. any CJK character: alias table first, then company-name resolution;
/// 3. leading ASCII letter: foreign equity, uppercased (dotted share
///    classes like BRK.B pass through untouched);
/// 4. anything else: not a symbol.
///
/// Mixed digit+CJK operands classify purely by the first character; no
/// validation of the remainder is attempted.
pub async fn classify(
    operand: &str,
    aliases: &AliasTable,
    resolver: &dyn CompanyResolver,
) -> Option<Resolution> {
    let first = operand.chars().next()?;

    if first.is_ascii_digit() {
        return Some(Resolution::Single(SymbolRef::new(
            operand,
            MarketClass::DomesticEquity,
        )));
    }

    if operand.chars().any(is_cjk) {
        if let Some(resolution) = aliases.lookup(operand) {
            return Some(resolution);
        }
        return match resolver.resolve(operand).await {
            Ok(Some(symbol)) => Some(Resolution::Single(SymbolRef::new(
                symbol,
                MarketClass::DomesticEquity,
            ))),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(operand, error = %err, "company-name resolution failed");
                None
            }
        };
    }

    if first.is_ascii_alphabetic() {
        return Some(Resolution::Single(SymbolRef::new(
            operand.to_uppercase(),
            MarketClass::ForeignEquity,
        )));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockCompanyResolver;

    fn unused_resolver() -> MockCompanyResolver {
        // any call is a test failure: these operands must not hit the resolver
        MockCompanyResolver::new()
    }

    fn domestic(symbol: &str) -> Option<Resolution> {
        Some(Resolution::Single(SymbolRef::new(
            symbol,
            MarketClass::DomesticEquity,
        )))
    }

    fn foreign(symbol: &str) -> Option<Resolution> {
        Some(Resolution::Single(SymbolRef::new(
            symbol,
            MarketClass::ForeignEquity,
        )))
    }

    #[tokio::test]
    async fn test_digit_operands_are_domestic() {
        let table = AliasTable::new();
        let resolver = unused_resolver();
        for (operand, expected) in [
            ("2330", "2330"),
            ("2884", "2884"),
            ("00930A", "00930A"), // ETF code with trailing letter
            ("0", "0"),
            ("123456", "123456"),
        ] {
            assert_eq!(
                classify(operand, &table, &resolver).await,
                domestic(expected),
                "operand {operand}"
            );
        }
    }

    #[tokio::test]
    async fn test_ascii_operands_are_foreign_and_uppercased() {
        let table = AliasTable::new();
        let resolver = unused_resolver();
        assert_eq!(classify("AAPL", &table, &resolver).await, foreign("AAPL"));
        assert_eq!(classify("aapl", &table, &resolver).await, foreign("AAPL"));
        assert_eq!(classify("A", &table, &resolver).await, foreign("A"));
        assert_eq!(classify("ABC123", &table, &resolver).await, foreign("ABC123"));
        assert_eq!(classify("brk.b", &table, &resolver).await, foreign("BRK.B"));
    }

    #[tokio::test]
    async fn test_empty_and_junk_operands() {
        let table = AliasTable::new();
        let resolver = unused_resolver();
        assert_eq!(classify("", &table, &resolver).await, None);
        assert_eq!(classify("#2884", &table, &resolver).await, None);
        assert_eq!(classify("$%!", &table, &resolver).await, None);
    }

    #[tokio::test]
    async fn test_alias_takes_priority_over_resolver() {
        let table = AliasTable::new();
        let resolver = unused_resolver();
        assert_eq!(
            classify("大盤", &table, &resolver).await,
            Some(Resolution::Single(SymbolRef::new(
                "IX0001",
                MarketClass::Index
            )))
        );
    }

    #[tokio::test]
    async fn test_company_name_falls_back_to_resolver() {
        let table = AliasTable::new();
        let mut resolver = MockCompanyResolver::new();
        resolver
            .expect_resolve()
            .withf(|name| name == "台積電")
            .times(1)
            .returning(|_| Ok(Some("2330".to_string())));
        assert_eq!(classify("台積電", &table, &resolver).await, domestic("2330"));
    }

    #[tokio::test]
    async fn test_unresolvable_company_name() {
        let table = AliasTable::new();
        let mut resolver = MockCompanyResolver::new();
        resolver.expect_resolve().returning(|_| Ok(None));
        assert_eq!(classify("不存在公司", &table, &resolver).await, None);
    }

    #[tokio::test]
    async fn test_resolver_error_degrades_to_none() {
        let table = AliasTable::new();
        let mut resolver = MockCompanyResolver::new();
        resolver.expect_resolve().returning(|_| {
            Err(crate::error::FetchError::Provider {
                provider: "mops",
                message: "boom".to_string(),
            })
        });
        assert_eq!(classify("台積電", &table, &resolver).await, None);
    }

    #[tokio::test]
    async fn test_mixed_digit_cjk_classifies_by_first_char() {
        let table = AliasTable::new();
        let resolver = unused_resolver();
        assert_eq!(classify("2330台積電", &table, &resolver).await, domestic("2330台積電"));
    }
}
