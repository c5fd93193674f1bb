//! Keyword alias table for indices, FX, commodities, bonds and crypto
//!
//! One immutable table, built once at startup from category sub-tables in a
//! fixed merge order. A keyword colliding across categories is a bug in the
//! table data and panics at construction, so a later category can never
//! silently shadow an earlier one.

use crate::symbol::{MarketClass, Resolution, SymbolRef};
use std::collections::HashMap;

/// Keyword that returns the derived help text instead of a quote.
pub const HELP_KEYWORD: &str = "指令";

/// Keyword for the broad Taiwan market, also the market-wide flow target.
pub const MARKET_KEYWORD: &str = "大盤";

/// What a keyword resolves to.
#[derive(Debug, Clone, PartialEq)]
enum AliasEntry {
    Single(SymbolRef),
    Basket(Vec<SymbolRef>),
    Help,
}

fn single(symbol: &str, market: MarketClass) -> AliasEntry {
    AliasEntry::Single(SymbolRef::new(symbol, market))
}

fn basket(members: &[(&str, MarketClass)]) -> AliasEntry {
    AliasEntry::Basket(
        members
            .iter()
            .map(|(symbol, market)| SymbolRef::new(*symbol, *market))
            .collect(),
    )
}

fn index_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Index;
    vec![
        (MARKET_KEYWORD, single("IX0001", Index)),
        ("櫃買", single("IX0043", Index)),
        ("日股", single("^N225", Index)),
        ("韓股", single("^KS11", Index)),
        (
            "亞股",
            basket(&[("IX0001", Index), ("^N225", Index), ("^KS11", Index)]),
        ),
        (
            "美股",
            basket(&[
                ("^GSPC", Index),
                ("^DJI", Index),
                ("^IXIC", Index),
                ("^SOX", Index),
            ]),
        ),
    ]
}

fn index_future_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Futures;
    vec![(
        "美股期",
        basket(&[
            ("ES=F", Futures),
            ("YM=F", Futures),
            ("NQ=F", Futures),
            ("SOX=F", Futures),
        ]),
    )]
}

fn currency_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Futures;
    vec![
        (
            "外匯",
            basket(&[
                ("TWD=X", Futures),
                ("JPYTWD=X", Futures),
                ("AUDTWD=X", Futures),
            ]),
        ),
        ("美元", single("TWD=X", Futures)),
        ("美金", single("TWD=X", Futures)),
        ("日元", single("JPYTWD=X", Futures)),
        ("日幣", single("JPYTWD=X", Futures)),
        ("澳元", single("AUDTWD=X", Futures)),
        ("澳幣", single("AUDTWD=X", Futures)),
    ]
}

fn commodity_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Futures;
    vec![
        ("黃金", single("GC=F", Futures)),
        ("白銀", single("SI=F", Futures)),
        ("貴金屬", basket(&[("GC=F", Futures), ("SI=F", Futures)])),
        ("原油", single("CL=F", Futures)),
    ]
}

fn bond_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Futures;
    let yields = basket(&[("^FVX", Futures), ("^TNX", Futures), ("^TYX", Futures)]);
    vec![("債券", yields.clone()), ("美債", yields)]
}

fn crypto_aliases() -> Vec<(&'static str, AliasEntry)> {
    use MarketClass::Futures;
    vec![
        ("比特幣", single("BTC-USD", Futures)),
        ("以太幣", single("ETH-USD", Futures)),
        (
            "虛擬幣",
            basket(&[("BTC-USD", Futures), ("ETH-USD", Futures)]),
        ),
    ]
}

/// Immutable keyword table. Built once per process, read-only afterwards.
#[derive(Debug)]
pub struct AliasTable {
    entries: HashMap<&'static str, AliasEntry>,
    /// (category label, keywords in declaration order), for the help text
    categories: Vec<(&'static str, Vec<&'static str>)>,
}

impl AliasTable {
    /// Build the table from the category sub-tables.
    ///
    /// Merge order: indices, index futures, currencies, commodities, bonds,
    /// crypto, help. Panics on a duplicate keyword across categories.
    pub fn new() -> Self {
        let categories: Vec<(&'static str, Vec<(&'static str, AliasEntry)>)> = vec![
            ("指數", index_aliases()),
            ("美股期", index_future_aliases()),
            ("外匯", currency_aliases()),
            ("原物料", commodity_aliases()),
            ("債券", bond_aliases()),
            ("虛擬幣", crypto_aliases()),
        ];

        let mut entries = HashMap::new();
        let mut labelled = Vec::new();
        for (label, aliases) in categories {
            let mut keywords = Vec::new();
            for (keyword, entry) in aliases {
                let previous = entries.insert(keyword, entry);
                assert!(previous.is_none(), "duplicate alias keyword: {keyword}");
                keywords.push(keyword);
            }
            labelled.push((label, keywords));
        }
        let previous = entries.insert(HELP_KEYWORD, AliasEntry::Help);
        assert!(previous.is_none(), "duplicate alias keyword: {HELP_KEYWORD}");

        Self {
            entries,
            categories: labelled,
        }
    }

    /// Resolve a keyword. `None` means the keyword is not an alias.
    pub fn lookup(&self, keyword: &str) -> Option<Resolution> {
        match self.entries.get(keyword)? {
            AliasEntry::Single(symbol_ref) => Some(Resolution::Single(symbol_ref.clone())),
            AliasEntry::Basket(members) => Some(Resolution::Basket(members.clone())),
            AliasEntry::Help => Some(Resolution::Text(self.help_text())),
        }
    }

    /// Derived help text: one line per category plus the fixed usage lines.
    /// Pure function of the table, identical on every call.
    pub fn help_text(&self) -> String {
        let mut lines = Vec::new();
        for (label, keywords) in &self.categories {
            let marked: Vec<String> = keywords.iter().map(|kw| format!("#{kw}")).collect();
            let line = format!("{label}: {}", marked.join(", "));
            match *label {
                "指數" => {
                    lines.push(line);
                    lines.push("個股: #股票代號 (ex: #2330), #公司名稱 (ex: #台積電)".to_string());
                    lines.push(
                        "技術分析: A大盤 A股票代號 (ex: A2330), A公司名稱 (ex: A台積電)"
                            .to_string(),
                    );
                    lines.push(
                        "三大法人買賣超: F大盤 F股票代號 (ex: F2330), F公司名稱 (ex: F台積電)"
                            .to_string(),
                    );
                }
                _ => lines.push(line),
            }
        }
        lines.join("\n")
    }

    /// Every symbol reachable through any alias, basket members included.
    pub fn all_symbols(&self) -> Vec<&str> {
        let mut symbols = Vec::new();
        for entry in self.entries.values() {
            match entry {
                AliasEntry::Single(r) => symbols.push(r.symbol.as_str()),
                AliasEntry::Basket(members) => {
                    symbols.extend(members.iter().map(|r| r.symbol.as_str()));
                }
                AliasEntry::Help => {}
            }
        }
        symbols
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::display_name_override;

    #[test]
    fn test_single_alias() {
        let table = AliasTable::new();
        assert_eq!(
            table.lookup("大盤"),
            Some(Resolution::Single(SymbolRef::new(
                "IX0001",
                MarketClass::Index
            )))
        );
        assert_eq!(
            table.lookup("黃金"),
            Some(Resolution::Single(SymbolRef::new(
                "GC=F",
                MarketClass::Futures
            )))
        );
    }

    #[test]
    fn test_basket_alias_preserves_order() {
        let table = AliasTable::new();
        let Some(Resolution::Basket(members)) = table.lookup("美股") else {
            panic!("美股 should resolve to a basket");
        };
        let symbols: Vec<&str> = members.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["^GSPC", "^DJI", "^IXIC", "^SOX"]);
    }

    #[test]
    fn test_bond_aliases_share_basket() {
        let table = AliasTable::new();
        assert_eq!(table.lookup("債券"), table.lookup("美債"));
    }

    #[test]
    fn test_unknown_keyword() {
        let table = AliasTable::new();
        assert_eq!(table.lookup("不存在"), None);
    }

    #[test]
    fn test_help_text() {
        let table = AliasTable::new();
        let help = table.help_text();
        assert!(help.contains("指數: #大盤, #櫃買, #日股, #韓股, #亞股, #美股"));
        assert!(help.contains("個股: #股票代號"));
        assert!(help.contains("虛擬幣: #比特幣, #以太幣, #虛擬幣"));
        // derived view is stable
        assert_eq!(help, table.help_text());
    }

    #[test]
    fn test_help_keyword_returns_text() {
        let table = AliasTable::new();
        match table.lookup(HELP_KEYWORD) {
            Some(Resolution::Text(text)) => assert_eq!(text, table.help_text()),
            other => panic!("expected help text, got {other:?}"),
        }
    }

    #[test]
    fn test_every_alias_symbol_has_display_name() {
        let table = AliasTable::new();
        for symbol in table.all_symbols() {
            assert!(
                display_name_override(symbol).is_some(),
                "alias symbol {symbol} has no display-name override"
            );
        }
    }
}
