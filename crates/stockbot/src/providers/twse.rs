//! TWSE / TPEx / MOPS data access
//!
//! One client covers the exchange-side lookups: domestic display names (with
//! a TPEx fallback for the OTC board), company-name to symbol resolution via
//! the MOPS autocomplete endpoint, and the 三大法人 flow tables (per symbol
//! and market-wide). All calls share one rate limiter; the exchange
//! throttles chatty clients.

use crate::cache::NameCache;
use crate::config::BotConfig;
use crate::error::Result;
use crate::flow::{InstitutionalFlow, MarketFlowRow, MarketFlowSummary};
use crate::providers::{CompanyResolver, FlowSource};
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate, Weekday};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::header;
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

const TWSE_BASE: &str = "https://www.twse.com.tw";
const TPEX_BASE: &str = "https://info.tpex.org.tw";
const MOPS_AUTOCOMPLETE_URL: &str = "https://mopsov.twse.com.tw/mops/web/ajax_autoComplete";

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

static AUTOCOMPLETE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id="autoDiv-1"[^>]*?value="([^"]*)""#).expect("static pattern")
});

/// Market-wide flow categories in display order.
const MARKET_FLOW_ORDER: [&str; 5] = ["外資及陸資", "投信", "自營商(自行買賣)", "自營商(避險)", "合計"];

/// TWSE-side data client.
pub struct TwseClient {
    http: reqwest::Client,
    limiter: SharedRateLimiter,
    names: NameCache,
    timeout: Duration,
}

impl TwseClient {
    pub fn new(config: &BotConfig) -> Self {
        let per_minute = NonZeroU32::new(config.twse_rate_limit).unwrap_or(NonZeroU32::MIN);
        Self {
            http: reqwest::Client::new(),
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            names: NameCache::new(config.name_cache_ttl),
            timeout: config.request_timeout,
        }
    }

    /// Chinese display name for a domestic symbol, cached for the TTL from
    /// the config. `otc` selects the TPEx endpoints for OTC-board symbols.
    pub async fn stock_name(&self, symbol: &str, otc: bool) -> Result<Option<String>> {
        if let Some(name) = self.names.get(symbol).await {
            return Ok(Some(name));
        }

        let name = if otc {
            self.name_from_tpex(symbol).await?
        } else {
            self.name_from_codequery(symbol).await?
        };

        if let Some(name) = &name {
            self.names.insert(symbol.to_string(), name.clone()).await;
        }
        Ok(name)
    }

    async fn name_from_codequery(&self, symbol: &str) -> Result<Option<String>> {
        self.limiter.until_ready().await;
        let url = format!("{TWSE_BASE}/rwd/zh/company/codeQuery");
        let response = self
            .http
            .get(&url)
            .query(&[("STK_NO", symbol)])
            .header(header::USER_AGENT, DESKTOP_UA)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        let Some(rows) = data["data"].as_array() else {
            return Ok(None);
        };
        for row in rows {
            let Some(cells) = row.as_array() else { continue };
            if cells.len() >= 2 && cells[0].as_str() == Some(symbol) {
                return Ok(cells[1].as_str().map(str::to_string));
            }
        }
        Ok(None)
    }

    async fn name_from_tpex(&self, symbol: &str) -> Result<Option<String>> {
        self.limiter.until_ready().await;
        // ETFs carry 5+ character codes and live on a different endpoint
        let url = if symbol.len() > 4 {
            format!("{TPEX_BASE}/api/etfProduct?query={symbol}")
        } else {
            format!("{TPEX_BASE}/api/stkInfo?query={symbol}")
        };
        let response = self.http.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        // stocks nest the fields under "info", ETFs sit at the top level
        let name = data["info"]["shortName"]
            .as_str()
            .or_else(|| data["shortName"].as_str());
        Ok(name.map(str::to_string))
    }

    /// Resolve a company name to its ticker via the MOPS autocomplete
    /// endpoint. The response is HTML; the first suggestion's `value`
    /// attribute carries the symbol.
    pub async fn resolve_company(&self, company_name: &str) -> Result<Option<String>> {
        self.limiter.until_ready().await;
        let form: [(&str, &str); 13] = [
            ("encodeURIComponent", "1"),
            ("step", "1"),
            ("firstin", "ture"), // sic, the endpoint expects this literal
            ("off", "1"),
            ("keyword4", ""),
            ("code1", ""),
            ("TYPEK2", ""),
            ("checkbtn", ""),
            ("queryName", "co_id"),
            ("inpuType", "co_id"),
            ("TYPEK", "all"),
            ("co_id", company_name),
            ("sstep", "1"),
        ];
        let response = self
            .http
            .post(MOPS_AUTOCOMPLETE_URL)
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body = response.text().await?;
        let symbol = AUTOCOMPLETE_VALUE
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().split_whitespace().next())
            .map(str::to_string);
        if symbol.is_none() {
            tracing::debug!(company_name, "no autocomplete match from MOPS");
        }
        Ok(symbol)
    }

    async fn fetch_fund_table(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<serde_json::Value>> {
        self.limiter.until_ready().await;
        let url = format!("{TWSE_BASE}{path}");
        let response = self
            .http
            .get(&url)
            .query(params)
            .header(header::USER_AGENT, DESKTOP_UA)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let data: serde_json::Value = response.json().await?;
        // non-trading days answer stat != OK: no data, not a failure
        if data["stat"].as_str() != Some("OK") {
            tracing::debug!(path, stat = %data["stat"], "fund table has no data");
            return Ok(None);
        }
        Ok(Some(data))
    }
}

#[async_trait]
impl CompanyResolver for TwseClient {
    async fn resolve(&self, name: &str) -> Result<Option<String>> {
        self.resolve_company(name).await
    }
}

#[async_trait]
impl FlowSource for TwseClient {
    async fn market_flow(&self) -> Result<Option<MarketFlowSummary>> {
        let date = effective_date(Local::now().date_naive());
        let Some(data) = self
            .fetch_fund_table(
                "/rwd/zh/fund/BFI82U",
                &[
                    ("dayDate", date.format("%Y%m%d").to_string()),
                    ("type", "day".to_string()),
                    ("response", "json".to_string()),
                ],
            )
            .await?
        else {
            return Ok(None);
        };

        let Some(rows) = data["data"].as_array() else {
            return Ok(None);
        };

        // reorder the feed rows into the fixed display order
        let mut ordered = Vec::new();
        for wanted in MARKET_FLOW_ORDER {
            for row in rows {
                let Some(cells) = row.as_array() else { continue };
                if cells.len() < 4 {
                    continue;
                }
                let label = cells[0].as_str().unwrap_or("").trim();
                if label.starts_with(wanted) {
                    let text =
                        |i: usize| cells[i].as_str().unwrap_or("0").trim().to_string();
                    ordered.push(MarketFlowRow {
                        label: wanted.to_string(),
                        buy: text(1),
                        sell: text(2),
                        net: text(3),
                    });
                    break;
                }
            }
        }
        if ordered.is_empty() {
            return Ok(None);
        }

        Ok(Some(MarketFlowSummary {
            date,
            rows: ordered,
        }))
    }

    async fn symbol_flow(&self, symbol: &str) -> Result<Option<InstitutionalFlow>> {
        let date = effective_date(Local::now().date_naive());
        let Some(data) = self
            .fetch_fund_table(
                "/rwd/zh/fund/T86",
                &[
                    ("date", date.format("%Y%m%d").to_string()),
                    ("selectType", "ALLBUT0999".to_string()),
                    ("response", "json".to_string()),
                ],
            )
            .await?
        else {
            return Ok(None);
        };

        let Some(rows) = data["data"].as_array() else {
            return Ok(None);
        };
        for row in rows {
            let Some(cells) = row.as_array() else { continue };
            if cells.first().and_then(|v| v.as_str()).map(str::trim) != Some(symbol) {
                continue;
            }
            return Ok(parse_t86_row(date, cells));
        }
        Ok(None)
    }
}

/// T86 column layout (selectType=ALLBUT0999): 0 code, 1 name, 2-4 foreign
/// buy/sell/net, 5-7 foreign dealer, 8-10 trust, 11 dealer net total,
/// 12-14 dealer self, 15-17 dealer hedge, 18 total net.
fn parse_t86_row(date: NaiveDate, cells: &[serde_json::Value]) -> Option<InstitutionalFlow> {
    if cells.len() < 19 {
        return None;
    }
    let text = |i: usize| cells[i].as_str().unwrap_or("0").trim().to_string();
    Some(InstitutionalFlow {
        date,
        foreign_buy: text(2),
        foreign_sell: text(3),
        foreign_net: text(4),
        trust_buy: text(8),
        trust_sell: text(9),
        trust_net: text(10),
        dealer_self_buy: text(12),
        dealer_self_sell: text(13),
        dealer_self_net: text(14),
        dealer_hedge_buy: text(15),
        dealer_hedge_sell: text(16),
        dealer_hedge_net: text(17),
        total_net: text(18),
    })
}

/// Flow tables publish per trading day; weekends roll back to Friday.
pub fn effective_date(today: NaiveDate) -> NaiveDate {
    match today.weekday() {
        Weekday::Sat => today - chrono::Days::new(1),
        Weekday::Sun => today - chrono::Days::new(2),
        _ => today,
    }
}
