// =============================================================================
// NSE Client — option-chain open interest and corporate announcements
// =============================================================================
//
// The NSE JSON API rejects cold requests: a browser-like session must first
// load the home page to collect cookies, then the API answers with the same
// cookie jar and a matching Referer.
//
// Both feeds are optional enrichments.  Callers treat any error here as
// "data unavailable", never as a failed analysis.
// =============================================================================

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::analysis::{CorporateCalendar, OptionChain, OptionStrike};
use crate::runtime_config::RuntimeConfig;

const OPTION_CHAIN_PATH: &str = "/api/option-chain-equities";
const ANNOUNCEMENTS_PATH: &str = "/api/corporate-announcements";

/// NSE session-aware API client.
#[derive(Clone)]
pub struct NseClient {
    base_url: String,
    client: reqwest::Client,
}

impl NseClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.http_timeout())
            .build()
            .context("failed to build NSE HTTP client")?;

        Ok(Self {
            base_url: config.nse_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Exchange ticker without any provider suffix (`TCS.NS` -> `TCS`).
    pub fn exchange_symbol(symbol: &str) -> String {
        symbol
            .trim()
            .split('.')
            .next()
            .unwrap_or_default()
            .to_uppercase()
    }

    /// Open interest per strike across all listed expiries.
    #[instrument(skip(self), name = "nse::option_chain")]
    pub async fn option_chain(&self, symbol: &str) -> Result<OptionChain> {
        let payload: OptionChainPayload = self.get_json(OPTION_CHAIN_PATH, symbol).await?;
        let chain = payload.into_chain();
        debug!(symbol, strikes = chain.strikes.len(), "option chain fetched");
        Ok(chain)
    }

    /// Next earnings and ex-dividend dates from the announcement feed.
    #[instrument(skip(self), name = "nse::corporate_calendar")]
    pub async fn corporate_calendar(&self, symbol: &str) -> Result<CorporateCalendar> {
        let payload: AnnouncementsPayload = self.get_json(ANNOUNCEMENTS_PATH, symbol).await?;
        let calendar = calendar_from_announcements(payload.into_items());
        debug!(
            symbol,
            earnings = %calendar.earnings_label(),
            ex_dividend = %calendar.ex_dividend_label(),
            "corporate calendar fetched"
        );
        Ok(calendar)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, symbol: &str) -> Result<T> {
        let symbol = Self::exchange_symbol(symbol);
        let referer = format!("{}/get-quotes/equity?symbol={}", self.base_url, symbol);

        // Session warm-up: the home page sets the cookies the API checks.
        self.client
            .get(&self.base_url)
            .header(REFERER, &referer)
            .send()
            .await
            .context("NSE session warm-up failed")?;

        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .header(REFERER, &referer)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read {path} response body"))?;

        if !status.is_success() {
            anyhow::bail!("NSE GET {} returned {}: {}", path, status, body);
        }

        serde_json::from_str(&body).with_context(|| format!("failed to parse {path} response"))
    }
}

// =============================================================================
// Option chain payload
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct OptionChainPayload {
    #[serde(default)]
    records: OptionRecords,
}

#[derive(Debug, Default, Deserialize)]
struct OptionRecords {
    #[serde(default)]
    data: Vec<OptionRow>,
}

#[derive(Debug, Deserialize)]
struct OptionRow {
    #[serde(rename = "strikePrice")]
    strike_price: Option<f64>,
    #[serde(rename = "CE")]
    call: Option<OptionLeg>,
    #[serde(rename = "PE")]
    put: Option<OptionLeg>,
}

#[derive(Debug, Deserialize)]
struct OptionLeg {
    #[serde(rename = "openInterest", default)]
    open_interest: Option<f64>,
}

impl OptionLeg {
    fn interest(leg: Option<&OptionLeg>) -> u64 {
        leg.and_then(|l| l.open_interest)
            .filter(|oi| oi.is_finite() && *oi > 0.0)
            .map(|oi| oi.round() as u64)
            .unwrap_or(0)
    }
}

impl OptionChainPayload {
    fn into_chain(self) -> OptionChain {
        let strikes = self
            .records
            .data
            .into_iter()
            .filter_map(|row| {
                Some(OptionStrike {
                    strike: row.strike_price?,
                    call_open_interest: OptionLeg::interest(row.call.as_ref()),
                    put_open_interest: OptionLeg::interest(row.put.as_ref()),
                })
            })
            .collect();
        OptionChain { strikes }
    }
}

// =============================================================================
// Announcement payload
// =============================================================================

/// The feed has shipped as a bare list, as `{data: [...]}` and as
/// `{records: {data: [...]}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnnouncementsPayload {
    List(Vec<Announcement>),
    Records { records: AnnouncementRecords },
    Data { data: Vec<Announcement> },
}

#[derive(Debug, Deserialize)]
struct AnnouncementRecords {
    #[serde(default)]
    data: Vec<Announcement>,
}

#[derive(Debug, Clone, Deserialize)]
struct Announcement {
    #[serde(default, alias = "desc")]
    title: String,
    #[serde(rename = "announcementDate", alias = "an_dt", default)]
    announcement_date: String,
}

impl AnnouncementsPayload {
    fn into_items(self) -> Vec<Announcement> {
        match self {
            Self::List(items) | Self::Data { data: items } => items,
            Self::Records { records } => records.data,
        }
    }
}

/// `10-May-2025`, optionally followed by a time of day.
fn announcement_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%d-%b-%Y").ok()
}

/// First "results" announcement is the earnings date, first "ex-dividend"
/// announcement the ex-dividend date.  Undated items are skipped.
fn calendar_from_announcements(items: Vec<Announcement>) -> CorporateCalendar {
    let mut calendar = CorporateCalendar::default();

    for item in items {
        let Some(date) = announcement_date(&item.announcement_date) else {
            continue;
        };
        let title = item.title.to_lowercase();

        if calendar.earnings_date.is_none() && title.contains("results") {
            calendar.earnings_date = Some(date);
        }
        if calendar.ex_dividend_date.is_none() && title.contains("ex-dividend") {
            calendar.ex_dividend_date = Some(date);
        }
    }

    calendar
}

// =============================================================================
// Tests
// =============================================================================
