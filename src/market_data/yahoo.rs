// =============================================================================
// Yahoo Chart Client — daily OHLCV history
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={range}&interval=1d
//
// The chart payload is column-oriented: one `timestamp` array plus parallel
// `open/high/low/close/volume` arrays under `indicators.quote[0]`, any of
// which may hold nulls.  Timestamps are session opens in UTC; adding the
// exchange `gmtoffset` before taking the date yields the local trading day.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::market_data::table::OhlcvTable;
use crate::runtime_config::RuntimeConfig;

/// Yahoo chart API client for one exchange.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    exchange_suffix: String,
    history_range: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build Yahoo HTTP client")?;

        debug!(base_url = %config.yahoo_base_url, "YahooClient initialised");

        Ok(Self {
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
            exchange_suffix: config.exchange_suffix.clone(),
            history_range: config.history_range.clone(),
            client,
        })
    }

    /// Ticker as Yahoo expects it: bare symbols get the exchange suffix,
    /// already-qualified ones (`TCS.NS`, `INFY.BO`) pass through.
    pub fn qualified_symbol(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        if symbol.contains('.') || self.exchange_suffix.is_empty() {
            symbol
        } else {
            format!("{symbol}{}", self.exchange_suffix)
        }
    }

    /// Fetch the configured range of daily bars for `symbol`.
    #[instrument(skip(self), name = "yahoo::daily_history")]
    pub async fn daily_history(&self, symbol: &str) -> Result<OhlcvTable> {
        let ticker = self.qualified_symbol(symbol);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", self.history_range.as_str()), ("interval", "1d")])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        if !status.is_success() {
            anyhow::bail!("Yahoo chart for {} returned {}: {}", ticker, status, body);
        }

        let table = parse_chart(&body).with_context(|| format!("invalid chart payload for {ticker}"))?;
        debug!(ticker = %ticker, rows = table.row_count(), "daily history fetched");
        Ok(table)
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parse a chart response body into a raw OHLCV table.
///
/// Nulls are preserved; the table drops incomplete rows when it is turned
/// into a series.
pub fn parse_chart(body: &str) -> Result<OhlcvTable> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).context("chart response is not valid JSON")?;

    if let Some(err) = envelope.chart.error {
        anyhow::bail!("chart error {}: {}", err.code, err.description);
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .context("chart response has no result")?;

    let dates = result
        .timestamp
        .iter()
        .map(|&ts| session_date(ts, result.meta.gmtoffset))
        .collect::<Result<Vec<NaiveDate>>>()?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .context("chart response has no quote block")?;

    Ok(OhlcvTable::new(dates)
        .with_column("Open", quote.open)
        .with_column("High", quote.high)
        .with_column("Low", quote.low)
        .with_column("Close", quote.close)
        .with_column("Volume", quote.volume))
}

fn session_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(timestamp.saturating_add(gmtoffset), 0)
        .map(|dt| dt.date_naive())
        .with_context(|| format!("timestamp {timestamp} out of range"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "TCS.NS", "gmtoffset": 19800 },
                "timestamp": [1717386300, 1717472700, 1717559100],
                "indicators": {
                    "quote": [{
                        "open":   [3800.0, 3820.5, null],
                        "high":   [3850.0, 3860.0, 3900.0],
                        "low":    [3790.0, 3800.0, 3850.0],
                        "close":  [3840.0, 3810.0, 3890.0],
                        "volume": [1200000, 980000, 1500000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn client(suffix: &str) -> YahooClient {
        let config = RuntimeConfig {
            exchange_suffix: suffix.to_string(),
            ..RuntimeConfig::default()
        };
        YahooClient::new(&config).unwrap()
    }

    #[test]
    fn parses_chart_into_series() {
        let series = parse_chart(CHART).unwrap().into_series().unwrap();
        // Third row has a null open and is dropped.
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(series.latest().close, 3810.0);
        assert_eq!(series.latest().volume, 980_000);
    }

    #[test]
    fn gmt_offset_moves_late_utc_sessions_forward() {
        // 2024-06-02T22:00:00Z is already 2024-06-03 in IST.
        assert_eq!(
            session_date(1717365600, 19800).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
        assert_eq!(
            session_date(1717365600, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
    }

    #[test]
    fn chart_error_is_reported() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn empty_result_is_an_error() {
        assert!(parse_chart(r#"{"chart":{"result":[],"error":null}}"#).is_err());
        assert!(parse_chart("not json").is_err());
    }

    #[test]
    fn qualified_symbol_appends_suffix_once() {
        let yahoo = client(".NS");
        assert_eq!(yahoo.qualified_symbol("tcs"), "TCS.NS");
        assert_eq!(yahoo.qualified_symbol("TCS.NS"), "TCS.NS");
        assert_eq!(yahoo.qualified_symbol("INFY.BO"), "INFY.BO");
        assert_eq!(client("").qualified_symbol("AAPL"), "AAPL");
    }
}
