// =============================================================================
// Snapshot Service — fetch, enrich, analyze
// =============================================================================
//
// One request = one symbol:
//   1. Daily history (required) and both enrichments (optional) are fetched
//      concurrently.
//   2. A failed history fetch fails the request.  A failed or disabled
//      enrichment is logged and becomes `None`.
//   3. The analyzer runs synchronously on the collected data.
// =============================================================================

use anyhow::{Context, Result};
use futures_util::future;
use tracing::{info, instrument, warn};

use crate::analysis::{analyze_table, AnalysisReport, Enrichments};
use crate::market_data::nse::NseClient;
use crate::market_data::yahoo::YahooClient;
use crate::runtime_config::RuntimeConfig;

pub struct SnapshotService {
    yahoo: YahooClient,
    nse: NseClient,
    enable_option_chain: bool,
    enable_corporate_calendar: bool,
}

impl SnapshotService {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            yahoo: YahooClient::new(config)?,
            nse: NseClient::new(config)?,
            enable_option_chain: config.enable_option_chain,
            enable_corporate_calendar: config.enable_corporate_calendar,
        })
    }

    /// Build the technical snapshot for `symbol`.
    ///
    /// `Err` only when price history could not be retrieved; every analysis
    /// outcome, including validation failures, is an `Ok(AnalysisReport)`.
    #[instrument(skip(self), name = "snapshot::build")]
    pub async fn build(&self, symbol: &str) -> Result<AnalysisReport> {
        let (history, enrichments) =
            future::join(self.yahoo.daily_history(symbol), self.enrichments(symbol)).await;
        let table = history.with_context(|| format!("failed to fetch price history for {symbol}"))?;

        let report = analyze_table(table, &enrichments);
        match report.error() {
            Some(error) => warn!(symbol, error, "analysis rejected input"),
            None => info!(
                symbol,
                option_chain = enrichments.option_chain.is_some(),
                calendar = enrichments.calendar.is_some(),
                "snapshot built"
            ),
        }
        Ok(report)
    }

    async fn enrichments(&self, symbol: &str) -> Enrichments {
        let option_chain = async {
            if self.enable_option_chain {
                Some(self.nse.option_chain(symbol).await)
            } else {
                None
            }
        };
        let calendar = async {
            if self.enable_corporate_calendar {
                Some(self.nse.corporate_calendar(symbol).await)
            } else {
                None
            }
        };

        let (option_chain, calendar) = future::join(option_chain, calendar).await;
        Enrichments {
            option_chain: settle(symbol, "option_chain", option_chain),
            calendar: settle(symbol, "corporate_calendar", calendar),
        }
    }
}

/// Collapse an optional fetch outcome into an optional value, logging
/// failures.
fn settle<T>(symbol: &str, feed: &str, outcome: Option<Result<T>>) -> Option<T> {
    match outcome? {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(symbol, feed, error = %e, "enrichment unavailable, continuing without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_keeps_successes() {
        assert_eq!(settle("TCS", "feed", Some(Ok(5))), Some(5));
    }

    #[test]
    fn settle_drops_failures_and_disabled_feeds() {
        let failed: Option<Result<u32>> = Some(Err(anyhow::anyhow!("503 from upstream")));
        assert_eq!(settle("TCS", "feed", failed), None);
        assert_eq!(settle::<u32>("TCS", "feed", None), None);
    }

    #[tokio::test]
    async fn unreachable_history_is_an_error() {
        let config = RuntimeConfig {
            yahoo_base_url: "http://127.0.0.1:9".to_string(),
            enable_option_chain: false,
            enable_corporate_calendar: false,
            http_timeout_secs: 2,
            ..RuntimeConfig::default()
        };
        let service = SnapshotService::new(&config).unwrap();
        let err = service.build("TCS").await.unwrap_err();
        assert!(err.to_string().contains("failed to fetch price history for TCS"));
    }

    #[tokio::test]
    async fn disabled_enrichments_are_none() {
        let config = RuntimeConfig {
            nse_base_url: "http://127.0.0.1:9".to_string(),
            enable_option_chain: false,
            enable_corporate_calendar: false,
            ..RuntimeConfig::default()
        };
        let service = SnapshotService::new(&config).unwrap();
        assert_eq!(service.enrichments("TCS").await, Enrichments::default());
    }

    #[tokio::test]
    async fn failed_enrichments_are_none() {
        let config = RuntimeConfig {
            nse_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout_secs: 2,
            ..RuntimeConfig::default()
        };
        let service = SnapshotService::new(&config).unwrap();
        assert_eq!(service.enrichments("TCS").await, Enrichments::default());
    }
}
