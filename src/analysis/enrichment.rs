// =============================================================================
// Optional Enrichments — option-chain open interest, corporate calendar
// =============================================================================
//
// Enrichments are fetched outside the engine and handed in as plain values.
// Each one may be absent; absence shows up as null (option chain) or "N/A"
// (calendar) in the result and never fails the analysis.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::round2;

/// Placeholder text for calendar fields with no data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Open interest at a single strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionStrike {
    pub strike: f64,
    pub call_open_interest: u64,
    pub put_open_interest: u64,
}

impl OptionStrike {
    fn total_open_interest(&self) -> u64 {
        self.call_open_interest.saturating_add(self.put_open_interest)
    }
}

/// One expiry-agnostic snapshot of the option chain, one row per strike row
/// as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub strikes: Vec<OptionStrike>,
}

/// Headline figures extracted from an option chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionChainSummary {
    pub top_call_strike: f64,
    pub top_call_open_interest: u64,
    pub top_put_strike: f64,
    pub top_put_open_interest: u64,
    /// Strike carrying the largest combined call + put open interest.
    pub max_pain_strike: f64,
}

impl OptionChainSummary {
    /// Summarise `chain`; `None` when it holds no usable strike.
    ///
    /// Ties resolve to the first row in chain order.
    pub fn from_chain(chain: &OptionChain) -> Option<Self> {
        let rows: Vec<&OptionStrike> = chain
            .strikes
            .iter()
            .filter(|row| row.strike.is_finite())
            .collect();

        let top_call = first_max_by_key(&rows, |row| row.call_open_interest)?;
        let top_put = first_max_by_key(&rows, |row| row.put_open_interest)?;
        let max_pain = first_max_by_key(&rows, OptionStrike::total_open_interest)?;

        Some(Self {
            top_call_strike: round2(top_call.strike),
            top_call_open_interest: top_call.call_open_interest,
            top_put_strike: round2(top_put.strike),
            top_put_open_interest: top_put.put_open_interest,
            max_pain_strike: round2(max_pain.strike),
        })
    }
}

// `Iterator::max_by_key` keeps the last maximum; the first one is wanted here.
fn first_max_by_key<'a>(
    rows: &[&'a OptionStrike],
    key: impl Fn(&OptionStrike) -> u64,
) -> Option<&'a OptionStrike> {
    rows.iter().copied().fold(None, |best, row| match best {
        Some(current) if key(current) >= key(row) => Some(current),
        _ => Some(row),
    })
}

/// Upcoming corporate events for the symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateCalendar {
    pub earnings_date: Option<NaiveDate>,
    pub ex_dividend_date: Option<NaiveDate>,
    pub shareholding_changes: Option<String>,
}

impl CorporateCalendar {
    /// Earnings date as `YYYY-MM-DD`, or `"N/A"`.
    pub fn earnings_label(&self) -> String {
        date_label(self.earnings_date)
    }

    /// Ex-dividend date as `YYYY-MM-DD`, or `"N/A"`.
    pub fn ex_dividend_label(&self) -> String {
        date_label(self.ex_dividend_date)
    }

    pub fn shareholding_label(&self) -> String {
        self.shareholding_changes
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Everything the analyzer may receive beyond the price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichments {
    pub option_chain: Option<OptionChain>,
    pub calendar: Option<CorporateCalendar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike(strike: f64, call: u64, put: u64) -> OptionStrike {
        OptionStrike {
            strike,
            call_open_interest: call,
            put_open_interest: put,
        }
    }

    #[test]
    fn summary_picks_extremes() {
        let chain = OptionChain {
            strikes: vec![
                strike(3900.0, 1_200, 9_000),
                strike(4000.0, 5_000, 6_000),
                strike(4100.0, 8_000, 500),
            ],
        };
        let summary = OptionChainSummary::from_chain(&chain).unwrap();
        assert_eq!(summary.top_call_strike, 4100.0);
        assert_eq!(summary.top_call_open_interest, 8_000);
        assert_eq!(summary.top_put_strike, 3900.0);
        assert_eq!(summary.top_put_open_interest, 9_000);
        assert_eq!(summary.max_pain_strike, 4000.0);
    }

    #[test]
    fn ties_resolve_to_first_row() {
        let chain = OptionChain {
            strikes: vec![strike(100.0, 10, 10), strike(110.0, 10, 10)],
        };
        let summary = OptionChainSummary::from_chain(&chain).unwrap();
        assert_eq!(summary.top_call_strike, 100.0);
        assert_eq!(summary.top_put_strike, 100.0);
        assert_eq!(summary.max_pain_strike, 100.0);
    }

    #[test]
    fn empty_chain_has_no_summary() {
        assert!(OptionChainSummary::from_chain(&OptionChain::default()).is_none());
        let bad = OptionChain {
            strikes: vec![strike(f64::NAN, 1, 1)],
        };
        assert!(OptionChainSummary::from_chain(&bad).is_none());
    }

    #[test]
    fn calendar_labels() {
        let calendar = CorporateCalendar {
            earnings_date: NaiveDate::from_ymd_opt(2025, 5, 10),
            ex_dividend_date: None,
            shareholding_changes: None,
        };
        assert_eq!(calendar.earnings_label(), "2025-05-10");
        assert_eq!(calendar.ex_dividend_label(), "N/A");
        assert_eq!(calendar.shareholding_label(), "N/A");
    }
}
