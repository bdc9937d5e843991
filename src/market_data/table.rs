// =============================================================================
// OHLCV Table — boundary normalization for raw provider data
// =============================================================================
//
// Providers hand back loosely named, nullable columns.  `OhlcvTable` is the
// only place that deals with that looseness: it folds column names to the
// canonical lowercase set, drops incomplete rows, collapses duplicate dates,
// and produces a validated `PriceSeries` for the engine.
// =============================================================================

use chrono::NaiveDate;
use tracing::debug;

use crate::market_data::series::{Bar, PriceSeries};
use crate::types::AnalysisError;

/// Columns every table must provide, in canonical form.
pub const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Column-oriented raw price table keyed by session date.
#[derive(Debug, Clone, Default)]
pub struct OhlcvTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl OhlcvTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Attach a column under its raw provider name.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    /// Canonical name for a raw column: composite names such as
    /// `Close_TCS.NS` keep their leading segment, then everything is
    /// lowercased.
    pub fn normalize_name(raw: &str) -> String {
        raw.trim()
            .split('_')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    fn column(&self, canonical: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(name, _)| Self::normalize_name(name) == canonical)
            .map(|(_, values)| values.as_slice())
    }

    /// Convert into a validated series.
    ///
    /// Rows with any missing or non-finite field are skipped.  When two rows
    /// share a date the later one wins.  Ordering and price validity are then
    /// enforced by [`PriceSeries::new`].
    pub fn into_series(self) -> Result<PriceSeries, AnalysisError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingColumns(missing));
        }

        let [open, high, low, close, volume] =
            REQUIRED_COLUMNS.map(|c| self.column(c).unwrap_or_default());
        let value = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten().filter(|v| v.is_finite());

        let mut bars: Vec<Bar> = Vec::with_capacity(self.dates.len());
        let mut skipped = 0usize;

        for (i, &date) in self.dates.iter().enumerate() {
            let row = (
                value(open, i),
                value(high, i),
                value(low, i),
                value(close, i),
                value(volume, i).filter(|v| *v >= 0.0),
            );
            let (Some(o), Some(h), Some(l), Some(c), Some(v)) = row else {
                skipped += 1;
                continue;
            };

            let bar = Bar::new(date, o, h, l, c, v.round() as u64);
            match bars.last_mut() {
                Some(last) if last.date == date => *last = bar,
                _ => bars.push(bar),
            }
        }

        if skipped > 0 {
            debug!(skipped, kept = bars.len(), "dropped incomplete OHLCV rows");
        }

        PriceSeries::new(bars)
    }
}
