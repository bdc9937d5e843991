use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::AnalysisError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, date-ordered daily bars
// ---------------------------------------------------------------------------

/// Non-empty sequence of bars with strictly increasing dates and positive,
/// finite prices.  Construction is the only validation point; every consumer
/// downstream may rely on these invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate `bars` and wrap them.
    pub fn new(bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(AnalysisError::InvalidBar {
                    date: bar.date,
                    reason: "prices must be positive and finite".to_string(),
                });
            }
            if index > 0 && bars[index - 1].date >= bar.date {
                return Err(AnalysisError::UnorderedDates {
                    previous: bars[index - 1].date,
                    next: bar.date,
                });
            }
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// The most recent bar.  Always present.
    pub fn latest(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    /// The last `count` bars (or all of them when fewer exist), oldest first.
    pub fn tail(&self, count: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(count);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Aggregate daily bars into calendar-week bars (Monday through Sunday).
    ///
    /// Each weekly bar carries the first open, highest high, lowest low, last
    /// close and summed volume of its week, dated by the week's last session.
    pub fn weekly(&self) -> Vec<Bar> {
        let mut weeks: Vec<Bar> = Vec::new();
        let mut current_week: Option<(i32, u32)> = None;

        for bar in &self.bars {
            let iso = bar.date.iso_week();
            let key = (iso.year(), iso.week());

            match weeks.last_mut() {
                Some(week) if current_week == Some(key) => {
                    week.high = week.high.max(bar.high);
                    week.low = week.low.min(bar.low);
                    week.close = bar.close;
                    week.volume = week.volume.saturating_add(bar.volume);
                    week.date = bar.date;
                }
                _ => {
                    weeks.push(*bar);
                    current_week = Some(key);
                }
            }
        }

        weeks
    }
}
