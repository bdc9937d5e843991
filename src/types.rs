// =============================================================================
// Shared types used across the snapshot engine
// =============================================================================

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Reasons an analysis request is rejected before any metric is computed.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The price series holds no bars.
    EmptySeries,
    /// A raw table lacks one or more of the OHLCV columns.
    MissingColumns(Vec<String>),
    /// Two consecutive bars are not in strictly increasing date order.
    UnorderedDates { previous: NaiveDate, next: NaiveDate },
    /// A bar carries an unusable price.
    InvalidBar { date: NaiveDate, reason: String },
    /// A derived metric overflowed or degenerated to a non-finite value.
    NonFiniteMetric(&'static str),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySeries => write!(f, "No price history supplied"),
            Self::MissingColumns(cols) => write!(f, "Missing columns: {}", cols.join(", ")),
            Self::UnorderedDates { previous, next } => write!(
                f,
                "Bars out of order: {next} does not follow {previous}"
            ),
            Self::InvalidBar { date, reason } => write!(f, "Invalid bar on {date}: {reason}"),
            Self::NonFiniteMetric(name) => write!(f, "Computed {name} is not a finite number"),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// A sorted price interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub lower: f64,
    pub upper: f64,
}

impl Zone {
    /// Build a zone from two bounds in any order.
    pub fn sorted(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lower, self.upper].serialize(serializer)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{:.2} – ₹{:.2}", self.lower, self.upper)
    }
}
