// =============================================================================
// Technical Analyzer — assembles one snapshot from a validated price series
// =============================================================================
//
// Pipeline (all synchronous, no shared state):
//   1. Validate the input into a `PriceSeries` (or start from one).
//   2. Compute indicators, classifiers and levels independently.
//   3. Fold in the optional enrichments.
//   4. Build the `TechnicalSnapshot` in a single aggregate expression.
//
// Short history never fails the analysis: each metric degrades to its own
// sentinel.  Only invalid input or a non-finite derived value produces an
// `{ "error": ... }` report.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::analysis::crossover::{self, CrossSignal};
use crate::analysis::enrichment::{Enrichments, OptionChainSummary};
use crate::analysis::levels::{self, BREAKOUT_BARS, FIFTY_TWO_WEEK_BARS, ZONE_BARS};
use crate::analysis::volume::{self, VolumeSignal};
use crate::indicators::ema::{calculate_ema, latest_ema, SNAPSHOT_EMA_PERIODS};
use crate::indicators::round2;
use crate::indicators::rsi::{latest_rsi, DEFAULT_RSI_PERIOD};
use crate::market_data::table::OhlcvTable;
use crate::market_data::PriceSeries;
use crate::patterns::{candlestick, structure, CandlePattern, PriceStructure};
use crate::types::{AnalysisError, Zone};

/// Bars handed to the structure classifier, daily and weekly.
const STRUCTURE_BARS: usize = 5;

/// Flat set of derived metrics.  Field names are the public contract and
/// only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    pub cmp: f64,
    pub rsi: f64,
    pub ema_21: f64,
    pub ema_50: f64,
    pub ema_200: f64,
    pub dist21: f64,
    pub dist50: f64,
    pub dist200: f64,
    pub fifty_two_wk_high: f64,
    pub fifty_two_wk_low: f64,
    pub percentile_52w: Option<f64>,
    pub support_zone: Zone,
    pub resistance_zone: Zone,
    pub daily_pattern: CandlePattern,
    pub weekly_pattern: CandlePattern,
    pub daily_structure: PriceStructure,
    pub weekly_structure: PriceStructure,
    /// Lakhs.
    pub volume_today: f64,
    /// Lakhs.
    pub volume_avg: Option<f64>,
    pub volume_surge_pct: Option<f64>,
    pub volume_signal: VolumeSignal,
    pub breakout_level: f64,
    /// Lakhs.
    pub breakout_volume: Option<f64>,
    pub ema_21_50_cross: CrossSignal,
    pub ema_50_200_cross: CrossSignal,
    pub top_call_oi_strike: Option<f64>,
    pub top_call_oi_interest: Option<u64>,
    pub top_put_oi_strike: Option<f64>,
    pub top_put_oi_interest: Option<u64>,
    pub max_pain_strike: Option<f64>,
    pub earnings_date: String,
    pub ex_dividend_date: String,
    pub shareholding_changes: String,
}

impl TechnicalSnapshot {
    /// `true` when CMP trades above the 200-day EMA.
    pub fn above_long_trend(&self) -> bool {
        self.cmp > self.ema_200
    }
}

/// Outcome of one analysis request: either the full snapshot or a single
/// error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Snapshot(Box<TechnicalSnapshot>),
    Failed { error: String },
}

impl AnalysisReport {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: reason.to_string(),
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<&TechnicalSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot.as_ref()),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Snapshot(_) => None,
            Self::Failed { error } => Some(error.as_str()),
        }
    }
}

impl From<Result<TechnicalSnapshot, AnalysisError>> for AnalysisReport {
    fn from(result: Result<TechnicalSnapshot, AnalysisError>) -> Self {
        match result {
            Ok(snapshot) => Self::Snapshot(Box::new(snapshot)),
            Err(e) => Self::failed(e),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Analyze an already validated series.
pub fn analyze(series: &PriceSeries, enrichments: &Enrichments) -> AnalysisReport {
    build_snapshot(series, enrichments).into()
}

/// Validate raw bars, then analyze them.
#[cfg(test)]
pub fn analyze_bars(bars: Vec<crate::market_data::Bar>, enrichments: &Enrichments) -> AnalysisReport {
    match PriceSeries::new(bars) {
        Ok(series) => analyze(&series, enrichments),
        Err(e) => AnalysisReport::failed(e),
    }
}

/// Normalize a raw column table, then analyze it.
pub fn analyze_table(table: OhlcvTable, enrichments: &Enrichments) -> AnalysisReport {
    match table.into_series() {
        Ok(series) => analyze(&series, enrichments),
        Err(e) => AnalysisReport::failed(e),
    }
}

// =============================================================================
// Snapshot assembly
// =============================================================================

fn build_snapshot(
    series: &PriceSeries,
    enrichments: &Enrichments,
) -> Result<TechnicalSnapshot, AnalysisError> {
    let closes = series.closes();
    let cmp = round2(series.latest().close);

    // ---- indicators ------------------------------------------------------
    let rsi = latest_rsi(&closes, DEFAULT_RSI_PERIOD);
    let [fast, medium, slow] = SNAPSHOT_EMA_PERIODS;
    let ema_fast = calculate_ema(&closes, fast);
    let ema_medium = calculate_ema(&closes, medium);
    let ema_slow = calculate_ema(&closes, slow);
    let latest = |values: &[f64]| latest_ema(values).unwrap_or(cmp);
    let (ema_21, ema_50, ema_200) = (latest(&ema_fast), latest(&ema_medium), latest(&ema_slow));

    // ---- levels ----------------------------------------------------------
    let year = levels::year_range(series.tail(FIFTY_TWO_WEEK_BARS), cmp);
    let (support_zone, resistance_zone) = levels::support_resistance(series.tail(ZONE_BARS), cmp);
    let breakout_level = levels::breakout_level(series.tail(BREAKOUT_BARS));

    // ---- price action ----------------------------------------------------
    let weekly = series.weekly();
    let daily_pattern = candlestick::classify(series.bars());
    let weekly_pattern = candlestick::classify(&weekly);
    let daily_structure = structure::classify(series.tail(STRUCTURE_BARS));
    let weekly_structure = if weekly.len() < STRUCTURE_BARS {
        PriceStructure::NotEnoughData
    } else {
        structure::classify(&weekly[weekly.len() - STRUCTURE_BARS..])
    };

    // ---- volume ----------------------------------------------------------
    let volume = volume::profile(series.bars());

    // ---- enrichments -----------------------------------------------------
    let options = enrichments
        .option_chain
        .as_ref()
        .and_then(OptionChainSummary::from_chain);
    let calendar = enrichments.calendar.clone().unwrap_or_default();

    let dist21 = levels::ema_distance_pct(ema_21, cmp);
    let dist50 = levels::ema_distance_pct(ema_50, cmp);
    let dist200 = levels::ema_distance_pct(ema_200, cmp);

    ensure_finite(&[
        ("cmp", cmp),
        ("rsi", rsi),
        ("ema_21", ema_21),
        ("ema_50", ema_50),
        ("ema_200", ema_200),
        ("dist21", dist21),
        ("dist50", dist50),
        ("dist200", dist200),
        ("fifty_two_wk_high", year.high),
        ("fifty_two_wk_low", year.low),
        ("support_zone", support_zone.lower + support_zone.upper),
        ("resistance_zone", resistance_zone.lower + resistance_zone.upper),
        ("breakout_level", breakout_level),
        ("volume_today", volume.today_lakhs),
    ])?;

    let snapshot = TechnicalSnapshot {
        cmp,
        rsi,
        ema_21,
        ema_50,
        ema_200,
        dist21,
        dist50,
        dist200,
        fifty_two_wk_high: year.high,
        fifty_two_wk_low: year.low,
        percentile_52w: year.percentile.filter(|p| p.is_finite()),
        support_zone,
        resistance_zone,
        daily_pattern,
        weekly_pattern,
        daily_structure,
        weekly_structure,
        volume_today: volume.today_lakhs,
        volume_avg: volume.average_lakhs,
        volume_surge_pct: volume.surge_pct.filter(|p| p.is_finite()),
        volume_signal: volume.signal,
        breakout_level,
        breakout_volume: volume.breakout_lakhs,
        ema_21_50_cross: crossover::detect(&ema_fast, &ema_medium, fast, medium),
        ema_50_200_cross: crossover::detect(&ema_medium, &ema_slow, medium, slow),
        top_call_oi_strike: options.map(|o| o.top_call_strike),
        top_call_oi_interest: options.map(|o| o.top_call_open_interest),
        top_put_oi_strike: options.map(|o| o.top_put_strike),
        top_put_oi_interest: options.map(|o| o.top_put_open_interest),
        max_pain_strike: options.map(|o| o.max_pain_strike),
        earnings_date: calendar.earnings_label(),
        ex_dividend_date: calendar.ex_dividend_label(),
        shareholding_changes: calendar.shareholding_label(),
    };

    debug!(
        bars = series.len(),
        cmp = snapshot.cmp,
        rsi = snapshot.rsi,
        daily_pattern = %snapshot.daily_pattern,
        daily_structure = %snapshot.daily_structure,
        volume_signal = %snapshot.volume_signal,
        "technical snapshot computed"
    );

    Ok(snapshot)
}

fn ensure_finite(metrics: &[(&'static str, f64)]) -> Result<(), AnalysisError> {
    match metrics.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, _)) => Err(AnalysisError::NonFiniteMetric(name)),
        None => Ok(()),
    }
}
