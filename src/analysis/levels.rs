// =============================================================================
// Price Levels — 52-week range, EMA distance, support/resistance, breakout
// =============================================================================
//
// Support/resistance zones come from trailing 20-bar statistics:
//   support candidates    = { min(low),  mean(low)  }
//   resistance candidates = { mean(high), max(high) }
// A support candidate at or above CMP is replaced by CMP * 0.97; a resistance
// candidate at or below CMP is replaced by CMP * 1.03.  At penny prices those
// buffers round back onto CMP, so the replacement then steps one paisa
// (0.01) away instead.  The support zone always sits below CMP and the
// resistance zone above it.
// =============================================================================

use crate::indicators::round2;
use crate::market_data::Bar;
use crate::types::Zone;

/// Sessions in a trading year.
pub const FIFTY_TWO_WEEK_BARS: usize = 252;
/// Look-back for dynamic support/resistance.
pub const ZONE_BARS: usize = 20;
/// Look-back for the swing high used as breakout reference.
pub const BREAKOUT_BARS: usize = 10;

const SUPPORT_BUFFER: f64 = 0.97;
const RESISTANCE_BUFFER: f64 = 1.03;
const BREAKOUT_BUFFER: f64 = 1.003;
/// Smallest price step at two-decimal precision.
const TICK: f64 = 0.01;

/// Trailing one-year extremes and where CMP sits between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearRange {
    pub high: f64,
    pub low: f64,
    /// `None` when high and low coincide.
    pub percentile: Option<f64>,
}

/// 52-week high/low over `bars` (expected to be the trailing 252 bars) and
/// the CMP percentile inside that range.
pub fn year_range(bars: &[Bar], cmp: f64) -> YearRange {
    let high = round2(bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max));
    let low = round2(bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min));

    let percentile = (high > low).then(|| round2((cmp - low) / (high - low) * 100.0));

    YearRange {
        high,
        low,
        percentile,
    }
}

/// Absolute distance of `ema` from `cmp`, as a percentage of `cmp`.
pub fn ema_distance_pct(ema: f64, cmp: f64) -> f64 {
    if cmp <= 0.0 {
        return 0.0;
    }
    round2((ema - cmp).abs() / cmp * 100.0)
}

/// Dynamic support and resistance zones from `bars` (expected to be the
/// trailing 20 bars), validated against `cmp`.
pub fn support_resistance(bars: &[Bar], cmp: f64) -> (Zone, Zone) {
    let n = bars.len().max(1) as f64;
    let lows = bars.iter().map(|b| b.low);
    let highs = bars.iter().map(|b| b.high);

    let support_low = round2(lows.clone().fold(f64::INFINITY, f64::min));
    let support_high = round2(lows.sum::<f64>() / n);
    let resistance_low = round2(highs.clone().sum::<f64>() / n);
    let resistance_high = round2(highs.fold(f64::NEG_INFINITY, f64::max));

    let support_floor = below_cmp(cmp);
    let resistance_floor = above_cmp(cmp);

    let below = |candidate: f64| if candidate >= cmp { support_floor } else { candidate };
    let above = |candidate: f64| if candidate <= cmp { resistance_floor } else { candidate };

    (
        Zone::sorted(below(support_low), below(support_high)),
        Zone::sorted(above(resistance_low), above(resistance_high)),
    )
}

/// `cmp * 0.97` at two decimals, or one tick under `cmp` when that rounds
/// back onto it.
fn below_cmp(cmp: f64) -> f64 {
    let buffered = round2(cmp * SUPPORT_BUFFER);
    if buffered < cmp {
        buffered
    } else {
        round2(cmp - TICK)
    }
}

/// `cmp * 1.03` at two decimals, or one tick over `cmp` when that rounds
/// back onto it.
fn above_cmp(cmp: f64) -> f64 {
    let buffered = round2(cmp * RESISTANCE_BUFFER);
    if buffered > cmp {
        buffered
    } else {
        round2(cmp + TICK)
    }
}

/// Price a close must clear to confirm a breakout: 0.3% above the highest
/// high of `bars` (expected to be the trailing 10 bars).
pub fn breakout_level(bars: &[Bar]) -> f64 {
    let swing_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    round2(swing_high * BREAKOUT_BUFFER)
}
