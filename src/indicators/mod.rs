// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the momentum and trend indicators
// used by the snapshot engine.  Series functions return every computable
// reading; the `latest_*` helpers collapse a series into the single rounded
// value that lands in the analysis result.

pub mod ema;
pub mod rsi;

/// Round to two decimal places, the precision of every published metric.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
