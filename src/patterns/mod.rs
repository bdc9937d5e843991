// =============================================================================
// Pattern Classifiers
// =============================================================================
//
// Rule-table classifiers over the trailing bars of a series:
// - Candlestick patterns (last one or two bars)
// - Price structure (last four highs/lows)
//
// Both are total functions: short or degenerate input maps to a labelled
// sentinel rather than an error.

pub mod candlestick;
pub mod structure;

pub use candlestick::CandlePattern;
pub use structure::PriceStructure;
