// =============================================================================
// Technical Analysis Engine
// =============================================================================
//
// Pure, synchronous computation over a validated price series.  `analyzer`
// orchestrates; the other modules each own one family of derived metrics.

pub mod analyzer;
pub mod crossover;
pub mod enrichment;
pub mod levels;
pub mod volume;

pub use analyzer::{analyze_table, AnalysisReport, TechnicalSnapshot};
#[cfg(test)]
pub use analyzer::analyze_bars;
pub use enrichment::{CorporateCalendar, Enrichments, OptionChain, OptionStrike};
