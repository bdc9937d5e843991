// =============================================================================
// Price-Structure Classifier
// =============================================================================
//
// Reads the swing shape of the last four bars' highs and lows.  Rules are an
// ordered table, first match wins:
//
//   1. highs and lows strictly rising across all four bars  => HH-HL
//   2. highs and lows strictly falling across all four bars => LH-LL
//   3. latest bar's range engulfs the prior bar's           => Expansion
//   4. latest bar's range sits inside the prior bar's       => Contraction
//   5. anything else                                        => Mixed Trend
// =============================================================================

use serde::Serialize;

use crate::market_data::Bar;

/// Number of trailing bars the rules inspect.
pub const STRUCTURE_WINDOW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum PriceStructure {
    HigherHighHigherLow,
    LowerHighLowerLow,
    Expansion,
    Contraction,
    MixedTrend,
    NotEnoughData,
    NotAvailable,
}

impl std::fmt::Display for PriceStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::HigherHighHigherLow => "Higher High – Higher Low",
            Self::LowerHighLowerLow => "Lower High – Lower Low",
            Self::Expansion => "Expansion",
            Self::Contraction => "Contraction",
            Self::MixedTrend => "Mixed Trend",
            Self::NotEnoughData => "Not Enough Data",
            Self::NotAvailable => "Not Available",
        };
        f.write_str(label)
    }
}

impl From<PriceStructure> for String {
    fn from(structure: PriceStructure) -> Self {
        structure.to_string()
    }
}

type Window = [f64; STRUCTURE_WINDOW];
type StructureRule = (PriceStructure, fn(&Window, &Window) -> bool);

const RULES: [StructureRule; 4] = [
    (PriceStructure::HigherHighHigherLow, higher_highs_higher_lows),
    (PriceStructure::LowerHighLowerLow, lower_highs_lower_lows),
    (PriceStructure::Expansion, expansion),
    (PriceStructure::Contraction, contraction),
];

/// Classify the trailing four bars of `bars`.
pub fn classify(bars: &[Bar]) -> PriceStructure {
    if bars.len() < STRUCTURE_WINDOW {
        return PriceStructure::NotEnoughData;
    }

    let tail = &bars[bars.len() - STRUCTURE_WINDOW..];
    let highs: Window = std::array::from_fn(|i| tail[i].high);
    let lows: Window = std::array::from_fn(|i| tail[i].low);

    if highs.iter().chain(lows.iter()).any(|v| !v.is_finite()) {
        return PriceStructure::NotAvailable;
    }

    RULES
        .iter()
        .find(|(_, matches)| matches(&highs, &lows))
        .map(|(label, _)| *label)
        .unwrap_or(PriceStructure::MixedTrend)
}

fn strictly_rising(w: &Window) -> bool {
    w.windows(2).all(|p| p[1] > p[0])
}

fn strictly_falling(w: &Window) -> bool {
    w.windows(2).all(|p| p[1] < p[0])
}

fn higher_highs_higher_lows(highs: &Window, lows: &Window) -> bool {
    strictly_rising(highs) && strictly_rising(lows)
}

fn lower_highs_lower_lows(highs: &Window, lows: &Window) -> bool {
    strictly_falling(highs) && strictly_falling(lows)
}

fn expansion(highs: &Window, lows: &Window) -> bool {
    highs[3] > highs[2] && lows[3] < lows[2]
}

fn contraction(highs: &Window, lows: &Window) -> bool {
    highs[3] < highs[2] && lows[3] > lows[2]
}
