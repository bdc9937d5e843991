// =============================================================================
// Candlestick Pattern Classifier
// =============================================================================
//
// Classifies the most recent bar (and, for two-candle patterns, the bar
// before it) into a named pattern.  The classification is an ordered decision
// table: single-bar rules first, then two-bar rules, first match wins.
//
// Geometry:
//   body         = |close - open|
//   range        = high - low
//   upper shadow = high - max(open, close)
//   lower shadow = min(open, close) - low
//   bullish      = close > open,  bearish = open > close
// =============================================================================

use serde::Serialize;

use crate::market_data::Bar;

/// Every label the classifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum CandlePattern {
    Doji,
    SpinningTop,
    Hammer,
    ShootingStar,
    HangingMan,
    InvertedHammer,
    BearishEngulfing,
    BullishEngulfing,
    DarkCloudCover,
    PiercingLine,
    BearishHarami,
    BullishHarami,
    Neutral,
    NotEnoughData,
    NotAvailable,
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Doji => "Doji",
            Self::SpinningTop => "Spinning Top",
            Self::Hammer => "Hammer",
            Self::ShootingStar => "Shooting Star",
            Self::HangingMan => "Hanging Man",
            Self::InvertedHammer => "Inverted Hammer",
            Self::BearishEngulfing => "Bearish Engulfing",
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::DarkCloudCover => "Dark Cloud Cover",
            Self::PiercingLine => "Piercing Line",
            Self::BearishHarami => "Bearish Harami",
            Self::BullishHarami => "Bullish Harami",
            Self::Neutral => "Neutral",
            Self::NotEnoughData => "Not Enough Data",
            Self::NotAvailable => "Not Available",
        };
        f.write_str(label)
    }
}

impl From<CandlePattern> for String {
    fn from(pattern: CandlePattern) -> Self {
        pattern.to_string()
    }
}

// =============================================================================
// Decision table
// =============================================================================

type SingleBarRule = (CandlePattern, fn(&Bar) -> bool);
type TwoBarRule = (CandlePattern, fn(&Bar, &Bar) -> bool);

/// Evaluated on the latest bar, in order.
const SINGLE_BAR_RULES: [SingleBarRule; 6] = [
    (CandlePattern::Doji, is_doji),
    (CandlePattern::SpinningTop, is_spinning_top),
    (CandlePattern::Hammer, is_hammer),
    (CandlePattern::ShootingStar, is_shooting_star),
    (CandlePattern::HangingMan, is_hanging_man),
    (CandlePattern::InvertedHammer, is_inverted_hammer),
];

/// Evaluated on `(previous, latest)`, in order, after every single-bar rule
/// has failed.
const TWO_BAR_RULES: [TwoBarRule; 6] = [
    (CandlePattern::BearishEngulfing, is_bearish_engulfing),
    (CandlePattern::BullishEngulfing, is_bullish_engulfing),
    (CandlePattern::DarkCloudCover, is_dark_cloud_cover),
    (CandlePattern::PiercingLine, is_piercing_line),
    (CandlePattern::BearishHarami, is_bearish_harami),
    (CandlePattern::BullishHarami, is_bullish_harami),
];

/// Classify the last two bars of `bars`.  Anything before them is ignored.
pub fn classify(bars: &[Bar]) -> CandlePattern {
    let [.., prev, curr] = bars else {
        return CandlePattern::NotEnoughData;
    };

    let finite = |b: &Bar| [b.open, b.high, b.low, b.close].iter().all(|v| v.is_finite());
    if !finite(prev) || !finite(curr) {
        return CandlePattern::NotAvailable;
    }

    if range(curr) == 0.0 || range(prev) == 0.0 {
        return CandlePattern::Neutral;
    }

    SINGLE_BAR_RULES
        .iter()
        .find(|(_, matches)| matches(curr))
        .map(|(label, _)| *label)
        .or_else(|| {
            TWO_BAR_RULES
                .iter()
                .find(|(_, matches)| matches(prev, curr))
                .map(|(label, _)| *label)
        })
        .unwrap_or(CandlePattern::Neutral)
}

// =============================================================================
// Geometry
// =============================================================================

fn body(b: &Bar) -> f64 {
    (b.close - b.open).abs()
}

fn range(b: &Bar) -> f64 {
    b.high - b.low
}

fn upper_shadow(b: &Bar) -> f64 {
    b.high - b.open.max(b.close)
}

fn lower_shadow(b: &Bar) -> f64 {
    b.open.min(b.close) - b.low
}

fn is_bullish(b: &Bar) -> bool {
    b.close > b.open
}

fn is_bearish(b: &Bar) -> bool {
    b.open > b.close
}

fn midpoint(b: &Bar) -> f64 {
    (b.open + b.close) / 2.0
}

// =============================================================================
// Single-bar predicates
// =============================================================================

fn is_doji(c: &Bar) -> bool {
    body(c) / range(c) < 0.1
}

fn is_spinning_top(c: &Bar) -> bool {
    body(c) / range(c) < 0.3 && upper_shadow(c) > body(c) && lower_shadow(c) > body(c)
}

fn is_hammer(c: &Bar) -> bool {
    lower_shadow(c) > 2.0 * body(c) && upper_shadow(c) < 0.3 * body(c) && is_bullish(c)
}

fn is_shooting_star(c: &Bar) -> bool {
    upper_shadow(c) > 2.0 * body(c) && lower_shadow(c) < 0.3 * body(c) && is_bearish(c)
}

fn is_hanging_man(c: &Bar) -> bool {
    is_bearish(c) && lower_shadow(c) > 2.0 * body(c)
}

fn is_inverted_hammer(c: &Bar) -> bool {
    is_bullish(c) && upper_shadow(c) > 2.0 * body(c)
}

// =============================================================================
// Two-bar predicates
// =============================================================================

fn is_bearish_engulfing(p: &Bar, c: &Bar) -> bool {
    is_bearish(c) && is_bullish(p) && c.open > p.close && c.close < p.open
}

fn is_bullish_engulfing(p: &Bar, c: &Bar) -> bool {
    is_bullish(c) && is_bearish(p) && c.open < p.close && c.close > p.open
}

fn is_dark_cloud_cover(p: &Bar, c: &Bar) -> bool {
    is_bearish(c) && is_bullish(p) && c.open > p.close && c.close < midpoint(p)
}

fn is_piercing_line(p: &Bar, c: &Bar) -> bool {
    is_bullish(c) && is_bearish(p) && c.close > midpoint(p) && c.open < p.close
}

fn is_bearish_harami(p: &Bar, c: &Bar) -> bool {
    is_bullish(p) && is_bearish(c) && c.open < p.close && c.close > p.open
}

fn is_bullish_harami(p: &Bar, c: &Bar) -> bool {
    is_bearish(p) && is_bullish(c) && c.open > p.close && c.close < p.open
}
