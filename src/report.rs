// =============================================================================
// Snapshot Report — plain-text rendering of an analysis
// =============================================================================
//
// Sections:
//   I.    Price Summary          V.    Volume Analysis
//   II.   Trend Overview         VI.   Corporate & Events Calendar
//   III.  Indicators             VII.  Breakout Setup
//   IV.   Price Action           VIII. Option Chain Summary
// followed by a fixed disclaimer.  A failed analysis renders as one line.
// =============================================================================

use std::fmt;

use chrono::NaiveDate;

use crate::analysis::{AnalysisReport, TechnicalSnapshot};
use crate::analysis::enrichment::NOT_AVAILABLE;

/// Width labels are padded to so values line up.
const LABEL_WIDTH: usize = 22;

const DISCLAIMER: &str = "📌 Disclaimer: This analysis is for informational purposes only and \
should not be considered as investment advice. Please consult a qualified financial advisor \
before making any investment decisions. All investments involve risk, including the possible \
loss of principal. Past performance is not indicative of future results.";

/// Text report for one symbol, rendered through `Display`.
pub struct SnapshotReport<'a> {
    symbol: &'a str,
    report: &'a AnalysisReport,
    date: NaiveDate,
}

impl<'a> SnapshotReport<'a> {
    pub fn new(symbol: &'a str, report: &'a AnalysisReport, date: NaiveDate) -> Self {
        Self {
            symbol,
            report,
            date,
        }
    }
}

impl fmt::Display for SnapshotReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol.to_uppercase();
        match self.report {
            AnalysisReport::Failed { error } => {
                write!(f, "⚠️ Error generating report for {symbol}: {error}")
            }
            AnalysisReport::Snapshot(s) => {
                writeln!(f, "📘 {symbol} – Technical Snapshot")?;
                writeln!(f, "Date: {}", self.date.format("%Y-%m-%d"))?;
                writeln!(f)?;
                price_summary(f, s)?;
                trend_overview(f, s)?;
                indicators(f, s)?;
                price_action(f, s)?;
                volume(f, s)?;
                calendar(f, s)?;
                breakout(f, s)?;
                option_chain(f, s)?;
                write!(f, "{DISCLAIMER}")
            }
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

fn item(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "  • {label:<width$}: {value}", width = LABEL_WIDTH)
}

fn heading(f: &mut fmt::Formatter<'_>, numeral: &str, title: &str) -> fmt::Result {
    writeln!(f, "🔹 {numeral:<6}{title}")
}

fn or_na<T>(value: Option<T>, render: impl Fn(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Distance to the nearer end of the 52-week range.
fn year_position(s: &TechnicalSnapshot) -> String {
    if s.cmp <= 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    let from_low = (s.cmp - s.fifty_two_wk_low) / s.cmp * 100.0;
    let from_high = (s.fifty_two_wk_high - s.cmp) / s.cmp * 100.0;
    if from_low <= from_high {
        format!("{from_low:.2}% Far From 52-Week Low")
    } else {
        format!("{from_high:.2}% Far From 52-Week High")
    }
}

fn price_summary(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "I.", "Price Summary")?;
    item(f, "CMP (NSE)", format!("₹{:.2}", s.cmp))?;
    item(
        f,
        "52-Week Range",
        format!("₹{:.2} – ₹{:.2}", s.fifty_two_wk_low, s.fifty_two_wk_high),
    )?;
    item(f, "52-Week Position", year_position(s))?;
    writeln!(f)
}

fn trend_overview(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    let trend = if s.above_long_trend() {
        "Strong Bullish"
    } else {
        "Strong Bearish"
    };
    heading(f, "II.", "Trend Overview")?;
    item(f, "Trend", trend)?;
    item(f, "Support Zone", s.support_zone)?;
    item(f, "Resistance Zone", s.resistance_zone)?;
    writeln!(f)
}

fn ema_line(ema: f64, distance: f64, cmp: f64) -> String {
    let side = if ema > cmp { "above" } else { "below" };
    format!("₹{ema:.2} ({distance:.2}% {side})")
}

fn indicators(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "III.", "Indicators")?;
    item(f, "RSI (14)", format!("{:.2}", s.rsi))?;
    item(f, "EMA 21", ema_line(s.ema_21, s.dist21, s.cmp))?;
    item(f, "EMA 50", ema_line(s.ema_50, s.dist50, s.cmp))?;
    item(f, "EMA 200", ema_line(s.ema_200, s.dist200, s.cmp))?;
    item(f, "EMA 21/50 Cross", s.ema_21_50_cross)?;
    item(f, "EMA 50/200 Cross", s.ema_50_200_cross)?;
    writeln!(f)
}

fn price_action(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "IV.", "Price Action")?;
    item(f, "Daily Pattern", s.daily_pattern)?;
    item(f, "Daily Structure", s.daily_structure)?;
    item(f, "Weekly Pattern", s.weekly_pattern)?;
    item(f, "Weekly Structure", s.weekly_structure)?;
    writeln!(f)
}

fn volume(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "V.", "Volume Analysis")?;
    item(f, "Today’s Volume", format!("{:.2} Lakh", s.volume_today))?;
    item(f, "Surge Over 20 Days", or_na(s.volume_surge_pct, |p| format!("{p:.2}%")))?;
    item(f, "50-Day Avg Vol.", or_na(s.volume_avg, |v| format!("{v:.2} Lakh")))?;
    item(f, "Volume Signal", s.volume_signal)?;
    writeln!(f)
}

fn calendar(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "VI.", "Corporate & Events Calendar")?;
    item(f, "Next Earnings Date", &s.earnings_date)?;
    item(f, "Ex-Dividend Date", &s.ex_dividend_date)?;
    item(f, "Shareholding Changes", &s.shareholding_changes)?;
    writeln!(f)
}

fn breakout(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    heading(f, "VII.", "Breakout Setup")?;
    writeln!(
        f,
        "  • Breakout if Price is greater than ₹{:.2} and also Volume is greater than {} Lakh Shares.",
        s.breakout_level,
        or_na(s.breakout_volume, |v| format!("{v:.2}")),
    )?;
    writeln!(f)
}

fn option_chain(f: &mut fmt::Formatter<'_>, s: &TechnicalSnapshot) -> fmt::Result {
    let strike_with_oi = |strike: Option<f64>, oi: Option<u64>| match (strike, oi) {
        (Some(strike), Some(oi)) => format!("₹{strike:.2} ({oi})"),
        _ => NOT_AVAILABLE.to_string(),
    };

    heading(f, "VIII.", "Option Chain Summary")?;
    item(f, "Max Call OI Strike", strike_with_oi(s.top_call_oi_strike, s.top_call_oi_interest))?;
    item(f, "Max Put OI Strike", strike_with_oi(s.top_put_oi_strike, s.top_put_oi_interest))?;
    item(f, "Max Pain Strike", or_na(s.max_pain_strike, |p| format!("₹{p:.2}")))?;
    writeln!(f)
}

// =============================================================================
// Tests
// =============================================================================
