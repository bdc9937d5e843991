// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an equity is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gains (delta clipped at 0) and losses (negated deltas
//          clipped at 0).
// Step 3 — Average gain / average loss are plain SMAs over the trailing
//          `period` deltas.  No reading exists until `period` deltas do.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A zero average loss leaves RS undefined.  Such readings are reported as
// `None` in the series and collapse to the 0.0 sentinel in `latest_rsi`, the
// same sentinel used for "not enough closes yet".  A genuine reading of 0.0
// cannot be told apart from the sentinel.
// =============================================================================

use super::round2;

/// Default look-back used by the snapshot engine.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned one-to-one with the input.
///
/// Element `i` is `Some` only when `period` deltas end at close `i` and the
/// average loss over them is non-zero.
///
/// # Edge cases
/// - `period == 0` => every element is `None`
/// - fewer than `period + 1` closes => every element is `None`
/// - zero average loss (flat or strictly rising window) => `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return result;
    }

    // --- Split deltas into gains and losses ----------------------------------
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    // --- Rolling sums over `period` deltas -----------------------------------
    let period_f = period as f64;
    let mut sum_gain: f64 = gains[..period].iter().sum();
    let mut sum_loss: f64 = losses[..period].iter().sum();

    // Delta `j` ends at close `j + 1`.
    for j in (period - 1)..gains.len() {
        if j >= period {
            sum_gain += gains[j] - gains[j - period];
            sum_loss += losses[j] - losses[j - period];
        }
        result[j + 1] = rsi_from_averages(sum_gain / period_f, sum_loss / period_f);
    }

    result
}

/// Latest RSI reading rounded to two decimals, or `0.0` when no reading is
/// available.
pub fn latest_rsi(closes: &[f64], period: usize) -> f64 {
    calculate_rsi(closes, period)
        .last()
        .copied()
        .flatten()
        .map(round2)
        .unwrap_or(0.0)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the average loss is zero or the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    // Rolling subtraction can leave tiny negative residue on a flat window.
    if avg_loss <= 1e-12 {
        return None;
    }
    let rs = avg_gain.max(0.0) / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_reading_at_index_period() {
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 20);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_alternating_is_balanced() {
        // 7 gains of 1.0 and 7 losses of 1.0 in every window => RSI 50.
        let closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.into_iter().flatten() {
            assert!((v - 50.0).abs() < 1e-9, "expected 50.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        for v in series.into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_gains_is_undefined() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_uses_simple_average_of_trailing_window() {
        // Window of 3 deltas: +2, -1, +1 => avg_gain 1.0, avg_loss 1/3.
        let closes = [10.0, 12.0, 11.0, 12.0];
        let series = calculate_rsi(&closes, 3);
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((series[3].unwrap() - expected).abs() < 1e-10);
    }

    // ---- latest_rsi ------------------------------------------------------

    #[test]
    fn latest_rsi_sentinel_when_short() {
        assert_eq!(latest_rsi(&[100.0, 101.0, 99.0], DEFAULT_RSI_PERIOD), 0.0);
    }

    #[test]
    fn latest_rsi_sentinel_when_no_losses() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert_eq!(latest_rsi(&closes, DEFAULT_RSI_PERIOD), 0.0);
    }

    #[test]
    fn latest_rsi_is_rounded() {
        let closes = [10.0, 12.0, 11.0, 12.0];
        assert_eq!(latest_rsi(&closes, 3), 75.0);

        let closes = [10.0, 12.0, 11.0, 11.5];
        // gains 2.0 + 0.5, loss 1.0 => RS 2.5 => 71.428...
        assert_eq!(latest_rsi(&closes, 3), 71.43);
    }
}
