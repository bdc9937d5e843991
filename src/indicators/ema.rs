// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded from the very first close, so every bar carries a
// reading and there is no warm-up gap.
// =============================================================================

use super::round2;

/// Periods published in every snapshot.
pub const SNAPSHOT_EMA_PERIODS: [usize; 3] = [21, 50, 200];

/// Compute the EMA series for `closes`, one value per close.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - empty input => empty vec
/// - A non-finite intermediate value truncates the series; downstream
///   consumers should not trust a broken series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(closes.len());
    let mut prev_ema = closes[0];
    if !prev_ema.is_finite() {
        return result;
    }
    result.push(prev_ema);

    for &close in &closes[1..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

/// Last point of an EMA series rounded to two decimals, or `None` for an
/// empty series.
pub fn latest_ema(ema: &[f64]) -> Option<f64> {
    ema.last().copied().map(round2)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_seeded_from_first_close() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 3);
        assert_eq!(ema[0], 2.0);
        // multiplier = 0.5
        assert!((ema[1] - 3.0).abs() < 1e-10);
        assert!((ema[2] - 4.5).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        let closes = ascending(10);
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);

        let mult = 2.0 / 6.0;
        let mut expected = closes[0];
        for (i, &c) in closes.iter().enumerate().skip(1) {
            expected = c * mult + expected * (1.0 - mult);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}");
        }
    }

    #[test]
    fn ema_period_one_tracks_close() {
        let closes = [5.0, 9.0, 3.0, 7.25];
        let ema = calculate_ema(&closes, 1);
        assert_eq!(ema, closes.to_vec());
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let ema = calculate_ema(&[250.0; 40], 21);
        assert!(ema.iter().all(|v| (v - 250.0).abs() < 1e-9));
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let closes = [1.0, 2.0, f64::NAN, 5.0];
        assert_eq!(calculate_ema(&closes, 3).len(), 2);
    }

    #[test]
    fn shorter_period_hugs_an_uptrend() {
        let closes = ascending(300);
        let e21 = *calculate_ema(&closes, 21).last().unwrap();
        let e50 = *calculate_ema(&closes, 50).last().unwrap();
        let e200 = *calculate_ema(&closes, 200).last().unwrap();
        assert!(e21 > e50 && e50 > e200);
        assert!(e21 < 300.0);
    }

    // ---- latest_ema ------------------------------------------------------

    #[test]
    fn latest_ema_rounds() {
        assert_eq!(latest_ema(&calculate_ema(&[1.0, 2.0], 2)), Some(1.67));
        assert_eq!(latest_ema(&[]), None);
    }
}
