// =============================================================================
// EMA Crossover Detection
// =============================================================================
//
// Compares a fast and a slow EMA series on the previous and the latest bar.
// A strict flip from below to above is a golden cross; the mirror flip is a
// death cross.  Touching (equality) on either bar is not a cross.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum CrossSignal {
    GoldenCross { fast: usize, slow: usize },
    DeathCross { fast: usize, slow: usize },
    None,
}

impl std::fmt::Display for CrossSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoldenCross { fast, slow } => write!(f, "Golden Cross ({fast}x{slow})"),
            Self::DeathCross { fast, slow } => write!(f, "Death Cross ({fast}x{slow})"),
            Self::None => write!(f, "None"),
        }
    }
}

impl From<CrossSignal> for String {
    fn from(signal: CrossSignal) -> Self {
        signal.to_string()
    }
}

/// Detect a crossover of `fast_ema` over `slow_ema` on the last bar.
///
/// Both series must be aligned on the same bars; fewer than two aligned
/// points yields `None`.
pub fn detect(fast_ema: &[f64], slow_ema: &[f64], fast: usize, slow: usize) -> CrossSignal {
    let (Some([fast_prev, fast_curr]), Some([slow_prev, slow_curr])) =
        (last_two(fast_ema), last_two(slow_ema))
    else {
        return CrossSignal::None;
    };

    if fast_prev < slow_prev && fast_curr > slow_curr {
        CrossSignal::GoldenCross { fast, slow }
    } else if fast_prev > slow_prev && fast_curr < slow_curr {
        CrossSignal::DeathCross { fast, slow }
    } else {
        CrossSignal::None
    }
}

fn last_two(series: &[f64]) -> Option<[f64; 2]> {
    match series {
        [.., prev, curr] => Some([*prev, *curr]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upward_flip_is_golden() {
        let signal = detect(&[9.0, 11.0], &[10.0, 10.0], 21, 50);
        assert_eq!(signal, CrossSignal::GoldenCross { fast: 21, slow: 50 });
        assert_eq!(signal.to_string(), "Golden Cross (21x50)");
    }

    #[test]
    fn downward_flip_is_death() {
        let signal = detect(&[11.0, 9.0], &[10.0, 10.0], 50, 200);
        assert_eq!(signal.to_string(), "Death Cross (50x200)");
    }

    #[test]
    fn swapping_series_mirrors_the_label() {
        let fast = [4.0, 6.0];
        let slow = [5.0, 5.5];
        assert!(matches!(detect(&fast, &slow, 1, 2), CrossSignal::GoldenCross { .. }));
        assert!(matches!(detect(&slow, &fast, 1, 2), CrossSignal::DeathCross { .. }));
    }

    #[test]
    fn touching_is_not_a_cross() {
        assert_eq!(detect(&[10.0, 11.0], &[10.0, 10.0], 21, 50), CrossSignal::None);
        assert_eq!(detect(&[9.0, 10.0], &[10.0, 10.0], 21, 50), CrossSignal::None);
    }

    #[test]
    fn no_flip_is_none() {
        assert_eq!(detect(&[12.0, 13.0], &[10.0, 10.0], 21, 50), CrossSignal::None);
    }

    #[test]
    fn short_series_is_none() {
        assert_eq!(detect(&[1.0], &[2.0], 21, 50), CrossSignal::None);
        assert_eq!(detect(&[], &[], 21, 50), CrossSignal::None);
        assert_eq!(CrossSignal::None.to_string(), "None");
    }

    #[test]
    fn only_last_two_points_matter() {
        let fast = [100.0, 1.0, 9.0, 11.0];
        let slow = [1.0, 100.0, 10.0, 10.0];
        assert_eq!(detect(&fast, &slow, 21, 50), CrossSignal::GoldenCross { fast: 21, slow: 50 });
    }
}
