// =============================================================================
// Volume Analysis — surge, participation signal, breakout volume
// =============================================================================
//
// Today's volume is compared with trailing averages over the sessions that
// precede it:
//   signal    = "High Volume" if today >= avg50 else "Low Volume"
//   surge %   = (today - avg20) / avg20 * 100
//   breakout  = 1.2 * avg50, expressed in lakhs
//
// The 50-bar average is truncated to whole shares before use.
// =============================================================================

use serde::Serialize;

use crate::indicators::round2;
use crate::market_data::Bar;

pub const LONG_VOLUME_BARS: usize = 50;
pub const SHORT_VOLUME_BARS: usize = 20;

/// One lakh = 100 000 shares.
pub const LAKH: f64 = 100_000.0;

const BREAKOUT_VOLUME_MULTIPLIER: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum VolumeSignal {
    HighVolume,
    LowVolume,
    NotEnoughData,
}

impl std::fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighVolume => write!(f, "High Volume"),
            Self::LowVolume => write!(f, "Low Volume"),
            Self::NotEnoughData => write!(f, "Not Enough Data"),
        }
    }
}

impl From<VolumeSignal> for String {
    fn from(signal: VolumeSignal) -> Self {
        signal.to_string()
    }
}

/// Volume metrics for the latest session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProfile {
    /// Latest session volume, in lakhs.
    pub today_lakhs: f64,
    /// Trailing 50-session average, in lakhs.
    pub average_lakhs: Option<f64>,
    pub surge_pct: Option<f64>,
    pub signal: VolumeSignal,
    /// Volume a breakout session should print, in lakhs.
    pub breakout_lakhs: Option<f64>,
}

/// Mean volume of the last `window` bars of `prior`, or `None` if fewer exist.
fn trailing_mean(prior: &[Bar], window: usize) -> Option<f64> {
    if window == 0 || prior.len() < window {
        return None;
    }
    let total: f64 = prior[prior.len() - window..]
        .iter()
        .map(|b| b.volume as f64)
        .sum();
    Some(total / window as f64)
}

/// Build the volume profile for the last bar of `bars`.
pub fn profile(bars: &[Bar]) -> VolumeProfile {
    let Some((today, prior)) = bars.split_last() else {
        return VolumeProfile {
            today_lakhs: 0.0,
            average_lakhs: None,
            surge_pct: None,
            signal: VolumeSignal::NotEnoughData,
            breakout_lakhs: None,
        };
    };
    let today = today.volume as f64;

    let avg_long = trailing_mean(prior, LONG_VOLUME_BARS).map(f64::trunc);
    let avg_short = trailing_mean(prior, SHORT_VOLUME_BARS);

    let signal = match avg_long {
        Some(avg) if today >= avg => VolumeSignal::HighVolume,
        Some(_) => VolumeSignal::LowVolume,
        None => VolumeSignal::NotEnoughData,
    };

    let surge_pct = avg_short
        .filter(|avg| *avg > 0.0)
        .map(|avg| round2((today - avg) / avg * 100.0));

    VolumeProfile {
        today_lakhs: round2(today / LAKH),
        average_lakhs: avg_long.map(|avg| round2(avg / LAKH)),
        surge_pct,
        signal,
        breakout_lakhs: avg_long.map(|avg| round2(avg * BREAKOUT_VOLUME_MULTIPLIER / LAKH)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn bars_with_volumes(volumes: &[u64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        volumes
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::new(start + Days::new(i as u64), 10.0, 11.0, 9.0, 10.0, v))
            .collect()
    }

    #[test]
    fn surge_after_fifty_quiet_sessions() {
        let mut volumes = vec![1_000_000u64; 50];
        volumes.push(2_000_000);
        let p = profile(&bars_with_volumes(&volumes));

        assert_eq!(p.signal, VolumeSignal::HighVolume);
        assert_eq!(p.breakout_lakhs, Some(12.0));
        assert_eq!(p.average_lakhs, Some(10.0));
        assert_eq!(p.today_lakhs, 20.0);
        assert_eq!(p.surge_pct, Some(100.0));
    }

    #[test]
    fn quiet_session_is_low_volume() {
        let mut volumes = vec![1_000_000u64; 60];
        volumes.push(400_000);
        let p = profile(&bars_with_volumes(&volumes));
        assert_eq!(p.signal, VolumeSignal::LowVolume);
        assert_eq!(p.surge_pct, Some(-60.0));
    }

    #[test]
    fn equal_to_average_counts_as_high() {
        let p = profile(&bars_with_volumes(&[500_000u64; 51]));
        assert_eq!(p.signal, VolumeSignal::HighVolume);
        assert_eq!(p.surge_pct, Some(0.0));
    }

    #[test]
    fn short_history_degrades() {
        let p = profile(&bars_with_volumes(&[100, 200, 300]));
        assert_eq!(p.signal, VolumeSignal::NotEnoughData);
        assert_eq!(p.average_lakhs, None);
        assert_eq!(p.breakout_lakhs, None);
        assert_eq!(p.surge_pct, None);
    }

    #[test]
    fn surge_available_before_long_average() {
        let mut volumes = vec![1_000u64; 20];
        volumes.push(1_500);
        let p = profile(&bars_with_volumes(&volumes));
        assert_eq!(p.signal, VolumeSignal::NotEnoughData);
        assert_eq!(p.surge_pct, Some(50.0));
    }

    #[test]
    fn zero_average_omits_surge() {
        let mut volumes = vec![0u64; 20];
        volumes.push(1_000);
        assert_eq!(profile(&bars_with_volumes(&volumes)).surge_pct, None);
    }

    #[test]
    fn long_average_is_truncated() {
        // 49 * 3 + 4 = 151 over 50 => 3.02 -> 3 shares.
        let mut volumes = vec![3u64; 49];
        volumes.push(4);
        volumes.push(3);
        let p = profile(&bars_with_volumes(&volumes));
        assert_eq!(p.signal, VolumeSignal::HighVolume);
        assert_eq!(p.breakout_lakhs, Some(0.0));
    }

    #[test]
    fn empty_input() {
        assert_eq!(profile(&[]).signal, VolumeSignal::NotEnoughData);
    }
}
