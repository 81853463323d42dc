use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::stats::{mean, sample_std};

/// Default centered window size in records.
pub const DEFAULT_WINDOW: usize = 30;

/// Rolling mean/std at one index. Both are `None` where the window does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
}

impl RollingPoint {
    const UNDEFINED: RollingPoint = RollingPoint {
        rolling_mean: None,
        rolling_std: None,
    };

    pub fn is_defined(&self) -> bool {
        self.rolling_mean.is_some()
    }
}

/// Centered rolling statistics over time-ordered values.
///
/// The window around index `i` spans `[i - W/2, i + (W-1)/2]` (integer
/// division), so an even window leans one sample into the past. Indices
/// whose window would cross either end of the series are undefined; the
/// window never wraps.
pub fn rolling_stats(values: &[f64], window: usize) -> Result<Vec<RollingPoint>, AnalysisError> {
    if window == 0 {
        return Err(AnalysisError::InvalidWindow(window));
    }

    let before = window / 2;
    let after = (window - 1) / 2;
    let n = values.len();

    let points = (0..n)
        .map(|i| {
            if i < before || i + after >= n {
                return RollingPoint::UNDEFINED;
            }
            let slice = &values[i - before..=i + after];
            RollingPoint {
                rolling_mean: Some(mean(slice)),
                rolling_std: Some(sample_std(slice)),
            }
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_mean_matches_window_average() {
        // Constant-increment series: 0, 1, 2, ..., 99.
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let points = rolling_stats(&values, 30).unwrap();

        // Window at 50 spans 35..=64, mean 49.5.
        let at_50 = points[50];
        let expected: f64 = (35..=64).map(|v| v as f64).sum::<f64>() / 30.0;
        assert!((at_50.rolling_mean.unwrap() - expected).abs() < 1e-9);
        assert!((expected - 49.5).abs() < 1e-12);
    }

    #[test]
    fn flat_window_has_exactly_zero_std() {
        let values = vec![0.1; 30];
        let points = rolling_stats(&values, 30).unwrap();
        assert_eq!(points[15].rolling_mean, Some(0.1));
        assert_eq!(points[15].rolling_std, Some(0.0));
    }

    #[test]
    fn undefined_at_both_ends() {
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let points = rolling_stats(&values, 30).unwrap();

        assert!(!points[14].is_defined());
        assert!(points[15].is_defined());
        assert!(points[25].is_defined());
        assert!(!points[26].is_defined());
        assert_eq!(points.len(), values.len());
    }

    #[test]
    fn shorter_than_window_is_all_undefined() {
        let values = vec![1.0; 29];
        let points = rolling_stats(&values, 30).unwrap();
        assert!(points.iter().all(|p| !p.is_defined()));
    }

    #[test]
    fn odd_window_is_symmetric() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let points = rolling_stats(&values, 3).unwrap();
        assert!(!points[0].is_defined());
        assert!((points[1].rolling_mean.unwrap() - 2.0).abs() < 1e-12);
        assert!((points[3].rolling_mean.unwrap() - 4.0).abs() < 1e-12);
        assert!(!points[4].is_defined());
    }

    #[test]
    fn zero_window_rejected() {
        assert_eq!(rolling_stats(&[1.0], 0), Err(AnalysisError::InvalidWindow(0)));
    }
}
