//! Tracking-difference summary statistics.
//!
//! Alpha is the ETF return minus the index return for a period. Periods with
//! a NaN or infinite alpha are excluded entirely: they count neither as a
//! win nor as a loss, and do not enter the mean's denominator.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::CompareError;
use crate::CompareResult;

/// Win count and average tracking difference over the aligned periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// All aligned periods, finite or not.
    pub aligned_periods: usize,
    /// Periods with a finite alpha.
    pub valid_periods: usize,
    /// Valid periods where the ETF beat the index.
    pub wins: usize,
    /// `wins / valid_periods`.
    pub win_rate: f64,
    /// Arithmetic mean alpha over valid periods.
    pub mean_alpha: f64,
    /// Sample standard deviation of alpha (needs two valid periods).
    pub tracking_error: Option<f64>,
}

/// Summarise aligned ETF and index returns.
pub fn summarize(etf: &[f64], index: &[f64]) -> CompareResult<SummaryStats> {
    if etf.len() != index.len() {
        return Err(CompareError::InvalidInput {
            field: "index".into(),
            reason: format!(
                "Index returns ({}) must have the same length as ETF returns ({})",
                index.len(),
                etf.len()
            ),
        });
    }

    let alphas: Vec<f64> = etf
        .iter()
        .zip(index)
        .map(|(e, i)| e - i)
        .filter(|a| a.is_finite())
        .collect();

    if alphas.is_empty() {
        return Err(CompareError::NoValidPeriods);
    }

    let valid_periods = alphas.len();
    let wins = alphas.iter().filter(|a| **a > 0.0).count();
    let mean_alpha = alphas.iter().mean();
    let tracking_error = if valid_periods >= 2 {
        Some(alphas.iter().std_dev())
    } else {
        None
    };

    Ok(SummaryStats {
        aligned_periods: etf.len(),
        valid_periods,
        wins,
        win_rate: wins as f64 / valid_periods as f64,
        mean_alpha,
        tracking_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_counts() {
        let etf = [0.10, -0.10, 0.02];
        let idx = [0.04, 0.0385, 0.02];
        let s = summarize(&etf, &idx).unwrap();
        assert_eq!(s.aligned_periods, 3);
        assert_eq!(s.valid_periods, 3);
        // A zero alpha is not a win.
        assert_eq!(s.wins, 1);
        assert!((s.win_rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_excluded_from_mean_denominator() {
        let etf = [0.03, f64::NAN, 0.01, 0.02];
        let idx = [0.0, 0.01, 0.0, 0.0];
        let s = summarize(&etf, &idx).unwrap();
        assert_eq!(s.aligned_periods, 4);
        assert_eq!(s.valid_periods, 3);
        assert!((s.mean_alpha - 0.02).abs() < 1e-12);
        assert_eq!(s.wins, 3);
    }

    #[test]
    fn test_infinite_alpha_excluded() {
        let etf = [f64::INFINITY, 0.01];
        let idx = [0.0, 0.02];
        let s = summarize(&etf, &idx).unwrap();
        assert_eq!(s.valid_periods, 1);
        assert_eq!(s.wins, 0);
        assert_eq!(s.tracking_error, None);
    }

    #[test]
    fn test_all_non_finite_is_error() {
        let etf = [f64::NAN, f64::NAN];
        let idx = [0.0, 0.0];
        assert!(matches!(
            summarize(&etf, &idx),
            Err(CompareError::NoValidPeriods)
        ));
        assert!(matches!(
            summarize(&[], &[]),
            Err(CompareError::NoValidPeriods)
        ));
    }

    #[test]
    fn test_tracking_error_is_sample_std_dev() {
        let etf = [0.02, 0.04];
        let idx = [0.0, 0.0];
        let s = summarize(&etf, &idx).unwrap();
        // alphas 0.02, 0.04: mean 0.03, sample variance 0.0002
        let te = s.tracking_error.unwrap();
        assert!((te - 0.0002f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(matches!(
            summarize(&[0.1, 0.2], &[0.1]),
            Err(CompareError::InvalidInput { .. })
        ));
    }
}
