//! Blended portfolios built from aligned ETF and index returns.
//!
//! Two strategies:
//! 1. **Fixed blend** -- constant ETF weight every period
//! 2. **Glide path** -- ETF weight moving linearly from a start to an end value
//!    across the aligned periods
//!
//! The glide schedule is a function of position in the aligned sequence, not
//! of elapsed calendar time: a missing month does not advance the weight.
//! Weights are range-checked by [`crate::config::BlendConfig::validate`]
//! before they get here.

use serde::{Deserialize, Serialize};

use crate::alignment::AlignedReturns;
use crate::types::MonthKey;

/// One aligned month with both blended returns and the glide weight used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedPeriod {
    pub month: MonthKey,
    pub etf: f64,
    pub index: f64,
    pub fixed_blend: f64,
    pub glide_blend: f64,
    pub glide_weight: f64,
}

impl BlendedPeriod {
    pub fn alpha(&self) -> f64 {
        self.etf - self.index
    }
}

/// `etf_i * w + index_i * (1 - w)` for every period.
///
/// # Panics
///
/// Panics if the two slices differ in length.
pub fn blend_fixed(etf: &[f64], index: &[f64], weight: f64) -> Vec<f64> {
    assert_eq!(
        etf.len(),
        index.len(),
        "blend_fixed: return series must have equal length"
    );
    let index_weight = 1.0 - weight;
    etf.iter()
        .zip(index)
        .map(|(e, i)| e * weight + i * index_weight)
        .collect()
}

/// Linear ETF weights for `count` periods from `start` to `end` inclusive.
///
/// A single period takes the end weight. Zero periods give no weights.
pub fn glide_weights(count: usize, start: f64, end: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![end],
        _ => {
            let last = count - 1;
            let step = (end - start) / last as f64;
            (0..count)
                .map(|i| if i == last { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// `etf_i * w_i + index_i * (1 - w_i)` with a per-period weight.
///
/// # Panics
///
/// Panics if the three slices differ in length.
pub fn blend_glide(etf: &[f64], index: &[f64], weights: &[f64]) -> Vec<f64> {
    assert!(
        etf.len() == index.len() && etf.len() == weights.len(),
        "blend_glide: returns and weights must have equal length"
    );
    etf.iter()
        .zip(index)
        .zip(weights)
        .map(|((e, i), w)| e * w + i * (1.0 - w))
        .collect()
}

/// Apply both blends to an aligned table.
pub fn apply_blends(
    aligned: &AlignedReturns,
    fixed_weight: f64,
    glide_start: f64,
    glide_end: f64,
) -> Vec<BlendedPeriod> {
    let etf = aligned.etf_returns();
    let index = aligned.index_returns();
    let fixed = blend_fixed(&etf, &index, fixed_weight);
    let weights = glide_weights(aligned.len(), glide_start, glide_end);
    let glide = blend_glide(&etf, &index, &weights);

    aligned
        .periods
        .iter()
        .zip(fixed)
        .zip(glide)
        .zip(weights)
        .map(|(((p, fixed_blend), glide_blend), glide_weight)| BlendedPeriod {
            month: p.month,
            etf: p.etf,
            index: p.index,
            fixed_blend,
            glide_blend,
            glide_weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignedPeriod;
    use pretty_assertions::assert_eq;

    const ETF: [f64; 3] = [0.05, -0.02, 0.01];
    const IDX: [f64; 3] = [0.04, -0.01, 0.02];

    #[test]
    fn test_fixed_full_weight_is_etf() {
        assert_eq!(blend_fixed(&ETF, &IDX, 1.0), ETF.to_vec());
    }

    #[test]
    fn test_fixed_zero_weight_is_index() {
        assert_eq!(blend_fixed(&ETF, &IDX, 0.0), IDX.to_vec());
    }

    #[test]
    fn test_fixed_80_20() {
        let out = blend_fixed(&[0.10], &[0.04], 0.8);
        assert!((out[0] - 0.088).abs() < 1e-12);
    }

    #[test]
    fn test_glide_endpoints() {
        let w = glide_weights(5, 0.9, 0.6);
        assert_eq!(w.len(), 5);
        assert_eq!(w[0], 0.9);
        assert_eq!(w[4], 0.6);
        assert!((w[2] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_glide_last_weight_is_exact_end() {
        // 0.9 + 19 * (-0.3 / 19) rounds to 0.5999999999999999
        for n in 2..=120 {
            let w = glide_weights(n, 0.9, 0.6);
            assert_eq!(w[0], 0.9, "n = {n}");
            assert_eq!(w[n - 1], 0.6, "n = {n}");
        }
    }

    #[test]
    fn test_glide_two_periods_hits_both_ends() {
        let w = glide_weights(2, 0.9, 0.6);
        assert_eq!(w, vec![0.9, 0.6]);
    }

    #[test]
    fn test_glide_single_period_takes_end() {
        assert_eq!(glide_weights(1, 0.9, 0.6), vec![0.6]);
    }

    #[test]
    fn test_glide_zero_periods() {
        assert!(glide_weights(0, 0.9, 0.6).is_empty());
    }

    #[test]
    fn test_glide_rising_schedule() {
        let w = glide_weights(3, 0.2, 1.0);
        assert!(w.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn test_glide_blend_uses_per_period_weight() {
        let out = blend_glide(&[0.10, 0.10], &[0.0, 0.0], &[1.0, 0.5]);
        assert!((out[0] - 0.10).abs() < 1e-12);
        assert!((out[1] - 0.05).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_fixed_length_mismatch_panics() {
        blend_fixed(&[0.1, 0.2], &[0.1], 0.5);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_glide_length_mismatch_panics() {
        blend_glide(&[0.1], &[0.1], &[0.5, 0.5]);
    }

    #[test]
    fn test_apply_blends_carries_months_and_weights() {
        let jan = MonthKey::new(2024, 1).unwrap();
        let feb = MonthKey::new(2024, 2).unwrap();
        let aligned = AlignedReturns {
            etf_label: "ETF".into(),
            index_label: "IDX".into(),
            periods: vec![
                AlignedPeriod {
                    month: jan,
                    etf: 0.10,
                    index: 0.04,
                },
                AlignedPeriod {
                    month: feb,
                    etf: -0.10,
                    index: 0.0385,
                },
            ],
        };
        let rows = apply_blends(&aligned, 0.8, 0.9, 0.6);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, jan);
        assert_eq!(rows[1].month, feb);
        assert_eq!(rows[0].glide_weight, 0.9);
        assert_eq!(rows[1].glide_weight, 0.6);
        assert!((rows[0].glide_blend - (0.10 * 0.9 + 0.04 * 0.1)).abs() < 1e-12);
        assert!((rows[1].fixed_blend - (-0.0723)).abs() < 1e-12);
    }
}
