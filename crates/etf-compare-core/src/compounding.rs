use serde::{Deserialize, Serialize};

use crate::blend::BlendedPeriod;

/// Compound `returns` from `base`: `c_i = c_{i-1} * (1 + r_i)`.
///
/// NaN and infinite returns propagate into every later value.
pub fn cumulative(base: f64, returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(base, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

/// Cumulative index values of the four compared series, compounded
/// independently from the same base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTable {
    pub base: f64,
    pub etf: Vec<f64>,
    pub index: Vec<f64>,
    pub fixed_blend: Vec<f64>,
    pub glide_blend: Vec<f64>,
}

impl CumulativeTable {
    pub fn from_periods(base: f64, periods: &[BlendedPeriod]) -> Self {
        let column = |f: fn(&BlendedPeriod) -> f64| -> Vec<f64> {
            let returns: Vec<f64> = periods.iter().map(f).collect();
            cumulative(base, &returns)
        };
        CumulativeTable {
            base,
            etf: column(|p| p.etf),
            index: column(|p| p.index),
            fixed_blend: column(|p| p.fixed_blend),
            glide_blend: column(|p| p.glide_blend),
        }
    }

    pub fn len(&self) -> usize {
        self.etf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.etf.is_empty()
    }

    /// Final ETF and index values, if any period exists.
    pub fn final_values(&self) -> Option<(f64, f64)> {
        Some((*self.etf.last()?, *self.index.last()?))
    }
}
