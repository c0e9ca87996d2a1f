//! Calendar alignment of two return series.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompareError;
use crate::returns::ReturnSeries;
use crate::types::MonthKey;
use crate::CompareResult;

/// ETF and index returns for one month present in both series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPeriod {
    pub month: MonthKey,
    pub etf: f64,
    pub index: f64,
}

impl AlignedPeriod {
    /// Tracking difference for the month.
    pub fn alpha(&self) -> f64 {
        self.etf - self.index
    }
}

/// Intersection of an ETF and an index return series, ascending by month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedReturns {
    pub etf_label: String,
    pub index_label: String,
    pub periods: Vec<AlignedPeriod>,
}

impl AlignedReturns {
    pub fn months(&self) -> Vec<MonthKey> {
        self.periods.iter().map(|p| p.month).collect()
    }

    pub fn etf_returns(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.etf).collect()
    }

    pub fn index_returns(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.index).collect()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Keep the months present in both series, in the ETF series' order.
///
/// Both inputs are checked for strictly increasing months, which makes the
/// intersection ascending without a re-sort. An empty intersection is a valid
/// result here; the comparison pipeline reports it as
/// [`CompareError::NoOverlap`].
pub fn align_returns(etf: &ReturnSeries, index: &ReturnSeries) -> CompareResult<AlignedReturns> {
    for series in [etf, index] {
        if !series.is_sorted() {
            return Err(CompareError::InvalidInput {
                field: series.label().to_string(),
                reason: "Return series must be sorted by strictly increasing month".into(),
            });
        }
    }

    let lookup: HashMap<MonthKey, f64> = index
        .points()
        .iter()
        .map(|p| (p.month, p.value))
        .collect();

    let periods: Vec<AlignedPeriod> = etf
        .points()
        .iter()
        .filter_map(|p| {
            lookup.get(&p.month).map(|&index_value| AlignedPeriod {
                month: p.month,
                etf: p.value,
                index: index_value,
            })
        })
        .collect();

    debug!(
        etf = etf.label(),
        index = index.label(),
        etf_months = etf.len(),
        index_months = index.len(),
        aligned = periods.len(),
        "aligned return series"
    );

    Ok(AlignedReturns {
        etf_label: etf.label().to_string(),
        index_label: index.label().to_string(),
        periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::MonthlyReturn;
    use pretty_assertions::assert_eq;

    fn month(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    fn series(label: &str, values: &[(u32, f64)]) -> ReturnSeries {
        let points = values
            .iter()
            .map(|&(m, value)| MonthlyReturn {
                month: month(2024, m),
                value,
            })
            .collect();
        ReturnSeries::new(label, points).unwrap()
    }

    #[test]
    fn test_intersection_in_order() {
        let a = series("ETF", &[(1, 0.01), (2, 0.02), (3, 0.03)]);
        let b = series("IDX", &[(2, 0.12), (3, 0.13), (4, 0.14)]);
        let aligned = align_returns(&a, &b).unwrap();
        assert_eq!(aligned.months(), vec![month(2024, 2), month(2024, 3)]);
        assert_eq!(aligned.etf_returns(), vec![0.02, 0.03]);
        assert_eq!(aligned.index_returns(), vec![0.12, 0.13]);
        assert_eq!(aligned.etf_label, "ETF");
        assert_eq!(aligned.index_label, "IDX");
    }

    #[test]
    fn test_disjoint_is_empty_not_error() {
        let a = series("ETF", &[(1, 0.01)]);
        let b = series("IDX", &[(2, 0.02)]);
        let aligned = align_returns(&a, &b).unwrap();
        assert!(aligned.is_empty());
    }

    #[test]
    fn test_interior_gap_in_index() {
        let a = series("ETF", &[(1, 0.01), (2, 0.02), (3, 0.03), (4, 0.04)]);
        let b = series("IDX", &[(1, 0.11), (3, 0.13), (4, 0.14)]);
        let aligned = align_returns(&a, &b).unwrap();
        assert_eq!(
            aligned.months(),
            vec![month(2024, 1), month(2024, 3), month(2024, 4)]
        );
    }

    #[test]
    fn test_alpha_per_period() {
        let a = series("ETF", &[(1, 0.10)]);
        let b = series("IDX", &[(1, 0.04)]);
        let aligned = align_returns(&a, &b).unwrap();
        assert!((aligned.periods[0].alpha() - 0.06).abs() < 1e-12);
    }
}
