use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompareError;
use crate::resample::MonthlyPriceMap;
use crate::types::MonthKey;
use crate::CompareResult;

/// Return earned over the month ending at `month`, as a decimal (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub month: MonthKey,
    pub value: f64,
}

/// Month-over-month returns with strictly increasing month keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    label: String,
    points: Vec<MonthlyReturn>,
}

impl ReturnSeries {
    /// Build a series from caller-supplied returns, rejecting unordered or
    /// repeated months.
    pub fn new(label: impl Into<String>, points: Vec<MonthlyReturn>) -> CompareResult<Self> {
        let label = label.into();
        if !is_strictly_increasing(&points) {
            return Err(CompareError::InvalidInput {
                field: label,
                reason: "Return months must be strictly increasing".into(),
            });
        }
        Ok(ReturnSeries { label, points })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[MonthlyReturn] {
        &self.points
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.points.iter().map(|p| p.month).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        is_strictly_increasing(&self.points)
    }
}

fn is_strictly_increasing(points: &[MonthlyReturn]) -> bool {
    points.windows(2).all(|w| w[0].month < w[1].month)
}

/// Convert monthly closes into month-over-month returns.
///
/// `r_i = p_i / p_{i-1} - 1` over the sorted month keys. A period whose
/// previous close is exactly zero is omitted. Fewer than two months yields an
/// empty series; whether that is fatal is the caller's decision.
pub fn monthly_returns(label: &str, prices: &MonthlyPriceMap) -> ReturnSeries {
    let keys = prices.sorted_keys();
    let mut points = Vec::with_capacity(keys.len().saturating_sub(1));

    for pair in keys.windows(2) {
        let (prev_month, month) = (pair[0], pair[1]);
        let (Some(p0), Some(p1)) = (prices.get(&prev_month), prices.get(&month)) else {
            continue;
        };
        if p0 == 0.0 {
            continue;
        }
        points.push(MonthlyReturn {
            month,
            value: p1 / p0 - 1.0,
        });
    }

    debug!(label, periods = points.len(), "computed monthly returns");

    ReturnSeries {
        label: label.to_string(),
        points,
    }
}
