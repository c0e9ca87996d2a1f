//! Month-end resampling.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::series::Series;
use crate::types::MonthKey;

/// Last observed price per calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyPriceMap {
    prices: BTreeMap<MonthKey, f64>,
}

impl MonthlyPriceMap {
    /// Record `price` for `month`, replacing any earlier entry.
    pub fn insert(&mut self, month: MonthKey, price: f64) {
        self.prices.insert(month, price);
    }

    pub fn get(&self, month: &MonthKey) -> Option<f64> {
        self.prices.get(month).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Month keys in ascending calendar order.
    ///
    /// Every ordered traversal of the map goes through this step.
    pub fn sorted_keys(&self) -> Vec<MonthKey> {
        self.prices.keys().copied().collect()
    }
}

impl FromIterator<(MonthKey, f64)> for MonthlyPriceMap {
    fn from_iter<I: IntoIterator<Item = (MonthKey, f64)>>(iter: I) -> Self {
        let mut map = MonthlyPriceMap::default();
        for (month, price) in iter {
            map.insert(month, price);
        }
        map
    }
}

/// Reduce a daily series to one price per month.
///
/// The series is ascending, so the chronologically last point of each month
/// overwrites earlier ones. This gives month-end closes without assuming the
/// last trading day of a month.
pub fn resample_monthly(series: &Series) -> MonthlyPriceMap {
    let mut map = MonthlyPriceMap::default();
    for point in series.points() {
        map.insert(MonthKey::of(point.date), point.price);
    }
    debug!(
        symbol = series.symbol(),
        months = map.len(),
        "resampled to monthly closes"
    );
    map
}
