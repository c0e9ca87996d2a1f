//! Price data sources.
//!
//! Retrieval itself is a collaborator concern: the engine only asks a
//! [`PriceSource`] for raw `(date, price)` records. Implementations surface
//! their failures as [`CompareError::DataRetrieval`] and do not retry.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::series::{parse_price_date, RawPricePoint};
use crate::CompareResult;

/// Default sampling interval requested from a source.
pub const DEFAULT_INTERVAL: &str = "1d";

/// What history a source should return. Consumed only by sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub start: NaiveDate,
    #[serde(default = "default_interval")]
    pub interval: String,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

impl HistoryQuery {
    pub fn new(start: NaiveDate) -> Self {
        HistoryQuery {
            start,
            interval: default_interval(),
        }
    }

    /// Whether a raw record belongs to the requested history.
    ///
    /// Records whose date cannot be read are kept so that normalisation can
    /// report them.
    pub fn includes(&self, record: &RawPricePoint) -> bool {
        parse_price_date(&record.date).map_or(true, |date| date >= self.start)
    }
}

/// A provider of raw daily closes for a symbol.
pub trait PriceSource {
    fn fetch(&self, symbol: &str, query: &HistoryQuery) -> CompareResult<Vec<RawPricePoint>>;
}

impl<S: PriceSource + ?Sized> PriceSource for &S {
    fn fetch(&self, symbol: &str, query: &HistoryQuery) -> CompareResult<Vec<RawPricePoint>> {
        (**self).fetch(symbol, query)
    }
}

/// Price source backed by records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, Vec<RawPricePoint>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, records: Vec<RawPricePoint>) -> Self {
        self.insert(symbol, records);
        self
    }

    pub fn insert(&mut self, symbol: &str, records: Vec<RawPricePoint>) {
        self.series.insert(symbol.to_string(), records);
    }
}

impl PriceSource for InMemorySource {
    fn fetch(&self, symbol: &str, query: &HistoryQuery) -> CompareResult<Vec<RawPricePoint>> {
        let records = self
            .series
            .get(symbol)
            .ok_or_else(|| CompareError::DataRetrieval {
                symbol: symbol.to_string(),
                reason: "no price history available".into(),
            })?;
        Ok(records
            .iter()
            .filter(|r| query.includes(r))
            .cloned()
            .collect())
    }
}
