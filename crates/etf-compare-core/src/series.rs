//! Price series normalisation.
//!
//! Turns the raw `(date string, price)` records delivered by a price source
//! into a validated [`Series`]: invalid prices dropped, dates parsed to UTC
//! calendar days, sorted ascending with one point per day.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompareError;
use crate::CompareResult;

/// Accepted date-only format, tried first.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted date-time format, tried when [`DATE_FORMAT`] does not match.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A price record exactly as a source supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub date: String,
    pub price: f64,
}

impl RawPricePoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        RawPricePoint {
            date: date.into(),
            price,
        }
    }
}

/// A validated closing price on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A normalised price series: strictly increasing dates, positive finite prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    points: Vec<PricePoint>,
    skipped: usize,
}

impl Series {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of raw records dropped for a NaN, infinite or non-positive price.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Render the series back into raw records (`YYYY-MM-DD` dates).
    pub fn to_raw(&self) -> Vec<RawPricePoint> {
        self.points
            .iter()
            .map(|p| RawPricePoint::new(p.date.format(DATE_FORMAT).to_string(), p.price))
            .collect()
    }
}

/// Parse a source date string as a UTC calendar day.
///
/// `YYYY-MM-DD` is tried first, then `YYYY-MM-DD HH:MM:SS`; the time of day
/// is discarded.
pub fn parse_price_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

/// Whether a price may enter the pipeline.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Normalise raw price records into a [`Series`].
///
/// Invalid prices are skipped and counted. An unparseable date fails the
/// whole series with [`CompareError::DateParse`]. When two records fall on the
/// same day the later-supplied one is kept.
pub fn normalize(symbol: &str, raw: &[RawPricePoint]) -> CompareResult<Series> {
    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;

    for record in raw {
        if !is_valid_price(record.price) {
            skipped += 1;
            continue;
        }
        let date = parse_price_date(&record.date).ok_or_else(|| CompareError::DateParse {
            symbol: symbol.to_string(),
            value: record.date.clone(),
        })?;
        points.push(PricePoint {
            date,
            price: record.price,
        });
    }

    // Stable sort keeps supply order among same-day records.
    points.sort_by_key(|p| p.date);

    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }

    debug!(
        symbol,
        raw = raw.len(),
        kept = deduped.len(),
        skipped,
        "normalised price series"
    );

    Ok(Series {
        symbol: symbol.to_string(),
        points: deduped,
        skipped,
    })
}
