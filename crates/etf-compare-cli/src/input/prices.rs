//! File-backed price sources.
//!
//! Supported layouts:
//! - CSV with a header row containing `date` and `close` (or `price`)
//!   columns; other columns are ignored. Empty, `null` or non-numeric closes
//!   are read as NaN and dropped during normalisation.
//! - JSON object mapping date strings to closes, `null` allowed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use etf_compare_core::series::RawPricePoint;
use etf_compare_core::source::{HistoryQuery, PriceSource};
use etf_compare_core::{CompareError, CompareResult};

use crate::input::file::resolve_path;

const EXTENSIONS: [&str; 2] = ["csv", "json"];

#[derive(Debug, Deserialize)]
struct CsvPriceRecord {
    #[serde(alias = "Date", alias = "DATE", alias = "timestamp")]
    date: String,
    #[serde(alias = "Close", alias = "CLOSE", alias = "price", alias = "Price")]
    close: Option<String>,
}

fn retrieval_error(symbol: &str, reason: impl Into<String>) -> CompareError {
    CompareError::DataRetrieval {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

fn parse_close(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Read every record of a CSV price file.
pub fn read_csv_prices(symbol: &str, path: &Path) -> CompareResult<Vec<RawPricePoint>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| retrieval_error(symbol, format!("{}: {}", path.display(), e)))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: CsvPriceRecord =
            row.map_err(|e| retrieval_error(symbol, format!("{}: {}", path.display(), e)))?;
        records.push(RawPricePoint::new(
            row.date.trim(),
            parse_close(row.close.as_deref()),
        ));
    }
    Ok(records)
}

/// Read every record of a JSON `{ "date": close }` price file.
pub fn read_json_prices(symbol: &str, path: &Path) -> CompareResult<Vec<RawPricePoint>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| retrieval_error(symbol, format!("{}: {}", path.display(), e)))?;
    let map: BTreeMap<String, Option<f64>> = serde_json::from_str(&contents)
        .map_err(|e| retrieval_error(symbol, format!("{}: {}", path.display(), e)))?;
    Ok(map
        .into_iter()
        .map(|(date, close)| RawPricePoint::new(date, close.unwrap_or(f64::NAN)))
        .collect())
}

fn read_prices(symbol: &str, path: &Path) -> CompareResult<Vec<RawPricePoint>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => read_csv_prices(symbol, path),
        Some("json") => read_json_prices(symbol, path),
        _ => Err(retrieval_error(
            symbol,
            format!(
                "Unsupported price file '{}'. Use .csv or .json",
                path.display()
            ),
        )),
    }
}

/// A single price file serving one symbol.
#[derive(Debug, Clone)]
pub struct PriceFile {
    path: PathBuf,
}

impl PriceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PriceFile { path: path.into() }
    }
}

impl PriceSource for PriceFile {
    fn fetch(&self, symbol: &str, query: &HistoryQuery) -> CompareResult<Vec<RawPricePoint>> {
        let path = resolve_path(&self.path).map_err(|e| retrieval_error(symbol, e))?;
        let records = read_prices(symbol, &path)?;
        debug!(symbol, path = %path.display(), records = records.len(), "read price file");
        Ok(records.into_iter().filter(|r| query.includes(r)).collect())
    }
}

/// A directory holding one `<SYMBOL>.csv` or `<SYMBOL>.json` per symbol.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource { dir: dir.into() }
    }

    fn locate(&self, symbol: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", symbol, ext)))
            .find(|p| p.is_file())
    }
}

impl PriceSource for DirectorySource {
    fn fetch(&self, symbol: &str, query: &HistoryQuery) -> CompareResult<Vec<RawPricePoint>> {
        let path = self.locate(symbol).ok_or_else(|| {
            retrieval_error(
                symbol,
                format!(
                    "no {}.csv or {}.json in {}",
                    symbol,
                    symbol,
                    self.dir.display()
                ),
            )
        })?;
        PriceFile::new(path).fetch(symbol, query)
    }
}
