use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use etf_compare_core::comparison;
use etf_compare_core::resample::resample_monthly;
use etf_compare_core::returns::monthly_returns;
use etf_compare_core::source::{HistoryQuery, PriceSource, DEFAULT_INTERVAL};
use etf_compare_core::MonthKey;

use crate::input::prices::{DirectorySource, PriceFile};

/// Arguments for single-symbol monthly returns
#[derive(Args)]
pub struct ReturnsArgs {
    /// Symbol to load
    #[arg(long)]
    pub symbol: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "2019-01-01")]
    pub start: NaiveDate,

    /// Directory holding <SYMBOL>.csv or <SYMBOL>.json price files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Price file for the symbol (overrides --data-dir)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
struct MonthlyRow {
    month: MonthKey,
    close: f64,
    #[serde(rename = "return")]
    monthly_return: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ReturnsOutput {
    symbol: String,
    daily_points: usize,
    skipped_points: usize,
    months: usize,
    rows: Vec<MonthlyRow>,
}

pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let source: Box<dyn PriceSource> = match args.file {
        Some(ref path) => Box::new(PriceFile::new(path)),
        None => Box::new(DirectorySource::new(&args.data_dir)),
    };
    let query = HistoryQuery {
        start: args.start,
        interval: DEFAULT_INTERVAL.to_string(),
    };

    let series = comparison::load_series(source.as_ref(), &args.symbol, &query)?;
    let monthly = resample_monthly(&series);
    let returns = monthly_returns(series.symbol(), &monthly);

    let rows: Vec<MonthlyRow> = monthly
        .sorted_keys()
        .into_iter()
        .filter_map(|month| {
            let close = monthly.get(&month)?;
            let monthly_return = returns
                .points()
                .iter()
                .find(|r| r.month == month)
                .map(|r| r.value);
            Some(MonthlyRow {
                month,
                close,
                monthly_return,
            })
        })
        .collect();

    let output = ReturnsOutput {
        symbol: series.symbol().to_string(),
        daily_points: series.len(),
        skipped_points: series.skipped(),
        months: monthly.len(),
        rows,
    };
    Ok(serde_json::to_value(output)?)
}
