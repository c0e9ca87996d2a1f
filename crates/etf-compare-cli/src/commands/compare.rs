use std::fs::File;
use std::io::BufWriter;

use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::{builder::Builder, Table};
use tracing::{info, warn};

use etf_compare_core::comparison::{self, ComparisonReport, DEFAULT_SAMPLE_LIMIT};
use etf_compare_core::source::{HistoryQuery, PriceSource, DEFAULT_INTERVAL};
use etf_compare_core::BlendConfig;

use crate::input;
use crate::input::prices::{DirectorySource, PriceFile};
use crate::output::{csv_out, html};

/// Arguments for the ETF vs index comparison
#[derive(Args)]
pub struct CompareArgs {
    /// ETF symbol
    #[arg(long, default_value = "SPY")]
    pub etf: String,

    /// Reference index symbol
    #[arg(long, default_value = "^990100-USD-STRD")]
    pub index: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "2019-01-01")]
    pub start: NaiveDate,

    /// Sampling interval requested from the price source
    #[arg(long, default_value = DEFAULT_INTERVAL)]
    pub interval: String,

    /// ETF weight of the fixed ("LifeStrategy") blend
    #[arg(long, default_value = "0.80")]
    pub life_etf: Decimal,

    /// ETF weight at the start of the glide path
    #[arg(long, default_value = "0.90")]
    pub glide_start: Decimal,

    /// ETF weight at the end of the glide path
    #[arg(long, default_value = "0.60")]
    pub glide_end: Decimal,

    /// Directory holding <SYMBOL>.csv or <SYMBOL>.json price files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Price file for the ETF (overrides --data-dir)
    #[arg(long)]
    pub etf_file: Option<String>,

    /// Price file for the index (overrides --data-dir)
    #[arg(long)]
    pub index_file: Option<String>,

    /// Write the report rows as CSV to this path
    #[arg(long)]
    pub out: Option<String>,

    /// Write an HTML report with charts to this path
    #[arg(long)]
    pub html: Option<String>,

    /// Print sample monthly closes and returns to stderr
    #[arg(long)]
    pub verify: bool,

    /// Path to a JSON request (overrides symbol, date and weight flags); "-" reads stdin
    #[arg(long)]
    pub input: Option<String>,
}

/// What to compare, over which history, with which weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub etf: String,
    pub index: String,
    pub query: HistoryQuery,
    #[serde(default)]
    pub blend: BlendConfig,
}

impl CompareRequest {
    fn from_args(args: &CompareArgs) -> Self {
        CompareRequest {
            etf: args.etf.clone(),
            index: args.index.clone(),
            query: HistoryQuery {
                start: args.start,
                interval: args.interval.clone(),
            },
            blend: BlendConfig::new(args.life_etf, args.glide_start, args.glide_end),
        }
    }
}

fn resolve_request(args: &CompareArgs) -> Result<CompareRequest, Box<dyn std::error::Error>> {
    match args.input.as_deref() {
        Some("-") => input::stdin::read_stdin()?
            .ok_or_else(|| "--input - requires a JSON request on stdin".into()),
        Some(path) => input::file::read_json(path),
        None => Ok(CompareRequest::from_args(args)),
    }
}

fn source_for(file: Option<&str>, data_dir: &str) -> Box<dyn PriceSource> {
    match file {
        Some(path) => Box::new(PriceFile::new(path)),
        None => Box::new(DirectorySource::new(data_dir)),
    }
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(&args)?;
    request.blend.validate()?;

    let etf_source = source_for(args.etf_file.as_deref(), &args.data_dir);
    let index_source = source_for(args.index_file.as_deref(), &args.data_dir);

    let etf = comparison::load_series(etf_source.as_ref(), &request.etf, &request.query)
        .map_err(|e| format!("ETF error: {}", e))?;
    let index = comparison::load_series(index_source.as_ref(), &request.index, &request.query)
        .map_err(|e| format!("Index error: {}", e))?;

    let output = comparison::compare(&etf, &index, &request.blend)?;
    for warning in &output.warnings {
        warn!("{}", warning);
    }

    let report = &output.result;
    if args.verify {
        print_verification(report);
    }
    print_summary(report);

    if let Some(ref path) = args.html {
        let written = html::write_html_report(path, report, &request.query)
            .map_err(|e| format!("HTML report error: {}", e))?;
        eprintln!("HTML report: {}", written.display());
    }

    let mut value = serde_json::to_value(&output)?;
    if let Some(ref path) = args.out {
        let file = File::create(path)
            .map_err(|e| format!("Cannot create output file '{}': {}", path, e))?;
        csv_out::write_report_csv(BufWriter::new(file), &report.rows)?;
        info!(path = %path, rows = report.rows.len(), "wrote CSV report");
        detach_rows(&mut value, path);
    }

    Ok(value)
}

/// The report rows went to `path`: drop them from what stdout renders.
fn detach_rows(value: &mut Value, path: &str) {
    if let Some(Value::Object(result)) = value.get_mut("result") {
        result.remove("rows");
        result.insert("report_path".into(), Value::String(path.to_string()));
    }
}

fn print_summary(report: &ComparisonReport) {
    let s = &report.summary;
    eprintln!(
        "Tracking difference: ETF>index={}/{}, avg={:.5}",
        s.wins, s.valid_periods, s.mean_alpha
    );
    let o = &report.outcome;
    eprintln!(
        "Result: {} is {} index ({:.2} vs {:.2})",
        report.etf_symbol,
        o.relation.describe(),
        o.etf_final,
        o.index_final
    );
}

fn print_verification(report: &ComparisonReport) {
    let mut builder = Builder::default();
    builder.push_record([
        "Date",
        "ETF_Close",
        "Index_Close",
        "ETF_Return",
        "Index_Return",
        "Alpha",
    ]);
    for record in verification_records(report) {
        builder.push_record(record);
    }
    eprintln!("VERIFY sample rows (monthly closes and returns):");
    eprintln!("{}", Table::from(builder));
}

/// Verification rows as text, with a `...` row where periods were elided.
fn verification_records(report: &ComparisonReport) -> Vec<[String; 6]> {
    let fmt_close = |c: Option<f64>| c.map(|v| format!("{:.2}", v)).unwrap_or_default();
    let elided = report.periods.len() > report.verification.len();

    let mut records: Vec<[String; 6]> = Vec::with_capacity(report.verification.len() + 1);
    for (i, row) in report.verification.iter().enumerate() {
        if elided && i == DEFAULT_SAMPLE_LIMIT {
            records.push(std::array::from_fn(|_| "...".to_string()));
        }
        records.push([
            row.month.to_string(),
            fmt_close(row.etf_close),
            fmt_close(row.index_close),
            format!("{:.5}", row.etf_return),
            format!("{:.5}", row.index_return),
            format!("{:.5}", row.alpha),
        ]);
    }
    records
}
