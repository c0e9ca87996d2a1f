//! ETF vs index comparison pipeline.
//!
//! Wires the stages together:
//! 1. **Resample** both normalised series to month-end closes
//! 2. **Returns** month over month for each
//! 3. **Align** on common months
//! 4. **Blend** into a fixed-weight and a glide-path portfolio
//! 5. **Compound** all four return streams from the same base
//! 6. **Summarise** tracking difference and the final outcome

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alignment::{align_returns, AlignedReturns};
use crate::blend::{apply_blends, BlendedPeriod};
use crate::compounding::CumulativeTable;
use crate::config::BlendConfig;
use crate::error::CompareError;
use crate::resample::{resample_monthly, MonthlyPriceMap};
use crate::returns::monthly_returns;
use crate::series::{normalize, Series};
use crate::source::{HistoryQuery, PriceSource};
use crate::stats::{summarize, SummaryStats};
use crate::types::*;
use crate::CompareResult;

/// Number of head and tail periods in a verification sample.
pub const DEFAULT_SAMPLE_LIMIT: usize = 3;

/// One reporting row: cumulative values, the month's alpha and glide weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub month: MonthKey,
    pub etf: f64,
    pub index: f64,
    pub alpha: f64,
    pub fixed_blend: f64,
    pub glide_blend: f64,
    pub glide_weight: f64,
}

/// Where the ETF finished relative to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Higher,
    Lower,
    Equal,
}

impl Relation {
    pub fn describe(&self) -> &'static str {
        match self {
            Relation::Higher => "higher than",
            Relation::Lower => "lower than",
            Relation::Equal => "equal to",
        }
    }
}

/// Final cumulative values of the ETF and the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub relation: Relation,
    pub etf_final: f64,
    pub index_final: f64,
}

/// Monthly closes and returns for a spot check of the alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRow {
    pub month: MonthKey,
    pub etf_close: Option<f64>,
    pub index_close: Option<f64>,
    pub etf_return: f64,
    pub index_return: f64,
    pub alpha: f64,
}

/// Full result of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub etf_symbol: String,
    pub index_symbol: String,
    pub config: BlendConfig,
    /// Aligned monthly returns with both blends.
    pub periods: Vec<BlendedPeriod>,
    /// Reporting rows; periods with a non-finite alpha are left out.
    pub rows: Vec<ReportRow>,
    pub summary: SummaryStats,
    pub outcome: Outcome,
    /// First and last aligned periods with their monthly closes.
    pub verification: Vec<VerificationRow>,
}

/// Fetch a symbol's history from `source` and normalise it.
pub fn load_series<S: PriceSource + ?Sized>(
    source: &S,
    symbol: &str,
    query: &HistoryQuery,
) -> CompareResult<Series> {
    let raw = source.fetch(symbol, query).map_err(|e| match e {
        CompareError::DataRetrieval { .. } => e,
        other => CompareError::DataRetrieval {
            symbol: symbol.to_string(),
            reason: other.to_string(),
        },
    })?;
    normalize(symbol, &raw)
}

/// Compare an ETF against its index and the two blended portfolios.
pub fn compare(
    etf: &Series,
    index: &Series,
    config: &BlendConfig,
) -> CompareResult<ComputationOutput<ComparisonReport>> {
    let start = Instant::now();
    config.validate()?;

    let mut warnings: Vec<String> = Vec::new();
    for series in [etf, index] {
        if series.skipped() > 0 {
            warnings.push(format!(
                "Ticker {}: skipped {} invalid close points",
                series.symbol(),
                series.skipped()
            ));
        }
    }

    let etf_monthly = resample_monthly(etf);
    let index_monthly = resample_monthly(index);
    let etf_returns = monthly_returns(etf.symbol(), &etf_monthly);
    let index_returns = monthly_returns(index.symbol(), &index_monthly);

    let aligned = align_returns(&etf_returns, &index_returns)?;
    if aligned.is_empty() {
        return Err(CompareError::NoOverlap {
            etf: etf.symbol().to_string(),
            index: index.symbol().to_string(),
        });
    }
    let dropped = etf_returns.len() + index_returns.len() - 2 * aligned.len();
    if dropped > 0 {
        warnings.push(format!(
            "{} monthly returns without a counterpart were dropped during alignment",
            dropped
        ));
    }

    let periods = apply_blends(
        &aligned,
        config.fixed_weight_f64(),
        config.glide_start_f64(),
        config.glide_end_f64(),
    );
    let cumulative = CumulativeTable::from_periods(config.base_value, &periods);
    let summary = summarize(&aligned.etf_returns(), &aligned.index_returns())?;
    let rows = report_rows(&periods, &cumulative);
    let outcome = final_outcome(&cumulative)?;
    let verification =
        verification_sample(&aligned, &etf_monthly, &index_monthly, DEFAULT_SAMPLE_LIMIT);

    debug!(
        periods = periods.len(),
        rows = rows.len(),
        "comparison tables built"
    );
    info!(
        etf = etf.symbol(),
        index = index.symbol(),
        wins = summary.wins,
        valid = summary.valid_periods,
        mean_alpha = summary.mean_alpha,
        "tracking difference computed"
    );

    let report = ComparisonReport {
        etf_symbol: etf.symbol().to_string(),
        index_symbol: index.symbol().to_string(),
        config: config.clone(),
        periods,
        rows,
        summary,
        outcome,
        verification,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Month-end returns aligned on calendar month; fixed and linear glide-path blends; compounded from a common base",
        &serde_json::json!({
            "fixed_weight": config.fixed_weight.to_string(),
            "glide_start": config.glide_start.to_string(),
            "glide_end": config.glide_end.to_string(),
            "base_value": config.base_value,
            "month_close": "last observation in calendar month",
            "glide_schedule": "linear by aligned period position",
        }),
        warnings,
        elapsed,
        report,
    ))
}

/// Rows for reporting; a period with a non-finite alpha gets no row.
fn report_rows(periods: &[BlendedPeriod], cumulative: &CumulativeTable) -> Vec<ReportRow> {
    periods
        .iter()
        .enumerate()
        .filter(|(_, p)| p.alpha().is_finite())
        .map(|(i, p)| ReportRow {
            month: p.month,
            etf: cumulative.etf[i],
            index: cumulative.index[i],
            alpha: p.alpha(),
            fixed_blend: cumulative.fixed_blend[i],
            glide_blend: cumulative.glide_blend[i],
            glide_weight: p.glide_weight,
        })
        .collect()
}

fn final_outcome(cumulative: &CumulativeTable) -> CompareResult<Outcome> {
    let (etf_final, index_final) = cumulative
        .final_values()
        .filter(|(e, i)| !e.is_nan() && !i.is_nan())
        .ok_or_else(|| {
            CompareError::InsufficientData("Final comparison not available".into())
        })?;
    let relation = if etf_final > index_final {
        Relation::Higher
    } else if etf_final < index_final {
        Relation::Lower
    } else {
        Relation::Equal
    };
    Ok(Outcome {
        relation,
        etf_final,
        index_final,
    })
}

/// The first and last `limit` aligned periods with their monthly closes.
///
/// When the table has no more than `2 * limit` periods every period is
/// returned once.
pub fn verification_sample(
    aligned: &AlignedReturns,
    etf_monthly: &MonthlyPriceMap,
    index_monthly: &MonthlyPriceMap,
    limit: usize,
) -> Vec<VerificationRow> {
    let n = aligned.len();
    let indices: Vec<usize> = if n <= 2 * limit {
        (0..n).collect()
    } else {
        (0..limit).chain(n - limit..n).collect()
    };
    indices
        .into_iter()
        .map(|i| {
            let p = &aligned.periods[i];
            VerificationRow {
                month: p.month,
                etf_close: etf_monthly.get(&p.month),
                index_close: index_monthly.get(&p.month),
                etf_return: p.etf,
                index_return: p.index,
                alpha: p.alpha(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignedPeriod;
    use crate::series::RawPricePoint;
    use crate::source::InMemorySource;
    use chrono::NaiveDate;

    fn series(symbol: &str, closes: &[(&str, f64)]) -> Series {
        let raw: Vec<RawPricePoint> = closes
            .iter()
            .map(|(d, p)| RawPricePoint::new(*d, *p))
            .collect();
        normalize(symbol, &raw).unwrap()
    }

    #[test]
    fn test_no_overlap_is_error() {
        let etf = series("ETF", &[("2024-01-31", 100.0), ("2024-02-29", 101.0)]);
        let idx = series("IDX", &[("2024-05-31", 100.0), ("2024-06-28", 101.0)]);
        match compare(&etf, &idx, &BlendConfig::default()) {
            Err(CompareError::NoOverlap { etf, index }) => {
                assert_eq!(etf, "ETF");
                assert_eq!(index, "IDX");
            }
            other => panic!("Expected NoOverlap, got {:?}", other.map(|o| o.result.rows)),
        }
    }

    #[test]
    fn test_invalid_weight_rejected_before_running() {
        let etf = series("ETF", &[("2024-01-31", 100.0), ("2024-02-29", 101.0)]);
        let cfg = BlendConfig {
            glide_start: rust_decimal_macros::dec!(1.5),
            ..BlendConfig::default()
        };
        assert!(matches!(
            compare(&etf, &etf, &cfg),
            Err(CompareError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_skipped_points_reported_as_warnings() {
        let raw = vec![
            RawPricePoint::new("2024-01-31", 100.0),
            RawPricePoint::new("2024-02-15", f64::NAN),
            RawPricePoint::new("2024-02-29", 101.0),
        ];
        let etf = normalize("ETF", &raw).unwrap();
        let idx = series("IDX", &[("2024-01-31", 50.0), ("2024-02-29", 51.0)]);
        let out = compare(&etf, &idx, &BlendConfig::default()).unwrap();
        let skipped: Vec<&String> = out
            .warnings
            .iter()
            .filter(|w| w.contains("skipped"))
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("ETF") && skipped[0].contains("skipped 1"));
    }

    #[test]
    fn test_outcome_relation() {
        let etf = series("ETF", &[("2024-01-31", 100.0), ("2024-02-29", 90.0)]);
        let idx = series("IDX", &[("2024-01-31", 100.0), ("2024-02-29", 95.0)]);
        let out = compare(&etf, &idx, &BlendConfig::default()).unwrap();
        assert_eq!(out.result.outcome.relation, Relation::Lower);
        assert_eq!(out.result.outcome.relation.describe(), "lower than");
    }

    #[test]
    fn test_identical_series_are_equal() {
        let etf = series("ETF", &[("2024-01-31", 100.0), ("2024-02-29", 90.0)]);
        let out = compare(&etf, &etf, &BlendConfig::default()).unwrap();
        assert_eq!(out.result.outcome.relation, Relation::Equal);
        assert_eq!(out.result.summary.wins, 0);
        assert_eq!(out.result.summary.mean_alpha, 0.0);
    }

    #[test]
    fn test_verification_sample_head_and_tail() {
        let periods: Vec<AlignedPeriod> = (1..=8)
            .map(|m| AlignedPeriod {
                month: MonthKey::new(2024, m).unwrap(),
                etf: 0.01,
                index: 0.0,
            })
            .collect();
        let aligned = AlignedReturns {
            etf_label: "ETF".into(),
            index_label: "IDX".into(),
            periods,
        };
        let empty = MonthlyPriceMap::default();
        let sample = verification_sample(&aligned, &empty, &empty, 3);
        let months: Vec<u32> = sample.iter().map(|r| r.month.month()).collect();
        assert_eq!(months, vec![1, 2, 3, 6, 7, 8]);
        assert_eq!(sample[0].etf_close, None);
    }

    #[test]
    fn test_verification_sample_short_table() {
        let aligned = AlignedReturns {
            etf_label: "ETF".into(),
            index_label: "IDX".into(),
            periods: vec![AlignedPeriod {
                month: MonthKey::new(2024, 1).unwrap(),
                etf: 0.01,
                index: 0.0,
            }],
        };
        let closes: MonthlyPriceMap = vec![(MonthKey::new(2024, 1).unwrap(), 42.0)]
            .into_iter()
            .collect();
        let sample = verification_sample(&aligned, &closes, &closes, 3);
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].etf_close, Some(42.0));
    }

    #[test]
    fn test_load_series_wraps_source_errors() {
        let source = InMemorySource::new();
        let query = HistoryQuery::new(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert!(matches!(
            load_series(&source, "SPY", &query),
            Err(CompareError::DataRetrieval { .. })
        ));
    }

    #[test]
    fn test_load_series_propagates_date_errors() {
        let source = InMemorySource::new()
            .with_series("SPY", vec![RawPricePoint::new("31/01/2024", 1.0)]);
        let query = HistoryQuery::new(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        assert!(matches!(
            load_series(&source, "SPY", &query),
            Err(CompareError::DateParse { .. })
        ));
    }
}
