use etf_compare_core::alignment::align_returns;
use etf_compare_core::blend::{blend_fixed, blend_glide, glide_weights};
use etf_compare_core::compounding::cumulative;
use etf_compare_core::resample::{resample_monthly, MonthlyPriceMap};
use etf_compare_core::returns::{monthly_returns, MonthlyReturn, ReturnSeries};
use etf_compare_core::series::{normalize, RawPricePoint};
use etf_compare_core::stats::summarize;
use etf_compare_core::MonthKey;
use pretty_assertions::assert_eq;

fn month(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).unwrap()
}

/// A year of business-day-ish closes, delivered out of order with a few
/// invalid prints and duplicate days.
fn messy_year() -> Vec<RawPricePoint> {
    let mut raw = Vec::new();
    for m in (1..=12).rev() {
        for day in [3u32, 11, 19, 27] {
            let price = 100.0 + m as f64 + day as f64 / 100.0;
            raw.push(RawPricePoint::new(format!("2023-{m:02}-{day:02}"), price));
        }
        raw.push(RawPricePoint::new(format!("2023-{m:02}-05"), f64::NAN));
    }
    raw.push(RawPricePoint::new("2023-06-27 16:00:00", 200.0));
    raw
}

// ===========================================================================
// Normalisation
// ===========================================================================

#[test]
fn test_normalized_dates_strictly_increasing() {
    let series = normalize("X", &messy_year()).unwrap();
    assert_eq!(series.len(), 48);
    assert_eq!(series.skipped(), 12);
    assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn test_normalization_idempotent() {
    let once = normalize("X", &messy_year()).unwrap();
    let twice = normalize("X", &once.to_raw()).unwrap();
    assert_eq!(once.points(), twice.points());
}

// ===========================================================================
// Resampling and returns
// ===========================================================================

#[test]
fn test_month_end_is_last_observation() {
    let series = normalize("X", &messy_year()).unwrap();
    let monthly = resample_monthly(&series);
    assert_eq!(monthly.len(), 12);
    // Later-supplied duplicate of 2023-06-27 wins.
    assert_eq!(monthly.get(&month(2023, 6)), Some(200.0));
    let january = monthly.get(&month(2023, 1)).unwrap();
    assert!((january - 101.27).abs() < 1e-9);
}

#[test]
fn test_return_correctness() {
    let prices: MonthlyPriceMap = vec![
        (month(2024, 1), 100.0),
        (month(2024, 2), 110.0),
        (month(2024, 3), 99.0),
    ]
    .into_iter()
    .collect();
    let rets = monthly_returns("X", &prices).values();
    assert!((rets[0] - 0.10).abs() < 1e-12);
    assert!((rets[1] + 0.10).abs() < 1e-12);
}

// ===========================================================================
// Alignment, blending, compounding, statistics
// ===========================================================================

#[test]
fn test_alignment_intersection() {
    let a = ReturnSeries::new(
        "A",
        [1, 2, 3]
            .iter()
            .map(|&m| MonthlyReturn {
                month: month(2024, m),
                value: 0.01,
            })
            .collect(),
    )
    .unwrap();
    let b = ReturnSeries::new(
        "B",
        [2, 3, 4]
            .iter()
            .map(|&m| MonthlyReturn {
                month: month(2024, m),
                value: 0.02,
            })
            .collect(),
    )
    .unwrap();
    let aligned = align_returns(&a, &b).unwrap();
    assert_eq!(aligned.months(), vec![month(2024, 2), month(2024, 3)]);
}

#[test]
fn test_blend_boundaries() {
    let a = [0.031, -0.027, 0.0, 0.114];
    let b = [0.012, 0.004, -0.05, 0.02];
    assert_eq!(blend_fixed(&a, &b, 1.0), a.to_vec());
    assert_eq!(blend_fixed(&a, &b, 0.0), b.to_vec());

    let all_etf = vec![1.0; a.len()];
    assert_eq!(blend_glide(&a, &b, &all_etf), a.to_vec());
}

#[test]
fn test_glide_endpoints() {
    for n in 2usize..=240 {
        let w = glide_weights(n, 0.9, 0.6);
        assert_eq!(w.len(), n);
        assert_eq!(w[0], 0.9, "n = {n}");
        assert_eq!(w[n - 1], 0.6, "n = {n}");
    }
    for (start, end) in [(1.0, 0.0), (0.0, 1.0), (0.7, 0.3), (0.55, 0.55)] {
        for n in 2usize..=60 {
            let w = glide_weights(n, start, end);
            assert_eq!((w[0], w[n - 1]), (start, end), "n = {n}");
        }
    }
    assert_eq!(glide_weights(1, 0.9, 0.6), vec![0.6]);
}

#[test]
fn test_compounding() {
    let c = cumulative(100.0, &[0.1, -0.1]);
    assert!((c[0] - 110.0).abs() < 1e-9);
    assert!((c[1] - 99.0).abs() < 1e-9);
}

#[test]
fn test_statistics_exclusion() {
    let etf = [0.05, f64::NAN, 0.02, -0.01];
    let idx = [0.01, 0.0, 0.01, 0.0];
    let s = summarize(&etf, &idx).unwrap();
    assert_eq!(s.valid_periods, 3);
    let expected = (0.04 + 0.01 - 0.01) / 3.0;
    assert!((s.mean_alpha - expected).abs() < 1e-12);
}
