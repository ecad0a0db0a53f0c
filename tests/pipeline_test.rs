use std::time::Duration;

use chrono::NaiveDate;
use rand::prelude::*;
use serde_json::json;

use tsprep::pipeline::{OutlierMethod, PipelineConfig, TransformKind};
use tsprep::remote::{ImputationRequest, ImputationResponse, ImputationService, LocalImputer};
use tsprep::{Error, Pipeline, RawRow, Result, Series, Stats};

fn rows(pairs: &[(&str, f64)]) -> Vec<RawRow> {
    pairs
        .iter()
        .map(|(date, value)| {
            [
                ("date".to_string(), json!(date)),
                ("sales".to_string(), json!(value)),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

fn daily_rows(values: &[f64]) -> Vec<RawRow> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let date = start + chrono::Days::new(i as u64);
            [
                ("date".to_string(), json!(date.format("%Y-%m-%d").to_string())),
                ("sales".to_string(), json!(value)),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

#[test]
fn imputation_fills_every_grid_slot() {
    let input = rows(&[("2024-01-01", 10.0), ("2024-01-03", 30.0)]);
    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    assert_eq!(result.series.numeric_values(), vec![10.0, 20.0, 30.0]);
    let dates: Vec<NaiveDate> = result.series.iter().filter_map(|p| p.timestamp).collect();
    assert_eq!(dates.len(), 3);
    for pair in dates.windows(2) {
        assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
    }
}

#[test]
fn outlier_filter_drops_the_spike() {
    let input = daily_rows(&[1.0, 2.0, 3.0, 4.0, 100.0]);
    let mut config = PipelineConfig::default();
    config.outliers.enabled = true;
    config.outliers.threshold = 1.5;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    assert_eq!(result.series.numeric_values(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn outlier_filter_mad_survives_skew() {
    // Mean/std are dragged by the spike; MAD is not.
    let input = daily_rows(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 500.0]);
    let mut config = PipelineConfig::default();
    config.outliers.enabled = true;
    config.outliers.method = OutlierMethod::Mad;
    config.outliers.threshold = 3.0;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    assert!(!result.series.numeric_values().contains(&500.0));
    assert_eq!(result.series.len(), 6);
}

#[test]
fn smoothing_matches_trailing_window() {
    let input = daily_rows(&[1.0, 2.0, 3.0, 4.0]);
    let mut config = PipelineConfig::default();
    config.smoothing.enabled = true;
    config.smoothing.window = 2;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    assert_eq!(result.series.numeric_values(), vec![1.0, 1.5, 2.5, 3.5]);
}

#[test]
fn log_transform_marks_out_of_domain_as_non_finite() {
    let input = daily_rows(&[0.0, 1.0, std::f64::consts::E]);
    let mut config = PipelineConfig::default();
    config.transform.enabled = true;
    config.transform.kind = TransformKind::Log;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    let values = result.series.values();
    assert_eq!(values[0], Some(f64::NEG_INFINITY));
    assert_eq!(values[1], Some(0.0));
    assert!((values[2].unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn difference_and_stationary_shrink_by_one() {
    for kind in [TransformKind::Difference, TransformKind::Stationary] {
        let input = daily_rows(&[1.0, 2.0, 4.0, 8.0]);
        let mut config = PipelineConfig::default();
        config.transform.enabled = true;
        config.transform.kind = kind;
        let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
        assert_eq!(result.series.len(), 3, "{:?}", kind);
    }
}

#[test]
fn decomposition_components_sum_back_to_the_value() {
    let input = daily_rows(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
    let mut config = PipelineConfig::default();
    config.decomposition.enabled = true;
    config.decomposition.window = 3;
    config.decomposition.keep_components = true;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    let trend = result.trend.unwrap();
    let seasonal = result.seasonal.unwrap();
    for (i, point) in result.series.iter().enumerate() {
        let value = point.value.unwrap();
        assert!(
            (trend[i] + seasonal[i] - value).abs() <= 1e-9 * value.abs().max(1.0),
            "round trip broken at index {}",
            i
        );
    }
}

#[test]
fn decomposition_replace_mode_swaps_values_for_trend() {
    let input = daily_rows(&[2.0, 4.0, 6.0, 8.0]);
    let mut config = PipelineConfig::default();
    config.decomposition.enabled = true;
    config.decomposition.window = 2;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    assert_eq!(result.series.numeric_values(), vec![2.0, 3.0, 5.0, 7.0]);
    assert_eq!(result.seasonal.unwrap(), vec![0.0, 1.0, 1.0, 1.0]);
}

#[test]
fn normalization_hits_both_bounds_and_is_idempotent() {
    let input = daily_rows(&[5.0, 10.0, 0.0, 7.5]);
    let mut config = PipelineConfig::default();
    config.normalization.enabled = true;
    let pipeline = Pipeline::new(config);
    let once = pipeline.run(&input, "date", "sales").unwrap();
    let values = once.series.numeric_values();
    assert!(values.contains(&0.0));
    assert!(values.contains(&1.0));
    assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));

    let again = pipeline
        .run(&once.series.to_rows("date", "sales"), "date", "sales")
        .unwrap();
    assert_eq!(again.series.numeric_values(), values);
}

#[test]
fn full_chain_on_noisy_data_stays_in_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<f64> = (0..120)
        .map(|i| 50.0 + (i as f64 / 10.0).sin() * 5.0 + rng.random_range(-1.0..1.0))
        .collect();
    let input = daily_rows(&values);

    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    config.outliers.enabled = true;
    config.outliers.threshold = 3.0;
    config.smoothing.enabled = true;
    config.smoothing.window = 5;
    config.normalization.enabled = true;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();

    assert!(!result.series.is_empty());
    assert!(result.series.len() <= 120);
    for v in result.series.numeric_values() {
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn extra_columns_survive_the_whole_chain() {
    let mut input = daily_rows(&[1.0, 2.0, 3.0]);
    for row in &mut input {
        row.insert("region".to_string(), json!("north"));
    }
    let mut config = PipelineConfig::default();
    config.smoothing.enabled = true;
    config.smoothing.window = 2;
    config.normalization.enabled = true;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    let back = result.series.to_rows("date", "sales");
    assert!(back.iter().all(|r| r.get("region") == Some(&json!("north"))));
}

#[test]
fn stats_describe_the_final_column() {
    let input = daily_rows(&[1.0, 2.0, 3.0, 4.0]);
    let result = Pipeline::default().run(&input, "date", "sales").unwrap();
    let stats = Stats::from_series(&result.series).unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.mean, 2.5);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 4.0);
}

struct FailingImputer(Error);

impl ImputationService for FailingImputer {
    fn impute(&self, _request: &ImputationRequest) -> Result<ImputationResponse> {
        Err(match &self.0 {
            Error::ImputationTimeout(d) => Error::ImputationTimeout(*d),
            other => Error::ImputationService(other.to_string()),
        })
    }
}

#[test]
fn remote_imputer_matches_local_output() {
    let input = rows(&[("2024-01-01", 10.0), ("2024-01-03", 30.0)]);
    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    let pipeline = Pipeline::new(config);
    let local = pipeline.run(&input, "date", "sales").unwrap();
    let remote = pipeline
        .run_with_imputer(&input, "date", "sales", &LocalImputer)
        .unwrap();
    assert_eq!(local.series.numeric_values(), remote.series.numeric_values());
}

#[test]
fn remote_failures_keep_their_kind() {
    let input = rows(&[("2024-01-01", 10.0), ("2024-01-03", 30.0)]);
    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    let pipeline = Pipeline::new(config);

    let service = FailingImputer(Error::ImputationService("503".to_string()));
    let err = pipeline
        .run_with_imputer(&input, "date", "sales", &service)
        .unwrap_err();
    assert!(matches!(err, Error::ImputationService(_)));

    let service = FailingImputer(Error::ImputationTimeout(Duration::from_secs(30)));
    let err = pipeline
        .run_with_imputer(&input, "date", "sales", &service)
        .unwrap_err();
    assert!(matches!(err, Error::ImputationTimeout(_)));
}

#[test]
fn remote_imputer_is_skipped_when_stage_is_disabled() {
    struct Panicking;
    impl ImputationService for Panicking {
        fn impute(&self, _request: &ImputationRequest) -> Result<ImputationResponse> {
            panic!("service must not be called");
        }
    }
    let input = daily_rows(&[1.0, 2.0]);
    let result = Pipeline::default()
        .run_with_imputer(&input, "date", "sales", &Panicking)
        .unwrap();
    assert_eq!(result.series.len(), 2);
}

#[test]
fn garbage_rows_do_not_break_the_chain() {
    let mut input = daily_rows(&[1.0, 2.0, 3.0]);
    input.push(
        [
            ("date".to_string(), json!("not a date")),
            ("sales".to_string(), json!("not a number")),
        ]
        .into_iter()
        .collect(),
    );
    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    config.smoothing.enabled = true;
    config.smoothing.window = 2;
    let result = Pipeline::new(config).run(&input, "date", "sales").unwrap();
    // The undated row is dropped by the imputer; the rest flows through.
    assert_eq!(result.series.len(), 3);
}

#[test]
fn empty_input_yields_empty_output() {
    let mut config = PipelineConfig::default();
    config.imputation.enabled = true;
    config.smoothing.enabled = true;
    config.smoothing.window = 3;
    config.normalization.enabled = true;
    let result = Pipeline::new(config).run(&[], "date", "sales").unwrap();
    assert!(result.series.is_empty());
}

fn series_from(values: &[f64]) -> Series {
    let input = daily_rows(values);
    Series::from_rows(&input, "date", "sales")
}

#[test]
fn sorting_is_stable_for_equal_timestamps() {
    let series = series_from(&[1.0, 2.0]);
    assert_eq!(series.sorted_by_timestamp().numeric_values(), vec![1.0, 2.0]);
}
