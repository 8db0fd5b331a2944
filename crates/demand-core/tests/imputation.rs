mod common;

use common::{at_hour, date, hourly};
use demand_core::imputation::{
    detect_and_impute, fill_gaps, population_moments, CleaningConfig, EdgePolicy,
};
use demand_core::series::HourlySeries;

fn values(series: &demand_core::series::CleanedHourlySeries) -> Vec<Option<f64>> {
    series.rows.iter().map(|row| row.value).collect()
}

#[test]
fn spike_is_flagged_and_replaced_by_its_neighbours() {
    let mut raw = vec![Some(100.0); 24];
    raw[11] = Some(10_000.0);
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));

    let outcome = detect_and_impute(&series, &CleaningConfig::default());

    assert!(outcome.cleaned.rows[11].is_outlier);
    assert_eq!(outcome.cleaned.rows[11].value, Some(100.0));
    assert_eq!(outcome.stats.outliers_detected, 1);
    assert_eq!(outcome.stats.interpolated_total, 1);
    assert_eq!(outcome.stats.total_rows, 24);
    assert_eq!(outcome.original.readings()[11].value, Some(10_000.0));
}

#[test]
fn nulls_and_outliers_are_counted_separately() {
    let mut raw = vec![Some(100.0); 24];
    raw[3] = None;
    raw[4] = None;
    raw[15] = Some(9_000.0);
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));

    let outcome = detect_and_impute(&series, &CleaningConfig::default());

    assert_eq!(outcome.stats.nulls_inputs, 2);
    assert_eq!(outcome.stats.outliers_detected, 1);
    assert_eq!(outcome.stats.interpolated_total, 3);
    assert_eq!(outcome.stats.missing_days_filled, 0);
    assert!(outcome.cleaned.rows[3].is_null);
    assert!(!outcome.cleaned.rows[3].is_outlier);
    assert!(values(&outcome.cleaned).iter().all(|v| *v == Some(100.0)));
}

#[test]
fn zero_variance_series_never_flags_outliers() {
    for level in [0.0, 5_000.0, 1e12] {
        let mut raw = vec![Some(level); 30];
        raw[7] = None;
        let series = HourlySeries::new(hourly(at_hour(date(2024, 3, 1), 0), &raw));

        let outcome = detect_and_impute(&series, &CleaningConfig::default());

        assert_eq!(outcome.stats.outliers_detected, 0, "level {level}");
        assert_eq!(outcome.stats.nulls_inputs, 1);
        assert_eq!(outcome.cleaned.rows[7].value, Some(level));
    }
}

#[test]
fn cleaning_its_own_output_is_a_fixed_point() {
    let mut raw: Vec<Option<f64>> = (0..48)
        .map(|i| Some(100.0 + 10.0 * (i as f64 * std::f64::consts::PI / 12.0).sin()))
        .collect();
    raw[20] = Some(1_000.0);
    raw[33] = None;
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));
    let config = CleaningConfig::default();

    let first = detect_and_impute(&series, &config);
    assert_eq!(first.stats.outliers_detected, 1);

    let second = detect_and_impute(&first.cleaned.to_hourly(), &config);

    assert_eq!(second.stats.outliers_detected, 0);
    assert_eq!(second.stats.interpolated_total, 0);
    assert_eq!(values(&second.cleaned), values(&first.cleaned));
}

#[test]
fn output_is_reproducible() {
    let raw: Vec<Option<f64>> = (0..72)
        .map(|i| match i % 17 {
            0 => None,
            5 => Some(4_000.0),
            _ => Some(250.0 + (i as f64).cos() * 30.0),
        })
        .collect();
    let series = HourlySeries::new(hourly(at_hour(date(2024, 2, 1), 1), &raw));
    let config = CleaningConfig::default();

    let a = detect_and_impute(&series, &config);
    let b = detect_and_impute(&series, &config);

    assert_eq!(a.cleaned, b.cleaned);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn boundary_gaps_take_the_nearest_known_value() {
    let raw = vec![None, None, Some(10.0), Some(20.0), None];
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));

    let outcome = detect_and_impute(&series, &CleaningConfig::default());

    assert_eq!(
        values(&outcome.cleaned),
        vec![Some(10.0), Some(10.0), Some(10.0), Some(20.0), Some(20.0)]
    );
    assert_eq!(outcome.stats.interpolated_total, 3);
}

#[test]
fn all_missing_series_stays_missing() {
    let raw = vec![None; 6];
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));

    let outcome = detect_and_impute(&series, &CleaningConfig::default());

    assert_eq!(outcome.stats.outliers_detected, 0);
    assert_eq!(outcome.stats.nulls_inputs, 6);
    assert!(values(&outcome.cleaned).iter().all(Option::is_none));
}

#[test]
fn threshold_is_configurable() {
    // z of the 125 reading is roughly 2.1
    let mut raw: Vec<Option<f64>> = (0..20)
        .map(|i| Some(if i % 2 == 0 { 90.0 } else { 110.0 }))
        .collect();
    raw.push(Some(125.0));
    let series = HourlySeries::new(hourly(at_hour(date(2024, 1, 1), 1), &raw));

    let strict = detect_and_impute(&series, &CleaningConfig { z_threshold: 2.0 });
    let lenient = detect_and_impute(&series, &CleaningConfig::default());

    assert_eq!(strict.stats.outliers_detected, 1);
    assert!(strict.cleaned.rows[20].is_outlier);
    assert_eq!(lenient.stats.outliers_detected, 0);
}

#[test]
fn series_is_sorted_before_cleaning() {
    let day = date(2024, 1, 1);
    let mut readings = hourly(at_hour(day, 1), &[Some(1.0), Some(2.0), Some(3.0)]);
    readings.reverse();

    let series = HourlySeries::new(readings);

    let stamps: Vec<_> = series.readings().iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![at_hour(day, 1), at_hour(day, 2), at_hour(day, 3)]);
}

#[test]
fn fill_gaps_interpolates_by_position() {
    let mut interior = vec![Some(0.0), None, None, Some(30.0)];
    assert_eq!(fill_gaps(&mut interior, EdgePolicy::InteriorOnly), 2);
    assert_eq!(interior, vec![Some(0.0), Some(10.0), Some(20.0), Some(30.0)]);

    let mut edges = vec![None, Some(5.0), None];
    assert_eq!(fill_gaps(&mut edges, EdgePolicy::InteriorOnly), 0);
    assert_eq!(edges, vec![None, Some(5.0), None]);
    assert_eq!(fill_gaps(&mut edges, EdgePolicy::Nearest), 2);
    assert_eq!(edges, vec![Some(5.0), Some(5.0), Some(5.0)]);
}

#[test]
fn moments_use_the_population_deviation() {
    let (mean, std) = population_moments([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    assert_eq!(mean, 5.0);
    assert_eq!(std, 2.0);
    assert!(population_moments(Vec::<f64>::new()).is_none());
}
