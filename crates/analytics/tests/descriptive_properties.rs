use analytics::StatisticsCalculator;
use assert_approx_eq::assert_approx_eq;
use core_types::NumericSample;

const PERCENTILES: [f64; 5] = [25.0, 50.0, 75.0, 90.0, 95.0];

fn sample(values: &[f64]) -> NumericSample {
    NumericSample::new(values.to_vec()).unwrap()
}

fn fixtures() -> Vec<Vec<f64>> {
    vec![
        vec![1.0],
        vec![0.1, 0.2, 0.3],
        vec![12.5, 7.25, 99.99, 1000.0, 0.01],
        vec![-5.0, 5.0, -5.0, 5.0],
        (1..=250).map(|i| (i as f64 * 1.37).sin() * 40.0 + 60.0).collect(),
    ]
}

#[test]
fn mean_times_count_is_sum() {
    let calc = StatisticsCalculator::new();
    for values in fixtures() {
        let stats = calc.describe(&sample(&values), &PERCENTILES).unwrap();
        let tolerance = 1e-9 * stats.sum.abs().max(1.0);
        assert_approx_eq!(stats.mean * stats.count as f64, stats.sum, tolerance);
    }
}

#[test]
fn median_of_small_samples() {
    let calc = StatisticsCalculator::new();
    assert_eq!(calc.describe(&sample(&[1.0, 2.0, 3.0, 4.0]), &[]).unwrap().median, 2.5);
    assert_eq!(calc.describe(&sample(&[1.0, 2.0, 3.0]), &[]).unwrap().median, 2.0);
    assert_eq!(calc.describe(&sample(&[3.0, 1.0, 2.0]), &[]).unwrap().median, 2.0);
}

#[test]
fn tukey_fences_flag_the_extreme_order() {
    let calc = StatisticsCalculator::new();
    let flagged = calc.detect_outliers(&sample(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]));
    assert_eq!(flagged.outliers, vec![100.0]);
    assert_approx_eq!(flagged.q1, 2.25, 1e-12);
    assert_approx_eq!(flagged.q3, 4.75, 1e-12);
    assert_approx_eq!(flagged.upper_bound, 8.5, 1e-12);

    let clean = calc.detect_outliers(&sample(&[1.0, 2.0, 3.0, 4.0, 5.0]));
    assert!(clean.outliers.is_empty());
    assert_eq!(clean.clean_data.len(), 5);
}

#[test]
fn ninety_five_percent_interval_brackets_the_mean() {
    let calc = StatisticsCalculator::new();
    for values in fixtures() {
        let ci = calc.confidence_interval(&sample(&values), 0.95).unwrap();
        assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
    }
}

#[test]
fn known_order_sample_at_ninety_five_percent() {
    let values = [10.0, 20.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];
    let calc = StatisticsCalculator::new();
    let ci = calc.confidence_interval(&sample(&values), 0.95).unwrap();

    assert_approx_eq!(ci.mean, 47.0, 1e-12);
    assert!(ci.contains(47.0));
    // σ = √681 (population), SE = σ/√10.
    assert_approx_eq!(ci.standard_error, (681.0f64).sqrt() / (10.0f64).sqrt(), 1e-9);
    assert_approx_eq!(ci.margin_of_error, 1.96 * ci.standard_error, 1e-12);

    let stats = calc.describe(&sample(&values), &PERCENTILES).unwrap();
    assert_eq!(stats.mode, Some(vec![20.0]));
    assert_eq!(stats.median, 45.0);
}
