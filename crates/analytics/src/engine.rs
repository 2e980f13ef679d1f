use crate::error::AnalyticsError;
use crate::math;
use crate::report::{
    ConfidenceInterval, DescriptiveStatistics, OutlierReport, PercentileValue, RobustStatistics,
};
use crate::zscore;
use core_types::NumericSample;

/// Tukey's multiplier for the outlier fences.
const TUKEY_K: f64 = 1.5;

/// A stateless calculator for the descriptive side of a sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsCalculator {}

impl StatisticsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point: every descriptive measure of `sample`.
    ///
    /// # Arguments
    ///
    /// * `sample` - A non-empty sample of finite values.
    /// * `percentiles` - Percentiles to report, each within `[0, 100]`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DescriptiveStatistics` or `InvalidInput`
    /// when a percentile is out of range.
    pub fn describe(
        &self,
        sample: &NumericSample,
        percentiles: &[f64],
    ) -> Result<DescriptiveStatistics, AnalyticsError> {
        validate_percentiles(percentiles)?;

        let values = sample.values();
        let sorted = sample.sorted();
        let count = values.len();

        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;
        let variance = math::population_variance(values, mean);
        let standard_deviation = variance.sqrt();
        let min = sorted[0];
        let max = sorted[count - 1];

        let coefficient_of_variation = if mean == 0.0 {
            0.0
        } else {
            standard_deviation / mean * 100.0
        };

        let stats = DescriptiveStatistics {
            count,
            sum,
            mean,
            median: math::median_of_sorted(&sorted),
            mode: math::modes_of_sorted(&sorted),
            variance,
            standard_deviation,
            min,
            max,
            range: max - min,
            skewness: math::skewness(values, mean).unwrap_or(0.0),
            kurtosis: math::excess_kurtosis(values, mean).unwrap_or(0.0),
            percentiles: percentiles
                .iter()
                .map(|&p| PercentileValue { percentile: p, value: math::percentile_of_sorted(&sorted, p) })
                .collect(),
            coefficient_of_variation,
            low_sample: count < 4,
        };

        if stats.low_sample {
            tracing::debug!(count, "Sample too short for shape statistics; reporting 0");
        }

        Ok(stats)
    }

    /// Percentiles of `sample` by linear interpolation.
    pub fn percentiles(
        &self,
        sample: &NumericSample,
        percentiles: &[f64],
    ) -> Result<Vec<PercentileValue>, AnalyticsError> {
        validate_percentiles(percentiles)?;
        let sorted = sample.sorted();
        Ok(percentiles
            .iter()
            .map(|&p| PercentileValue { percentile: p, value: math::percentile_of_sorted(&sorted, p) })
            .collect())
    }

    /// Splits the sample on the Tukey fences `Q1 - 1.5·IQR` and `Q3 + 1.5·IQR`.
    pub fn detect_outliers(&self, sample: &NumericSample) -> OutlierReport {
        let sorted = sample.sorted();
        let (lower_bound, upper_bound, q1, q3, iqr) = math::tukey_fences(&sorted, TUKEY_K);

        let (outliers, clean_data): (Vec<f64>, Vec<f64>) = sample
            .values()
            .iter()
            .copied()
            .partition(|&v| v < lower_bound || v > upper_bound);

        OutlierReport { outliers, clean_data, lower_bound, upper_bound, q1, q3, iqr }
    }

    /// Large-sample interval for the mean: `mean ± z·σ/√n`.
    pub fn confidence_interval(
        &self,
        sample: &NumericSample,
        level: f64,
    ) -> Result<ConfidenceInterval, AnalyticsError> {
        let z = zscore::critical_value(level)?;
        let values = sample.values();
        let n = values.len() as f64;
        let mean = math::mean(values);
        let sigma = math::population_variance(values, mean).sqrt();

        let standard_error = sigma / n.sqrt();
        let margin_of_error = z * standard_error;

        Ok(ConfidenceInterval {
            lower: mean - margin_of_error,
            upper: mean + margin_of_error,
            mean,
            margin_of_error,
            standard_error,
            confidence_level: level,
        })
    }

    /// Descriptive statistics of the sample with its Tukey outliers removed.
    pub fn robust_statistics(
        &self,
        sample: &NumericSample,
        percentiles: &[f64],
    ) -> Result<RobustStatistics, AnalyticsError> {
        let outliers = self.detect_outliers(sample);
        let outlier_percentage = outliers.outlier_percentage();
        let outliers_removed = outliers.outliers.len();
        // The interquartile values always survive the fences, so this is non-empty.
        let clean = NumericSample::with_metadata(outliers.clean_data, sample.metadata().clone())?;

        Ok(RobustStatistics {
            statistics: self.describe(&clean, percentiles)?,
            outliers_removed,
            outlier_percentage,
        })
    }

    /// Pearson correlation of two paired series.
    ///
    /// `0` when either series has no spread.
    pub fn correlation(&self, x: &[f64], y: &[f64]) -> Result<f64, AnalyticsError> {
        if x.len() != y.len() {
            return Err(AnalyticsError::InvalidInput {
                field: "series",
                reason: format!("length mismatch ({} vs {})", x.len(), y.len()),
            });
        }
        if x.len() < 2 {
            return Err(AnalyticsError::InsufficientData(
                "correlation needs at least two pairs".to_string(),
            ));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(AnalyticsError::InvalidInput {
                field: "series",
                reason: "all values must be finite".to_string(),
            });
        }

        let mean_x = math::mean(x);
        let mean_y = math::mean(y);
        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (a, b) in x.iter().zip(y) {
            let (dx, dy) = (a - mean_x, b - mean_y);
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denominator = (var_x * var_y).sqrt();
        if denominator == 0.0 {
            return Ok(0.0);
        }
        Ok((cov / denominator).clamp(-1.0, 1.0))
    }
}

fn validate_percentiles(percentiles: &[f64]) -> Result<(), AnalyticsError> {
    match percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        Some(bad) => Err(AnalyticsError::InvalidInput {
            field: "percentiles",
            reason: format!("{bad} is outside [0, 100]"),
        }),
        None => Ok(()),
    }
}
