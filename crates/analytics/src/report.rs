use serde::{Deserialize, Serialize};

/// One requested percentile and its interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

/// The fixed battery of descriptive measures for one sample.
///
/// Every measure uses the population sigma (`variance` divides by `n`);
/// `skewness` and `kurtosis` add the small-sample lead factors. They are `0`
/// when undefined, and `low_sample` is set when the sample is too short for
/// them (fewer than four values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStatistics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// `None` when no value repeats.
    pub mode: Option<Vec<f64>>,
    pub variance: f64,
    pub standard_deviation: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub percentiles: Vec<PercentileValue>,
    /// Percent; `0` when the mean is zero.
    pub coefficient_of_variation: f64,
    pub low_sample: bool,
}

impl DescriptiveStatistics {
    /// Looks up a computed percentile.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|pv| (pv.percentile - p).abs() < 1e-9)
            .map(|pv| pv.value)
    }
}

/// Tukey-fence outlier split of a sample. Both lists keep the caller's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    pub outliers: Vec<f64>,
    pub clean_data: Vec<f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl OutlierReport {
    /// Share of the sample flagged as outliers, in percent.
    pub fn outlier_percentage(&self) -> f64 {
        let total = self.outliers.len() + self.clean_data.len();
        if total == 0 {
            return 0.0;
        }
        self.outliers.len() as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
    pub margin_of_error: f64,
    pub standard_error: f64,
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Statistics recomputed on the Tukey-clean data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobustStatistics {
    pub statistics: DescriptiveStatistics,
    pub outliers_removed: usize,
    pub outlier_percentage: f64,
}
