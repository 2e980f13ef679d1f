//! Business-facing enrichment of the raw descriptive measures: shape
//! interpretation, alerts, a data-quality score and period comparison.

use crate::engine::StatisticsCalculator;
use crate::error::AnalyticsError;
use crate::report::{ConfidenceInterval, DescriptiveStatistics, OutlierReport, RobustStatistics};
use core_types::{ConfidenceLevel, NumericSample};
use serde::{Deserialize, Serialize};

const SHAPE_BAND: f64 = 0.5;
const SMALL_SAMPLE: usize = 30;
const LARGE_SAMPLE: usize = 100;
const HIGH_CV_PCT: f64 = 50.0;
const OUTLIER_ALERT_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewShape {
    Symmetric,
    RightSkewed,
    LeftSkewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailShape {
    Mesokurtic,
    Leptokurtic,
    Platykurtic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariabilityLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub skewness: SkewShape,
    pub kurtosis: TailShape,
    pub variability: VariabilityLevel,
}

impl Interpretation {
    pub fn from_statistics(stats: &DescriptiveStatistics) -> Self {
        let skewness = if stats.skewness.abs() < SHAPE_BAND {
            SkewShape::Symmetric
        } else if stats.skewness > SHAPE_BAND {
            SkewShape::RightSkewed
        } else {
            SkewShape::LeftSkewed
        };
        let kurtosis = if stats.kurtosis.abs() < SHAPE_BAND {
            TailShape::Mesokurtic
        } else if stats.kurtosis > SHAPE_BAND {
            TailShape::Leptokurtic
        } else {
            TailShape::Platykurtic
        };
        let cv = stats.coefficient_of_variation;
        let variability = if cv < 10.0 {
            VariabilityLevel::Low
        } else if cv < 30.0 {
            VariabilityLevel::Moderate
        } else {
            VariabilityLevel::High
        };
        Self { skewness, kurtosis, variability }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SmallSample,
    HighVariability,
    FrequentOutliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    /// 0..=100.
    pub score: u8,
    pub level: QualityLevel,
    pub factors: Vec<String>,
}

/// Full descriptive section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveSummary {
    pub statistics: DescriptiveStatistics,
    pub outliers: OutlierReport,
    pub confidence_interval: ConfidenceInterval,
    pub robust: RobustStatistics,
    pub interpretation: Interpretation,
    pub alerts: Vec<Alert>,
    pub data_quality: DataQuality,
    /// Confidence the sample size alone supports.
    pub analysis_confidence: ConfidenceLevel,
}

/// What to compute for a summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub percentiles: &'a [f64],
    pub confidence_level: f64,
    /// Whether secondary tables (periods, customers, products) accompany the sample.
    pub auxiliary_data: bool,
}

impl StatisticsCalculator {
    /// Describes `sample` and enriches the result for reporting.
    pub fn summarize(
        &self,
        sample: &NumericSample,
        request: SummaryRequest<'_>,
    ) -> Result<DescriptiveSummary, AnalyticsError> {
        let statistics = self.describe(sample, request.percentiles)?;
        let outliers = self.detect_outliers(sample);
        let confidence_interval = self.confidence_interval(sample, request.confidence_level)?;
        let robust = self.robust_statistics(sample, request.percentiles)?;

        let interpretation = Interpretation::from_statistics(&statistics);
        let alerts = alerts(&statistics, &outliers);
        let data_quality = data_quality(&statistics, request.auxiliary_data);
        let analysis_confidence = analysis_confidence(statistics.count);

        tracing::debug!(
            count = statistics.count,
            outliers = outliers.outliers.len(),
            alerts = alerts.len(),
            quality = data_quality.score,
            "Descriptive summary computed"
        );

        Ok(DescriptiveSummary {
            statistics,
            outliers,
            confidence_interval,
            robust,
            interpretation,
            alerts,
            data_quality,
            analysis_confidence,
        })
    }
}

pub fn alerts(stats: &DescriptiveStatistics, outliers: &OutlierReport) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if stats.count < SMALL_SAMPLE {
        alerts.push(Alert {
            kind: AlertKind::SmallSample,
            message: format!(
                "Only {} observations; results may not be representative",
                stats.count
            ),
        });
    }
    if stats.coefficient_of_variation > HIGH_CV_PCT {
        alerts.push(Alert {
            kind: AlertKind::HighVariability,
            message: format!(
                "Coefficient of variation is {:.1}%",
                stats.coefficient_of_variation
            ),
        });
    }
    let share = outliers.outlier_percentage();
    if share > OUTLIER_ALERT_PCT {
        alerts.push(Alert {
            kind: AlertKind::FrequentOutliers,
            message: format!("{share:.1}% of the observations are extreme values"),
        });
    }
    alerts
}

pub fn data_quality(stats: &DescriptiveStatistics, auxiliary_data: bool) -> DataQuality {
    let mut score = 0u8;
    let mut factors = Vec::new();

    if stats.count >= LARGE_SAMPLE {
        score += 30;
        factors.push("adequate sample size".to_string());
    } else if stats.count >= SMALL_SAMPLE {
        score += 20;
        factors.push("acceptable sample size".to_string());
    } else {
        factors.push("small sample size".to_string());
    }

    if stats.coefficient_of_variation < HIGH_CV_PCT {
        score += 25;
        factors.push("controlled variability".to_string());
    } else {
        factors.push("high variability".to_string());
    }

    if auxiliary_data {
        score += 25;
        factors.push("period and customer data available".to_string());
    }

    if stats.skewness.abs() < 1.0 {
        score += 20;
        factors.push("roughly symmetric distribution".to_string());
    }

    let level = match score {
        80.. => QualityLevel::Excellent,
        60..=79 => QualityLevel::Good,
        40..=59 => QualityLevel::Fair,
        _ => QualityLevel::Poor,
    };

    DataQuality { score, level, factors }
}

pub fn analysis_confidence(count: usize) -> ConfidenceLevel {
    match count {
        1000.. => ConfidenceLevel::P99,
        100..=999 => ConfidenceLevel::P95,
        30..=99 => ConfidenceLevel::P90,
        _ => ConfidenceLevel::P80,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChange {
    pub current: f64,
    pub previous: f64,
    pub absolute: f64,
    /// `None` when the previous value is zero.
    pub percent: Option<f64>,
}

impl MetricChange {
    pub fn new(current: f64, previous: f64) -> Self {
        let absolute = current - previous;
        let percent = (previous != 0.0).then(|| absolute / previous * 100.0);
        Self { current, previous, absolute, percent }
    }
}

/// Change between two periods' order-amount statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub revenue: MetricChange,
    pub orders: MetricChange,
    pub average_order_value: MetricChange,
}

/// Compares the statistics of two order-amount samples: the sum is revenue,
/// the count is orders and the mean is the average order value.
pub fn compare_periods(
    current: &DescriptiveStatistics,
    previous: &DescriptiveStatistics,
) -> PeriodComparison {
    PeriodComparison {
        revenue: MetricChange::new(current.sum, previous.sum),
        orders: MetricChange::new(current.count as f64, previous.count as f64),
        average_order_value: MetricChange::new(current.mean, previous.mean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample(values: &[f64]) -> NumericSample {
        NumericSample::new(values.to_vec()).unwrap()
    }

    fn request() -> SummaryRequest<'static> {
        SummaryRequest {
            percentiles: &[25.0, 50.0, 75.0],
            confidence_level: 0.95,
            auxiliary_data: false,
        }
    }

    #[test]
    fn skewed_small_sample_raises_alerts() {
        let summary = StatisticsCalculator::new()
            .summarize(&sample(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]), request())
            .unwrap();
        let kinds: Vec<AlertKind> = summary.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::SmallSample, AlertKind::HighVariability, AlertKind::FrequentOutliers]
        );
        assert_eq!(summary.interpretation.skewness, SkewShape::RightSkewed);
        assert_eq!(summary.interpretation.variability, VariabilityLevel::High);
        assert_eq!(summary.analysis_confidence, ConfidenceLevel::P80);
        assert!(summary.confidence_interval.contains(summary.statistics.mean));
    }

    #[test]
    fn quality_score_adds_up_factors() {
        let values: Vec<f64> = (0..120).map(|i| 100.0 + (i % 10) as f64).collect();
        let stats = StatisticsCalculator::new().describe(&sample(&values), &[]).unwrap();
        let quality = data_quality(&stats, true);
        assert_eq!(quality.score, 100);
        assert_eq!(quality.level, QualityLevel::Excellent);

        let quality = data_quality(&stats, false);
        assert_eq!(quality.score, 75);
        assert_eq!(quality.level, QualityLevel::Good);
    }

    #[test]
    fn analysis_confidence_follows_sample_size() {
        assert_eq!(analysis_confidence(5), ConfidenceLevel::P80);
        assert_eq!(analysis_confidence(30), ConfidenceLevel::P90);
        assert_eq!(analysis_confidence(100), ConfidenceLevel::P95);
        assert_eq!(analysis_confidence(5000), ConfidenceLevel::P99);
    }

    #[test]
    fn period_comparison_reports_percent_change() {
        let calc = StatisticsCalculator::new();
        let current = calc.describe(&sample(&[10.0, 20.0, 30.0]), &[]).unwrap();
        let previous = calc.describe(&sample(&[10.0, 20.0]), &[]).unwrap();
        let comparison = compare_periods(&current, &previous);
        assert_approx_eq!(comparison.revenue.percent.unwrap(), 100.0, 1e-9);
        assert_approx_eq!(comparison.orders.percent.unwrap(), 50.0, 1e-9);
        assert_approx_eq!(comparison.average_order_value.absolute, 5.0, 1e-9);
        assert_eq!(MetricChange::new(5.0, 0.0).percent, None);
    }
}
