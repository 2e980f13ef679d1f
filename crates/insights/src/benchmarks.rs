use crate::segmentation::SegmentationSummary;
use crate::trends::TrendAnalysis;
use configuration::BenchmarkPolicy;
use core_types::SegmentLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkPerformance {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl BenchmarkPerformance {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 1.2 {
            BenchmarkPerformance::Excellent
        } else if ratio >= 1.0 {
            BenchmarkPerformance::Good
        } else if ratio >= 0.8 {
            BenchmarkPerformance::Fair
        } else {
            BenchmarkPerformance::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub current: Option<f64>,
    pub benchmark: f64,
    pub ratio: Option<f64>,
    pub performance: Option<BenchmarkPerformance>,
}

impl BenchmarkComparison {
    /// Higher is better: `current / benchmark`, `0` for a zero benchmark.
    fn higher_is_better(current: Option<f64>, benchmark: f64) -> Self {
        let ratio = current.map(|c| if benchmark == 0.0 { 0.0 } else { c / benchmark });
        Self { current, benchmark, ratio, performance: ratio.map(BenchmarkPerformance::from_ratio) }
    }

    /// Lower is better: `benchmark / current`. A current value of zero beats
    /// any benchmark and carries no ratio.
    fn lower_is_better(current: Option<f64>, benchmark: f64) -> Self {
        match current {
            Some(c) if c == 0.0 => Self {
                current,
                benchmark,
                ratio: None,
                performance: Some(BenchmarkPerformance::Excellent),
            },
            _ => {
                let ratio = current.map(|c| benchmark / c);
                Self { current, benchmark, ratio, performance: ratio.map(BenchmarkPerformance::from_ratio) }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub average_order_value: BenchmarkComparison,
    pub customer_lifetime_value: BenchmarkComparison,
    pub order_frequency: BenchmarkComparison,
    pub churn_rate: BenchmarkComparison,
    pub revenue_growth: BenchmarkComparison,
    pub acquisition_rate: BenchmarkComparison,
}

impl BenchmarkReport {
    pub fn comparisons(&self) -> [(&'static str, &BenchmarkComparison); 6] {
        [
            ("averageOrderValue", &self.average_order_value),
            ("customerLifetimeValue", &self.customer_lifetime_value),
            ("orderFrequency", &self.order_frequency),
            ("churnRate", &self.churn_rate),
            ("revenueGrowth", &self.revenue_growth),
            ("acquisitionRate", &self.acquisition_rate),
        ]
    }
}

/// Compares the observed metrics with the reference values. Metrics without
/// data keep `current: None` and carry no rating.
pub fn compare(
    segments: Option<&SegmentationSummary>,
    trends: Option<&TrendAnalysis>,
    policy: &BenchmarkPolicy,
) -> BenchmarkReport {
    let aov = segments.and_then(|s| s.average_order_value);
    let frequency = segments.and_then(|s| s.average_frequency);
    let clv = aov.zip(frequency).map(|(aov, freq)| aov * freq * policy.lifetime_months);
    let churn = segments.map(|s| s.churn.high_rate());
    let acquisition = segments.map(|s| s.share(SegmentLabel::New));
    let growth = trends.map(|t| t.revenue.normalized_slope);

    BenchmarkReport {
        average_order_value: BenchmarkComparison::higher_is_better(aov, policy.average_order_value),
        customer_lifetime_value: BenchmarkComparison::higher_is_better(clv, policy.customer_lifetime_value),
        order_frequency: BenchmarkComparison::higher_is_better(frequency, policy.order_frequency),
        churn_rate: BenchmarkComparison::lower_is_better(churn, policy.churn_rate),
        revenue_growth: BenchmarkComparison::higher_is_better(growth, policy.revenue_growth),
        acquisition_rate: BenchmarkComparison::higher_is_better(acquisition, policy.acquisition_rate),
    }
}
