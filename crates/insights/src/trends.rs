use analytics::math;
use configuration::TrendPolicy;
use core_types::PeriodAggregate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// OLS trend of one series against its period index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendLine {
    pub slope: f64,
    /// `slope / |mean|`; `0` when the mean is zero.
    pub normalized_slope: f64,
    pub direction: TrendDirection,
    /// `(last - first) / first * 100`; `None` when the first value is zero.
    pub percent_change: Option<f64>,
    pub periods: usize,
}

impl TrendLine {
    /// `None` below two points.
    pub fn fit(values: &[f64], policy: &TrendPolicy) -> Option<Self> {
        let slope = math::ols_slope(values)?;
        let mean = math::mean(values);
        let normalized_slope = if mean == 0.0 { 0.0 } else { slope / mean.abs() };

        let direction = if normalized_slope > policy.stable_band {
            TrendDirection::Increasing
        } else if normalized_slope < -policy.stable_band {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        let first = values[0];
        let last = values[values.len() - 1];
        let percent_change = (first != 0.0).then(|| (last - first) / first * 100.0);

        Some(Self { slope, normalized_slope, direction, percent_change, periods: values.len() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peak {
    pub period: String,
    pub value: f64,
}

/// Periods standing out above `mean + k·sigma`, highest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakPeriods {
    pub revenue: Vec<Peak>,
    pub order_count: Vec<Peak>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastConfidence {
    High,
    Medium,
}

/// Naive next-period revenue: the recent mean pushed along the trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueForecast {
    pub value: f64,
    /// One window sigma either side, floored at zero.
    pub lower: f64,
    pub upper: f64,
    pub confidence: ForecastConfidence,
    /// Periods the estimate is averaged over.
    pub window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub order_count: TrendLine,
    pub revenue: TrendLine,
    /// Periods without orders are skipped for this series.
    pub average_order_value: Option<TrendLine>,
    pub peaks: PeakPeriods,
    pub revenue_forecast: Option<RevenueForecast>,
}

/// Labelled values above `mean + k·sigma` (population sigma), highest first.
/// Empty below three points.
pub fn find_peaks(labels: &[&str], values: &[f64], k: f64) -> Vec<Peak> {
    if values.len() < 3 || labels.len() != values.len() {
        return Vec::new();
    }
    let mean = math::mean(values);
    let threshold = mean + k * math::population_variance(values, mean).sqrt();

    let mut peaks: Vec<Peak> = labels
        .iter()
        .zip(values)
        .filter(|&(_, &value)| value > threshold)
        .map(|(label, &value)| Peak { period: label.to_string(), value })
        .collect();
    peaks.sort_by(|a, b| b.value.total_cmp(&a.value));
    peaks
}

/// Mean of the last `policy.forecast_window` values scaled by
/// `1 + normalized_slope`. `None` below two points.
pub fn forecast_next(values: &[f64], trend: &TrendLine, policy: &TrendPolicy) -> Option<RevenueForecast> {
    if values.len() < 2 || policy.forecast_window == 0 {
        return None;
    }
    let window = &values[values.len().saturating_sub(policy.forecast_window)..];
    let mean = math::mean(window);
    let sigma = math::population_variance(window, mean).sqrt();

    let value = (mean * (1.0 + trend.normalized_slope)).max(0.0);
    let confident = mean > 0.0 && sigma / mean < policy.forecast_confident_cv;

    Some(RevenueForecast {
        value,
        lower: (value - sigma).max(0.0),
        upper: value + sigma,
        confidence: if confident { ForecastConfidence::High } else { ForecastConfidence::Medium },
        window: window.len(),
    })
}

/// Trends of order count, revenue and AOV, with peaks and a next-period
/// revenue estimate; `None` with fewer than two periods.
pub fn analyze(periods: &[PeriodAggregate], policy: &TrendPolicy) -> Option<TrendAnalysis> {
    let labels: Vec<&str> = periods.iter().map(|p| p.period.as_str()).collect();
    let orders: Vec<f64> = periods.iter().map(|p| p.order_count as f64).collect();
    let revenue: Vec<f64> = periods
        .iter()
        .map(|p| p.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let aov: Vec<f64> = periods
        .iter()
        .filter_map(|p| p.average_order_value().and_then(|v| v.to_f64()))
        .collect();

    let revenue_line = TrendLine::fit(&revenue, policy)?;
    Some(TrendAnalysis {
        order_count: TrendLine::fit(&orders, policy)?,
        average_order_value: TrendLine::fit(&aov, policy),
        peaks: PeakPeriods {
            revenue: find_peaks(&labels, &revenue, policy.peak_sigma),
            order_count: find_peaks(&labels, &orders, policy.peak_sigma),
        },
        revenue_forecast: forecast_next(&revenue, &revenue_line, policy),
        revenue: revenue_line,
    })
}
