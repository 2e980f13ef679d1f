use analytics::math;
use core_types::PeriodAggregate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

const TUKEY_K: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalousPeriod {
    pub period: String,
    pub order_count: u64,
    pub revenue: f64,
    pub order_count_outlier: bool,
    pub revenue_outlier: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub periods_analyzed: usize,
    pub anomalous_periods: Vec<AnomalousPeriod>,
}

impl AnomalyReport {
    pub fn count(&self) -> usize {
        self.anomalous_periods.len()
    }
}

fn outside_fences(values: &[f64]) -> impl Fn(f64) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (lower, upper, ..) = math::tukey_fences(&sorted, TUKEY_K);
    move |value| value < lower || value > upper
}

/// Periods whose order count or revenue falls outside the Tukey fences of
/// its own series. `None` for an empty series.
pub fn detect(periods: &[PeriodAggregate]) -> Option<AnomalyReport> {
    if periods.is_empty() {
        return None;
    }

    let orders: Vec<f64> = periods.iter().map(|p| p.order_count as f64).collect();
    let revenue: Vec<f64> = periods
        .iter()
        .map(|p| p.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let order_outlier = outside_fences(&orders);
    let revenue_outlier = outside_fences(&revenue);

    let anomalous_periods = periods
        .iter()
        .zip(orders.iter().zip(&revenue))
        .filter_map(|(period, (&count, &amount))| {
            let order_count_outlier = order_outlier(count);
            let revenue_outlier = revenue_outlier(amount);
            (order_count_outlier || revenue_outlier).then(|| AnomalousPeriod {
                period: period.period.clone(),
                order_count: period.order_count,
                revenue: amount,
                order_count_outlier,
                revenue_outlier,
            })
        })
        .collect();

    Some(AnomalyReport { periods_analyzed: periods.len(), anomalous_periods })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(i: usize, orders: u64, revenue: i64) -> PeriodAggregate {
        PeriodAggregate {
            period: format!("2024-05-{:02}", i + 1),
            order_count: orders,
            revenue: Decimal::from(revenue),
        }
    }

    #[test]
    fn spike_day_is_flagged_on_both_series() {
        let mut periods: Vec<_> = (0..9).map(|i| day(i, 10 + (i as u64 % 3), 500 + i as i64 * 10)).collect();
        periods.push(day(9, 80, 9000));

        let report = detect(&periods).unwrap();
        assert_eq!(report.periods_analyzed, 10);
        assert_eq!(report.count(), 1);
        let spike = &report.anomalous_periods[0];
        assert_eq!(spike.period, "2024-05-10");
        assert!(spike.order_count_outlier && spike.revenue_outlier);
    }

    #[test]
    fn steady_series_has_no_anomalies() {
        let periods: Vec<_> = (0..7).map(|i| day(i, 10, 500)).collect();
        assert_eq!(detect(&periods).unwrap().count(), 0);
        assert!(detect(&[]).is_none());
    }
}
