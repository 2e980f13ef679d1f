use crate::segmentation::SegmentationSummary;
use configuration::{ScenarioMultipliers, ScenarioPolicy};
use core_types::PeriodAggregate;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Observed starting point of the projections. Each metric is `None` when the
/// data it comes from is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetrics {
    pub revenue: Option<Decimal>,
    pub customer_count: Option<u64>,
    pub average_order_value: Option<Decimal>,
    pub churn_rate: Option<f64>,
}

impl BaseMetrics {
    pub fn observe(periods: &[PeriodAggregate], segments: Option<&SegmentationSummary>) -> Self {
        let (revenue, average_order_value) = if periods.is_empty() {
            (None, None)
        } else {
            let revenue: Decimal = periods.iter().map(|p| p.revenue).sum();
            let orders: u64 = periods.iter().map(|p| p.order_count).sum();
            let aov = (orders > 0).then(|| revenue / Decimal::from(orders));
            (Some(revenue), aov)
        };

        Self {
            revenue,
            customer_count: segments.map(|s| s.total_customers as u64),
            average_order_value,
            churn_rate: segments.map(|s| s.churn.high_rate()),
        }
    }

    pub fn has_data(&self) -> bool {
        self.revenue.is_some() || self.customer_count.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Realistic,
    Pessimistic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub probability: f64,
    pub revenue_multiplier: Decimal,
    pub projected_revenue: Option<Decimal>,
    pub projected_customers: Option<u64>,
    pub projected_average_order_value: Option<Decimal>,
    pub projected_churn_rate: Option<f64>,
}

impl Scenario {
    fn project(kind: ScenarioKind, base: &BaseMetrics, m: &ScenarioMultipliers) -> Self {
        Self {
            kind,
            probability: m.probability,
            revenue_multiplier: m.revenue,
            projected_revenue: base.revenue.map(|r| (r * m.revenue).round_dp(2)),
            // Customers lost scale with the churn multiplier.
            projected_customers: base
                .customer_count
                .map(|c| (c as f64 * (2.0 - m.churn)).floor().max(0.0) as u64),
            projected_average_order_value: base
                .average_order_value
                .map(|v| (v * m.average_order_value).round_dp(2)),
            projected_churn_rate: base.churn_rate.map(|c| (c * m.churn).min(1.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSet {
    pub base: BaseMetrics,
    pub optimistic: Scenario,
    pub realistic: Scenario,
    pub pessimistic: Scenario,
    /// Probability-weighted projected revenue.
    pub expected_revenue: Option<Decimal>,
}

impl ScenarioSet {
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        [&self.optimistic, &self.realistic, &self.pessimistic].into_iter()
    }
}

pub fn project(base: BaseMetrics, policy: &ScenarioPolicy) -> ScenarioSet {
    let optimistic = Scenario::project(ScenarioKind::Optimistic, &base, &policy.optimistic);
    let realistic = Scenario::project(ScenarioKind::Realistic, &base, &policy.realistic);
    let pessimistic = Scenario::project(ScenarioKind::Pessimistic, &base, &policy.pessimistic);

    let expected_revenue = [&optimistic, &realistic, &pessimistic]
        .iter()
        .map(|s| Some(s.projected_revenue? * Decimal::from_f64(s.probability)?))
        .sum::<Option<Decimal>>()
        .map(|r| r.round_dp(2));

    tracing::debug!(
        base_revenue = ?base.revenue.and_then(|r| r.to_f64()),
        "Scenarios projected."
    );

    ScenarioSet { base, optimistic, realistic, pessimistic, expected_revenue }
}
