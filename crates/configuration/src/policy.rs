use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Every heuristic threshold the insight generator applies, in one table.
///
/// Deserialized from the `[policy]` section of `vendstat.toml`; any omitted
/// section falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightPolicy {
    pub trend: TrendPolicy,
    pub segmentation: SegmentationPolicy,
    pub triggers: TriggerPolicy,
    pub priority: PriorityPolicy,
    pub scenarios: ScenarioPolicy,
    pub benchmarks: BenchmarkPolicy,
    pub products: ProductPolicy,
    pub plan: PlanPolicy,
}

/// Bands applied to normalized OLS slopes (slope divided by the series mean).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPolicy {
    /// Slopes inside `±stable_band` classify as stable.
    pub stable_band: f64,
    pub revenue_growth_trigger: f64,
    pub volume_growth_trigger: f64,
    pub revenue_decline_trigger: f64,
    /// Periods above `mean + peak_sigma * sigma` are peaks.
    pub peak_sigma: f64,
    /// Most recent periods averaged for the next-period estimate.
    pub forecast_window: usize,
    /// Window CV (fraction) under which the estimate counts as high confidence.
    pub forecast_confident_cv: f64,
}

/// Minimums a customer has to meet to enter a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    pub min_orders: u64,
    pub min_spent: Decimal,
    pub max_recency_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationPolicy {
    pub vip: SegmentRule,
    pub loyal: SegmentRule,
    /// Customers silent for longer than this are "At Risk".
    pub at_risk_after_days: i64,
    /// Customers with exactly this many orders are "New".
    pub new_customer_orders: u64,
    pub churn_high_after_days: i64,
    pub churn_medium_after_days: i64,
}

/// Thresholds of the opportunity and risk trigger catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerPolicy {
    /// VIP share (percent) below which the segment counts as under-represented.
    pub vip_share_floor_pct: f64,
    /// High-churn share (percent) above which churn reduction is high impact.
    pub churn_high_impact_pct: f64,
    /// More anomalous periods than this is an operational risk.
    pub anomalous_period_limit: usize,
    /// A Pareto point reached before this rank is a concentration risk.
    pub pareto_rank_limit: usize,
    /// VIP share (fraction) above which the customer base is concentrated.
    pub customer_concentration_ceiling: f64,
    /// Coefficient of variation (percent) considered highly variable.
    pub high_variability_cv_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityPolicy {
    pub base: i32,
    pub context_bonus: i32,
    pub horizon_bonus: i32,
    pub min: i32,
    pub max: i32,
}

impl PriorityPolicy {
    /// Applies the bonuses and clamps into `[min, max]`.
    pub fn score(&self, context_match: bool, horizon_match: bool) -> i32 {
        let mut priority = self.base;
        if context_match {
            priority += self.context_bonus;
        }
        if horizon_match {
            priority += self.horizon_bonus;
        }
        priority.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMultipliers {
    pub revenue: Decimal,
    pub churn: f64,
    pub average_order_value: Decimal,
    /// Static prior; not re-estimated from the data.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioPolicy {
    pub optimistic: ScenarioMultipliers,
    pub realistic: ScenarioMultipliers,
    pub pessimistic: ScenarioMultipliers,
}

/// Bands of the product-mix measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPolicy {
    /// Share of revenue (percent) that defines the Pareto point.
    pub pareto_share_pct: f64,
    /// Upper Gini bounds of the very even, even, moderate and uneven bands.
    pub gini_bands: [f64; 4],
    /// Normalized entropy above which the mix is highly diverse.
    pub high_diversity: f64,
    /// Normalized entropy above which the mix is moderately diverse.
    pub moderate_diversity: f64,
}

/// Sizes and cut-offs of the action plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPolicy {
    /// High-churn share (fraction) under which retention counts as a strength.
    pub strong_retention_rate: f64,
    pub max_immediate_actions: usize,
    pub max_short_term_goals: usize,
    pub max_key_investments: usize,
    pub max_secondary_kpis: usize,
}

/// Reference values the current metrics are compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkPolicy {
    pub average_order_value: f64,
    pub customer_lifetime_value: f64,
    pub order_frequency: f64,
    pub churn_rate: f64,
    pub revenue_growth: f64,
    pub acquisition_rate: f64,
    /// Months used when extrapolating lifetime value.
    pub lifetime_months: f64,
}

// --- Default Implementations ---

impl Default for TrendPolicy {
    fn default() -> Self {
        Self {
            stable_band: 0.05,
            revenue_growth_trigger: 0.05,
            volume_growth_trigger: 0.03,
            revenue_decline_trigger: -0.03,
            peak_sigma: 1.0,
            forecast_window: 3,
            forecast_confident_cv: 0.2,
        }
    }
}

impl Default for SegmentationPolicy {
    fn default() -> Self {
        Self {
            vip: SegmentRule { min_orders: 10, min_spent: dec!(1000), max_recency_days: 30 },
            loyal: SegmentRule { min_orders: 5, min_spent: dec!(500), max_recency_days: 60 },
            at_risk_after_days: 90,
            new_customer_orders: 1,
            churn_high_after_days: 90,
            churn_medium_after_days: 60,
        }
    }
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            vip_share_floor_pct: 15.0,
            churn_high_impact_pct: 20.0,
            anomalous_period_limit: 5,
            pareto_rank_limit: 3,
            customer_concentration_ceiling: 0.4,
            high_variability_cv_pct: 50.0,
        }
    }
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self { base: 5, context_bonus: 2, horizon_bonus: 1, min: 0, max: 10 }
    }
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self {
            optimistic: ScenarioMultipliers {
                revenue: dec!(1.3),
                churn: 0.5,
                average_order_value: dec!(1.2),
                probability: 0.25,
            },
            realistic: ScenarioMultipliers {
                revenue: dec!(1.1),
                churn: 1.0,
                average_order_value: dec!(1.05),
                probability: 0.60,
            },
            pessimistic: ScenarioMultipliers {
                revenue: dec!(0.9),
                churn: 1.3,
                average_order_value: dec!(1.0),
                probability: 0.15,
            },
        }
    }
}

impl Default for BenchmarkPolicy {
    fn default() -> Self {
        Self {
            average_order_value: 150.0,
            customer_lifetime_value: 500.0,
            order_frequency: 3.5,
            churn_rate: 0.15,
            revenue_growth: 0.05,
            acquisition_rate: 0.10,
            lifetime_months: 12.0,
        }
    }
}

impl Default for ProductPolicy {
    fn default() -> Self {
        Self {
            pareto_share_pct: 80.0,
            gini_bands: [0.2, 0.4, 0.6, 0.8],
            high_diversity: 0.8,
            moderate_diversity: 0.5,
        }
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            strong_retention_rate: 0.10,
            max_immediate_actions: 5,
            max_short_term_goals: 3,
            max_key_investments: 3,
            max_secondary_kpis: 6,
        }
    }
}

impl InsightPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend.stable_band < 0.0 {
            return Err(ConfigError::ValidationError(
                "policy.trend.stable_band cannot be negative".to_string(),
            ));
        }
        if self.trend.forecast_window == 0 {
            return Err(ConfigError::ValidationError(
                "policy.trend.forecast_window must be at least 1".to_string(),
            ));
        }
        let products = &self.products;
        if !(products.pareto_share_pct > 0.0 && products.pareto_share_pct <= 100.0) {
            return Err(ConfigError::ValidationError(format!(
                "policy.products.pareto_share_pct must be in (0, 100] (got {})",
                products.pareto_share_pct
            )));
        }
        if products.gini_bands.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::ValidationError(
                "policy.products.gini_bands must be strictly increasing".to_string(),
            ));
        }
        if products.moderate_diversity > products.high_diversity {
            return Err(ConfigError::ValidationError(
                "policy.products.moderate_diversity exceeds high_diversity".to_string(),
            ));
        }
        let priority = &self.priority;
        if priority.min > priority.max {
            return Err(ConfigError::ValidationError(format!(
                "policy.priority.min ({}) exceeds policy.priority.max ({})",
                priority.min, priority.max
            )));
        }
        let seg = &self.segmentation;
        if seg.churn_medium_after_days > seg.churn_high_after_days {
            return Err(ConfigError::ValidationError(
                "policy.segmentation churn bands overlap (medium after high)".to_string(),
            ));
        }
        if seg.loyal.min_orders > seg.vip.min_orders || seg.loyal.min_spent > seg.vip.min_spent {
            return Err(ConfigError::ValidationError(
                "policy.segmentation.loyal must not be stricter than vip".to_string(),
            ));
        }
        let scenarios = &self.scenarios;
        let total = scenarios.optimistic.probability
            + scenarios.realistic.probability
            + scenarios.pessimistic.probability;
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::ValidationError(format!(
                "policy.scenarios probabilities must sum to 1.0 (got {total})"
            )));
        }
        if !(scenarios.optimistic.revenue > scenarios.realistic.revenue
            && scenarios.realistic.revenue > scenarios.pessimistic.revenue)
        {
            return Err(ConfigError::ValidationError(
                "policy.scenarios revenue multipliers must decrease from optimistic to pessimistic"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(InsightPolicy::default().validate().is_ok());
    }

    #[test]
    fn priority_is_clamped() {
        let policy = PriorityPolicy { base: 9, ..Default::default() };
        assert_eq!(policy.score(true, true), 10);
        assert_eq!(PriorityPolicy::default().score(false, false), 5);
        assert_eq!(PriorityPolicy::default().score(true, false), 7);
        assert_eq!(PriorityPolicy::default().score(false, true), 6);
    }

    #[test]
    fn product_bands_must_be_ordered() {
        let mut policy = InsightPolicy::default();
        policy.products.gini_bands = [0.2, 0.6, 0.4, 0.8];
        assert!(matches!(policy.validate(), Err(ConfigError::ValidationError(_))));

        let mut policy = InsightPolicy::default();
        policy.products.pareto_share_pct = 120.0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn scenario_probabilities_must_sum_to_one() {
        let mut policy = InsightPolicy::default();
        policy.scenarios.optimistic.probability = 0.5;
        assert!(matches!(policy.validate(), Err(ConfigError::ValidationError(_))));
    }
}
