use crate::opportunities::Opportunity;
use crate::recommendations::Recommendation;
use crate::risks::Risk;
use crate::scenarios::ScenarioSet;
use crate::segmentation::SegmentationSummary;
use core_types::ImpactLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Favorable,
    Balanced,
    Unfavorable,
}

/// Aggregate figures derived from the other sections of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMetrics {
    pub opportunities_identified: usize,
    pub high_impact_opportunities: usize,
    pub risks_identified: usize,
    pub high_severity_risks: usize,
    pub recommendations_prioritized: usize,
    pub average_priority: Option<f64>,
    pub average_feasibility: Option<f64>,
    /// Sum of opportunity scores.
    pub opportunity_value: f64,
    /// Sum of risk scores.
    pub risk_exposure: f64,
    pub outlook: Outlook,
    /// Realistic projection minus the observed revenue.
    pub revenue_upside: Option<Decimal>,
    /// Observed revenue minus the pessimistic projection.
    pub revenue_downside: Option<Decimal>,
    pub customers_at_risk: Option<usize>,
}

fn average(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f64>() / n as f64)
}

pub fn measure(
    opportunities: &[Opportunity],
    risks: &[Risk],
    recommendations: &[Recommendation],
    scenarios: &ScenarioSet,
    segments: Option<&SegmentationSummary>,
) -> ImpactMetrics {
    let opportunity_value: f64 = opportunities.iter().map(|o| o.score).sum();
    let risk_exposure: f64 = risks.iter().map(|r| r.risk_score).sum();
    let outlook = match opportunity_value - risk_exposure {
        net if net > 0.0 => Outlook::Favorable,
        net if net < 0.0 => Outlook::Unfavorable,
        _ => Outlook::Balanced,
    };

    let base = scenarios.base.revenue;
    let revenue_upside = base.zip(scenarios.realistic.projected_revenue).map(|(b, r)| r - b);
    let revenue_downside = base.zip(scenarios.pessimistic.projected_revenue).map(|(b, p)| b - p);

    ImpactMetrics {
        opportunities_identified: opportunities.len(),
        high_impact_opportunities: opportunities.iter().filter(|o| o.impact == ImpactLevel::High).count(),
        risks_identified: risks.len(),
        high_severity_risks: risks.iter().filter(|r| r.severity == ImpactLevel::High).count(),
        recommendations_prioritized: recommendations.len(),
        average_priority: average(recommendations.iter().map(|r| f64::from(r.priority))),
        average_feasibility: average(recommendations.iter().map(|r| f64::from(r.feasibility_score))),
        opportunity_value,
        risk_exposure,
        outlook,
        revenue_upside,
        revenue_downside,
        customers_at_risk: segments.map(|s| s.churn.high),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{self, BaseMetrics};
    use configuration::ScenarioPolicy;
    use rust_decimal_macros::dec;

    #[test]
    fn revenue_swing_comes_from_the_scenarios() {
        let base = BaseMetrics { revenue: Some(dec!(1000)), ..BaseMetrics::default() };
        let set = scenarios::project(base, &ScenarioPolicy::default());
        let metrics = measure(&[], &[], &[], &set, None);

        assert_eq!(metrics.revenue_upside, Some(dec!(100)));
        assert_eq!(metrics.revenue_downside, Some(dec!(100)));
        assert_eq!(metrics.outlook, Outlook::Balanced);
        assert_eq!(metrics.average_priority, None);
        assert_eq!(metrics.customers_at_risk, None);
    }
}
