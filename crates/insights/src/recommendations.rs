use crate::catalogue::InsightCategory;
use crate::opportunities::{Opportunity, OpportunityKind};
use crate::risks::{Risk, RiskKind};
use configuration::{AnalysisOptions, PriorityPolicy};
use core_types::{BusinessContext, ImpactLevel, TimeHorizon};
use serde::{Deserialize, Serialize};

/// What a recommendation was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum RecommendationSource {
    Opportunity(OpportunityKind),
    Risk(RiskKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub source: RecommendationSource,
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    pub time_to_impact: TimeHorizon,
    pub investment: ImpactLevel,
    pub impact: ImpactLevel,
    pub actions: Vec<String>,
    /// `0..=10`, higher first.
    pub priority: i32,
    pub feasibility_score: u8,
    pub impact_score: u8,
}

/// Category a business context rewards.
pub fn context_category(context: BusinessContext) -> InsightCategory {
    match context {
        BusinessContext::Growth => InsightCategory::Revenue,
        BusinessContext::RiskAssessment => InsightCategory::RiskManagement,
        BusinessContext::Optimization | BusinessContext::Efficiency => InsightCategory::Operations,
        BusinessContext::Expansion => InsightCategory::Products,
    }
}

/// Lower investment is easier to execute.
pub fn feasibility_score(investment: ImpactLevel) -> u8 {
    match investment {
        ImpactLevel::Low => 8,
        ImpactLevel::Medium => 6,
        ImpactLevel::High => 4,
    }
}

pub fn impact_score(impact: ImpactLevel) -> u8 {
    match impact {
        ImpactLevel::High => 9,
        ImpactLevel::Medium => 6,
        ImpactLevel::Low => 3,
    }
}

fn from_opportunity(opportunity: &Opportunity) -> Recommendation {
    Recommendation {
        source: RecommendationSource::Opportunity(opportunity.kind),
        title: opportunity.title.clone(),
        description: opportunity.description.clone(),
        category: opportunity.category,
        time_to_impact: opportunity.time_to_impact,
        investment: opportunity.investment,
        impact: opportunity.impact,
        actions: opportunity.actions.clone(),
        priority: 0,
        feasibility_score: feasibility_score(opportunity.investment),
        impact_score: impact_score(opportunity.impact),
    }
}

fn from_risk(risk: &Risk) -> Recommendation {
    Recommendation {
        source: RecommendationSource::Risk(risk.kind),
        title: format!("Mitigate: {}", risk.title.to_lowercase()),
        description: risk.description.clone(),
        category: InsightCategory::RiskManagement,
        time_to_impact: risk.time_horizon,
        investment: ImpactLevel::Medium,
        impact: risk.severity,
        actions: risk.mitigation_actions.clone(),
        priority: 0,
        feasibility_score: feasibility_score(ImpactLevel::Medium),
        impact_score: impact_score(risk.severity),
    }
}

/// Turns every opportunity and risk into a recommendation, scores its
/// priority against the requested context and horizon, drops those under the
/// threshold and sorts the rest by priority, then impact score.
pub fn prioritize(
    opportunities: &[Opportunity],
    risks: &[Risk],
    options: &AnalysisOptions,
    policy: &PriorityPolicy,
) -> Vec<Recommendation> {
    let rewarded = context_category(options.business_context);
    let threshold = i32::from(options.priority_threshold);

    let mut recommendations: Vec<Recommendation> = opportunities
        .iter()
        .map(from_opportunity)
        .chain(risks.iter().map(from_risk))
        .map(|mut rec| {
            rec.priority =
                policy.score(rec.category == rewarded, rec.time_to_impact == options.time_horizon);
            rec
        })
        .filter(|rec| rec.priority >= threshold)
        .collect();

    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.impact_score.cmp(&a.impact_score))
    });
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunity(kind: OpportunityKind, category: InsightCategory, horizon: TimeHorizon) -> Opportunity {
        Opportunity {
            kind,
            category,
            title: "t".into(),
            description: "d".into(),
            impact: ImpactLevel::High,
            confidence: 0.8,
            time_to_impact: horizon,
            investment: ImpactLevel::Low,
            actions: vec!["a".into()],
            success_metrics: vec![],
            score: 2.4,
        }
    }

    #[test]
    fn context_and_horizon_bonuses_stack() {
        let options = AnalysisOptions {
            business_context: BusinessContext::Growth,
            time_horizon: TimeHorizon::Short,
            priority_threshold: 1,
            ..AnalysisOptions::default()
        };
        let opportunities = [
            opportunity(OpportunityKind::GrowthAcceleration, InsightCategory::Revenue, TimeHorizon::Short),
            opportunity(OpportunityKind::VipGrowth, InsightCategory::Customers, TimeHorizon::Medium),
            opportunity(OpportunityKind::ChurnReduction, InsightCategory::Customers, TimeHorizon::Short),
        ];
        let recs = prioritize(&opportunities, &[], &options, &PriorityPolicy::default());
        let priorities: Vec<_> = recs.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, [8, 6, 5]);
        assert_eq!(recs[0].source, RecommendationSource::Opportunity(OpportunityKind::GrowthAcceleration));
        assert_eq!(recs[0].feasibility_score, 8);
        assert_eq!(recs[0].impact_score, 9);
    }

    #[test]
    fn nothing_below_the_threshold_survives() {
        let options = AnalysisOptions { priority_threshold: 7, ..AnalysisOptions::default() };
        let opportunities = [
            opportunity(OpportunityKind::VolumeExpansion, InsightCategory::Operations, TimeHorizon::Medium),
            opportunity(OpportunityKind::ProductExpansion, InsightCategory::Products, TimeHorizon::Short),
        ];
        let recs = prioritize(&opportunities, &[], &options, &PriorityPolicy::default());
        assert_eq!(recs.len(), 1);
        assert!(recs.iter().all(|r| r.priority >= 7));
    }

    #[test]
    fn risks_become_risk_management_recommendations() {
        let options = AnalysisOptions {
            business_context: BusinessContext::RiskAssessment,
            time_horizon: TimeHorizon::Short,
            ..AnalysisOptions::default()
        };
        let risk = Risk {
            kind: RiskKind::RevenueDecline,
            category: InsightCategory::Financial,
            title: "Revenue decline".into(),
            description: "d".into(),
            severity: ImpactLevel::High,
            probability: 0.75,
            time_horizon: TimeHorizon::Short,
            mitigation_actions: vec!["Review the commercial strategy".into()],
            early_warning_indicators: vec![],
            contingency_plan: "c".into(),
            risk_score: 2.25,
        };
        let recs = prioritize(&[], &[risk], &options, &PriorityPolicy::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, InsightCategory::RiskManagement);
        assert_eq!(recs[0].priority, 8);
        assert_eq!(recs[0].title, "Mitigate: revenue decline");
        assert_eq!(recs[0].feasibility_score, 6);
    }
}
