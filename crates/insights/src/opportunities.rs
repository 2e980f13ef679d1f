use crate::catalogue::{InsightCategory, Signals, rank_by_score};
use crate::products::PerformanceCategory;
use configuration::{AnalysisOptions, InsightPolicy};
use core_types::{FocusArea, ImpactLevel, SegmentLabel, TimeHorizon};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    GrowthAcceleration,
    VolumeExpansion,
    VipGrowth,
    ChurnReduction,
    ProductExpansion,
}

impl OpportunityKind {
    /// Trigger family the opportunity belongs to.
    pub fn focus_area(&self) -> FocusArea {
        match self {
            OpportunityKind::GrowthAcceleration | OpportunityKind::VolumeExpansion => FocusArea::Trends,
            OpportunityKind::VipGrowth | OpportunityKind::ChurnReduction => FocusArea::Customers,
            OpportunityKind::ProductExpansion => FocusArea::Products,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub impact: ImpactLevel,
    pub confidence: f64,
    pub time_to_impact: TimeHorizon,
    pub investment: ImpactLevel,
    pub actions: Vec<String>,
    pub success_metrics: Vec<String>,
    /// `confidence * impact.weight()`.
    pub score: f64,
}

struct Template {
    kind: OpportunityKind,
    category: InsightCategory,
    title: &'static str,
    impact: ImpactLevel,
    confidence: f64,
    time_to_impact: TimeHorizon,
    investment: ImpactLevel,
    actions: &'static [&'static str],
    success_metrics: &'static [&'static str],
}

impl Template {
    fn build(self, description: String) -> Opportunity {
        Opportunity {
            kind: self.kind,
            category: self.category,
            title: self.title.to_string(),
            description,
            impact: self.impact,
            confidence: self.confidence,
            time_to_impact: self.time_to_impact,
            investment: self.investment,
            actions: self.actions.iter().map(|s| s.to_string()).collect(),
            success_metrics: self.success_metrics.iter().map(|s| s.to_string()).collect(),
            score: self.confidence * self.impact.weight(),
        }
    }
}

fn trend_opportunities(signals: &Signals, policy: &InsightPolicy, out: &mut Vec<Opportunity>) {
    let Some(trends) = signals.trends else { return };

    let revenue_slope = trends.revenue.normalized_slope;
    if revenue_slope > policy.trend.revenue_growth_trigger {
        out.push(
            Template {
                kind: OpportunityKind::GrowthAcceleration,
                category: InsightCategory::Revenue,
                title: "Accelerate revenue growth",
                impact: ImpactLevel::High,
                confidence: 0.85,
                time_to_impact: TimeHorizon::Short,
                investment: ImpactLevel::Medium,
                actions: &[
                    "Increase marketing investment",
                    "Expand best-selling products",
                    "Review pricing upward",
                ],
                success_metrics: &[
                    "Revenue growth above 20%",
                    "Higher conversion",
                    "Higher average order value",
                ],
            }
            .build(format!(
                "Revenue grows {:.1}% of its mean per period",
                revenue_slope * 100.0
            )),
        );
    }

    let volume_slope = trends.order_count.normalized_slope;
    if volume_slope > policy.trend.volume_growth_trigger {
        out.push(
            Template {
                kind: OpportunityKind::VolumeExpansion,
                category: InsightCategory::Operations,
                title: "Expand order volume capacity",
                impact: ImpactLevel::Medium,
                confidence: 0.78,
                time_to_impact: TimeHorizon::Medium,
                investment: ImpactLevel::High,
                actions: &[
                    "Scale dispensing infrastructure",
                    "Automate order handling",
                    "Increase stock capacity",
                ],
                success_metrics: &[
                    "Capacity utilization above 80%",
                    "Response time under 2 minutes",
                    "Customer satisfaction above 95%",
                ],
            }
            .build(format!(
                "Order count grows {:.1}% of its mean per period",
                volume_slope * 100.0
            )),
        );
    }
}

fn customer_opportunities(signals: &Signals, policy: &InsightPolicy, out: &mut Vec<Opportunity>) {
    let Some(segments) = signals.segments else { return };

    let vip_count = segments.count(SegmentLabel::Vip);
    let vip_pct = segments.share(SegmentLabel::Vip) * 100.0;
    if vip_count > 0 && vip_pct < policy.triggers.vip_share_floor_pct {
        out.push(
            Template {
                kind: OpportunityKind::VipGrowth,
                category: InsightCategory::Customers,
                title: "Develop the VIP segment",
                impact: ImpactLevel::High,
                confidence: 0.72,
                time_to_impact: TimeHorizon::Medium,
                investment: ImpactLevel::Medium,
                actions: &[
                    "Launch a premium loyalty programme",
                    "Offer personalised service",
                    "Create exclusive experiences",
                ],
                success_metrics: &[
                    "VIP share above 20%",
                    "VIP retention above 90%",
                    "VIP average spend up 50%",
                ],
            }
            .build(format!("Only {vip_pct:.1}% of customers are VIP")),
        );
    }

    if segments.churn.high > 0 {
        let churn_pct = segments.churn.high as f64 / segments.total_customers as f64 * 100.0;
        let impact = if churn_pct > policy.triggers.churn_high_impact_pct {
            ImpactLevel::High
        } else {
            ImpactLevel::Medium
        };
        out.push(
            Template {
                kind: OpportunityKind::ChurnReduction,
                category: InsightCategory::Customers,
                title: "Reduce customer churn",
                impact,
                confidence: 0.80,
                time_to_impact: TimeHorizon::Short,
                investment: ImpactLevel::Low,
                actions: &[
                    "Run a reactivation campaign",
                    "Send personalised offers",
                    "Improve customer support",
                ],
                success_metrics: &[
                    "Churn rate below 10%",
                    "Reactivation above 30%",
                    "NPS up 20 points",
                ],
            }
            .build(format!("{churn_pct:.1}% of customers are at high risk of churning")),
        );
    }
}

fn product_opportunities(signals: &Signals, out: &mut Vec<Opportunity>) {
    let Some(products) = signals.products else { return };

    let stars = products.in_category(PerformanceCategory::Star).count();
    if stars > 0 {
        out.push(
            Template {
                kind: OpportunityKind::ProductExpansion,
                category: InsightCategory::Products,
                title: "Expand star products",
                impact: ImpactLevel::High,
                confidence: 0.88,
                time_to_impact: TimeHorizon::Short,
                investment: ImpactLevel::Medium,
                actions: &[
                    "Increase stock of star products",
                    "Develop variants",
                    "Run focused campaigns",
                ],
                success_metrics: &[
                    "Star product sales up 40%",
                    "Gross margin up 15%",
                    "Market share up 5%",
                ],
            }
            .build(format!("{stars} products lead on both revenue and volume")),
        );
    }
}

/// Runs the opportunity triggers of every focused family and ranks the hits
/// by score, highest first.
pub fn identify(signals: &Signals, policy: &InsightPolicy, options: &AnalysisOptions) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();
    if options.focuses_on(FocusArea::Trends) {
        trend_opportunities(signals, policy, &mut opportunities);
    }
    if options.focuses_on(FocusArea::Customers) {
        customer_opportunities(signals, policy, &mut opportunities);
    }
    if options.focuses_on(FocusArea::Products) {
        product_opportunities(signals, &mut opportunities);
    }

    rank_by_score(&mut opportunities, |o| o.score);
    tracing::debug!(count = opportunities.len(), "Opportunities identified.");
    opportunities
}
