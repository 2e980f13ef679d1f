use crate::benchmarks::{BenchmarkComparison, BenchmarkPerformance, BenchmarkReport};
use crate::catalogue::InsightCategory;
use crate::opportunities::Opportunity;
use crate::products::ProductAnalysis;
use crate::recommendations::Recommendation;
use crate::risks::{Risk, RiskKind};
use crate::segmentation::SegmentationSummary;
use crate::trends::{TrendAnalysis, TrendDirection};
use analytics::DescriptiveStatistics;
use configuration::InsightPolicy;
use core_types::{ImpactLevel, SegmentLabel, TimeHorizon};
use distributions::FitResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub headline: String,
    pub key_findings: Vec<String>,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub top_opportunity: Option<String>,
    pub top_risk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub action: String,
    pub recommendation: String,
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub title: String,
    pub time_to_impact: TimeHorizon,
    pub success_metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePhase {
    pub phase: String,
    pub horizon: TimeHorizon,
    pub initiatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationPlan {
    pub risk: RiskKind,
    pub title: String,
    pub severity: ImpactLevel,
    pub actions: Vec<String>,
    pub early_warning_indicators: Vec<String>,
    pub contingency_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermStrategy {
    pub vision: String,
    /// Categories of the ranked opportunities, then of the risks, first
    /// occurrence wins.
    pub strategic_pillars: Vec<InsightCategory>,
    /// Recommendations needing a high investment or a long horizon.
    pub key_investments: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMix {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLoad {
    pub category: InsightCategory,
    pub initiatives: usize,
}

/// Effort implied by the retained recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    pub total_initiatives: usize,
    pub investment_mix: InvestmentMix,
    /// Largest single investment; `None` without recommendations.
    pub peak_investment: Option<ImpactLevel>,
    pub by_category: Vec<CategoryLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub metric: String,
    pub current: Option<f64>,
    pub target: f64,
    /// Good or better against its benchmark; `None` without data.
    pub on_target: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitoringFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessMetrics {
    pub primary_kpis: Vec<Kpi>,
    /// Success metrics of the ranked opportunities, deduplicated.
    pub secondary_kpis: Vec<String>,
    pub monitoring_frequency: MonitoringFrequency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub executive_summary: ExecutiveSummary,
    pub immediate_actions: Vec<ActionItem>,
    pub short_term_goals: Vec<Goal>,
    pub long_term_strategy: LongTermStrategy,
    pub resource_requirements: ResourceRequirements,
    pub success_metrics: SuccessMetrics,
    pub timeline: Vec<TimelinePhase>,
    pub risk_mitigation: Vec<MitigationPlan>,
}

/// Everything the plan is composed from.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub trends: Option<&'a TrendAnalysis>,
    pub segments: Option<&'a SegmentationSummary>,
    pub products: Option<&'a ProductAnalysis>,
    pub benchmarks: &'a BenchmarkReport,
    pub statistics: Option<&'a DescriptiveStatistics>,
    pub fit: Option<&'a FitResult>,
    pub opportunities: &'a [Opportunity],
    pub risks: &'a [Risk],
    pub recommendations: &'a [Recommendation],
}

fn phase_label(horizon: TimeHorizon) -> &'static str {
    match horizon {
        TimeHorizon::Short => "1-2 months",
        TimeHorizon::Medium => "3-6 months",
        TimeHorizon::Long => "6-12 months",
    }
}

fn vision(pillar: Option<InsightCategory>) -> &'static str {
    match pillar {
        Some(InsightCategory::Revenue) => "Turn the current sales momentum into sustained revenue growth",
        Some(InsightCategory::Operations) => "Run a predictable operation that scales with demand",
        Some(InsightCategory::Customers) => "Build a loyal base of high-value customers",
        Some(InsightCategory::Products) => "Focus the catalogue on the products that drive revenue",
        Some(InsightCategory::Financial) => "Strengthen margins and financial resilience",
        Some(InsightCategory::RiskManagement) => "Reduce exposure to the risks identified this period",
        None => "Maintain current performance while more data accumulates",
    }
}

fn long_term_strategy(inputs: &PlanInputs, policy: &InsightPolicy) -> LongTermStrategy {
    let mut strategic_pillars = Vec::new();
    let categories = inputs
        .opportunities
        .iter()
        .map(|o| o.category)
        .chain(inputs.risks.iter().map(|r| r.category));
    for category in categories {
        if !strategic_pillars.contains(&category) {
            strategic_pillars.push(category);
        }
    }

    let key_investments = inputs
        .recommendations
        .iter()
        .filter(|rec| rec.investment == ImpactLevel::High || rec.time_to_impact == TimeHorizon::Long)
        .take(policy.plan.max_key_investments)
        .map(|rec| rec.title.clone())
        .collect();

    LongTermStrategy {
        vision: vision(strategic_pillars.first().copied()).to_string(),
        strategic_pillars,
        key_investments,
    }
}

fn resource_requirements(recommendations: &[Recommendation]) -> ResourceRequirements {
    let mut investment_mix = InvestmentMix::default();
    let mut by_category: Vec<CategoryLoad> = Vec::new();

    for rec in recommendations {
        match rec.investment {
            ImpactLevel::Low => investment_mix.low += 1,
            ImpactLevel::Medium => investment_mix.medium += 1,
            ImpactLevel::High => investment_mix.high += 1,
        }
        match by_category.iter_mut().find(|load| load.category == rec.category) {
            Some(load) => load.initiatives += 1,
            None => by_category.push(CategoryLoad { category: rec.category, initiatives: 1 }),
        }
    }

    ResourceRequirements {
        total_initiatives: recommendations.len(),
        investment_mix,
        peak_investment: recommendations
            .iter()
            .map(|rec| rec.investment)
            .max_by(|a, b| a.weight().total_cmp(&b.weight())),
        by_category,
    }
}

fn on_target(comparison: &BenchmarkComparison) -> Option<bool> {
    comparison
        .performance
        .map(|p| matches!(p, BenchmarkPerformance::Excellent | BenchmarkPerformance::Good))
}

fn kpi(metric: &str, comparison: &BenchmarkComparison) -> Kpi {
    Kpi {
        metric: metric.to_string(),
        current: comparison.current,
        target: comparison.benchmark,
        on_target: on_target(comparison),
    }
}

fn success_metrics(inputs: &PlanInputs, policy: &InsightPolicy) -> SuccessMetrics {
    let benchmarks = inputs.benchmarks;
    let churn = &benchmarks.churn_rate;
    let retention = Kpi {
        metric: "Customer retention".to_string(),
        current: churn.current.map(|rate| 1.0 - rate),
        target: 1.0 - churn.benchmark,
        on_target: on_target(churn),
    };

    let mut secondary_kpis: Vec<String> = Vec::new();
    for metric in inputs.opportunities.iter().flat_map(|o| &o.success_metrics) {
        if secondary_kpis.len() == policy.plan.max_secondary_kpis {
            break;
        }
        if !secondary_kpis.contains(metric) {
            secondary_kpis.push(metric.clone());
        }
    }

    let monitoring_frequency = if inputs.risks.iter().any(|r| r.severity == ImpactLevel::High) {
        MonitoringFrequency::Weekly
    } else if !inputs.risks.is_empty() {
        MonitoringFrequency::Biweekly
    } else {
        MonitoringFrequency::Monthly
    };

    SuccessMetrics {
        primary_kpis: vec![
            kpi("Revenue growth", &benchmarks.revenue_growth),
            retention,
            kpi("Average order value", &benchmarks.average_order_value),
        ],
        secondary_kpis,
        monitoring_frequency,
    }
}

fn key_findings(inputs: &PlanInputs, policy: &InsightPolicy) -> Vec<String> {
    let mut findings = Vec::new();

    if let Some(trends) = inputs.trends {
        let revenue = &trends.revenue;
        let direction = match revenue.direction {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        findings.push(match revenue.percent_change {
            Some(change) => format!(
                "Revenue is {direction} over {} periods ({change:+.1}% first to last)",
                revenue.periods
            ),
            None => format!("Revenue is {direction} over {} periods", revenue.periods),
        });
    }

    if let Some(forecast) = inputs.trends.and_then(|t| t.revenue_forecast) {
        findings.push(format!(
            "Next period revenue estimated at {:.2} ({:.2} to {:.2})",
            forecast.value, forecast.lower, forecast.upper
        ));
    }

    if let Some(mix) = inputs.products.and_then(|p| p.mix.as_ref()) {
        findings.push(format!(
            "{} units over {} products (Gini {:.2}, {:?} diversity)",
            mix.units_sold, mix.unique_products, mix.gini_index, mix.diversity
        ));
    }

    if let Some(segments) = inputs.segments {
        findings.push(format!(
            "{} customers: {} VIP, {} at high churn risk",
            segments.total_customers,
            segments.count(SegmentLabel::Vip),
            segments.churn.high
        ));
    }

    if let Some(stats) = inputs.statistics {
        let cv = stats.coefficient_of_variation;
        findings.push(if cv > policy.triggers.high_variability_cv_pct {
            format!("Order amounts are highly variable (CV {cv:.1}%)")
        } else {
            format!("Order amounts average {:.2} (CV {cv:.1}%)", stats.mean)
        });
    }

    if let Some(best) = inputs.fit.and_then(|fit| fit.best.map(|kind| (kind, fit.reliable))) {
        let (kind, reliable) = best;
        let caveat = if reliable { "" } else { " on a small sample" };
        findings.push(format!("Order amounts fit a {} model best{caveat}", kind.as_str()));
    }

    if findings.is_empty() {
        findings.push("No data available for the selected period".to_string());
    }
    findings
}

fn executive_summary(inputs: &PlanInputs, policy: &InsightPolicy) -> ExecutiveSummary {
    let mut strengths = Vec::new();
    let mut improvement_areas = Vec::new();

    if let Some(trends) = inputs.trends {
        let slope = trends.revenue.normalized_slope;
        if slope > policy.trend.revenue_growth_trigger {
            strengths.push("Sustained revenue growth".to_string());
        } else if slope < 0.0 {
            improvement_areas.push("Reverse the revenue decline".to_string());
        }
    }
    if let Some(segments) = inputs.segments {
        let churn = segments.churn.high_rate();
        if churn < policy.plan.strong_retention_rate {
            strengths.push("Strong customer retention".to_string());
        } else if churn * 100.0 > policy.triggers.churn_high_impact_pct {
            improvement_areas.push("Improve customer retention".to_string());
        }
    }

    ExecutiveSummary {
        headline: format!(
            "{} opportunities and {} risks identified",
            inputs.opportunities.len(),
            inputs.risks.len()
        ),
        key_findings: key_findings(inputs, policy),
        strengths,
        improvement_areas,
        top_opportunity: inputs.opportunities.first().map(|o| o.title.clone()),
        top_risk: inputs.risks.first().map(|r| r.title.clone()),
    }
}

/// Composes the plan from the ranked opportunities, risks and
/// recommendations. Identical inputs give an identical plan.
pub fn compose(inputs: &PlanInputs, policy: &InsightPolicy) -> ActionPlan {
    let immediate_actions = inputs
        .recommendations
        .iter()
        .filter(|rec| rec.time_to_impact == TimeHorizon::Short)
        .filter_map(|rec| {
            rec.actions.first().map(|action| ActionItem {
                action: action.clone(),
                recommendation: rec.title.clone(),
                priority: rec.priority,
            })
        })
        .take(policy.plan.max_immediate_actions)
        .collect();

    let short_term_goals = inputs
        .opportunities
        .iter()
        .filter(|o| o.time_to_impact != TimeHorizon::Long)
        .take(policy.plan.max_short_term_goals)
        .map(|o| Goal {
            title: o.title.clone(),
            time_to_impact: o.time_to_impact,
            success_metrics: o.success_metrics.clone(),
        })
        .collect();

    let timeline = [TimeHorizon::Short, TimeHorizon::Medium, TimeHorizon::Long]
        .into_iter()
        .map(|horizon| TimelinePhase {
            phase: phase_label(horizon).to_string(),
            horizon,
            initiatives: inputs
                .recommendations
                .iter()
                .filter(|rec| rec.time_to_impact == horizon)
                .map(|rec| rec.title.clone())
                .collect(),
        })
        .collect();

    let risk_mitigation = inputs
        .risks
        .iter()
        .map(|risk| MitigationPlan {
            risk: risk.kind,
            title: risk.title.clone(),
            severity: risk.severity,
            actions: risk.mitigation_actions.clone(),
            early_warning_indicators: risk.early_warning_indicators.clone(),
            contingency_plan: risk.contingency_plan.clone(),
        })
        .collect();

    ActionPlan {
        executive_summary: executive_summary(inputs, policy),
        immediate_actions,
        short_term_goals,
        long_term_strategy: long_term_strategy(inputs, policy),
        resource_requirements: resource_requirements(inputs.recommendations),
        success_metrics: success_metrics(inputs, policy),
        timeline,
        risk_mitigation,
    }
}
