use crate::catalogue::{InsightCategory, Signals, rank_by_score};
use configuration::{AnalysisOptions, InsightPolicy};
use core_types::{FocusArea, ImpactLevel, SegmentLabel, TimeHorizon};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    RevenueDecline,
    ConcentrationRisk,
    OperationalInstability,
    CustomerConcentration,
}

impl RiskKind {
    pub fn focus_area(&self) -> FocusArea {
        match self {
            RiskKind::RevenueDecline => FocusArea::Financial,
            RiskKind::ConcentrationRisk => FocusArea::Products,
            RiskKind::OperationalInstability => FocusArea::Operations,
            RiskKind::CustomerConcentration => FocusArea::Customers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub kind: RiskKind,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub severity: ImpactLevel,
    pub probability: f64,
    pub time_horizon: TimeHorizon,
    pub mitigation_actions: Vec<String>,
    pub early_warning_indicators: Vec<String>,
    pub contingency_plan: String,
    /// `probability * severity.weight()`.
    pub risk_score: f64,
}

#[allow(clippy::too_many_arguments)]
fn risk(
    kind: RiskKind,
    category: InsightCategory,
    title: &str,
    description: String,
    severity: ImpactLevel,
    probability: f64,
    time_horizon: TimeHorizon,
    mitigation_actions: &[&str],
    early_warning_indicators: &[&str],
    contingency_plan: &str,
) -> Risk {
    Risk {
        kind,
        category,
        title: title.to_string(),
        description,
        severity,
        probability,
        time_horizon,
        mitigation_actions: mitigation_actions.iter().map(|s| s.to_string()).collect(),
        early_warning_indicators: early_warning_indicators.iter().map(|s| s.to_string()).collect(),
        contingency_plan: contingency_plan.to_string(),
        risk_score: probability * severity.weight(),
    }
}

fn revenue_decline(signals: &Signals, policy: &InsightPolicy) -> Option<Risk> {
    let slope = signals.trends?.revenue.normalized_slope;
    (slope < policy.trend.revenue_decline_trigger).then(|| {
        risk(
            RiskKind::RevenueDecline,
            InsightCategory::Financial,
            "Revenue decline",
            format!("Revenue falls {:.1}% of its mean per period", -slope * 100.0),
            ImpactLevel::High,
            0.75,
            TimeHorizon::Short,
            &[
                "Review the commercial strategy",
                "Analyse competitor activity",
                "Diversify the product range",
            ],
            &["Monthly sales below 95% of target", "Conversion below baseline"],
            "Cost reduction and market refocus",
        )
    })
}

fn concentration_risk(signals: &Signals, policy: &InsightPolicy) -> Option<Risk> {
    let rank = signals.products?.concentration.pareto_rank?;
    (rank < policy.triggers.pareto_rank_limit).then(|| {
        risk(
            RiskKind::ConcentrationRisk,
            InsightCategory::Products,
            "Revenue concentration",
            format!(
                "The top {rank} products generate {:.0}% of revenue",
                policy.products.pareto_share_pct
            ),
            ImpactLevel::Medium,
            0.60,
            TimeHorizon::Medium,
            &[
                "Diversify the product portfolio",
                "Develop new segments",
                "Reduce dependence on key products",
            ],
            &["Lead product sales below 80% of usual", "New products under 10% of revenue"],
            "Accelerated launch of alternative products",
        )
    })
}

fn operational_instability(signals: &Signals, policy: &InsightPolicy) -> Option<Risk> {
    let count = signals.anomalies?.count();
    (count > policy.triggers.anomalous_period_limit).then(|| {
        risk(
            RiskKind::OperationalInstability,
            InsightCategory::Operations,
            "Operational instability",
            format!("{count} periods with anomalous order count or revenue"),
            ImpactLevel::Medium,
            0.65,
            TimeHorizon::Short,
            &[
                "Monitor orders in real time",
                "Tighten dispensing quality control",
                "Prepare contingency procedures",
            ],
            &["Daily variation above 30%", "Complaints above baseline"],
            "Escalation and rapid response protocol",
        )
    })
}

fn customer_concentration(signals: &Signals, policy: &InsightPolicy) -> Option<Risk> {
    let share = signals.segments?.share(SegmentLabel::Vip);
    (share > policy.triggers.customer_concentration_ceiling).then(|| {
        risk(
            RiskKind::CustomerConcentration,
            InsightCategory::Customers,
            "Customer concentration",
            format!("{:.1}% of customers are VIP", share * 100.0),
            ImpactLevel::High,
            0.55,
            TimeHorizon::Medium,
            &[
                "Broaden the customer base",
                "Open new sales channels",
                "Run acquisition programmes",
            ],
            &["Top customers above 70% of revenue", "Fewer than 20 new customers a month"],
            "Accelerated customer acquisition",
        )
    })
}

/// Runs the risk triggers of every focused family and ranks the hits by risk
/// score, highest first.
pub fn assess(signals: &Signals, policy: &InsightPolicy, options: &AnalysisOptions) -> Vec<Risk> {
    let triggers: [(RiskKind, fn(&Signals, &InsightPolicy) -> Option<Risk>); 4] = [
        (RiskKind::RevenueDecline, revenue_decline),
        (RiskKind::ConcentrationRisk, concentration_risk),
        (RiskKind::OperationalInstability, operational_instability),
        (RiskKind::CustomerConcentration, customer_concentration),
    ];

    let mut risks: Vec<Risk> = triggers
        .iter()
        .filter(|(kind, _)| options.focuses_on(kind.focus_area()))
        .filter_map(|(_, trigger)| trigger(signals, policy))
        .collect();

    rank_by_score(&mut risks, |r| r.risk_score);
    tracing::debug!(count = risks.len(), "Risks assessed.");
    risks
}
