//! # vendstat Business Insights
//!
//! Turns the aggregate tables and the upstream statistics into ranked
//! opportunities, risks and prioritized recommendations, with scenarios,
//! benchmarks and an action plan built from them.
//!
//! Missing inputs never fail a run: every section that lacks its data comes
//! back empty or `None`, and the trigger that needs it simply does not fire.

use crate::action_plan::{ActionPlan, PlanInputs};
use crate::anomalies::AnomalyReport;
use crate::benchmarks::BenchmarkReport;
use crate::catalogue::Signals;
use crate::error::InsightError;
use crate::impact::ImpactMetrics;
use crate::opportunities::Opportunity;
use crate::products::ProductAnalysis;
use crate::recommendations::Recommendation;
use crate::risks::Risk;
use crate::scenarios::{BaseMetrics, ScenarioSet};
use crate::segmentation::SegmentationSummary;
use crate::trends::TrendAnalysis;
use analytics::DescriptiveStatistics;
use chrono::{DateTime, Utc};
use configuration::{AnalysisOptions, InsightPolicy};
use core_types::{
    BusinessContext, CustomerAggregate, FocusArea, PeriodAggregate, ProductAggregate, TimeHorizon,
};
use distributions::FitResult;
use serde::Serialize;

pub mod action_plan;
pub mod anomalies;
pub mod benchmarks;
pub mod catalogue;
pub mod error;
pub mod impact;
pub mod opportunities;
pub mod products;
pub mod recommendations;
pub mod risks;
pub mod scenarios;
pub mod segmentation;
pub mod trends;

pub use catalogue::InsightCategory;

/// Data the generator works from. Every piece is optional in practice:
/// empty tables and `None` statistics are valid.
#[derive(Debug, Clone, Copy)]
pub struct InsightInput<'a> {
    pub statistics: Option<&'a DescriptiveStatistics>,
    pub fit: Option<&'a FitResult>,
    /// Time-ordered, oldest first.
    pub periods: &'a [PeriodAggregate],
    pub customers: &'a [CustomerAggregate],
    pub products: &'a [ProductAggregate],
    /// Reference instant for customer recency.
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInsightReport {
    pub generated_at: DateTime<Utc>,
    pub business_context: BusinessContext,
    pub time_horizon: TimeHorizon,
    pub focus_areas: Vec<FocusArea>,
    pub trends: Option<TrendAnalysis>,
    pub segments: Option<SegmentationSummary>,
    pub products: Option<ProductAnalysis>,
    pub anomalies: Option<AnomalyReport>,
    pub opportunities: Vec<Opportunity>,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<Recommendation>,
    pub scenarios: ScenarioSet,
    pub benchmarks: BenchmarkReport,
    pub action_plan: ActionPlan,
    pub impact_metrics: ImpactMetrics,
    /// Sections skipped for lack of data.
    pub data_gaps: Vec<String>,
}

impl BusinessInsightReport {
    /// True when no trigger fired. Still a valid report.
    pub fn is_quiet(&self) -> bool {
        self.opportunities.is_empty() && self.risks.is_empty()
    }
}

/// The insight engine. Holds only the validated policy.
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    policy: InsightPolicy,
}

impl InsightGenerator {
    /// Fails only if the policy table is inconsistent.
    pub fn new(policy: InsightPolicy) -> Result<Self, InsightError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &InsightPolicy {
        &self.policy
    }

    /// Derives, triggers, prioritizes and composes the full insight report.
    pub fn generate(&self, input: InsightInput, options: &AnalysisOptions) -> BusinessInsightReport {
        let policy = &self.policy;

        // 1. Derive
        let trends = trends::analyze(input.periods, &policy.trend);
        let segments = segmentation::segment_customers(input.customers, input.as_of, &policy.segmentation);
        let products = products::analyze(input.products, &policy.products);
        let anomalies = anomalies::detect(input.periods);

        let mut data_gaps = Vec::new();
        if trends.is_none() {
            data_gaps.push("trends: fewer than two periods".to_string());
        }
        if segments.is_none() {
            data_gaps.push("segments: no customers".to_string());
        }
        if products.is_none() {
            data_gaps.push("products: no product table".to_string());
        }
        if input.statistics.is_none() {
            data_gaps.push("statistics: no order amounts".to_string());
        }

        // 2. Trigger and rank
        let signals = Signals {
            trends: trends.as_ref(),
            segments: segments.as_ref(),
            products: products.as_ref(),
            anomalies: anomalies.as_ref(),
        };
        let opportunities = opportunities::identify(&signals, policy, options);
        let risks = risks::assess(&signals, policy, options);

        // 3. Prioritize
        let recommendations =
            recommendations::prioritize(&opportunities, &risks, options, &policy.priority);

        // 4. Project and compare
        let base = BaseMetrics::observe(input.periods, segments.as_ref());
        let scenarios = scenarios::project(base, &policy.scenarios);
        let benchmarks = benchmarks::compare(segments.as_ref(), trends.as_ref(), &policy.benchmarks);

        // 5. Compose
        let action_plan = action_plan::compose(
            &PlanInputs {
                trends: trends.as_ref(),
                segments: segments.as_ref(),
                products: products.as_ref(),
                benchmarks: &benchmarks,
                statistics: input.statistics,
                fit: input.fit,
                opportunities: &opportunities,
                risks: &risks,
                recommendations: &recommendations,
            },
            policy,
        );
        let impact_metrics =
            impact::measure(&opportunities, &risks, &recommendations, &scenarios, segments.as_ref());

        tracing::info!(
            opportunities = opportunities.len(),
            risks = risks.len(),
            recommendations = recommendations.len(),
            gaps = data_gaps.len(),
            "Business insights generated."
        );

        BusinessInsightReport {
            generated_at: input.as_of,
            business_context: options.business_context,
            time_horizon: options.time_horizon,
            focus_areas: options.focus_areas.clone(),
            trends,
            segments,
            products,
            anomalies,
            opportunities,
            risks,
            recommendations,
            scenarios,
            benchmarks,
            action_plan,
            impact_metrics,
            data_gaps,
        }
    }
}
