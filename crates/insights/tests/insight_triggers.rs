use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{AnalysisOptions, InsightPolicy};
use core_types::{
    BusinessContext, CustomerAggregate, FocusArea, ImpactLevel, PeriodAggregate, ProductAggregate,
    TimeHorizon,
};
use insights::InsightCategory;
use insights::action_plan::{InvestmentMix, MonitoringFrequency};
use insights::opportunities::OpportunityKind;
use insights::risks::RiskKind;
use insights::{InsightGenerator, InsightInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
}

fn growing_periods() -> Vec<PeriodAggregate> {
    (0..8)
        .map(|i| PeriodAggregate {
            period: format!("2024-06-{:02}", i + 1),
            order_count: 20 + 2 * i,
            revenue: Decimal::from(1000 + 100 * i),
        })
        .collect()
}

fn customers() -> Vec<CustomerAggregate> {
    let customer = |id: u64, orders: u64, spent: Decimal, days_ago: i64| CustomerAggregate {
        user_id: id,
        order_count: orders,
        total_spent: spent,
        last_order: as_of() - Duration::days(days_ago),
    };
    let mut list = vec![customer(1, 15, dec!(2000), 2)];
    list.extend((2..=4).map(|id| customer(id, 2, dec!(80), 120)));
    list.extend((5..=10).map(|id| customer(id, 3, dec!(150), 15)));
    list
}

fn products() -> Vec<ProductAggregate> {
    [("a", 50, 5000), ("b", 5, 4000), ("c", 40, 300), ("d", 2, 100)]
        .into_iter()
        .map(|(id, orders, revenue)| ProductAggregate {
            product_id: id.to_string(),
            name: id.to_uppercase(),
            order_count: orders,
            revenue: Decimal::from(revenue),
        })
        .collect()
}

fn generator() -> InsightGenerator {
    InsightGenerator::new(InsightPolicy::default()).unwrap()
}

#[test]
fn full_dataset_fires_the_expected_triggers_in_rank_order() {
    let (periods, customers, products) = (growing_periods(), customers(), products());
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &customers,
        products: &products,
        as_of: as_of(),
    };
    let report = generator().generate(input, &AnalysisOptions::default());

    let kinds: Vec<_> = report.opportunities.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        [
            OpportunityKind::ProductExpansion,
            OpportunityKind::GrowthAcceleration,
            OpportunityKind::ChurnReduction,
            OpportunityKind::VipGrowth,
            OpportunityKind::VolumeExpansion,
        ]
    );
    let churn = &report.opportunities[2];
    assert_eq!(churn.impact, ImpactLevel::High);

    let risks: Vec<_> = report.risks.iter().map(|r| r.kind).collect();
    assert_eq!(risks, [RiskKind::ConcentrationRisk]);
    assert_eq!(report.products.as_ref().unwrap().concentration.pareto_rank, Some(2));

    assert_eq!(report.action_plan.risk_mitigation.len(), 1);
    assert_eq!(report.action_plan.executive_summary.top_opportunity.as_deref(), Some("Expand star products"));
    assert!(report.data_gaps.iter().any(|gap| gap.starts_with("statistics")));
}

#[test]
fn action_plan_strategy_resources_and_metrics_follow_the_triggers() {
    let (periods, customers, products) = (growing_periods(), customers(), products());
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &customers,
        products: &products,
        as_of: as_of(),
    };
    let report = generator().generate(input, &AnalysisOptions::default());
    let plan = &report.action_plan;

    // Opportunity categories in rank order; the products risk adds nothing new.
    let strategy = &plan.long_term_strategy;
    assert_eq!(
        strategy.strategic_pillars,
        [
            InsightCategory::Products,
            InsightCategory::Revenue,
            InsightCategory::Customers,
            InsightCategory::Operations,
        ]
    );
    assert_eq!(strategy.vision, "Focus the catalogue on the products that drive revenue");
    assert_eq!(strategy.key_investments, ["Expand order volume capacity"]);

    // Five opportunities and one risk survive the default threshold.
    let resources = &plan.resource_requirements;
    assert_eq!(resources.total_initiatives, 6);
    assert_eq!(resources.investment_mix, InvestmentMix { low: 1, medium: 4, high: 1 });
    assert_eq!(resources.peak_investment, Some(ImpactLevel::High));
    let customers_load = resources
        .by_category
        .iter()
        .find(|load| load.category == InsightCategory::Customers)
        .unwrap();
    assert_eq!(customers_load.initiatives, 2);

    let metrics = &plan.success_metrics;
    let growth = &metrics.primary_kpis[0];
    assert_eq!(growth.metric, "Revenue growth");
    assert_eq!(growth.on_target, Some(true));
    let retention = &metrics.primary_kpis[1];
    assert!((retention.current.unwrap() - 0.7).abs() < 1e-12);
    assert!((retention.target - 0.85).abs() < 1e-12);
    assert_eq!(retention.on_target, Some(false));
    assert_eq!(
        metrics.secondary_kpis,
        [
            "Star product sales up 40%",
            "Gross margin up 15%",
            "Market share up 5%",
            "Revenue growth above 20%",
            "Higher conversion",
            "Higher average order value",
        ]
    );
    assert_eq!(metrics.monitoring_frequency, MonitoringFrequency::Biweekly);
    assert_eq!(plan.timeline[0].phase, "1-2 months");
}

#[test]
fn trends_and_products_carry_peaks_forecast_and_mix() {
    let (periods, products) = (growing_periods(), products());
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &[],
        products: &products,
        as_of: as_of(),
    };
    let report = generator().generate(input, &AnalysisOptions::default());

    let trends = report.trends.as_ref().unwrap();
    // Mean 1350, sigma ~229: the last two days clear the threshold.
    let peak_days: Vec<_> = trends.peaks.revenue.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(peak_days, ["2024-06-08", "2024-06-07"]);
    assert_eq!(trends.peaks.order_count.len(), 2);
    let forecast = trends.revenue_forecast.unwrap();
    assert!(forecast.value > 1600.0 && forecast.lower < forecast.value);

    let mix = report.products.as_ref().unwrap().mix.as_ref().unwrap();
    assert_eq!(mix.units_sold, 97);
    assert!((mix.gini_index - 0.4613402062).abs() < 1e-9);
    assert!(
        report
            .action_plan
            .executive_summary
            .key_findings
            .iter()
            .any(|f| f.starts_with("Next period revenue estimated at"))
    );
}

#[test]
fn focus_areas_gate_trigger_families() {
    let (periods, customers, products) = (growing_periods(), customers(), products());
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &customers,
        products: &products,
        as_of: as_of(),
    };
    let options = AnalysisOptions { focus_areas: vec![FocusArea::Customers], ..AnalysisOptions::default() };
    let report = generator().generate(input, &options);

    assert!(report.opportunities.iter().all(|o| o.kind.focus_area() == FocusArea::Customers));
    assert_eq!(report.opportunities.len(), 2);
    assert!(report.risks.is_empty());
}

#[test]
fn threshold_keeps_only_boosted_recommendations() {
    let (periods, customers, products) = (growing_periods(), customers(), products());
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &customers,
        products: &products,
        as_of: as_of(),
    };
    let options = AnalysisOptions {
        business_context: BusinessContext::Growth,
        time_horizon: TimeHorizon::Short,
        priority_threshold: 7,
        ..AnalysisOptions::default()
    };
    let report = generator().generate(input, &options);

    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].priority, 8);
    assert!(report.recommendations.iter().all(|r| r.priority >= 7));
}

#[test]
fn scenarios_project_from_observed_revenue() {
    let periods = growing_periods();
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &periods,
        customers: &[],
        products: &[],
        as_of: as_of(),
    };
    let report = generator().generate(input, &AnalysisOptions::default());
    let scenarios = &report.scenarios;

    assert_eq!(scenarios.base.revenue, Some(dec!(10800)));
    assert!(scenarios.optimistic.projected_revenue > scenarios.realistic.projected_revenue);
    assert!(scenarios.realistic.projected_revenue > scenarios.pessimistic.projected_revenue);
    assert_eq!(scenarios.base.customer_count, None);
}

#[test]
fn empty_input_is_a_quiet_but_valid_report() {
    let input = InsightInput {
        statistics: None,
        fit: None,
        periods: &[],
        customers: &[],
        products: &[],
        as_of: as_of(),
    };
    let report = generator().generate(input, &AnalysisOptions::default());

    assert!(report.is_quiet());
    assert!(report.recommendations.is_empty());
    assert!(report.trends.is_none() && report.segments.is_none());
    assert_eq!(report.scenarios.expected_revenue, None);
    assert_eq!(report.data_gaps.len(), 4);
    assert!(serde_json::to_value(&report).is_ok());
}
