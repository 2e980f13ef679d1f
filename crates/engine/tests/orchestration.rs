use assert_approx_eq::assert_approx_eq;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{RawAnalysisOptions, Settings};
use core_types::{CustomerAggregate, DistributionKind, ErrorKind, PeriodAggregate, SampleFilter};
use distributions::report::ModelingAdvice;
use engine::section::Section;
use engine::source::{AnalyticsSource, RawDataset};
use engine::{AnalysisRequest, AnalyticsEngine, EngineError, InMemorySource, SourceError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        filter: SampleFilter::default(),
        options: RawAnalysisOptions::default(),
        as_of: as_of(),
    }
}

fn engine() -> AnalyticsEngine {
    AnalyticsEngine::new(Settings::default()).unwrap()
}

fn full_dataset() -> RawDataset {
    RawDataset {
        period: Some("2024-06".into()),
        order_amounts: [10, 20, 20, 30, 40, 50, 60, 70, 80, 90].iter().map(|v| json!(v)).collect(),
        daily_order_counts: [3, 4, 2, 5, 3, 4, 3, 2, 4, 3].iter().map(|v| json!(v)).collect(),
        previous_order_amounts: Some(vec![json!(40), json!(50)]),
        periods: (0..6)
            .map(|i| PeriodAggregate {
                period: format!("2024-06-{:02}", i + 1),
                order_count: 10,
                revenue: Decimal::from(500 + 10 * i),
            })
            .collect(),
        customers: vec![CustomerAggregate {
            user_id: 7,
            order_count: 3,
            total_spent: dec!(120),
            last_order: as_of() - Duration::days(5),
        }],
        products: vec![],
        as_of: None,
    }
}

#[tokio::test]
async fn full_dataset_produces_three_ready_sections() {
    let source = InMemorySource::new(full_dataset());
    let report = engine().run(&source, request()).await.unwrap();

    assert!(report.degraded.is_empty());

    let descriptive = report.descriptive.data().unwrap();
    assert_approx_eq!(descriptive.statistics.mean, 47.0, 1e-12);
    assert!(descriptive.confidence_interval.lower < 47.0);
    assert!(descriptive.confidence_interval.upper > 47.0);

    let comparison = report.period_comparison.unwrap();
    assert_approx_eq!(comparison.revenue.absolute, 470.0 - 90.0, 1e-9);

    let probability = report.probability.data().unwrap();
    assert!(probability.amounts.reliable);
    assert!(probability.volume.as_ref().unwrap().model(DistributionKind::Poisson).is_some());

    let insights = report.insights.data().unwrap();
    assert!(insights.trends.is_some());
    assert_eq!(insights.segments.as_ref().unwrap().total_customers, 1);
    assert!(serde_json::to_string(&report).is_ok());
}

#[tokio::test]
async fn variability_advice_uses_the_policy_threshold() {
    // The amounts have a CV of about 55.5%.
    let source = InMemorySource::new(full_dataset());
    let report = engine().run(&source, request()).await.unwrap();
    let advice = &report.probability.data().unwrap().recommendations;
    assert!(advice.contains(&ModelingAdvice::ManageHighVariability));

    let mut settings = Settings::default();
    settings.policy.triggers.high_variability_cv_pct = 60.0;
    let report = AnalyticsEngine::new(settings).unwrap().run(&source, request()).await.unwrap();
    let advice = &report.probability.data().unwrap().recommendations;
    assert!(!advice.contains(&ModelingAdvice::ManageHighVariability));
}

#[tokio::test]
async fn empty_dataset_reports_no_data_instead_of_inventing_it() {
    let source = InMemorySource::new(RawDataset::default());
    let report = engine().run(&source, request()).await.unwrap();

    assert!(matches!(report.descriptive, Section::NoData { .. }));
    assert!(matches!(report.probability, Section::NoData { .. }));
    assert_eq!(report.degraded, ["descriptive", "probability"]);

    let insights = report.insights.data().unwrap();
    assert!(insights.is_quiet());
    assert_eq!(insights.scenarios.base.revenue, None);
}

#[tokio::test]
async fn malformed_amounts_fail_only_their_branches() {
    let mut dataset = full_dataset();
    dataset.order_amounts.push(json!("not a number"));
    let report = engine().run(&InMemorySource::new(dataset), request()).await.unwrap();

    match &report.descriptive {
        Section::Failed { kind, .. } => assert_eq!(*kind, ErrorKind::InvalidInput),
        other => panic!("expected a failed section, got {other:?}"),
    }
    assert!(report.insights.is_ready());
}

#[tokio::test]
async fn small_sample_is_fitted_but_flagged() {
    let mut dataset = full_dataset();
    dataset.order_amounts = [5, 5, 6, 4, 5, 100].iter().map(|v| json!(v)).collect();
    dataset.daily_order_counts.clear();
    let report = engine().run(&InMemorySource::new(dataset), request()).await.unwrap();

    let descriptive = report.descriptive.data().unwrap();
    assert_eq!(descriptive.outliers.outliers, [100.0]);

    let probability = report.probability.data().unwrap();
    assert!(!probability.amounts.reliable);
    let poisson = probability.amounts.model(DistributionKind::Poisson).unwrap();
    assert_approx_eq!(poisson.parameter("lambda").unwrap(), 20.8333, 1e-3);
    assert!(poisson.goodness_of_fit.reject_null);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_fetching() {
    let source = InMemorySource::new(full_dataset());

    let mut bad_filter = request();
    bad_filter.filter.min_amount = Some(dec!(50));
    bad_filter.filter.max_amount = Some(dec!(10));
    let err = engine().run(&source, bad_filter).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let mut bad_options = request();
    bad_options.options.priority_threshold = Some(11);
    let err = engine().run(&source, bad_options).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

struct StalledSource;

#[async_trait]
impl AnalyticsSource for StalledSource {
    async fn fetch(&self, _filter: &SampleFilter) -> Result<RawDataset, SourceError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(RawDataset::default())
    }
}

#[tokio::test]
async fn stalled_fetch_times_out() {
    let mut settings = Settings::default();
    settings.engine.fetch_timeout = std::time::Duration::from_millis(20);
    let engine = AnalyticsEngine::new(settings).unwrap();

    let err = engine.run(&StalledSource, request()).await.unwrap_err();
    assert!(matches!(err, EngineError::FetchTimeout(_)));
}
