//! # vendstat Engine
//!
//! Orchestrates one analysis run: validate the request, fetch the dataset
//! under a timeout, fan the descriptive and distribution branches out onto
//! the blocking pool, then generate insights from whatever came back.
//!
//! Only request validation and the fetch can fail a run. Every branch
//! reports its own outcome as a `Section`.

use crate::section::Section;
use crate::source::{AnalyticsSource, RawDataset};
use analytics::{DescriptiveSummary, PeriodComparison};
use chrono::{DateTime, Utc};
use configuration::{AnalysisOptions, EngineSettings, RawAnalysisOptions, Settings};
use core_types::{ErrorKind, SampleFilter, SampleMetadata, SampleOutcome};
use distributions::ProbabilityReport;
use insights::{BusinessInsightReport, InsightGenerator, InsightInput};
use serde::Serialize;
use tokio::task::{JoinError, spawn_blocking};

mod branches;
pub mod error;
pub mod section;
pub mod source;

pub use error::{EngineError, SourceError};
pub use source::{InMemorySource, JsonFileSource};

/// One analysis request as received from a caller.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub filter: SampleFilter,
    pub options: RawAnalysisOptions,
    /// Reference instant for date checks and customer recency.
    pub as_of: DateTime<Utc>,
}

/// The three report sections plus the request they answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub filter: SampleFilter,
    pub options: AnalysisOptions,
    pub descriptive: Section<DescriptiveSummary>,
    pub period_comparison: Option<PeriodComparison>,
    pub probability: Section<ProbabilityReport>,
    pub insights: Section<BusinessInsightReport>,
    /// Names of the sections that are not `ready`.
    pub degraded: Vec<&'static str>,
}

/// The central orchestrator.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    settings: EngineSettings,
    defaults: RawAnalysisOptions,
    generator: InsightGenerator,
}

impl AnalyticsEngine {
    /// Creates an engine from loaded settings. Fails on an invalid policy.
    pub fn new(settings: Settings) -> Result<Self, EngineError> {
        let generator = InsightGenerator::new(settings.policy)?;
        Ok(Self { settings: settings.engine, defaults: settings.defaults, generator })
    }

    /// Validates the request, fetches its data and runs the full analysis.
    #[tracing::instrument(skip_all, fields(period = ?request.filter.period))]
    pub async fn run(
        &self,
        source: &dyn AnalyticsSource,
        request: AnalysisRequest,
    ) -> Result<AnalyticsReport, EngineError> {
        // 1. Validate
        let options = request.options.merged_over(&self.defaults).validate()?;
        request.filter.validate(request.as_of.date_naive())?;

        // 2. Fetch
        let timeout = self.settings.fetch_timeout;
        let dataset = tokio::time::timeout(timeout, source.fetch(&request.filter))
            .await
            .map_err(|_| EngineError::FetchTimeout(timeout))??;
        tracing::info!(
            amounts = dataset.order_amounts.len(),
            periods = dataset.periods.len(),
            customers = dataset.customers.len(),
            products = dataset.products.len(),
            "Dataset fetched."
        );

        // 3. Analyze
        Ok(self.analyze(dataset, request.filter, options, request.as_of).await)
    }

    /// Runs the branches over an already-fetched dataset.
    pub async fn analyze(
        &self,
        dataset: RawDataset,
        filter: SampleFilter,
        options: AnalysisOptions,
        as_of: DateTime<Utc>,
    ) -> AnalyticsReport {
        let metadata = SampleMetadata { period: dataset.period.clone(), filter: Some(filter.clone()) };
        let amounts =
            SampleOutcome::from_json_values("order amount", &dataset.order_amounts, metadata.clone());
        let volume =
            SampleOutcome::from_json_values("order count", &dataset.daily_order_counts, metadata.clone());
        let previous = dataset
            .previous_order_amounts
            .as_deref()
            .map(|values| SampleOutcome::from_json_values("previous order amount", values, metadata));
        let auxiliary_data = dataset.has_auxiliary_data();

        // Fan out
        let descriptive_task = spawn_blocking({
            let (amounts, options) = (amounts.clone(), options.clone());
            move || branches::describe(&amounts, previous.as_ref(), &options, auxiliary_data)
        });
        let probability_task = spawn_blocking({
            let options = options.clone();
            let settings = branches::FitSettings {
                small_samples: self.settings.fit_small_samples,
                high_variability_cv_pct: self.generator.policy().triggers.high_variability_cv_pct,
            };
            move || branches::fit(&amounts, &volume, &options, settings)
        });
        let (descriptive, probability) = futures::future::join(descriptive_task, probability_task).await;

        // Fan in
        let (descriptive, period_comparison) = match descriptive {
            Ok(branch) => (branch.summary, branch.comparison),
            Err(e) => (branch_panicked("descriptive", e), None),
        };
        let probability = probability.unwrap_or_else(|e| branch_panicked("probability", e));

        let insights = self.insights(dataset, &descriptive, &probability, &options, as_of).await;

        let degraded = [
            ("descriptive", descriptive.is_ready()),
            ("probability", probability.is_ready()),
            ("insights", insights.is_ready()),
        ]
        .into_iter()
        .filter_map(|(name, ready)| (!ready).then_some(name))
        .collect::<Vec<_>>();

        tracing::info!(?degraded, "Analysis complete.");

        AnalyticsReport {
            generated_at: as_of,
            filter,
            options,
            descriptive,
            period_comparison,
            probability,
            insights,
            degraded,
        }
    }

    async fn insights(
        &self,
        dataset: RawDataset,
        descriptive: &Section<DescriptiveSummary>,
        probability: &Section<ProbabilityReport>,
        options: &AnalysisOptions,
        as_of: DateTime<Utc>,
    ) -> Section<BusinessInsightReport> {
        let generator = self.generator.clone();
        let statistics = descriptive.data().map(|summary| summary.statistics.clone());
        let fit = probability.data().map(|report| report.amounts.clone());
        let options = options.clone();
        let as_of = dataset.as_of.unwrap_or(as_of);

        let task = spawn_blocking(move || {
            let input = InsightInput {
                statistics: statistics.as_ref(),
                fit: fit.as_ref(),
                periods: &dataset.periods,
                customers: &dataset.customers,
                products: &dataset.products,
                as_of,
            };
            generator.generate(input, &options)
        });

        match task.await {
            Ok(report) => Section::Ready { data: report },
            Err(e) => branch_panicked("insights", e),
        }
    }
}

fn branch_panicked<T>(branch: &str, error: JoinError) -> Section<T> {
    tracing::error!(branch, error = %error, "Analysis branch did not complete.");
    Section::failed(ErrorKind::ComputationError, format!("{branch} branch did not complete: {error}"))
}
