//! The analysis branches. Each one is synchronous and runs on the blocking
//! pool; none of them can fail the whole run.

use crate::section::Section;
use analytics::{DescriptiveSummary, PeriodComparison, StatisticsCalculator, SummaryRequest};
use configuration::AnalysisOptions;
use core_types::{DistributionKind, SampleOutcome};
use distributions::{DistributionFitter, ProbabilityReport, ProbabilityRequest};

pub(crate) struct DescriptiveBranch {
    pub summary: Section<DescriptiveSummary>,
    pub comparison: Option<PeriodComparison>,
}

pub(crate) fn describe(
    amounts: &SampleOutcome,
    previous: Option<&SampleOutcome>,
    options: &AnalysisOptions,
    auxiliary_data: bool,
) -> DescriptiveBranch {
    let Some(sample) = amounts.sample() else {
        return DescriptiveBranch {
            summary: Section::from_unready(amounts)
                .unwrap_or_else(|| Section::NoData { reason: "no order amounts".to_string() }),
            comparison: None,
        };
    };

    let calculator = StatisticsCalculator::new();
    let request = SummaryRequest {
        percentiles: &options.percentiles,
        confidence_level: options.confidence.as_f64(),
        auxiliary_data,
    };

    let summary = match calculator.summarize(sample, request) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "Descriptive branch failed.");
            return DescriptiveBranch { summary: Section::failed(e.kind(), e), comparison: None };
        }
    };

    let comparison = previous
        .and_then(SampleOutcome::sample)
        .and_then(|previous| match calculator.describe(previous, &options.percentiles) {
            Ok(stats) => Some(analytics::compare_periods(&summary.statistics, &stats)),
            Err(e) => {
                tracing::warn!(error = %e, "Previous period could not be described.");
                None
            }
        });

    DescriptiveBranch { summary: Section::Ready { data: summary }, comparison }
}

/// Engine-level knobs of the distribution branch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FitSettings {
    /// Fit samples under ten observations in informational mode and flag
    /// them; otherwise such samples fail the branch.
    pub small_samples: bool,
    pub high_variability_cv_pct: f64,
}

/// Fits the order amounts and, when present, the per-period order counts.
pub(crate) fn fit(
    amounts: &SampleOutcome,
    volume: &SampleOutcome,
    options: &AnalysisOptions,
    settings: FitSettings,
) -> Section<ProbabilityReport> {
    let Some(sample) = amounts.sample() else {
        return Section::from_unready(amounts)
            .unwrap_or_else(|| Section::NoData { reason: "no order amounts".to_string() });
    };

    let fitter = DistributionFitter::new();
    let amount_fit = if settings.small_samples {
        fitter.fit_informational(sample, &options.distributions)
    } else {
        match fitter.fit(sample, &options.distributions) {
            Ok(fit) => fit,
            Err(e) => {
                tracing::warn!(error = %e, "Distribution branch failed.");
                return Section::failed(e.kind(), e);
            }
        }
    };

    let volume_fit = match volume {
        SampleOutcome::Ready { sample } if options.includes(DistributionKind::Poisson) => {
            Some(fitter.fit_informational(sample, &[DistributionKind::Poisson]))
        }
        SampleOutcome::Failed { reason, .. } => {
            tracing::warn!(%reason, "Order-count series ignored.");
            None
        }
        _ => None,
    };

    Section::Ready {
        data: ProbabilityReport::build(
            amount_fit,
            volume_fit,
            ProbabilityRequest {
                confidence: options.confidence,
                test_values: &options.test_values,
                distributions: &options.distributions,
                high_variability_cv_pct: settings.high_variability_cv_pct,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ErrorKind, NumericSample};

    fn settings(small_samples: bool) -> FitSettings {
        FitSettings { small_samples, high_variability_cv_pct: 50.0 }
    }

    fn ready(values: &[f64]) -> SampleOutcome {
        SampleOutcome::Ready { sample: NumericSample::new(values.to_vec()).unwrap() }
    }

    #[test]
    fn empty_amounts_propagate_as_no_data() {
        let empty = SampleOutcome::Empty { reason: "no order amount observations".into() };
        let branch = describe(&empty, None, &AnalysisOptions::default(), false);
        assert!(matches!(branch.summary, Section::NoData { .. }));
        assert!(matches!(
            fit(&empty, &empty, &AnalysisOptions::default(), settings(true)),
            Section::NoData { .. }
        ));
    }

    #[test]
    fn strict_fitting_fails_small_samples_with_their_kind() {
        let amounts = ready(&[5.0, 5.0, 6.0, 4.0, 5.0, 100.0]);
        let empty = SampleOutcome::Empty { reason: "none".into() };
        match fit(&amounts, &empty, &AnalysisOptions::default(), settings(false)) {
            Section::Failed { kind, .. } => assert_eq!(kind, ErrorKind::InsufficientData),
            other => panic!("expected a failed section, got {other:?}"),
        }
        assert!(fit(&amounts, &empty, &AnalysisOptions::default(), settings(true)).is_ready());
    }

    #[test]
    fn previous_period_yields_a_comparison() {
        let current = ready(&[10.0, 20.0, 30.0]);
        let previous = ready(&[10.0, 10.0]);
        let branch = describe(&current, Some(&previous), &AnalysisOptions::default(), false);
        let comparison = branch.comparison.unwrap();
        assert_eq!(comparison.revenue.absolute, 40.0);
        assert_eq!(comparison.orders.percent, Some(50.0));
    }
}
