use crate::fitter::{DistributionModel, FitResult};
use crate::goodness_of_fit::GoodnessOfFit;
use crate::normal::Normal;
use crate::poisson::Poisson;
use core_types::{ConfidenceLevel, DistributionKind};
use serde::{Deserialize, Serialize};

/// What the probability report should cover.
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityRequest<'a> {
    pub confidence: ConfidenceLevel,
    pub test_values: &'a [f64],
    pub distributions: &'a [DistributionKind],
    /// CV (percent) above which amounts count as highly variable.
    pub high_variability_cv_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalIntervals {
    /// `μ ± zσ/√n`
    pub mean: Interval,
    /// `μ ± zσ`
    pub value_range: Interval,
    /// `μ ± zσ√(1 + 1/n)`
    pub prediction: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoissonIntervals {
    /// `λ ± z√(λ/n)`, lower bound clamped at zero.
    pub rate: Interval,
    /// `max(0, λ - z√λ)` to `λ + z√λ` events per period.
    pub volume: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceIntervals {
    pub level: ConfidenceLevel,
    pub z_score: f64,
    pub normal: Option<NormalIntervals>,
    pub poisson: Option<PoissonIntervals>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalProbabilities {
    pub value: f64,
    pub density: f64,
    pub less_than: f64,
    pub greater_than: f64,
    /// `P(v < X < 1.2v)`
    pub within_twenty_percent_above: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoissonProbabilities {
    pub value: u64,
    pub exactly: f64,
    pub at_most: f64,
    pub more_than: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProbabilities {
    pub normal: Vec<NormalProbabilities>,
    pub poisson: Vec<PoissonProbabilities>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProbabilities {
    /// `P(order > 2μ)`
    pub high_value_order: Option<f64>,
    /// `P(order < μ/2)`
    pub low_value_order: Option<f64>,
    /// `P(volume > ⌊1.5λ⌋)`
    pub high_volume_period: Option<f64>,
    /// `P(volume ≤ ⌊0.5λ⌋)`
    pub low_volume_period: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStrength {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitReliability {
    High,
    Moderate,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Reject,
    DoNotReject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitAssessment {
    pub kind: DistributionKind,
    pub goodness_of_fit: GoodnessOfFit,
    pub strength: FitStrength,
    pub reliability: FitReliability,
    pub conclusion: Conclusion,
}

impl FitAssessment {
    pub fn from_model(model: &DistributionModel) -> Self {
        let gof = model.goodness_of_fit;
        let strength = match gof.statistic {
            d if d < 0.10 => FitStrength::Excellent,
            d if d < 0.15 => FitStrength::Good,
            d if d < 0.25 => FitStrength::Fair,
            _ => FitStrength::Poor,
        };
        let reliability = match gof.p_value {
            p if p > 0.10 => FitReliability::High,
            p if p > 0.05 => FitReliability::Moderate,
            p if p > 0.01 => FitReliability::Low,
            _ => FitReliability::VeryLow,
        };
        let conclusion = if gof.reject_null { Conclusion::Reject } else { Conclusion::DoNotReject };
        Self { kind: model.kind, goodness_of_fit: gof, strength, reliability, conclusion }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelingAdvice {
    /// Amounts are consistent with a Normal model.
    UseNormalModel,
    /// Period volume behaves like a Poisson process.
    PoissonCapacityPlanning,
    /// Amounts vary too much for a single-model view.
    ManageHighVariability,
}

/// The probability section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityReport {
    /// Fit of the order-amount sample.
    pub amounts: FitResult,
    /// Fit of the per-period order counts, when provided.
    pub volume: Option<FitResult>,
    pub best_distribution: Option<DistributionKind>,
    pub goodness_of_fit: Vec<FitAssessment>,
    pub confidence_intervals: ConfidenceIntervals,
    pub custom_probabilities: CustomProbabilities,
    pub business_probabilities: BusinessProbabilities,
    pub recommendations: Vec<ModelingAdvice>,
}

impl ProbabilityReport {
    /// Assembles the report from the amount fit and an optional volume fit.
    ///
    /// The Normal model comes from the amounts. The Poisson model comes from
    /// the volume fit when there is one, else from the amounts if they are
    /// counts. Models outside `request.distributions` are dropped.
    pub fn build(
        amounts: FitResult,
        volume: Option<FitResult>,
        request: ProbabilityRequest<'_>,
    ) -> Self {
        let amounts = restrict(amounts, request.distributions);
        let volume = volume.map(|fit| restrict(fit, request.distributions));

        let normal_model = amounts.model(DistributionKind::Normal).cloned();
        let poisson_model = volume
            .as_ref()
            .and_then(|fit| fit.model(DistributionKind::Poisson))
            .or_else(|| amounts.model(DistributionKind::Poisson))
            .cloned();

        let z = request.confidence.z_score();
        let confidence_intervals = ConfidenceIntervals {
            level: request.confidence,
            z_score: z,
            normal: normal_model.as_ref().and_then(|m| normal_intervals(m, z)),
            poisson: poisson_model.as_ref().and_then(|m| poisson_intervals(m, z)),
        };

        let normal = normal_model.as_ref().and_then(DistributionModel::as_normal);
        let poisson = poisson_model.as_ref().and_then(DistributionModel::as_poisson);

        let custom_probabilities = custom_probabilities(normal, poisson, request.test_values);
        let business_probabilities = business_probabilities(normal, poisson);

        let mut goodness_of_fit: Vec<FitAssessment> =
            amounts.models.iter().map(FitAssessment::from_model).collect();
        if let Some(fit) = &volume {
            goodness_of_fit.extend(
                fit.model(DistributionKind::Poisson)
                    .filter(|_| amounts.model(DistributionKind::Poisson).is_none())
                    .map(FitAssessment::from_model),
            );
        }

        let recommendations = recommendations(
            normal_model.as_ref(),
            poisson_model.as_ref(),
            normal,
            request.high_variability_cv_pct,
        );

        ProbabilityReport {
            best_distribution: amounts.best,
            amounts,
            volume,
            goodness_of_fit,
            confidence_intervals,
            custom_probabilities,
            business_probabilities,
            recommendations,
        }
    }
}

/// Keeps only the requested models and re-picks the best among them.
fn restrict(mut fit: FitResult, kinds: &[DistributionKind]) -> FitResult {
    fit.models.retain(|m| kinds.contains(&m.kind));
    if fit.best.is_some_and(|kind| !kinds.contains(&kind)) {
        fit.best = fit.models.first().map(|m| m.kind);
    }
    fit
}

fn normal_intervals(model: &DistributionModel, z: f64) -> Option<NormalIntervals> {
    let normal = model.as_normal()?;
    let n = model.sample_size as f64;
    let (mu, sigma) = (normal.mean, normal.std_dev);
    let around = |half_width: f64| Interval { lower: mu - half_width, upper: mu + half_width };
    Some(NormalIntervals {
        mean: around(z * sigma / n.sqrt()),
        value_range: around(z * sigma),
        prediction: around(z * sigma * (1.0 + 1.0 / n).sqrt()),
    })
}

fn poisson_intervals(model: &DistributionModel, z: f64) -> Option<PoissonIntervals> {
    let lambda = model.as_poisson()?.lambda;
    let n = model.sample_size as f64;
    let rate_margin = z * (lambda / n).sqrt();
    let volume_margin = z * lambda.sqrt();
    Some(PoissonIntervals {
        rate: Interval { lower: (lambda - rate_margin).max(0.0), upper: lambda + rate_margin },
        volume: Interval { lower: (lambda - volume_margin).max(0.0), upper: lambda + volume_margin },
    })
}

fn custom_probabilities(
    normal: Option<Normal>,
    poisson: Option<Poisson>,
    test_values: &[f64],
) -> CustomProbabilities {
    let normal_rows = normal
        .map(|model| {
            test_values
                .iter()
                .map(|&v| {
                    let (a, b) = if v <= 1.2 * v { (v, 1.2 * v) } else { (1.2 * v, v) };
                    NormalProbabilities {
                        value: v,
                        density: model.pdf(v),
                        less_than: model.cdf(v),
                        greater_than: 1.0 - model.cdf(v),
                        within_twenty_percent_above: model.probability_between(a, b),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let poisson_rows = poisson
        .map(|model| {
            test_values
                .iter()
                .filter(|v| **v >= 0.0 && v.fract() == 0.0)
                .map(|&v| {
                    let k = v as u64;
                    let at_most = model.cdf(v);
                    PoissonProbabilities {
                        value: k,
                        exactly: model.pmf(k),
                        at_most,
                        more_than: (1.0 - at_most).max(0.0),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    CustomProbabilities { normal: normal_rows, poisson: poisson_rows }
}

fn business_probabilities(normal: Option<Normal>, poisson: Option<Poisson>) -> BusinessProbabilities {
    let mut probabilities = BusinessProbabilities::default();
    if let Some(model) = normal {
        probabilities.high_value_order = Some(1.0 - model.cdf(2.0 * model.mean));
        probabilities.low_value_order = Some(model.cdf(model.mean / 2.0));
    }
    if let Some(model) = poisson {
        let high = (1.5 * model.lambda).floor();
        let low = (0.5 * model.lambda).floor();
        probabilities.high_volume_period = Some((1.0 - model.cdf(high)).max(0.0));
        probabilities.low_volume_period = Some(model.cdf(low));
    }
    probabilities
}

fn recommendations(
    normal_model: Option<&DistributionModel>,
    poisson_model: Option<&DistributionModel>,
    normal: Option<Normal>,
    high_variability_cv_pct: f64,
) -> Vec<ModelingAdvice> {
    let mut advice = Vec::new();
    if normal_model.is_some_and(|m| !m.goodness_of_fit.reject_null) {
        advice.push(ModelingAdvice::UseNormalModel);
    }
    if poisson_model.is_some_and(|m| !m.goodness_of_fit.reject_null) {
        advice.push(ModelingAdvice::PoissonCapacityPlanning);
    }
    if let Some(model) = normal {
        if model.mean != 0.0 && model.std_dev / model.mean * 100.0 > high_variability_cv_pct {
            advice.push(ModelingAdvice::ManageHighVariability);
        }
    }
    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitter::DistributionFitter;
    use assert_approx_eq::assert_approx_eq;
    use core_types::NumericSample;

    const BOTH: [DistributionKind; 2] = [DistributionKind::Normal, DistributionKind::Poisson];

    fn fit(values: &[f64]) -> FitResult {
        DistributionFitter::new()
            .fit_informational(&NumericSample::new(values.to_vec()).unwrap(), &BOTH)
    }

    fn request(test_values: &[f64]) -> ProbabilityRequest<'_> {
        ProbabilityRequest {
            confidence: ConfidenceLevel::P95,
            test_values,
            distributions: &BOTH,
            high_variability_cv_pct: 50.0,
        }
    }

    #[test]
    fn normal_intervals_nest() {
        let amounts: Vec<f64> = (0..20).map(|i| 40.0 + (i % 7) as f64 * 3.0).collect();
        let report = ProbabilityReport::build(fit(&amounts), None, request(&[]));
        let normal = report.confidence_intervals.normal.unwrap();
        assert!(normal.mean.lower > normal.value_range.lower);
        assert!(normal.prediction.lower < normal.mean.lower);
        assert!(normal.prediction.upper > normal.value_range.upper);
        assert!(report.confidence_intervals.poisson.is_some());
    }

    #[test]
    fn poisson_intervals_are_clamped_at_zero() {
        let counts = [0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let report = ProbabilityReport::build(fit(&counts), None, request(&[]));
        let poisson = report.confidence_intervals.poisson.unwrap();
        assert_eq!(poisson.volume.lower, 0.0);
        assert!(poisson.rate.lower >= 0.0);
        assert_approx_eq!(poisson.volume.upper, 0.5 + 1.96 * 0.5f64.sqrt(), 1e-12);
    }

    #[test]
    fn custom_probabilities_cover_both_models() {
        let counts = [3.0, 4.0, 2.0, 5.0, 3.0, 4.0, 6.0, 3.0, 2.0, 4.0];
        let report = ProbabilityReport::build(fit(&counts), None, request(&[3.0, 4.5]));
        let custom = &report.custom_probabilities;
        assert_eq!(custom.normal.len(), 2);
        // 4.5 is not a count, so only 3 is evaluated under Poisson.
        assert_eq!(custom.poisson.len(), 1);
        let row = custom.poisson[0];
        assert_approx_eq!(row.at_most + row.more_than, 1.0, 1e-12);
        let n = custom.normal[0];
        assert_approx_eq!(n.less_than + n.greater_than, 1.0, 1e-12);
    }

    #[test]
    fn business_probabilities_use_the_right_tails() {
        let amounts: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64 * 10.0).collect();
        let report = ProbabilityReport::build(fit(&amounts), None, request(&[]));
        let business = report.business_probabilities;
        assert!(business.high_value_order.unwrap() < 0.01);
        assert!(business.low_value_order.unwrap() < 0.01);
        assert!(business.high_volume_period.is_some());
    }

    #[test]
    fn volume_fit_supplies_the_poisson_model() {
        let amounts: Vec<f64> = (0..12).map(|i| 20.5 + i as f64).collect();
        let counts = [8.0, 10.0, 9.0, 12.0, 11.0, 10.0, 9.0, 8.0, 10.0, 13.0];
        let report = ProbabilityReport::build(fit(&amounts), Some(fit(&counts)), request(&[]));
        assert!(report.amounts.model(DistributionKind::Poisson).is_none());
        assert!(report.confidence_intervals.poisson.is_some());
        assert!(report.goodness_of_fit.iter().any(|a| a.kind == DistributionKind::Poisson));
    }

    #[test]
    fn distribution_subset_filters_the_report() {
        let counts = [3.0, 4.0, 2.0, 5.0, 3.0, 4.0, 6.0, 3.0, 2.0, 4.0];
        let only_normal = [DistributionKind::Normal];
        let report = ProbabilityReport::build(
            fit(&counts),
            None,
            ProbabilityRequest {
                confidence: ConfidenceLevel::P90,
                test_values: &[],
                distributions: &only_normal,
                high_variability_cv_pct: 50.0,
            },
        );
        assert!(report.confidence_intervals.poisson.is_none());
        assert!(report.goodness_of_fit.iter().all(|a| a.kind == DistributionKind::Normal));
        assert_eq!(report.confidence_intervals.z_score, 1.645);
    }

    #[test]
    fn variability_advice_follows_the_requested_threshold() {
        // mean 30, sigma 10: CV 33.3%.
        let amounts: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 20.0 } else { 40.0 }).collect();
        let loose = ProbabilityReport::build(fit(&amounts), None, request(&[]));
        assert!(!loose.recommendations.contains(&ModelingAdvice::ManageHighVariability));

        let strict = ProbabilityReport::build(
            fit(&amounts),
            None,
            ProbabilityRequest { high_variability_cv_pct: 30.0, ..request(&[]) },
        );
        assert!(strict.recommendations.contains(&ModelingAdvice::ManageHighVariability));
    }

    #[test]
    fn assessment_bands() {
        let amounts: Vec<f64> = (0..12).map(|i| 20.5 + i as f64).collect();
        let model = fit(&amounts).models[0].clone();
        let mut strong = model.clone();
        strong.goodness_of_fit.statistic = 0.05;
        strong.goodness_of_fit.p_value = 0.5;
        let a = FitAssessment::from_model(&strong);
        assert_eq!(a.strength, FitStrength::Excellent);
        assert_eq!(a.reliability, FitReliability::High);

        let mut weak = model;
        weak.goodness_of_fit.statistic = 0.3;
        weak.goodness_of_fit.p_value = 0.005;
        let a = FitAssessment::from_model(&weak);
        assert_eq!(a.strength, FitStrength::Poor);
        assert_eq!(a.reliability, FitReliability::VeryLow);
    }
}
