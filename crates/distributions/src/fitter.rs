use crate::error::FitError;
use crate::goodness_of_fit::{self, GoodnessOfFit};
use crate::normal::Normal;
use crate::poisson::{self, Poisson};
use analytics::math;
use core_types::{DistributionKind, NumericSample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum sample size for a fit to be called reliable.
pub const MIN_RELIABLE_SAMPLE: usize = 10;

/// One fitted model and how well it matches the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionModel {
    pub kind: DistributionKind,
    /// `mean`/`stdDev` for Normal, `lambda` for Poisson.
    pub parameters: BTreeMap<String, f64>,
    pub goodness_of_fit: GoodnessOfFit,
    /// `1 - D`; higher is better.
    pub score: f64,
    pub sample_size: usize,
}

impl DistributionModel {
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    pub fn as_normal(&self) -> Option<Normal> {
        match self.kind {
            DistributionKind::Normal => Some(Normal::new(
                self.parameter("mean")?,
                self.parameter("stdDev")?,
            )),
            DistributionKind::Poisson => None,
        }
    }

    pub fn as_poisson(&self) -> Option<Poisson> {
        match self.kind {
            DistributionKind::Poisson => Some(Poisson::new(self.parameter("lambda")?)),
            DistributionKind::Normal => None,
        }
    }
}

/// All candidate models for one sample, best first by score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub models: Vec<DistributionModel>,
    pub best: Option<DistributionKind>,
    /// False when the sample is below the reliable size.
    pub reliable: bool,
    pub sample_size: usize,
}

impl FitResult {
    pub fn model(&self, kind: DistributionKind) -> Option<&DistributionModel> {
        self.models.iter().find(|m| m.kind == kind)
    }

    pub fn best_model(&self) -> Option<&DistributionModel> {
        self.best.and_then(|kind| self.model(kind))
    }
}

/// A stateless fitter for the Normal and Poisson candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistributionFitter {}

impl DistributionFitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits every requested candidate; fails below the reliable sample size.
    pub fn fit(
        &self,
        sample: &NumericSample,
        kinds: &[DistributionKind],
    ) -> Result<FitResult, FitError> {
        if sample.len() < MIN_RELIABLE_SAMPLE {
            return Err(FitError::InsufficientData {
                required: MIN_RELIABLE_SAMPLE,
                actual: sample.len(),
            });
        }
        Ok(self.fit_informational(sample, kinds))
    }

    /// Fits any valid sample. Results below the reliable size are flagged
    /// `reliable = false` instead of failing.
    pub fn fit_informational(&self, sample: &NumericSample, kinds: &[DistributionKind]) -> FitResult {
        let values = sample.values();
        let sorted = sample.sorted();
        let mean = math::mean(values);
        let std_dev = math::population_variance(values, mean).sqrt();

        let mut models = Vec::with_capacity(2);
        if kinds.contains(&DistributionKind::Normal) {
            models.push(fit_normal(&sorted, mean, std_dev));
        }
        if kinds.contains(&DistributionKind::Poisson) {
            if poisson::is_eligible(values) {
                models.push(fit_poisson(&sorted, mean));
            } else {
                tracing::debug!("Poisson skipped: sample is not non-negative integer counts");
            }
        }

        let best = select_best(&models);
        let reliable = sample.len() >= MIN_RELIABLE_SAMPLE;
        if !reliable {
            tracing::warn!(
                n = sample.len(),
                required = MIN_RELIABLE_SAMPLE,
                "Fitting a sample below the reliable size; results are informational"
            );
        }

        models.sort_by(|a, b| b.score.total_cmp(&a.score));

        FitResult { models, best, reliable, sample_size: sample.len() }
    }
}

fn fit_normal(sorted: &[f64], mean: f64, std_dev: f64) -> DistributionModel {
    let normal = Normal::new(mean, std_dev);
    let gof = goodness_of_fit::kolmogorov_smirnov(sorted, |x| normal.cdf(x));
    DistributionModel {
        kind: DistributionKind::Normal,
        parameters: BTreeMap::from([
            ("mean".to_string(), mean),
            ("stdDev".to_string(), std_dev),
        ]),
        score: 1.0 - gof.statistic,
        goodness_of_fit: gof,
        sample_size: sorted.len(),
    }
}

fn fit_poisson(sorted: &[f64], lambda: f64) -> DistributionModel {
    let model = Poisson::new(lambda);
    let gof = goodness_of_fit::kolmogorov_smirnov(sorted, |x| model.cdf(x));
    DistributionModel {
        kind: DistributionKind::Poisson,
        parameters: BTreeMap::from([("lambda".to_string(), lambda)]),
        score: 1.0 - gof.statistic,
        goodness_of_fit: gof,
        sample_size: sorted.len(),
    }
}

/// Highest score wins; on a tie the earlier candidate (Normal) is kept.
fn select_best(models: &[DistributionModel]) -> Option<DistributionKind> {
    let mut best: Option<&DistributionModel> = None;
    for model in models {
        match best {
            Some(current) if model.score <= current.score => {}
            _ => best = Some(model),
        }
    }
    best.map(|m| m.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const BOTH: [DistributionKind; 2] = [DistributionKind::Normal, DistributionKind::Poisson];

    fn sample(values: &[f64]) -> NumericSample {
        NumericSample::new(values.to_vec()).unwrap()
    }

    #[test]
    fn strict_entry_point_needs_ten_observations() {
        let err = DistributionFitter::new()
            .fit(&sample(&[1.0, 2.0, 3.0]), &BOTH)
            .unwrap_err();
        assert_eq!(err, FitError::InsufficientData { required: 10, actual: 3 });
        assert_eq!(err.kind(), core_types::ErrorKind::InsufficientData);
    }

    #[test]
    fn poisson_is_omitted_for_non_count_data() {
        let fitter = DistributionFitter::new();
        let amounts: Vec<f64> = (0..12).map(|i| 10.5 + i as f64).collect();
        let fit = fitter.fit(&sample(&amounts), &BOTH).unwrap();
        assert!(fit.model(DistributionKind::Poisson).is_none());
        assert_eq!(fit.best, Some(DistributionKind::Normal));

        let with_negative: Vec<f64> = (-2..10).map(f64::from).collect();
        let fit = fitter.fit(&sample(&with_negative), &BOTH).unwrap();
        assert!(fit.model(DistributionKind::Poisson).is_none());
    }

    #[test]
    fn count_data_gets_both_models() {
        let counts = [3.0, 4.0, 2.0, 5.0, 3.0, 4.0, 6.0, 3.0, 2.0, 4.0, 5.0, 3.0];
        let fit = DistributionFitter::new().fit(&sample(&counts), &BOTH).unwrap();
        assert!(fit.reliable);
        let poisson = fit.model(DistributionKind::Poisson).unwrap();
        assert_approx_eq!(poisson.parameter("lambda").unwrap(), 44.0 / 12.0, 1e-12);
        assert!(fit.models[0].score >= fit.models[1].score);
    }

    #[test]
    fn requested_subset_is_respected() {
        let counts: Vec<f64> = (0..10).map(|i| (i % 4) as f64).collect();
        let fit = DistributionFitter::new()
            .fit(&sample(&counts), &[DistributionKind::Poisson])
            .unwrap();
        assert_eq!(fit.models.len(), 1);
        assert_eq!(fit.best, Some(DistributionKind::Poisson));
    }

    #[test]
    fn constant_sample_has_a_defined_fit() {
        let fit = DistributionFitter::new().fit(&sample(&[7.0; 12]), &BOTH).unwrap();
        let normal = fit.model(DistributionKind::Normal).unwrap();
        assert!(normal.goodness_of_fit.statistic.is_finite());
        assert!(normal.goodness_of_fit.p_value.is_finite());
        assert_eq!(normal.parameter("stdDev"), Some(0.0));
    }

    #[test]
    fn ties_favour_normal() {
        let gof = goodness_of_fit::kolmogorov_smirnov(&[1.0], |_| 1.0);
        let make = |kind| DistributionModel {
            kind,
            parameters: BTreeMap::new(),
            goodness_of_fit: gof,
            score: 0.5,
            sample_size: 1,
        };
        let models = vec![make(DistributionKind::Normal), make(DistributionKind::Poisson)];
        assert_eq!(select_best(&models), Some(DistributionKind::Normal));
    }
}
