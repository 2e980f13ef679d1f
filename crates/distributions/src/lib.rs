//! # vendstat Distribution Fitting
//!
//! Fits Normal and Poisson models to a sample, scores them with a
//! Kolmogorov-Smirnov statistic and derives intervals and business
//! probabilities from the fitted parameters.
//!
//! The fitter is stateless. `DistributionFitter::fit` refuses samples below
//! ten observations; `fit_informational` fits them anyway and marks the
//! result unreliable.

pub mod error;
pub mod fitter;
pub mod goodness_of_fit;
pub mod normal;
pub mod poisson;
pub mod report;

pub use error::FitError;
pub use fitter::{DistributionFitter, DistributionModel, FitResult, MIN_RELIABLE_SAMPLE};
pub use goodness_of_fit::GoodnessOfFit;
pub use normal::Normal;
pub use poisson::Poisson;
pub use report::{FitAssessment, ProbabilityReport, ProbabilityRequest};
