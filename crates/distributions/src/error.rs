use analytics::AnalyticsError;
use core_types::{CoreError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Reliable fitting needs at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Statistics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FitError::InsufficientData { .. } => ErrorKind::InsufficientData,
            FitError::InvalidInput { .. } => ErrorKind::InvalidInput,
            FitError::Analytics(e) => e.kind(),
            FitError::Core(e) => e.kind(),
        }
    }
}
