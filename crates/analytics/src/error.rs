use core_types::{CoreError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AnalyticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyticsError::InvalidInput { .. } => ErrorKind::InvalidInput,
            AnalyticsError::InsufficientData(_) => ErrorKind::InsufficientData,
            AnalyticsError::Calculation(_) => ErrorKind::ComputationError,
            AnalyticsError::Core(e) => e.kind(),
        }
    }
}
