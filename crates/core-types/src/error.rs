use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The four failure categories every analysis error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientData,
    ValidationError,
    ComputationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::InsufficientData => "InsufficientData",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ComputationError => "ComputationError",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Filter validation failed: {0}")]
    Validation(String),

    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(..) => ErrorKind::InvalidInput,
            CoreError::Validation(_) => ErrorKind::ValidationError,
            CoreError::Calculation(_) => ErrorKind::ComputationError,
        }
    }
}
