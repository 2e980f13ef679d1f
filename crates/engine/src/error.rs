use core_types::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Failures of a data source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Orchestration failures. Anything that happens inside a single analysis
/// branch is reported in that branch's section instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] configuration::error::ConfigError),

    #[error("Invalid request: {0}")]
    Request(#[from] core_types::CoreError),

    #[error("Insight generator error: {0}")]
    Insights(#[from] insights::error::InsightError),

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Data fetch did not complete within {0:?}")]
    FetchTimeout(Duration),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Configuration(e) => e.kind(),
            EngineError::Request(e) => e.kind(),
            EngineError::Insights(e) => e.kind(),
            EngineError::Source(SourceError::Parse(_)) => ErrorKind::InvalidInput,
            EngineError::Source(SourceError::Io(_)) | EngineError::FetchTimeout(_) => {
                ErrorKind::ComputationError
            }
        }
    }
}
