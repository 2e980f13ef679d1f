use configuration::error::ConfigError;
use core_types::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Invalid insight policy: {0}")]
    Policy(#[from] ConfigError),
}

impl InsightError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightError::Policy(e) => e.kind(),
        }
    }
}
