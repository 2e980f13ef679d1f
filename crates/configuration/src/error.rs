use core_types::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    #[error("Invalid analysis option '{key}': {reason}")]
    InvalidOption { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::LoadError(_) | ConfigError::InvalidOption { .. } => {
                ErrorKind::InvalidInput
            }
            ConfigError::ValidationError(_) => ErrorKind::ValidationError,
        }
    }
}
