use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod options;
pub mod policy;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use options::{AnalysisOptions, RawAnalysisOptions, DEFAULT_PERCENTILES};
#[cfg(feature = "clap")]
pub use options::OptionOverrides;
pub use policy::{
    BenchmarkPolicy, InsightPolicy, PlanPolicy, PriorityPolicy, ProductPolicy,
    ScenarioMultipliers, ScenarioPolicy, SegmentRule, SegmentationPolicy, TrendPolicy,
    TriggerPolicy,
};
pub use settings::{EngineSettings, Settings};

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at
/// `path` (or `vendstat.toml` in the working directory if it exists), then
/// `VENDSTAT__SECTION__KEY` environment variables. An explicit `path` must
/// exist. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("vendstat").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("VENDSTAT").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.policy.validate()?;
    // Surface bad defaults at startup rather than on the first request.
    settings.defaults.validate()?;

    tracing::debug!(
        fetch_timeout = ?settings.engine.fetch_timeout,
        "Configuration loaded"
    );
    Ok(settings)
}
