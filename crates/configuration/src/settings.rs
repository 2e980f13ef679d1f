use crate::options::RawAnalysisOptions;
use crate::policy::InsightPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub policy: InsightPolicy,
    /// Options applied when a request leaves a field unset.
    pub defaults: RawAnalysisOptions,
}

/// Contains parameters for the orchestration layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Upper bound on the data-fetch stage (e.g. "10s", "500ms").
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
    /// Fit distributions on samples below the reliable size and flag them
    /// as unreliable instead of skipping the section.
    pub fit_small_samples: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            fit_small_samples: true,
        }
    }
}
