use crate::error::ConfigError;
use core_types::{BusinessContext, ConfidenceLevel, DistributionKind, FocusArea, TimeHorizon};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PERCENTILES: [f64; 5] = [25.0, 50.0, 75.0, 90.0, 95.0];
pub const DEFAULT_PRIORITY_THRESHOLD: u8 = 5;

/// Analysis options as they arrive on the wire.
///
/// Every field is optional; `validate` fills the gaps with defaults and turns
/// the loosely-typed values into an [`AnalysisOptions`]. Both the snake_case
/// keys and the camelCase spelling used by the order platform are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawAnalysisOptions {
    pub distributions: Option<Vec<String>>,
    #[serde(alias = "testValues")]
    pub test_values: Option<Vec<f64>>,
    #[serde(alias = "confidenceLevel")]
    pub confidence_level: Option<f64>,
    #[serde(alias = "focusAreas")]
    pub focus_areas: Option<Vec<String>>,
    #[serde(alias = "businessContext")]
    pub business_context: Option<String>,
    #[serde(alias = "timeHorizon")]
    pub time_horizon: Option<String>,
    #[serde(alias = "priorityThreshold")]
    pub priority_threshold: Option<i64>,
    pub percentiles: Option<Vec<f64>>,
}

/// Validated, fully-populated options for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub distributions: Vec<DistributionKind>,
    pub test_values: Vec<f64>,
    pub confidence: ConfidenceLevel,
    pub focus_areas: Vec<FocusArea>,
    pub business_context: BusinessContext,
    pub time_horizon: TimeHorizon,
    pub priority_threshold: u8,
    pub percentiles: Vec<f64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            distributions: vec![DistributionKind::Normal, DistributionKind::Poisson],
            test_values: Vec::new(),
            confidence: ConfidenceLevel::default(),
            focus_areas: FocusArea::ALL.to_vec(),
            business_context: BusinessContext::default(),
            time_horizon: TimeHorizon::default(),
            priority_threshold: DEFAULT_PRIORITY_THRESHOLD,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
        }
    }
}

impl AnalysisOptions {
    pub fn includes(&self, kind: DistributionKind) -> bool {
        self.distributions.contains(&kind)
    }

    pub fn focuses_on(&self, area: FocusArea) -> bool {
        self.focus_areas.contains(&area)
    }
}

impl RawAnalysisOptions {
    /// Field-wise merge: values set on `self` win over those of `base`.
    pub fn merged_over(self, base: &RawAnalysisOptions) -> RawAnalysisOptions {
        RawAnalysisOptions {
            distributions: self.distributions.or_else(|| base.distributions.clone()),
            test_values: self.test_values.or_else(|| base.test_values.clone()),
            confidence_level: self.confidence_level.or(base.confidence_level),
            focus_areas: self.focus_areas.or_else(|| base.focus_areas.clone()),
            business_context: self.business_context.or_else(|| base.business_context.clone()),
            time_horizon: self.time_horizon.or_else(|| base.time_horizon.clone()),
            priority_threshold: self.priority_threshold.or(base.priority_threshold),
            percentiles: self.percentiles.or_else(|| base.percentiles.clone()),
        }
    }

    pub fn validate(&self) -> Result<AnalysisOptions, ConfigError> {
        let defaults = AnalysisOptions::default();

        let distributions = match &self.distributions {
            Some(names) => {
                let mut kinds = parse_list::<DistributionKind>("distributions", names)?;
                kinds.sort();
                kinds.dedup();
                kinds
            }
            None => defaults.distributions,
        };

        let test_values = self.test_values.clone().unwrap_or_default();
        if let Some(bad) = test_values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidOption {
                key: "test_values",
                reason: format!("{bad} is not a finite number"),
            });
        }

        let confidence = match self.confidence_level {
            Some(level) => ConfidenceLevel::try_from(level).map_err(|reason| {
                ConfigError::InvalidOption { key: "confidence_level", reason }
            })?,
            None => defaults.confidence,
        };

        let focus_areas = match &self.focus_areas {
            Some(names) => {
                let mut areas = parse_list::<FocusArea>("focus_areas", names)?;
                areas.sort();
                areas.dedup();
                areas
            }
            None => defaults.focus_areas,
        };

        let business_context = match &self.business_context {
            Some(name) => parse_enum("business_context", name)?,
            None => defaults.business_context,
        };

        let time_horizon = match &self.time_horizon {
            Some(name) => parse_enum("time_horizon", name)?,
            None => defaults.time_horizon,
        };

        let priority_threshold = match self.priority_threshold {
            Some(threshold) if (1..=10).contains(&threshold) => threshold as u8,
            Some(threshold) => {
                return Err(ConfigError::InvalidOption {
                    key: "priority_threshold",
                    reason: format!("must be between 1 and 10 (got {threshold})"),
                });
            }
            None => defaults.priority_threshold,
        };

        let percentiles = match &self.percentiles {
            Some(list) if list.is_empty() => {
                return Err(ConfigError::InvalidOption {
                    key: "percentiles",
                    reason: "at least one percentile is required".to_string(),
                });
            }
            Some(list) => {
                if let Some(bad) = list.iter().find(|p| !(0.0..=100.0).contains(*p)) {
                    return Err(ConfigError::InvalidOption {
                        key: "percentiles",
                        reason: format!("{bad} is outside [0, 100]"),
                    });
                }
                list.clone()
            }
            None => defaults.percentiles,
        };

        Ok(AnalysisOptions {
            distributions,
            test_values,
            confidence,
            focus_areas,
            business_context,
            time_horizon,
            priority_threshold,
            percentiles,
        })
    }
}

fn parse_list<T: DeserializeOwned>(
    key: &'static str,
    names: &[String],
) -> Result<Vec<T>, ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::InvalidOption {
            key,
            reason: "list cannot be empty".to_string(),
        });
    }
    names.iter().map(|name| parse_enum(key, name)).collect()
}

/// Parses a case-insensitive enum name; `riskAssessment`, `risk-assessment`
/// and `risk_assessment` are the same key.
fn parse_enum<T: DeserializeOwned>(key: &'static str, name: &str) -> Result<T, ConfigError> {
    let normalized = normalize_key(name);
    serde_json::from_value(Value::String(normalized)).map_err(|_| ConfigError::InvalidOption {
        key,
        reason: format!("unknown value '{name}'"),
    })
}

fn normalize_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.trim().chars() {
        if c == '-' || c == ' ' {
            out.push('_');
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev_lower = c.is_ascii_lowercase();
    }
    out
}

/// Command-line overrides, merged over the file/env defaults.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, Default, clap::Args)]
pub struct OptionOverrides {
    /// Confidence level: 0.80, 0.90, 0.95 or 0.99.
    #[arg(long)]
    pub confidence: Option<f64>,
    /// Distributions to fit (comma separated: normal,poisson).
    #[arg(long, value_delimiter = ',')]
    pub distributions: Option<Vec<String>>,
    /// Values to evaluate probabilities at.
    #[arg(long = "test-values", value_delimiter = ',', allow_negative_numbers = true)]
    pub test_values: Option<Vec<f64>>,
    /// Focus areas (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub focus: Option<Vec<String>>,
    #[arg(long)]
    pub context: Option<String>,
    #[arg(long)]
    pub horizon: Option<String>,
    /// Minimum recommendation priority (1-10).
    #[arg(long)]
    pub threshold: Option<i64>,
}

#[cfg(feature = "clap")]
impl From<OptionOverrides> for RawAnalysisOptions {
    fn from(overrides: OptionOverrides) -> Self {
        RawAnalysisOptions {
            distributions: overrides.distributions,
            test_values: overrides.test_values,
            confidence_level: overrides.confidence,
            focus_areas: overrides.focus,
            business_context: overrides.context,
            time_horizon: overrides.horizon,
            priority_threshold: overrides.threshold,
            percentiles: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ErrorKind;

    #[test]
    fn empty_options_validate_to_defaults() {
        let options = RawAnalysisOptions::default().validate().unwrap();
        assert_eq!(options, AnalysisOptions::default());
        assert_eq!(options.priority_threshold, 5);
        assert_eq!(options.confidence, ConfidenceLevel::P95);
    }

    #[test]
    fn camel_case_payload_is_accepted() {
        let raw: RawAnalysisOptions = serde_json::from_str(
            r#"{"distributions": ["poisson"], "testValues": [10, 20], "confidenceLevel": 0.9,
                "businessContext": "riskAssessment", "timeHorizon": "short"}"#,
        )
        .unwrap();
        let options = raw.validate().unwrap();
        assert_eq!(options.distributions, vec![DistributionKind::Poisson]);
        assert_eq!(options.test_values, vec![10.0, 20.0]);
        assert_eq!(options.confidence, ConfidenceLevel::P90);
        assert_eq!(options.business_context, BusinessContext::RiskAssessment);
        assert_eq!(options.time_horizon, TimeHorizon::Short);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<RawAnalysisOptions>(r#"{"confidense": 0.95}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_values_map_to_invalid_input() {
        let cases = [
            RawAnalysisOptions { confidence_level: Some(0.85), ..Default::default() },
            RawAnalysisOptions { priority_threshold: Some(11), ..Default::default() },
            RawAnalysisOptions { priority_threshold: Some(0), ..Default::default() },
            RawAnalysisOptions { distributions: Some(vec!["gamma".into()]), ..Default::default() },
            RawAnalysisOptions { distributions: Some(vec![]), ..Default::default() },
            RawAnalysisOptions { percentiles: Some(vec![101.0]), ..Default::default() },
            RawAnalysisOptions { business_context: Some("chaos".into()), ..Default::default() },
        ];
        for raw in cases {
            let err = raw.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{err}");
        }
    }

    #[test]
    fn merge_prefers_explicit_values() {
        let base = RawAnalysisOptions {
            confidence_level: Some(0.99),
            priority_threshold: Some(3),
            ..Default::default()
        };
        let request = RawAnalysisOptions { priority_threshold: Some(8), ..Default::default() };
        let merged = request.merged_over(&base).validate().unwrap();
        assert_eq!(merged.confidence, ConfidenceLevel::P99);
        assert_eq!(merged.priority_threshold, 8);
    }

    #[test]
    fn enum_keys_are_normalized() {
        assert_eq!(normalize_key("riskAssessment"), "risk_assessment");
        assert_eq!(normalize_key("Risk-Assessment"), "risk_assessment");
        assert_eq!(normalize_key(" growth "), "growth");
        assert_eq!(normalize_key("POISSON"), "poisson");
    }
}
