use crate::error::{CoreError, ErrorKind};
use crate::filter::SampleFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a sample came from. Carried along for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// Free-form period tag such as `"month"` or `"2024-05"`.
    pub period: Option<String>,
    /// The filter the data-access layer applied to produce the sample.
    pub filter: Option<SampleFilter>,
}

/// A non-empty sequence of finite numbers.
///
/// The invariant is enforced on construction, so every stage downstream can
/// index the first element and divide by `len()` without re-checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSample")]
pub struct NumericSample {
    values: Vec<f64>,
    metadata: SampleMetadata,
}

#[derive(Deserialize)]
struct UncheckedSample {
    values: Vec<f64>,
    #[serde(default)]
    metadata: SampleMetadata,
}

impl TryFrom<UncheckedSample> for NumericSample {
    type Error = CoreError;

    fn try_from(raw: UncheckedSample) -> Result<Self, Self::Error> {
        NumericSample::with_metadata(raw.values, raw.metadata)
    }
}

impl NumericSample {
    pub fn new(values: Vec<f64>) -> Result<Self, CoreError> {
        Self::with_metadata(values, SampleMetadata::default())
    }

    pub fn with_metadata(values: Vec<f64>, metadata: SampleMetadata) -> Result<Self, CoreError> {
        if values.is_empty() {
            return Err(CoreError::InvalidInput(
                "sample".to_string(),
                "must contain at least one value".to_string(),
            ));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(CoreError::InvalidInput(
                "sample".to_string(),
                format!("value at position {position} is not a finite number"),
            ));
        }
        Ok(Self { values, metadata })
    }

    /// Converts loosely-typed values as produced by a query layer.
    ///
    /// Numbers and numeric strings (decimal columns are often returned as
    /// text) are accepted; anything else is `InvalidInput`.
    pub fn from_json_values(values: &[Value], metadata: SampleMetadata) -> Result<Self, CoreError> {
        let parsed = values
            .iter()
            .enumerate()
            .map(|(i, value)| parse_number(value).ok_or_else(|| {
                CoreError::InvalidInput(
                    "sample".to_string(),
                    format!("value at position {i} is not numeric: {value}"),
                )
            }))
            .collect::<Result<Vec<f64>, CoreError>>()?;
        Self::with_metadata(parsed, metadata)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A sorted copy of the values. The sample itself keeps caller order.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// True when every value is a non-negative whole number (count data).
    pub fn is_count_data(&self) -> bool {
        self.values.iter().all(|v| *v >= 0.0 && v.fract() == 0.0)
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// The tagged result of asking the data-access layer for a sample.
///
/// "No rows yet" and "the query failed" are distinct states; neither is ever
/// papered over with example numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    Ready { sample: NumericSample },
    Empty { reason: String },
    Failed { kind: ErrorKind, reason: String },
}

impl SampleOutcome {
    /// Classifies raw values: no values is `Empty`, bad values are `Failed`.
    pub fn from_json_values(label: &str, values: &[Value], metadata: SampleMetadata) -> Self {
        if values.is_empty() {
            return SampleOutcome::Empty {
                reason: format!("no {label} observations for the requested filter"),
            };
        }
        match NumericSample::from_json_values(values, metadata) {
            Ok(sample) => SampleOutcome::Ready { sample },
            Err(e) => SampleOutcome::Failed {
                kind: e.kind(),
                reason: format!("{label}: {e}"),
            },
        }
    }

    pub fn sample(&self) -> Option<&NumericSample> {
        match self {
            SampleOutcome::Ready { sample } => Some(sample),
            _ => None,
        }
    }
}
