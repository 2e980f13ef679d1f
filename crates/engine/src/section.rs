use core_types::{ErrorKind, SampleOutcome};
use serde::{Deserialize, Serialize};

/// Outcome of one analysis branch.
///
/// A branch that had nothing to work on says so with `NoData`; a branch that
/// failed carries the error kind. Neither stops the other branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready { data: T },
    NoData { reason: String },
    Failed { kind: ErrorKind, reason: String },
}

impl<T> Section<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready { .. })
    }

    /// Carries a non-ready sample outcome over into a section.
    pub(crate) fn from_unready(outcome: &SampleOutcome) -> Option<Self> {
        match outcome {
            SampleOutcome::Ready { .. } => None,
            SampleOutcome::Empty { reason } => Some(Section::NoData { reason: reason.clone() }),
            SampleOutcome::Failed { kind, reason } => {
                Some(Section::Failed { kind: *kind, reason: reason.clone() })
            }
        }
    }

    pub(crate) fn failed(kind: ErrorKind, reason: impl ToString) -> Self {
        Section::Failed { kind, reason: reason.to_string() }
    }
}
