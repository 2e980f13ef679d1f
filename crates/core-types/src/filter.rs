use crate::enums::Period;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MAX_LIMIT: u32 = 10_000;

/// The filter the data-access layer applied when extracting a sample.
///
/// The engine never queries anything itself; it only checks that the filter
/// is self-consistent before trusting the data produced under it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFilter {
    pub period: Option<Period>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub user_id: Option<u64>,
    pub category_id: Option<u64>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub limit: Option<u32>,
}

impl SampleFilter {
    /// Rejects contradictory filters. `today` is supplied by the caller so
    /// the check stays deterministic.
    pub fn validate(&self, today: NaiveDate) -> Result<(), CoreError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(CoreError::Validation(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        if let Some(start) = self.start_date {
            if start > today {
                return Err(CoreError::Validation(format!(
                    "start date {start} is in the future"
                )));
            }
        }
        if let Some(min) = self.min_amount {
            if min.is_sign_negative() && !min.is_zero() {
                return Err(CoreError::Validation(format!(
                    "minimum amount {min} cannot be negative"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "minimum amount {min} exceeds maximum amount {max}"
                )));
            }
        }
        if let Some(limit) = self.limit {
            if limit < 1 || limit > MAX_LIMIT {
                return Err(CoreError::Validation(format!(
                    "limit must be between 1 and {MAX_LIMIT} (got {limit})"
                )));
            }
        }
        Ok(())
    }
}
