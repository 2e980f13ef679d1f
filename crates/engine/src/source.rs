use crate::error::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{CustomerAggregate, PeriodAggregate, ProductAggregate, SampleFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Everything the data-access layer extracted for one analysis.
///
/// Sample values stay untyped JSON until the engine checks them, because
/// query layers often return decimal columns as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDataset {
    /// Free-form period tag carried into the sample metadata.
    pub period: Option<String>,
    pub order_amounts: Vec<Value>,
    /// Orders per period, the count series the Poisson model is fitted to.
    pub daily_order_counts: Vec<Value>,
    /// Order amounts of the preceding period, for the period comparison.
    pub previous_order_amounts: Option<Vec<Value>>,
    /// Time-ordered, oldest first.
    pub periods: Vec<PeriodAggregate>,
    pub customers: Vec<CustomerAggregate>,
    pub products: Vec<ProductAggregate>,
    /// Reference instant for recency; the request's `as_of` when absent.
    pub as_of: Option<DateTime<Utc>>,
}

impl RawDataset {
    /// True when any of the secondary tables has rows.
    pub fn has_auxiliary_data(&self) -> bool {
        !self.periods.is_empty() || !self.customers.is_empty() || !self.products.is_empty()
    }
}

/// The contract between the engine and whatever produces the data.
///
/// Implementations perform the I/O; the engine bounds the call with the
/// configured fetch timeout.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch(&self, filter: &SampleFilter) -> Result<RawDataset, SourceError>;
}

/// Reads a dataset that was exported to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AnalyticsSource for JsonFileSource {
    async fn fetch(&self, filter: &SampleFilter) -> Result<RawDataset, SourceError> {
        tracing::debug!(path = %self.path.display(), ?filter, "Reading dataset file.");
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut dataset: RawDataset = serde_json::from_str(&contents)?;
        // The export is already filtered; only the row limit is applied here.
        if let Some(limit) = filter.limit {
            dataset.order_amounts.truncate(limit as usize);
        }
        Ok(dataset)
    }
}

/// Serves a dataset held in memory. Used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    dataset: RawDataset,
}

impl InMemorySource {
    pub fn new(dataset: RawDataset) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl AnalyticsSource for InMemorySource {
    async fn fetch(&self, _filter: &SampleFilter) -> Result<RawDataset, SourceError> {
        Ok(self.dataset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn json_file_source_reads_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let dataset = json!({
            "period": "2024-05",
            "order_amounts": [10, "12.5", 8],
            "periods": [{ "period": "2024-05-01", "order_count": 3, "revenue": "30.5" }]
        });
        std::fs::write(&path, dataset.to_string()).unwrap();

        let source = JsonFileSource::new(&path);
        let filter = SampleFilter { limit: Some(2), ..SampleFilter::default() };
        let loaded = source.fetch(&filter).await.unwrap();

        assert_eq!(loaded.order_amounts, vec![json!(10), json!("12.5")]);
        assert_eq!(loaded.periods.len(), 1);
        assert!(loaded.has_auxiliary_data());
        assert!(loaded.customers.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        let err = source.fetch(&SampleFilter::default()).await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
