//! Shared vocabulary of the trigger catalogue.

use crate::anomalies::AnomalyReport;
use crate::products::ProductAnalysis;
use crate::segmentation::SegmentationSummary;
use crate::trends::TrendAnalysis;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Business area an opportunity, risk or recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Revenue,
    Operations,
    Customers,
    Products,
    Financial,
    RiskManagement,
}

/// Everything the triggers may look at. Missing pieces simply keep the
/// triggers that need them from firing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals<'a> {
    pub trends: Option<&'a TrendAnalysis>,
    pub segments: Option<&'a SegmentationSummary>,
    pub products: Option<&'a ProductAnalysis>,
    pub anomalies: Option<&'a AnomalyReport>,
}

/// Sorts by descending score, keeping the catalogue order on ties.
pub(crate) fn rank_by_score<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
}
