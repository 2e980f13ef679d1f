use serde::{Deserialize, Serialize};
use std::fmt;

/// The probability models the fitter knows how to estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Normal,
    Poisson,
}

impl DistributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Poisson => "poisson",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The confidence levels accepted at the API boundary.
///
/// Serialized as the plain number (`0.95`), so option payloads stay numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ConfidenceLevel {
    P80,
    P90,
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 4] = [
        ConfidenceLevel::P80,
        ConfidenceLevel::P90,
        ConfidenceLevel::P95,
        ConfidenceLevel::P99,
    ];

    pub fn as_f64(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 0.80,
            ConfidenceLevel::P90 => 0.90,
            ConfidenceLevel::P95 => 0.95,
            ConfidenceLevel::P99 => 0.99,
        }
    }

    /// Two-sided critical value of the standard normal for this level.
    pub fn z_score(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.28,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.96,
            ConfidenceLevel::P99 => 2.576,
        }
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ConfidenceLevel::ALL
            .into_iter()
            .find(|level| (level.as_f64() - value).abs() < 1e-9)
            .ok_or_else(|| {
                format!("confidence level must be 0.80, 0.90, 0.95 or 0.99 (got {value})")
            })
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.as_f64()
    }
}

/// Qualitative weight attached to opportunities (impact) and risks (severity).
///
/// The order platform's Spanish labels (`Alto`, `Medio`, `Bajo`) are still
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[serde(alias = "Alto")]
    High,
    #[serde(alias = "Medio")]
    Medium,
    #[serde(alias = "Bajo")]
    Low,
}

impl ImpactLevel {
    /// Ranking weight: High = 3, Medium = 2, Low = 1.
    pub fn weight(&self) -> f64 {
        match self {
            ImpactLevel::High => 3.0,
            ImpactLevel::Medium => 2.0,
            ImpactLevel::Low => 1.0,
        }
    }
}

/// RFM segment assigned to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentLabel {
    #[serde(rename = "VIP")]
    Vip,
    Loyal,
    Regular,
    #[serde(rename = "At Risk")]
    AtRisk,
    New,
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SegmentLabel::Vip => "VIP",
            SegmentLabel::Loyal => "Loyal",
            SegmentLabel::Regular => "Regular",
            SegmentLabel::AtRisk => "At Risk",
            SegmentLabel::New => "New",
        };
        f.write_str(label)
    }
}

/// Families of insight triggers a caller can focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Trends,
    Customers,
    Products,
    Operations,
    Financial,
}

impl FocusArea {
    pub const ALL: [FocusArea; 5] = [
        FocusArea::Trends,
        FocusArea::Customers,
        FocusArea::Products,
        FocusArea::Operations,
        FocusArea::Financial,
    ];
}

/// The business situation recommendations are prioritized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessContext {
    Growth,
    #[default]
    Optimization,
    RiskAssessment,
    Expansion,
    Efficiency,
}

/// Planning horizon requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Short,
    #[default]
    Medium,
    Long,
}

/// Named reporting window used by the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
}
