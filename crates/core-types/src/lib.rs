pub mod enums;
pub mod error;
pub mod filter;
pub mod sample;
pub mod tables;

// Re-export the core types to provide a clean public API.
pub use enums::{
    BusinessContext, ConfidenceLevel, DistributionKind, FocusArea, ImpactLevel, Period,
    SegmentLabel, TimeHorizon,
};
pub use error::{CoreError, ErrorKind};
pub use filter::SampleFilter;
pub use sample::{NumericSample, SampleMetadata, SampleOutcome};
pub use tables::{CustomerAggregate, PeriodAggregate, ProductAggregate};
