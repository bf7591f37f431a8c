pub mod curve;
pub mod stats;

// Re-export key types for convenience
pub use curve::{AggregationType, Curve, Quality, Sample, TimeWindow, Viewport};
pub use stats::{QualityDistribution, Range, Stats, calculate_statistics};
