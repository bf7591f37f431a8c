//! Performance-critical engine components
//!
//! - LTTB downsampling with a zoom-adaptive point budget
//! - Bounded FIFO result cache
//! - Time-bucket aggregation with quality rollup
//! - Rendering advisories
//! - Background worker thread hosting an engine

mod advisory;
mod aggregate;
mod cache;
mod downsample;
mod worker;

pub use advisory::{Performance, Severity, SuggestedAction, Suggestion, get_optimization_suggestions};
pub use aggregate::{aggregate_curves, aggregate_samples, bucket_count, rollup_quality};
pub use cache::{CacheStats, ResultCache};
pub use downsample::{AdaptiveDownsampler, CacheKey, effective_budget, lttb_downsample};
pub use worker::{EngineWorker, WorkerRequest};

use std::sync::Arc;

use crate::data::Sample;

// Re-export profiling macros for convenience
// When no profiling feature is enabled, these become no-ops
pub use profiling;

/// Cached downsample output, one immutable allocation per cache entry.
///
/// A hit still copies the points into the caller's curve, whose `data` is an
/// owned `Vec`.
pub type SharedSamples = Arc<[Sample]>;

/// Wrap a block in a named profiling scope
#[macro_export]
macro_rules! timed {
    ($name:expr, $block:expr) => {{
        $crate::perf::profiling::scope!($name);
        $block
    }};
}
