//! Engine-wide constants and default values
//!
//! This module centralizes all thresholds and default values used throughout
//! the engine, making them easier to maintain and configure.

/// Downsampling defaults and zoom-driven budget scaling
pub mod downsample {
    /// Base point budget when a request names none
    pub const DEFAULT_TARGET_POINTS: usize = 1000;

    /// Zoom level above which the budget doubles
    pub const ZOOM_DOUBLE_THRESHOLD: f64 = 3.0;
    /// Multiplier and cap applied past `ZOOM_DOUBLE_THRESHOLD`
    pub const ZOOM_DOUBLE_FACTOR: usize = 2;
    pub const ZOOM_DOUBLE_CAP: usize = 2000;

    /// Zoom level above which the budget quadruples
    pub const ZOOM_QUAD_THRESHOLD: f64 = 5.0;
    /// Multiplier and cap applied past `ZOOM_QUAD_THRESHOLD`
    pub const ZOOM_QUAD_FACTOR: usize = 4;
    pub const ZOOM_QUAD_CAP: usize = 5000;
}

/// Result cache sizing
pub mod cache {
    /// Entry count at which the oldest insertion is evicted
    pub const DEFAULT_MAX_ENTRIES: usize = 1000;
}

/// Time-bucket aggregation
pub mod aggregate {
    /// Upper bound on buckets per curve
    pub const MAX_BUCKETS: usize = 500;

    /// One bucket per this many raw samples
    pub const SAMPLES_PER_BUCKET: usize = 10;
}

/// Performance advisory thresholds
pub mod advisory {
    /// Curve count above which fewer curves are suggested
    pub const MAX_CURVES: usize = 5000;

    /// Total sample count above which downsampling is suggested
    pub const MAX_TOTAL_POINTS: usize = 100_000;

    /// Frame budget in milliseconds (60 fps)
    pub const FRAME_BUDGET_MS: f64 = 16.0;
}

/// Worker and host defaults
pub mod worker {
    /// Caller-side wait before a request is treated as failed
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "curve-engine.toml";
}
