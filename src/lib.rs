//! Curve reduction engine for large multi-curve charts
//!
//! Reduces tens of millions of raw samples to a bounded number of renderable
//! points: LTTB downsampling with a zoom-adaptive budget and a bounded result
//! cache, time-bucket rollups with quality propagation, summary statistics, and
//! rendering advisories. The [`engine::Engine`] is driven by typed
//! request/response messages, directly or through a [`perf::EngineWorker`]
//! thread.

pub mod config;
pub mod constants;
pub mod data;
pub mod engine;
pub mod error;
pub mod perf;
pub mod protocol;

pub use config::EngineConfig;
pub use data::{AggregationType, Curve, Quality, Sample, Stats, TimeWindow, Viewport};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, Result};
pub use perf::EngineWorker;
pub use protocol::{Operation, OperationResult, RequestEnvelope, Response};
