//! The engine object and its dispatch boundary
//!
//! An [`Engine`] is built once per worker and owns the only mutable state: the
//! downsample cache inside its [`AdaptiveDownsampler`]. Operations are plain
//! synchronous methods; [`Engine::dispatch`] layers request/response handling
//! on top and turns every failure into a failure [`Response`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::data::{AggregationType, Curve, Stats, TimeWindow, Viewport, calculate_statistics};
use crate::error::{EngineError, Result};
use crate::perf::{
    AdaptiveDownsampler, CacheStats, Performance, Suggestion, aggregate_curves,
    get_optimization_suggestions,
};
use crate::protocol::{
    Cleared, Operation, OperationResult, RequestEnvelope, Response, decode_request, recover_ids,
};

pub struct Engine {
    downsampler: AdaptiveDownsampler,
    default_target_points: usize,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            downsampler: AdaptiveDownsampler::new(config.cache.max_entries),
            default_target_points: config.downsample.default_target_points,
        }
    }

    /// Downsample curves for the viewport, reusing cached results
    pub fn adaptive_downsample(
        &mut self,
        curves: Vec<Curve>,
        viewport: &Viewport,
        target_points: usize,
    ) -> Vec<Curve> {
        self.downsampler
            .downsample_curves(curves, viewport, target_points)
    }

    pub fn aggregate(
        &self,
        curves: Vec<Curve>,
        window: &TimeWindow,
        kind: AggregationType,
    ) -> Vec<Curve> {
        aggregate_curves(curves, window, kind)
    }

    pub fn statistics(&self, curves: &[Curve]) -> Stats {
        calculate_statistics(curves)
    }

    pub fn optimization_suggestions(
        &self,
        curves: &[Curve],
        performance: &Performance,
    ) -> Vec<Suggestion> {
        get_optimization_suggestions(curves, performance)
    }

    pub fn clear_cache(&mut self) {
        self.downsampler.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.downsampler.cache_stats()
    }

    /// Run one typed operation to completion
    pub fn execute(&mut self, op: Operation) -> OperationResult {
        match op {
            Operation::Downsample(req) => {
                let target = req.target_points.unwrap_or(self.default_target_points);
                OperationResult::Curves(self.adaptive_downsample(req.curves, &req.viewport, target))
            }
            Operation::Aggregate(req) => OperationResult::Curves(crate::timed!(
                "aggregate",
                self.aggregate(req.curves, &req.time_window, req.aggregation_type)
            )),
            Operation::Statistics(req) => OperationResult::Stats(crate::timed!(
                "statistics",
                self.statistics(&req.curves)
            )),
            Operation::Optimize(req) => OperationResult::Suggestions(
                self.optimization_suggestions(&req.curves, &req.performance),
            ),
            Operation::ClearCache => {
                self.clear_cache();
                OperationResult::Cleared(Cleared { success: true })
            }
        }
    }

    /// Resolve and run a request; always yields exactly one response
    pub fn dispatch(&mut self, request: RequestEnvelope) -> Response {
        let started = Instant::now();
        let RequestEnvelope { id, kind, data } = request;

        let response = match self.try_dispatch(&kind, data) {
            Ok(result) => Response::ok(id, kind, result),
            Err(err) => {
                log::warn!("{} for request '{}': {}", err.title(), id, err);
                Response::failure(id, kind, &err)
            }
        };

        log::debug!(
            "request '{}' ({}) handled in {:?}, success={}",
            response.id,
            response.kind,
            started.elapsed(),
            response.success
        );
        response
    }

    fn try_dispatch(&mut self, kind: &str, data: serde_json::Value) -> Result<OperationResult> {
        let op = Operation::parse(kind, data)?;

        panic::catch_unwind(AssertUnwindSafe(|| self.execute(op))).map_err(|payload| {
            EngineError::Panicked {
                kind: kind.to_string(),
                message: panic_message(payload.as_ref()),
            }
        })
    }

    /// Handle one JSON-encoded request and encode the response.
    ///
    /// A request that is not a valid envelope still gets a failure response,
    /// echoing whatever id and type could be recovered from it.
    pub fn dispatch_json(&mut self, text: &str) -> String {
        let response = match decode_request(text) {
            Ok(request) => self.dispatch(request),
            Err(err) => {
                let (id, kind) = recover_ids(text);
                log::warn!("{}: {}", err.title(), err);
                Response::failure(id, kind, &err)
            }
        };
        encode_response(&response)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// Encode a response, degrading to a bare failure line if encoding fails
pub fn encode_response(response: &Response) -> String {
    response.to_json().unwrap_or_else(|err| {
        serde_json::json!({
            "id": response.id,
            "type": response.kind,
            "success": false,
            "error": err.to_string(),
        })
        .to_string()
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
