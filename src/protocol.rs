//! Request/response envelopes for the engine's message boundary
//!
//! Requests arrive as `{ id, type, data }`. The `type` string is resolved to an
//! [`Operation`] here, at deserialization time; everything past this point is
//! exhaustive over the enum. Responses echo `id` and `type` verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{AggregationType, Curve, Stats, TimeWindow, Viewport};
use crate::error::{EngineError, Result};
use crate::perf::{Performance, Suggestion};

/// Wire envelope of an incoming request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Caller-chosen correlation id, opaque to the engine
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl RequestEnvelope {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            data,
        }
    }

    /// Build an envelope from a typed operation
    pub fn for_operation(id: impl Into<String>, op: &Operation) -> Result<Self> {
        let data = match op {
            Operation::Downsample(req) => serde_json::to_value(req),
            Operation::Aggregate(req) => serde_json::to_value(req),
            Operation::Statistics(req) => serde_json::to_value(req),
            Operation::Optimize(req) => serde_json::to_value(req),
            Operation::ClearCache => Ok(Value::Null),
        }
        .map_err(EngineError::Encode)?;
        Ok(Self::new(id, op.kind(), data))
    }
}

/// Read one request envelope from JSON text
pub fn decode_request(text: &str) -> Result<RequestEnvelope> {
    serde_json::from_str(text).map_err(EngineError::MalformedEnvelope)
}

/// Best-effort `(id, type)` from text that failed to decode as an envelope
pub fn recover_ids(text: &str) -> (String, String) {
    let value: Value = serde_json::from_str(text).unwrap_or(Value::Null);
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    (field("id"), field("type"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownsampleRequest {
    pub curves: Vec<Curve>,
    pub viewport: Viewport,
    /// Base budget; the engine's configured default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_points: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub curves: Vec<Curve>,
    pub time_window: TimeWindow,
    #[serde(default)]
    pub aggregation_type: AggregationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRequest {
    pub curves: Vec<Curve>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub curves: Vec<Curve>,
    #[serde(default)]
    pub performance: Performance,
}

/// One engine operation with its typed payload
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Downsample(DownsampleRequest),
    Aggregate(AggregateRequest),
    Statistics(StatisticsRequest),
    Optimize(OptimizeRequest),
    ClearCache,
}

impl Operation {
    pub const DOWNSAMPLE: &'static str = "downsample";
    pub const AGGREGATE: &'static str = "aggregate";
    pub const STATISTICS: &'static str = "statistics";
    pub const OPTIMIZE: &'static str = "optimize";
    pub const CLEAR_CACHE: &'static str = "clear_cache";

    /// Resolve a request type and payload.
    ///
    /// Unknown types are the only boundary check; payload shape errors surface
    /// as [`EngineError::InvalidPayload`].
    pub fn parse(kind: &str, data: Value) -> Result<Self> {
        fn payload<T: serde::de::DeserializeOwned>(kind: &str, data: Value) -> Result<T> {
            serde_json::from_value(data).map_err(|source| EngineError::InvalidPayload {
                kind: kind.to_string(),
                source,
            })
        }

        match kind {
            Self::DOWNSAMPLE => payload(kind, data).map(Operation::Downsample),
            Self::AGGREGATE => payload(kind, data).map(Operation::Aggregate),
            Self::STATISTICS => payload(kind, data).map(Operation::Statistics),
            Self::OPTIMIZE => payload(kind, data).map(Operation::Optimize),
            Self::CLEAR_CACHE => Ok(Operation::ClearCache),
            other => Err(EngineError::UnknownOperation {
                kind: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Downsample(_) => Self::DOWNSAMPLE,
            Operation::Aggregate(_) => Self::AGGREGATE,
            Operation::Statistics(_) => Self::STATISTICS,
            Operation::Optimize(_) => Self::OPTIMIZE,
            Operation::ClearCache => Self::CLEAR_CACHE,
        }
    }
}

/// Acknowledgement payload for cache clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cleared {
    pub success: bool,
}

/// Type-specific success payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Curves(Vec<Curve>),
    Stats(Stats),
    Suggestions(Vec<Suggestion>),
    Cleared(Cleared),
}

/// Wire envelope of an outgoing response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OperationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(id: impl Into<String>, kind: impl Into<String>, result: OperationResult) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, kind: impl Into<String>, err: &EngineError) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            success: false,
            result: None,
            error: Some(err.to_string()),
        }
    }

    /// Encode as a single JSON line
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(EngineError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type() {
        let err = Operation::parse("bogus", Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::UnknownOperation { .. }));
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_clear_cache_needs_no_data() {
        assert_eq!(
            Operation::parse("clear_cache", Value::Null).unwrap(),
            Operation::ClearCache
        );
    }

    #[test]
    fn test_missing_payload_is_invalid() {
        let err = Operation::parse("statistics", Value::Null).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPayload { .. }));
    }

    #[test]
    fn test_parse_downsample_payload() {
        let data = json!({
            "curves": [],
            "viewport": {"zoomLevel": 4, "width": 800},
            "targetPoints": 250
        });
        let Operation::Downsample(req) = Operation::parse("downsample", data).unwrap() else {
            panic!("expected downsample");
        };
        assert_eq!(req.viewport.zoom_level, 4.0);
        assert_eq!(req.target_points, Some(250));
    }

    #[test]
    fn test_parse_aggregate_defaults_to_average() {
        let data = json!({"curves": [], "timeWindow": {"start": 0, "end": 10}});
        let Operation::Aggregate(req) = Operation::parse("aggregate", data).unwrap() else {
            panic!("expected aggregate");
        };
        assert_eq!(req.aggregation_type, AggregationType::Average);
    }

    #[test]
    fn test_envelope_round_trip_through_operation() {
        let op = Operation::Statistics(StatisticsRequest { curves: vec![] });
        let env = RequestEnvelope::for_operation("42", &op).unwrap();
        assert_eq!(env.kind, "statistics");
        assert_eq!(Operation::parse(&env.kind, env.data).unwrap(), op);
    }

    #[test]
    fn test_response_shapes() {
        let ok = Response::ok("1", "clear_cache", OperationResult::Cleared(Cleared { success: true }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"id": "1", "type": "clear_cache", "success": true, "result": {"success": true}})
        );

        let err = EngineError::UnknownOperation { kind: "x".into() };
        let bad = Response::failure("2", "x", &err);
        let value = serde_json::to_value(&bad).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("result").is_none());
        assert_eq!(value["error"], "Unknown message type: x");
    }

    #[test]
    fn test_recover_ids() {
        assert_eq!(
            recover_ids(r#"{"id": "7", "type": 3}"#),
            ("7".to_string(), String::new())
        );
        assert_eq!(recover_ids("not json"), (String::new(), String::new()));
    }
}
