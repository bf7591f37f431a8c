//! Curve and sample types flowing through the engine
//!
//! Field names follow the camelCase wire format used by chart front-ends,
//! so payloads deserialize straight into these types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Per-sample data quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Good,
    Warning,
    Error,
}

/// A single time-series sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
    /// Absent quality is read as [`Quality::Good`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            quality: None,
        }
    }

    pub fn with_quality(timestamp: f64, value: f64, quality: Quality) -> Self {
        Self {
            timestamp,
            value,
            quality: Some(quality),
        }
    }

    /// Effective quality, defaulting to good
    #[inline]
    pub fn quality(&self) -> Quality {
        self.quality.unwrap_or_default()
    }
}

/// One named time series with its display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<Sample>,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// A curve that does not say it is visible is treated as hidden
    #[serde(default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Display metadata the engine does not interpret, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Curve {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
            color: "#1f77b4".to_string(),
            unit: None,
            visible: true,
            line_width: None,
            alpha: None,
            extra: Map::new(),
        }
    }

    /// Hidden or empty curves are passed through every transform unchanged
    #[inline]
    pub fn is_passthrough(&self) -> bool {
        !self.visible || self.data.is_empty()
    }
}

/// Caller view state; only the zoom level is consumed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    #[serde(default)]
    pub zoom_level: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Viewport {
    pub fn at_zoom(zoom_level: f64) -> Self {
        Self {
            zoom_level,
            extra: Map::new(),
        }
    }
}

/// Time range in the same coordinate space as sample timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Statistic computed per aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    #[default]
    Average,
    Max,
    Min,
}

impl AggregationType {
    /// Unrecognized names fall back to average
    pub fn parse(name: &str) -> Self {
        match name {
            "max" => AggregationType::Max,
            "min" => AggregationType::Min,
            _ => AggregationType::Average,
        }
    }
}

impl<'de> Deserialize<'de> for AggregationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
