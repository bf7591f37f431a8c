use serde::Serialize;

use super::curve::{Curve, Quality};

/// Closed numeric range, widened point by point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Inverted sentinel range; stays infinite when nothing widens it
    pub const EMPTY: Range = Range {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    #[inline]
    fn widen(&mut self, v: f64) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Sample count per quality label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    pub good: usize,
    pub warning: usize,
    pub error: usize,
}

impl QualityDistribution {
    fn record(&mut self, quality: Quality) {
        match quality {
            Quality::Good => self.good += 1,
            Quality::Warning => self.warning += 1,
            Quality::Error => self.error += 1,
        }
    }
}

/// Summary statistics over a curve set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_points: usize,
    pub total_curves: usize,
    pub visible_curves: usize,
    pub time_range: Range,
    pub value_range: Range,
    pub quality_distribution: QualityDistribution,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_points: 0,
            total_curves: 0,
            visible_curves: 0,
            time_range: Range::EMPTY,
            value_range: Range::EMPTY,
            quality_distribution: QualityDistribution::default(),
        }
    }
}

/// Calculate statistics over the visible curves.
///
/// `total_curves` counts every curve; everything else is restricted to visible ones.
#[profiling::function]
pub fn calculate_statistics(curves: &[Curve]) -> Stats {
    let mut stats = Stats {
        total_curves: curves.len(),
        ..Stats::default()
    };

    for curve in curves.iter().filter(|c| c.visible) {
        stats.visible_curves += 1;
        stats.total_points += curve.data.len();

        for sample in &curve.data {
            stats.time_range.widen(sample.timestamp);
            stats.value_range.widen(sample.value);
            stats.quality_distribution.record(sample.quality());
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::curve::Sample;

    #[test]
    fn test_empty_curve_list() {
        let stats = calculate_statistics(&[]);

        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.total_curves, 0);
        assert_eq!(stats.visible_curves, 0);
        assert_eq!(stats.time_range.min, f64::INFINITY);
        assert_eq!(stats.time_range.max, f64::NEG_INFINITY);
        assert_eq!(stats.value_range.min, f64::INFINITY);
        assert_eq!(stats.value_range.max, f64::NEG_INFINITY);
        assert!(stats.time_range.is_empty());
    }

    #[test]
    fn test_hidden_curves_only_counted() {
        let visible = Curve::new(
            "a",
            "A",
            vec![
                Sample::new(10.0, -3.0),
                Sample::with_quality(20.0, 7.0, Quality::Warning),
                Sample::with_quality(30.0, 1.0, Quality::Error),
            ],
        );
        let mut hidden = Curve::new("b", "B", vec![Sample::new(0.0, 1000.0)]);
        hidden.visible = false;

        let stats = calculate_statistics(&[visible, hidden]);

        assert_eq!(stats.total_curves, 2);
        assert_eq!(stats.visible_curves, 1);
        assert_eq!(stats.total_points, 3);
        assert_eq!(stats.time_range, Range { min: 10.0, max: 30.0 });
        assert_eq!(stats.value_range, Range { min: -3.0, max: 7.0 });
        assert_eq!(
            stats.quality_distribution,
            QualityDistribution {
                good: 1,
                warning: 1,
                error: 1
            }
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(calculate_statistics(&[])).unwrap();
        assert!(json.get("totalPoints").is_some());
        assert!(json.get("qualityDistribution").is_some());
        // JSON has no infinity; sentinels serialize as null
        assert!(json["timeRange"]["min"].is_null());
    }
}
