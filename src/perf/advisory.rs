//! Heuristic rendering-performance advice
//!
//! Pure function of the inputs; checks run in a fixed order and each may fire
//! independently.

use serde::{Deserialize, Serialize};

use crate::constants::advisory::{FRAME_BUDGET_MS, MAX_CURVES, MAX_TOTAL_POINTS};
use crate::data::Curve;

/// Caller-measured render cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Last frame's render time in milliseconds
    #[serde(default)]
    pub render_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    ReduceCurves,
    EnableDownsampling,
    OptimizeRendering,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    pub action: SuggestedAction,
}

/// Suggest remedies for the given curve load and frame time.
///
/// The point count sums over all curves, hidden ones included.
pub fn get_optimization_suggestions(curves: &[Curve], performance: &Performance) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if curves.len() > MAX_CURVES {
        suggestions.push(Suggestion {
            severity: Severity::Warning,
            message: format!(
                "{} curves loaded; consider showing fewer than {} at once",
                curves.len(),
                MAX_CURVES
            ),
            action: SuggestedAction::ReduceCurves,
        });
    }

    let total_points: usize = curves.iter().map(|c| c.data.len()).sum();
    if total_points > MAX_TOTAL_POINTS {
        suggestions.push(Suggestion {
            severity: Severity::Warning,
            message: format!("{} points in view; enable downsampling", total_points),
            action: SuggestedAction::EnableDownsampling,
        });
    }

    if performance.render_time > FRAME_BUDGET_MS {
        suggestions.push(Suggestion {
            severity: Severity::Error,
            message: format!(
                "Render took {:.1} ms, over the {} ms frame budget",
                performance.render_time, FRAME_BUDGET_MS
            ),
            action: SuggestedAction::OptimizeRendering,
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;

    fn curves(count: usize, points_each: usize) -> Vec<Curve> {
        (0..count)
            .map(|i| Curve::new(i.to_string(), "c", vec![Sample::new(0.0, 0.0); points_each]))
            .collect()
    }

    fn actions(s: &[Suggestion]) -> Vec<SuggestedAction> {
        s.iter().map(|s| s.action).collect()
    }

    #[test]
    fn test_nothing_fires() {
        let s = get_optimization_suggestions(&curves(10, 10), &Performance { render_time: 16.0 });
        assert!(s.is_empty());
    }

    #[test]
    fn test_too_many_curves() {
        let s = get_optimization_suggestions(&curves(5001, 0), &Performance { render_time: 10.0 });
        assert_eq!(actions(&s), vec![SuggestedAction::ReduceCurves]);
        assert_eq!(s[0].severity, Severity::Warning);
    }

    #[test]
    fn test_points_and_render_time_in_order() {
        let mut set = curves(5000, 20);
        set[0].data.push(Sample::new(1.0, 1.0));
        assert_eq!(set.iter().map(|c| c.data.len()).sum::<usize>(), 100_001);

        let s = get_optimization_suggestions(&set, &Performance { render_time: 17.0 });
        assert_eq!(
            actions(&s),
            vec![
                SuggestedAction::EnableDownsampling,
                SuggestedAction::OptimizeRendering
            ]
        );
        assert_eq!(s[1].severity, Severity::Error);
    }

    #[test]
    fn test_hidden_curves_count_toward_points() {
        let mut set = curves(1, 100_001);
        set[0].visible = false;
        let s = get_optimization_suggestions(&set, &Performance::default());
        assert_eq!(actions(&s), vec![SuggestedAction::EnableDownsampling]);
    }

    #[test]
    fn test_wire_format() {
        let s = get_optimization_suggestions(&curves(1, 0), &Performance { render_time: 40.0 });
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json[0]["type"], "error");
        assert_eq!(json[0]["action"], "optimize_rendering");
    }
}
