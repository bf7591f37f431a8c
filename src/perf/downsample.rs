//! Viewport-adaptive downsampling
//!
//! LTTB reduces each curve to a point budget that grows with zoom depth.
//! Results are cached per (curve, zoom, budget, input length).

use std::borrow::Cow;

use super::SharedSamples;
use super::cache::{CacheStats, ResultCache};
use crate::constants::downsample::{
    ZOOM_DOUBLE_CAP, ZOOM_DOUBLE_FACTOR, ZOOM_DOUBLE_THRESHOLD, ZOOM_QUAD_CAP, ZOOM_QUAD_FACTOR,
    ZOOM_QUAD_THRESHOLD,
};
use crate::data::{Curve, Sample, Viewport};

/// Cache key for one curve at one zoom level and budget.
///
/// The input length stands in for a content version: a revised curve with a
/// different sample count gets a fresh key instead of invalidating the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub curve_id: String,
    zoom_bits: u64,
    pub target_points: usize,
    pub len: usize,
}

impl CacheKey {
    pub fn new(curve_id: &str, zoom_level: f64, target_points: usize, len: usize) -> Self {
        Self {
            curve_id: curve_id.to_string(),
            // +0.0 folds -0.0 into 0.0 so both zooms share a key
            zoom_bits: (zoom_level + 0.0).to_bits(),
            target_points,
            len,
        }
    }
}

/// Point budget for a zoom level.
///
/// Thresholds are applied in ascending order so the deepest one wins.
pub fn effective_budget(target_points: usize, zoom_level: f64) -> usize {
    let mut budget = target_points;
    if zoom_level > ZOOM_DOUBLE_THRESHOLD {
        budget = ZOOM_DOUBLE_CAP.min(target_points.saturating_mul(ZOOM_DOUBLE_FACTOR));
    }
    if zoom_level > ZOOM_QUAD_THRESHOLD {
        budget = ZOOM_QUAD_CAP.min(target_points.saturating_mul(ZOOM_QUAD_FACTOR));
    }
    budget
}

/// Adaptive resolution controller; sole owner of the result cache
pub struct AdaptiveDownsampler {
    cache: ResultCache<CacheKey, SharedSamples>,
}

impl AdaptiveDownsampler {
    pub fn new(max_cache_entries: usize) -> Self {
        Self {
            cache: ResultCache::new(max_cache_entries),
        }
    }

    /// Downsample every visible, non-empty curve for the given viewport
    pub fn downsample_curves(
        &mut self,
        curves: Vec<Curve>,
        viewport: &Viewport,
        target_points: usize,
    ) -> Vec<Curve> {
        self.downsample_curves_with(curves, viewport, target_points, |data, budget| {
            lttb_downsample(data, budget).into_owned()
        })
    }

    /// Same as [`Self::downsample_curves`] with a caller-provided reducer,
    /// invoked only on cache misses where the curve exceeds its budget
    pub fn downsample_curves_with<F>(
        &mut self,
        curves: Vec<Curve>,
        viewport: &Viewport,
        target_points: usize,
        mut reduce: F,
    ) -> Vec<Curve>
    where
        F: FnMut(&[Sample], usize) -> Vec<Sample>,
    {
        profiling::scope!("adaptive_downsample");

        let budget = effective_budget(target_points, viewport.zoom_level);

        curves
            .into_iter()
            .map(|mut curve| {
                if curve.is_passthrough() {
                    return curve;
                }

                let key = CacheKey::new(
                    &curve.id,
                    viewport.zoom_level,
                    target_points,
                    curve.data.len(),
                );

                if let Some(points) = self.cache.get(&key) {
                    curve.data = points.to_vec();
                    return curve;
                }

                if curve.data.len() > budget {
                    profiling::scope!("compute_lttb");
                    curve.data = reduce(&curve.data, budget);
                }
                let points: SharedSamples = curve.data.as_slice().into();

                self.cache.set(key, points);
                curve
            })
            .collect()
    }

    /// Drop every cached result
    pub fn clear_cache(&mut self) {
        let dropped = self.cache.len();
        self.cache.clear();
        log::info!("cleared downsample cache ({} entries)", dropped);
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            total_points: self.cache.values().map(|v| v.len()).sum(),
            ..self.cache.stats()
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl Default for AdaptiveDownsampler {
    fn default() -> Self {
        Self::new(crate::constants::cache::DEFAULT_MAX_ENTRIES)
    }
}

/// LTTB (Largest Triangle Three Buckets) downsampling algorithm.
///
/// Returns the input untouched when it already fits. Budgets of two or fewer
/// keep just the endpoints. Ties in triangle area keep the earliest point.
pub fn lttb_downsample(data: &[Sample], target: usize) -> Cow<'_, [Sample]> {
    if data.len() <= target {
        return Cow::Borrowed(data);
    }

    let last = data.len() - 1;

    if target <= 2 {
        return Cow::Owned(vec![data[0], data[last]]);
    }

    let mut result = Vec::with_capacity(target);

    // Always include first point
    result.push(data[0]);

    let bucket_size = (data.len() - 2) as f64 / (target - 2) as f64;
    let bound = |i: usize| (i as f64 * bucket_size).floor() as usize + 1;
    let mut a = 0usize;

    for i in 0..(target - 2) {
        let bucket_start = bound(i);
        let bucket_end = bound(i + 1).min(last);

        // Average of next bucket
        let next_start = bucket_end;
        let next_end = bound(i + 2).min(data.len());

        let (avg_t, avg_v) = if next_start < next_end {
            let (sum_t, sum_v) = data[next_start..next_end]
                .iter()
                .fold((0.0, 0.0), |acc, s| (acc.0 + s.timestamp, acc.1 + s.value));
            let count = (next_end - next_start) as f64;
            (sum_t / count, sum_v / count)
        } else {
            (data[last].timestamp, data[last].value)
        };

        // Find point with largest triangle area
        let mut max_area = -1.0f64;
        let mut max_idx = bucket_start;
        let (at, av) = (data[a].timestamp, data[a].value);

        for (j, s) in data.iter().enumerate().take(bucket_end).skip(bucket_start) {
            let area = ((at - avg_t) * (s.value - av) - (at - s.timestamp) * (avg_v - av)).abs();
            if area > max_area {
                max_area = area;
                max_idx = j;
            }
        }

        result.push(data[max_idx]);
        a = max_idx;
    }

    // Always include last point
    result.push(data[last]);
    Cow::Owned(result)
}
