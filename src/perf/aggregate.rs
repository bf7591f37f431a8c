//! Time-bucketed rollups for overview rendering
//!
//! Each visible curve is cut into equal time buckets over the window; every
//! non-empty bucket becomes one sample at the bucket midpoint carrying the
//! chosen statistic and the worst quality seen in the bucket.

use crate::constants::aggregate::{MAX_BUCKETS, SAMPLES_PER_BUCKET};
use crate::data::{AggregationType, Curve, Quality, Sample, TimeWindow};

/// Bucket count for a curve of `len` samples
#[inline]
pub fn bucket_count(len: usize) -> usize {
    MAX_BUCKETS.min(len / SAMPLES_PER_BUCKET)
}

/// Aggregate every visible, non-empty curve over the time window
#[profiling::function]
pub fn aggregate_curves(
    curves: Vec<Curve>,
    window: &TimeWindow,
    kind: AggregationType,
) -> Vec<Curve> {
    curves
        .into_iter()
        .map(|mut curve| {
            if !curve.is_passthrough() {
                curve.data = aggregate_samples(&curve.data, window, kind);
            }
            curve
        })
        .collect()
}

/// Reduce one curve's samples to per-bucket statistics.
///
/// Buckets are half-open, so a sample on a boundary belongs to the later
/// bucket. Empty buckets are omitted. `data` must be sorted by timestamp.
pub fn aggregate_samples(data: &[Sample], window: &TimeWindow, kind: AggregationType) -> Vec<Sample> {
    let buckets = bucket_count(data.len());
    if buckets == 0 {
        return Vec::new();
    }

    let bucket_size = window.span() / buckets as f64;
    let mut out = Vec::with_capacity(buckets);

    for i in 0..buckets {
        let bucket_start = window.start + i as f64 * bucket_size;
        let bucket_end = window.start + (i + 1) as f64 * bucket_size;

        // Binary search for range bounds (data assumed sorted by timestamp)
        let lo = data.partition_point(|s| s.timestamp < bucket_start);
        let hi = data.partition_point(|s| s.timestamp < bucket_end);
        if lo >= hi {
            continue;
        }

        let points = &data[lo..hi];
        out.push(Sample::with_quality(
            bucket_start + bucket_size / 2.0,
            reduce(points, kind),
            rollup_quality(points),
        ));
    }

    out
}

fn reduce(points: &[Sample], kind: AggregationType) -> f64 {
    let values = points.iter().map(|s| s.value);
    match kind {
        AggregationType::Max => values.fold(f64::NEG_INFINITY, f64::max),
        AggregationType::Min => values.fold(f64::INFINITY, f64::min),
        AggregationType::Average => values.sum::<f64>() / points.len() as f64,
    }
}

/// Worst quality in the set: any error, else any warning, else good
pub fn rollup_quality(points: &[Sample]) -> Quality {
    points
        .iter()
        .map(Sample::quality)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20 samples spread evenly across [0, 100) -> two buckets of width 50
    fn two_bucket_curve(values: impl Fn(usize) -> f64) -> Vec<Sample> {
        (0..20).map(|i| Sample::new(i as f64 * 5.0, values(i))).collect()
    }

    #[test]
    fn test_bucket_count() {
        assert_eq!(bucket_count(0), 0);
        assert_eq!(bucket_count(9), 0);
        assert_eq!(bucket_count(10), 1);
        assert_eq!(bucket_count(4_999), 499);
        assert_eq!(bucket_count(1_000_000), 500);
    }

    #[test]
    fn test_midpoint_and_mean() {
        let mut data = vec![
            Sample::new(0.0, 10.0),
            Sample::new(1.0, 20.0),
            Sample::new(2.0, 30.0),
        ];
        data.extend((3..10).map(|i| Sample::new(100.0 + i as f64, 0.0)));

        let window = TimeWindow::new(0.0, 10.0);
        let out = aggregate_samples(&data, &window, AggregationType::Average);

        // One bucket spanning the whole window; the late samples fall outside it
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, 5.0);
        assert_eq!(out[0].value, 20.0);
    }

    #[test]
    fn test_min_max() {
        let data = two_bucket_curve(|i| i as f64);
        let window = TimeWindow::new(0.0, 100.0);

        let max = aggregate_samples(&data, &window, AggregationType::Max);
        let min = aggregate_samples(&data, &window, AggregationType::Min);

        assert_eq!(max.iter().map(|s| s.value).collect::<Vec<_>>(), vec![9.0, 19.0]);
        assert_eq!(min.iter().map(|s| s.value).collect::<Vec<_>>(), vec![0.0, 10.0]);
        assert_eq!(max[0].timestamp, 25.0);
        assert_eq!(max[1].timestamp, 75.0);
    }

    #[test]
    fn test_boundary_sample_goes_to_next_bucket() {
        let mut data: Vec<Sample> = (0..19).map(|i| Sample::new(i as f64, 0.0)).collect();
        data.push(Sample::new(50.0, 99.0));
        let window = TimeWindow::new(0.0, 100.0);
        let out = aggregate_samples(&data, &window, AggregationType::Max);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 0.0);
        assert_eq!(out[1].value, 99.0);
        assert_eq!(out[1].timestamp, 75.0);
    }

    #[test]
    fn test_empty_buckets_omitted() {
        // All samples inside the first half of the window
        let data: Vec<Sample> = (0..20).map(|i| Sample::new(i as f64, 1.0)).collect();
        let window = TimeWindow::new(0.0, 100.0);
        let out = aggregate_samples(&data, &window, AggregationType::Average);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, 25.0);
    }

    #[test]
    fn test_quality_rollup() {
        let mut points = vec![
            Sample::with_quality(0.0, 1.0, Quality::Good),
            Sample::with_quality(1.0, 1.0, Quality::Warning),
        ];
        assert_eq!(rollup_quality(&points), Quality::Warning);

        points.push(Sample::with_quality(2.0, 1.0, Quality::Error));
        points.push(Sample::new(3.0, 1.0));
        assert_eq!(rollup_quality(&points), Quality::Error);

        assert_eq!(rollup_quality(&[Sample::new(0.0, 0.0)]), Quality::Good);
    }

    #[test]
    fn test_rollup_reaches_output() {
        let mut data = two_bucket_curve(|_| 1.0);
        data[3].quality = Some(Quality::Warning);
        data[15].quality = Some(Quality::Error);
        let window = TimeWindow::new(0.0, 100.0);

        let out = aggregate_samples(&data, &window, AggregationType::Average);
        assert_eq!(out[0].quality, Some(Quality::Warning));
        assert_eq!(out[1].quality, Some(Quality::Error));
    }

    #[test]
    fn test_short_curve_yields_no_points() {
        let curves = vec![Curve::new("a", "A", vec![Sample::new(0.0, 1.0); 9])];
        let out = aggregate_curves(curves, &TimeWindow::new(0.0, 1.0), AggregationType::Average);
        assert!(out[0].data.is_empty());
    }

    #[test]
    fn test_hidden_curve_passthrough() {
        let mut hidden = Curve::new("h", "H", two_bucket_curve(|i| i as f64));
        hidden.visible = false;
        let out = aggregate_curves(
            vec![hidden.clone()],
            &TimeWindow::new(0.0, 100.0),
            AggregationType::Max,
        );
        assert_eq!(out[0], hidden);
    }

    #[test]
    fn test_bucket_granularity_per_curve() {
        let short = Curve::new("s", "S", two_bucket_curve(|_| 1.0));
        let long = Curve::new(
            "l",
            "L",
            (0..100).map(|i| Sample::new(i as f64, 1.0)).collect(),
        );
        let out = aggregate_curves(
            vec![short, long],
            &TimeWindow::new(0.0, 100.0),
            AggregationType::Average,
        );
        assert_eq!(out[0].data.len(), 2);
        assert_eq!(out[1].data.len(), 10);
    }
}
