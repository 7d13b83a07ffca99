//! Point list filtering, resampling, interpolation and smoothing
//!
//! Every function here is pure and independent of the others. Point lists
//! are assumed ordered by x where an operation depends on order.

use crate::model::{DataPoint, Domain};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Keep points satisfying `predicate`
pub fn filter_points<F>(points: &[DataPoint], predicate: F) -> Vec<DataPoint>
where
    F: Fn(&DataPoint) -> bool,
{
    points.iter().copied().filter(|p| predicate(p)).collect()
}

/// Keep valid points inside the given ranges; `None` leaves an axis open
pub fn filter_range(points: &[DataPoint], x: Option<Domain>, y: Option<Domain>) -> Vec<DataPoint> {
    filter_points(points, |p| {
        p.valid
            && x.map_or(true, |d| d.contains(p.x))
            && y.map_or(true, |d| d.contains(p.y))
    })
}

/// Resampling strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Resample {
    /// Every `stride`-th point, starting with the first, plus every gap
    Uniform { stride: usize },
    /// `count` points drawn without replacement, original order kept
    Random { count: usize, seed: u64 },
    /// Interior points kept only where the path turns by more than
    /// `threshold` radians; first and last always kept
    Adaptive { threshold: f64 },
}

/// Apply a resampling strategy
pub fn resample(points: &[DataPoint], method: Resample) -> Vec<DataPoint> {
    match method {
        Resample::Uniform { stride } => resample_uniform(points, stride),
        Resample::Random { count, seed } => resample_random(points, count, seed),
        Resample::Adaptive { threshold } => resample_adaptive(points, threshold),
    }
}

/// Indices kept by a uniform stride.
///
/// Invalid points are always kept, so thinning never joins two runs
/// across a gap.
pub fn uniform_indices(points: &[DataPoint], stride: usize) -> Vec<usize> {
    let stride = stride.max(1);
    (0..points.len())
        .filter(|&i| i % stride == 0 || !points[i].valid)
        .collect()
}

pub fn resample_uniform(points: &[DataPoint], stride: usize) -> Vec<DataPoint> {
    uniform_indices(points, stride)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

pub fn resample_random(points: &[DataPoint], count: usize, seed: u64) -> Vec<DataPoint> {
    if count >= points.len() {
        return points.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, points.len(), count).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| points[i]).collect()
}

pub fn resample_adaptive(points: &[DataPoint], threshold: f64) -> Vec<DataPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut kept = vec![points[0]];
    for i in 1..last {
        let (prev, here, next) = (points[i - 1], points[i], points[i + 1]);
        let turn = if prev.valid && here.valid && next.valid {
            let incoming = (here.y - prev.y).atan2(here.x - prev.x);
            let outgoing = (next.y - here.y).atan2(next.x - here.x);
            let mut delta = (outgoing - incoming).abs();
            if delta > std::f64::consts::PI {
                delta = std::f64::consts::TAU - delta;
            }
            delta
        } else {
            // Gap boundaries always survive
            f64::INFINITY
        };
        if turn > threshold {
            kept.push(here);
        }
    }
    kept.push(points[last]);
    kept
}

/// Linearly interpolate the valid points to `count` evenly spaced x values
pub fn interpolate(points: &[DataPoint], count: usize) -> Vec<DataPoint> {
    let valid: Vec<DataPoint> = points.iter().copied().filter(|p| p.valid).collect();
    if valid.len() < 2 || count < 2 {
        return valid;
    }
    let (x0, x1) = (valid[0].x, valid[valid.len() - 1].x);
    let mut segment = 0;
    (0..count)
        .map(|i| {
            let x = if i == count - 1 {
                x1
            } else {
                x0 + (x1 - x0) * i as f64 / (count - 1) as f64
            };
            while segment + 2 < valid.len() && valid[segment + 1].x < x {
                segment += 1;
            }
            let (a, b) = (valid[segment], valid[segment + 1]);
            let y = if b.x == a.x {
                a.y
            } else {
                a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x)
            };
            DataPoint::new(x, y)
        })
        .collect()
}

/// Centered moving average of y over `window` points.
///
/// Even windows are widened by one. Windows shrink at the ends; invalid
/// points neither contribute nor get smoothed.
pub fn moving_average(points: &[DataPoint], window: usize) -> Vec<DataPoint> {
    let window = if window % 2 == 0 { window + 1 } else { window };
    let half = window / 2;
    (0..points.len())
        .map(|i| {
            let point = points[i];
            if !point.valid {
                return point;
            }
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(points.len() - 1);
            let (sum, n) = points[lo..=hi]
                .iter()
                .filter(|p| p.valid)
                .fold((0.0, 0usize), |(sum, n), p| (sum + p.y, n + 1));
            DataPoint::new(point.x, sum / n as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<DataPoint> {
        (0..n).map(|i| DataPoint::new(i as f64, i as f64)).collect()
    }

    #[test]
    fn test_filter_range() {
        let mut points = line(10);
        points[3] = DataPoint::invalid(3.0);
        let filtered = filter_range(&points, Some(Domain::new(2.0, 5.0)), None);
        let xs: Vec<f64> = filtered.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_filter_predicate() {
        let filtered = filter_points(&line(6), |p| p.y % 2.0 == 0.0);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_uniform_stride() {
        let resampled = resample(&line(10), Resample::Uniform { stride: 3 });
        let xs: Vec<f64> = resampled.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_uniform_stride_keeps_gaps() {
        let mut points = line(7);
        points[3] = DataPoint::invalid(3.0);
        let resampled = resample_uniform(&points, 2);
        let xs: Vec<f64> = resampled.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 3.0, 4.0, 6.0]);
        assert!(!resampled[2].valid);
    }

    #[test]
    fn test_random_is_seeded_ordered_and_distinct() {
        let points = line(100);
        let a = resample(&points, Resample::Random { count: 10, seed: 42 });
        let b = resample(&points, Resample::Random { count: 10, seed: 42 });
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        for pair in a.windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
        assert_eq!(resample_random(&points[..5], 10, 1).len(), 5);
    }

    #[test]
    fn test_adaptive_keeps_corners_and_ends() {
        let points = vec![
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, 0.0),
            DataPoint::new(2.0, 0.0),
            DataPoint::new(3.0, 3.0),
            DataPoint::new(4.0, 6.0),
        ];
        let kept = resample(&points, Resample::Adaptive { threshold: 0.1 });
        let xs: Vec<f64> = kept.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_interpolate() {
        let points = vec![DataPoint::new(0.0, 0.0), DataPoint::new(2.0, 4.0)];
        let result = interpolate(&points, 5);
        let ys: Vec<f64> = result.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_interpolate_multi_segment() {
        let points = vec![
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, 10.0),
            DataPoint::new(2.0, 0.0),
        ];
        let result = interpolate(&points, 5);
        let ys: Vec<f64> = result.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 5.0, 10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_moving_average() {
        let points: Vec<DataPoint> = [1.0, 2.0, 6.0, 2.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, y)| DataPoint::new(i as f64, *y))
            .collect();
        let smoothed = moving_average(&points, 3);
        let ys: Vec<f64> = smoothed.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.5, 3.0, 10.0 / 3.0, 3.0, 1.5]);
    }

    #[test]
    fn test_moving_average_even_window_and_gaps() {
        let mut points = line(5);
        points[2] = DataPoint::invalid(2.0);
        let smoothed = moving_average(&points, 2);
        assert!(!smoothed[2].valid);
        assert_eq!(smoothed[1].y, 0.5);
    }
}
