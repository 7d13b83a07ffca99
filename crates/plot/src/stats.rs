//! Statistical summary of a point list

use crate::model::DataPoint;
use serde::{Deserialize, Serialize};

/// Summary of the y values of the valid points in a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// 25th percentile
    pub q1: f64,
    /// 75th percentile
    pub q3: f64,
}

/// Summarize the y values of the valid points; `None` if there are none
pub fn summarize(points: &[DataPoint]) -> Option<Summary> {
    let values: Vec<f64> = points.iter().filter(|p| p.valid).map(|p| p.y).collect();
    summarize_values(&values)
}

/// Summarize finite values; non-finite values are ignored
pub fn summarize_values(values: &[f64]) -> Option<Summary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(Summary {
        count,
        mean,
        median: percentile(&sorted, 0.5),
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
        q1: percentile(&sorted, 0.25),
        q3: percentile(&sorted, 0.75),
    })
}

/// Percentile `p` in `[0, 1]` of sorted values, linearly interpolated
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let position = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
