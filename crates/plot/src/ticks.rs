//! Tick planning
//!
//! Chooses human-friendly tick steps with the 1-2-5 rule and formats
//! tick labels. Ticks are recomputed for every render; nothing here keeps
//! state.

use crate::coords::log10_clamped;
use serde::{Deserialize, Serialize};

/// Upper bound on requested tick counts
const MAX_TARGET: usize = 100;

/// Spacing of polar angular ticks in degrees
pub const ANGLE_STEP: f64 = 45.0;

/// A labeled graduation on an axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    /// Device position once placed; fraction along the axis before that
    pub position: f64,
    pub label: String,
}

impl Tick {
    /// Same tick at a device position
    pub fn placed(self, position: f64) -> Self {
        Self { position, ..self }
    }
}

/// Step for roughly `target` intervals over `span`, snapped to 1, 2 or 5
/// times a power of ten
pub fn nice_step(span: f64, target: usize) -> f64 {
    let target = target.clamp(2, MAX_TARGET) as f64;
    let raw = span.abs() / target;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Values at multiples of `step` within `[min, max]`
pub fn values_with_step(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || min > max {
        return Vec::new();
    }
    let tolerance = step * 1e-9;
    let first = (min / step).ceil() as i64;
    let last = ((max + tolerance) / step).floor() as i64;
    if last < first || last - first > 10 * MAX_TARGET as i64 {
        return Vec::new();
    }
    (first..=last)
        .map(|k| {
            let value = k as f64 * step;
            let value = if value.abs() < step * 1e-10 { 0.0 } else { value };
            value.clamp(min, max)
        })
        .collect()
}

/// Tick values for a linear axis
pub fn tick_values(min: f64, max: f64, target: usize) -> Vec<f64> {
    if min >= max {
        return if min == max && min.is_finite() {
            vec![min]
        } else {
            Vec::new()
        };
    }
    values_with_step(min, max, nice_step(max - min, target))
}

/// Ticks for a linear axis. Positions are fractions of the range until
/// placed against a transform.
pub fn ticks(min: f64, max: f64, target: usize) -> Vec<Tick> {
    let span = max - min;
    tick_values(min, max, target)
        .into_iter()
        .map(|value| Tick {
            value,
            position: if span > 0.0 { (value - min) / span } else { 0.0 },
            label: format_tick_label(value),
        })
        .collect()
}

/// Minor tick values between major ticks, majors excluded
pub fn minor_tick_values(min: f64, max: f64, target: usize, divisions: usize) -> Vec<f64> {
    if min >= max || divisions < 2 {
        return Vec::new();
    }
    let major = nice_step(max - min, target);
    let minor = major / divisions as f64;
    values_with_step(min, max, minor)
        .into_iter()
        .filter(|v| {
            let ratio = v / major;
            (ratio - ratio.round()).abs() > 1e-6
        })
        .collect()
}

/// Tick values for a logarithmic axis.
///
/// Ranges covering at least two decades tick at powers of ten; narrower
/// ranges fall back to linear ticks.
pub fn log_tick_values(min: f64, max: f64, target: usize) -> Vec<f64> {
    let (lmin, lmax) = (log10_clamped(min), log10_clamped(max));
    if lmax - lmin < 2.0 {
        return tick_values(min.max(0.0), max, target);
    }
    let first = lmin.ceil() as i64;
    let last = (lmax + 1e-9).floor() as i64;
    let count = (last - first + 1).max(1) as usize;
    let stride = count.div_ceil(target.clamp(2, MAX_TARGET)).max(1);
    (first..=last)
        .step_by(stride)
        .map(|k| 10f64.powi(k as i32).clamp(min, max))
        .collect()
}

/// Ticks for a logarithmic axis
pub fn log_ticks(min: f64, max: f64, target: usize) -> Vec<Tick> {
    let (lmin, lmax) = (log10_clamped(min), log10_clamped(max));
    let span = lmax - lmin;
    log_tick_values(min, max, target)
        .into_iter()
        .map(|value| Tick {
            value,
            position: if span > 0.0 {
                (log10_clamped(value) - lmin) / span
            } else {
                0.0
            },
            label: format_tick_label(value),
        })
        .collect()
}

/// Polar angular ticks every 45 degrees within `[start, end]`.
///
/// Ticks begin at the first multiple of 45 at or after `start`. For a
/// full turn the closing angle duplicates the opening one and is dropped.
pub fn angle_ticks(start: f64, end: f64) -> Vec<Tick> {
    let (lo, hi) = (start.min(end), start.max(end));
    let full_turn = hi - lo >= 360.0 - 1e-9;
    let span = hi - lo;
    values_with_step(lo, hi, ANGLE_STEP)
        .into_iter()
        .filter(|a| !(full_turn && (*a - lo) >= 360.0 - 1e-9))
        .map(|value| Tick {
            value,
            position: if span > 0.0 { (value - lo) / span } else { 0.0 },
            label: format!("{}°", format_tick_label(value)),
        })
        .collect()
}

/// Format a tick value.
///
/// Zero (within 1e-10) is "0"; magnitudes of at least 1000 or below 0.01
/// use exponential notation with one fractional digit; everything else
/// gets up to two fractional digits with trailing zeros trimmed.
pub fn format_tick_label(value: f64) -> String {
    if value.abs() < 1e-10 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1000.0 || magnitude < 0.01 {
        return format!("{:.1e}", value);
    }
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
