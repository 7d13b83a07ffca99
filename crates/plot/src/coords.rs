//! Coordinate system
//!
//! A [`Transform`] maps data space to device space and back for one of
//! three geometries. It is immutable; any change of range, geometry or
//! canvas size means constructing a new one.

use crate::config::Margins;
use crate::model::{DataPoint, GeometryKind};
use crate::primitives::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Values at or below zero are clamped to this before taking a logarithm
pub const LOG_EPSILON: f64 = 1e-12;

/// Smallest span an axis range may have
const MIN_SPAN: f64 = 1e-9;

/// Device-space rectangle of the plot area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Canvas minus margins; never narrower than one device unit
    pub fn from_canvas(width: f64, height: f64, margins: &Margins) -> Self {
        Self {
            x: margins.left,
            y: margins.top,
            width: (width - margins.left - margins.right).max(1.0),
            height: (height - margins.top - margins.bottom).max(1.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius of the largest circle centered in the area
    pub fn inscribed_radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Data-space bounds.
///
/// In polar geometry the x bounds are the radius range and the y bounds
/// the angle range in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl DataRange {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Tight bounds around the valid points, if any
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DataPoint>) -> Option<Self> {
        let mut range: Option<Self> = None;
        for point in points.into_iter().filter(|p| p.valid) {
            range = Some(match range {
                None => Self::new(point.x, point.x, point.y, point.y),
                Some(r) => Self::new(
                    r.xmin.min(point.x),
                    r.xmax.max(point.x),
                    r.ymin.min(point.y),
                    r.ymax.max(point.y),
                ),
            });
        }
        range
    }

    pub fn x_span(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn y_span(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Ordered bounds with degenerate spans widened around their center
    pub fn normalized(&self) -> Self {
        let (xmin, xmax) = widen(self.xmin.min(self.xmax), self.xmin.max(self.xmax));
        let (ymin, ymax) = widen(self.ymin.min(self.ymax), self.ymin.max(self.ymax));
        Self::new(xmin, xmax, ymin, ymax)
    }

    /// Pad each side by `fraction` of the span; log axes pad in decades
    pub fn padded(&self, fraction: f64, log_x: bool, log_y: bool) -> Self {
        let (xmin, xmax) = pad_axis(self.xmin, self.xmax, fraction, log_x);
        let (ymin, ymax) = pad_axis(self.ymin, self.ymax, fraction, log_y);
        Self::new(xmin, xmax, ymin, ymax)
    }

    /// Widen one axis so a data unit covers the same device distance on both
    pub fn equalized(&self, area: &PlotArea) -> Self {
        let x_scale = self.x_span() / area.width;
        let y_scale = self.y_span() / area.height;
        if x_scale <= 0.0 || y_scale <= 0.0 {
            return *self;
        }
        if x_scale > y_scale {
            let half = x_scale * area.height / 2.0;
            let mid = (self.ymin + self.ymax) / 2.0;
            Self::new(self.xmin, self.xmax, mid - half, mid + half)
        } else {
            let half = y_scale * area.width / 2.0;
            let mid = (self.xmin + self.xmax) / 2.0;
            Self::new(mid - half, mid + half, self.ymin, self.ymax)
        }
    }
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo >= MIN_SPAN {
        (lo, hi)
    } else {
        let half = (lo.abs() * 0.1).max(0.5);
        (lo - half, hi + half)
    }
}

fn pad_axis(lo: f64, hi: f64, fraction: f64, log: bool) -> (f64, f64) {
    if log {
        let (llo, lhi) = (log10_clamped(lo), log10_clamped(hi));
        let pad = (lhi - llo) * fraction;
        (10f64.powf(llo - pad), 10f64.powf(lhi + pad))
    } else {
        let pad = (hi - lo) * fraction;
        (lo - pad, hi + pad)
    }
}

/// Base-10 logarithm with non-positive input clamped to [`LOG_EPSILON`]
pub fn log10_clamped(value: f64) -> f64 {
    value.max(LOG_EPSILON).log10()
}

/// Data-space to device-space mapping for one geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    geometry: GeometryKind,
    range: DataRange,
    area: PlotArea,
}

impl Transform {
    pub fn new(geometry: GeometryKind, range: DataRange, area: PlotArea) -> Self {
        let range = match geometry {
            GeometryKind::Logarithmic { log_x, log_y } => {
                let mut r = range;
                if log_x {
                    r.xmin = r.xmin.max(LOG_EPSILON);
                    r.xmax = r.xmax.max(LOG_EPSILON);
                }
                if log_y {
                    r.ymin = r.ymin.max(LOG_EPSILON);
                    r.ymax = r.ymax.max(LOG_EPSILON);
                }
                r.normalized()
            }
            _ => range.normalized(),
        };
        Self {
            geometry,
            range,
            area,
        }
    }

    pub fn geometry(&self) -> GeometryKind {
        self.geometry
    }

    pub fn range(&self) -> DataRange {
        self.range
    }

    pub fn area(&self) -> PlotArea {
        self.area
    }

    /// Map a data point to device space.
    ///
    /// For polar geometry `a` is the radius and `b` the angle in degrees.
    pub fn to_device(&self, a: f64, b: f64) -> Point {
        match self.geometry {
            GeometryKind::Polar => {
                let radius = self.radius_to_device(a);
                let theta = self.angle_to_radians(b);
                let center = self.area.center();
                Point::new(
                    center.x + radius * theta.cos(),
                    center.y - radius * theta.sin(),
                )
            }
            _ => Point::new(self.x_to_device(a), self.y_to_device(b)),
        }
    }

    /// Inverse of [`Transform::to_device`]
    pub fn from_device(&self, point: Point) -> (f64, f64) {
        match self.geometry {
            GeometryKind::Polar => {
                let center = self.area.center();
                let dx = point.x - center.x;
                let dy = center.y - point.y;
                let scale = self.area.inscribed_radius();
                let radius = self.range.xmin + dx.hypot(dy) / scale * self.range.x_span();
                let theta = dy.atan2(dx).rem_euclid(TAU);
                let angle = self.range.ymin + theta / TAU * self.range.y_span();
                (radius, angle)
            }
            _ => (self.x_from_device(point.x), self.y_from_device(point.y)),
        }
    }

    /// Horizontal device position of a data x (Cartesian and log axes)
    pub fn x_to_device(&self, x: f64) -> f64 {
        let t = self.axis_fraction(x, self.range.xmin, self.range.xmax, self.geometry.log_x());
        self.area.x + t * self.area.width
    }

    /// Vertical device position of a data y; larger y is higher up
    pub fn y_to_device(&self, y: f64) -> f64 {
        let t = self.axis_fraction(y, self.range.ymin, self.range.ymax, self.geometry.log_y());
        self.area.bottom() - t * self.area.height
    }

    pub fn x_from_device(&self, dx: f64) -> f64 {
        let t = (dx - self.area.x) / self.area.width;
        self.axis_value(t, self.range.xmin, self.range.xmax, self.geometry.log_x())
    }

    pub fn y_from_device(&self, dy: f64) -> f64 {
        let t = (self.area.bottom() - dy) / self.area.height;
        self.axis_value(t, self.range.ymin, self.range.ymax, self.geometry.log_y())
    }

    /// Device distance from the polar center for a data radius
    pub fn radius_to_device(&self, radius: f64) -> f64 {
        (radius - self.range.xmin) / self.range.x_span() * self.area.inscribed_radius()
    }

    fn angle_to_radians(&self, angle: f64) -> f64 {
        (angle - self.range.ymin) / self.range.y_span() * TAU
    }

    fn axis_fraction(&self, value: f64, lo: f64, hi: f64, log: bool) -> f64 {
        if log {
            let (l, llo, lhi) = (log10_clamped(value), log10_clamped(lo), log10_clamped(hi));
            (l - llo) / (lhi - llo)
        } else {
            (value - lo) / (hi - lo)
        }
    }

    fn axis_value(&self, t: f64, lo: f64, hi: f64, log: bool) -> f64 {
        if log {
            let (llo, lhi) = (log10_clamped(lo), log10_clamped(hi));
            10f64.powf(llo + t * (lhi - llo))
        } else {
            lo + t * (hi - lo)
        }
    }
}

/// Convert a Cartesian data point to (radius, angle in degrees)
pub fn cartesian_to_polar(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x).to_degrees().rem_euclid(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn area() -> PlotArea {
        PlotArea::new(50.0, 20.0, 400.0, 300.0)
    }

    #[test]
    fn test_cartesian_corners() {
        let t = Transform::new(
            GeometryKind::Cartesian,
            DataRange::new(0.0, 10.0, -1.0, 1.0),
            area(),
        );
        assert_eq!(t.to_device(0.0, -1.0), Point::new(50.0, 320.0));
        assert_eq!(t.to_device(10.0, 1.0), Point::new(450.0, 20.0));
        assert_eq!(t.to_device(5.0, 0.0), Point::new(250.0, 170.0));
    }

    #[test]
    fn test_log_axis_decades_evenly_spaced() {
        let t = Transform::new(
            GeometryKind::Logarithmic {
                log_x: true,
                log_y: false,
            },
            DataRange::new(1.0, 1000.0, 0.0, 1.0),
            area(),
        );
        let d1 = t.x_to_device(10.0) - t.x_to_device(1.0);
        let d2 = t.x_to_device(100.0) - t.x_to_device(10.0);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_log_axis_clamps_non_positive() {
        let t = Transform::new(
            GeometryKind::Logarithmic {
                log_x: false,
                log_y: true,
            },
            DataRange::new(0.0, 1.0, 1.0, 100.0),
            area(),
        );
        let y = t.y_to_device(-5.0);
        assert!(y.is_finite());
        assert!(y > area().bottom());
    }

    #[test]
    fn test_polar_center_and_rim() {
        let t = Transform::new(
            GeometryKind::Polar,
            DataRange::new(0.0, 2.0, 0.0, 360.0),
            area(),
        );
        let center = area().center();
        assert_eq!(t.to_device(0.0, 45.0), center);
        let rim = t.to_device(2.0, 90.0);
        assert!((rim.x - center.x).abs() < 1e-9);
        assert!((rim.y - (center.y - 150.0)).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_range_is_widened() {
        let range = DataRange::new(3.0, 3.0, 0.0, 1.0).normalized();
        assert!(range.x_span() > 0.0);
        assert!(range.xmin < 3.0 && range.xmax > 3.0);
    }

    #[test]
    fn test_padded_range() {
        let range = DataRange::new(0.0, 10.0, -1.0, 1.0).padded(0.1, false, false);
        assert!((range.xmin + 1.0).abs() < 1e-12);
        assert!((range.xmax - 11.0).abs() < 1e-12);
        assert!((range.ymin + 1.2).abs() < 1e-12);
        assert!((range.ymax - 1.2).abs() < 1e-12);
        let log = DataRange::new(1.0, 100.0, 0.0, 1.0).padded(0.1, true, false);
        assert!((log.xmin - 10f64.powf(-0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_equalized_range() {
        let area = PlotArea::new(0.0, 0.0, 400.0, 200.0);
        let range = DataRange::new(0.0, 1.0, 0.0, 1.0).equalized(&area);
        assert!((range.x_span() - 2.0).abs() < 1e-12);
        assert_eq!(range.y_span(), 1.0);
        assert!((range.xmin + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_range_from_points_skips_invalid() {
        let points = [
            DataPoint::new(1.0, 5.0),
            DataPoint::invalid(100.0),
            DataPoint::new(-2.0, 3.0),
        ];
        let range = DataRange::from_points(&points).unwrap();
        assert_eq!(range, DataRange::new(-2.0, 1.0, 3.0, 5.0));
        assert!(DataRange::from_points(&[DataPoint::invalid(0.0)]).is_none());
    }

    #[test]
    fn test_cartesian_to_polar() {
        let (r, a) = cartesian_to_polar(0.0, -2.0);
        assert!((r - 2.0).abs() < 1e-12);
        assert!((a - 270.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_cartesian_round_trip(x in -50.0f64..50.0, y in -5.0f64..5.0) {
            let t = Transform::new(
                GeometryKind::Cartesian,
                DataRange::new(-50.0, 50.0, -5.0, 5.0),
                area(),
            );
            let (rx, ry) = t.from_device(t.to_device(x, y));
            prop_assert!((rx - x).abs() < 1e-6);
            prop_assert!((ry - y).abs() < 1e-6);
        }

        #[test]
        fn prop_log_round_trip(x in 0.001f64..1000.0, y in 0.1f64..100.0) {
            let t = Transform::new(
                GeometryKind::Logarithmic { log_x: true, log_y: true },
                DataRange::new(0.001, 1000.0, 0.1, 100.0),
                area(),
            );
            let (rx, ry) = t.from_device(t.to_device(x, y));
            prop_assert!((rx - x).abs() < 1e-6 * x.max(1.0));
            prop_assert!((ry - y).abs() < 1e-6 * y.max(1.0));
        }

        #[test]
        fn prop_polar_round_trip(r in 0.01f64..5.0, angle in 0.0f64..359.9) {
            let t = Transform::new(
                GeometryKind::Polar,
                DataRange::new(0.0, 5.0, 0.0, 360.0),
                area(),
            );
            let (rr, ra) = t.from_device(t.to_device(r, angle));
            prop_assert!((rr - r).abs() < 1e-6);
            prop_assert!((ra - angle).abs() < 1e-6);
        }
    }
}
