//! Axis composition
//!
//! Builds grid lines, axis spines with arrowheads, tick marks, tick
//! labels, axis labels and the title from a [`Transform`].

use crate::config::EngineConfig;
use crate::coords::{log10_clamped, Transform};
use crate::model::{AxisLines, ChartSpec, GeometryKind};
use crate::primitives::{Group, Point, Primitive, Stroke, TextAnchor, TextBaseline};
use crate::ticks::{self, Tick};

/// Axis primitives, one group per paint layer
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPrimitives {
    pub grid: Group,
    pub axes: Group,
    pub ticks: Group,
    pub labels: Group,
    /// Ticks along x (angular ticks in polar geometry), placed
    pub x_ticks: Vec<Tick>,
    /// Ticks along y (radial ticks in polar geometry), placed
    pub y_ticks: Vec<Tick>,
}

impl AxisPrimitives {
    fn new() -> Self {
        Self {
            grid: Group::new("grid"),
            axes: Group::new("axes"),
            ticks: Group::new("ticks"),
            labels: Group::new("axis-labels"),
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
        }
    }
}

/// Composes the axis layers for one render
pub struct AxisComposer<'a> {
    config: &'a EngineConfig,
}

impl<'a> AxisComposer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, transform: &Transform, spec: &ChartSpec) -> AxisPrimitives {
        let mut out = AxisPrimitives::new();
        match transform.geometry() {
            GeometryKind::Polar => self.compose_polar(transform, spec, &mut out),
            _ => self.compose_cartesian(transform, spec, &mut out),
        }
        self.compose_titles(transform, spec, &mut out.labels);
        out
    }

    fn axis_stroke(&self) -> Stroke {
        Stroke::solid(self.config.axis.line_color, self.config.axis.line_width)
    }

    fn tick_label(&self, position: Point, text: &str, anchor: TextAnchor, baseline: TextBaseline) -> Primitive {
        Primitive::text(
            position,
            text,
            self.config.fonts.tick_label,
            self.config.axis.text_color,
            anchor,
            baseline,
        )
    }

    fn compose_cartesian(&self, transform: &Transform, spec: &ChartSpec, out: &mut AxisPrimitives) {
        let axis = &self.config.axis;
        let range = transform.range();
        let area = transform.area();
        let geometry = transform.geometry();

        let x_ticks: Vec<Tick> = axis_ticks(range.xmin, range.xmax, axis.x_tick_target, geometry.log_x())
            .into_iter()
            .map(|t| {
                let position = transform.x_to_device(t.value);
                t.placed(position)
            })
            .collect();
        let y_ticks: Vec<Tick> = axis_ticks(range.ymin, range.ymax, axis.y_tick_target, geometry.log_y())
            .into_iter()
            .map(|t| {
                let position = transform.y_to_device(t.value);
                t.placed(position)
            })
            .collect();

        // Grid
        if spec.grid.minor() {
            let stroke = Stroke::solid(axis.minor_grid_color, axis.grid_width);
            for x in minor_values(range.xmin, range.xmax, axis.x_tick_target, geometry.log_x(), axis.minor_divisions) {
                let dx = transform.x_to_device(x);
                out.grid.push(Primitive::line(Point::new(dx, area.y), Point::new(dx, area.bottom()), stroke.clone()));
            }
            for y in minor_values(range.ymin, range.ymax, axis.y_tick_target, geometry.log_y(), axis.minor_divisions) {
                let dy = transform.y_to_device(y);
                out.grid.push(Primitive::line(Point::new(area.x, dy), Point::new(area.right(), dy), stroke.clone()));
            }
        }
        if spec.grid.major() {
            let stroke = Stroke::solid(axis.major_grid_color, axis.grid_width);
            for tick in &x_ticks {
                out.grid.push(Primitive::line(
                    Point::new(tick.position, area.y),
                    Point::new(tick.position, area.bottom()),
                    stroke.clone(),
                ));
            }
            for tick in &y_ticks {
                out.grid.push(Primitive::line(
                    Point::new(area.x, tick.position),
                    Point::new(area.right(), tick.position),
                    stroke.clone(),
                ));
            }
        }

        if spec.axis_lines == AxisLines::None {
            out.x_ticks = x_ticks;
            out.y_ticks = y_ticks;
            return;
        }

        // Spine positions: the horizontal axis sits at `x_axis_y`, the
        // vertical one at `y_axis_x`
        let (x_axis_y, y_axis_x) = match spec.axis_lines {
            AxisLines::Right => (area.y, area.right()),
            AxisLines::Center => {
                let zero_y = if geometry.log_y() { area.bottom() } else { transform.y_to_device(0.0) };
                let zero_x = if geometry.log_x() { area.x } else { transform.x_to_device(0.0) };
                (zero_y.clamp(area.y, area.bottom()), zero_x.clamp(area.x, area.right()))
            }
            _ => (area.bottom(), area.x),
        };

        let stroke = self.axis_stroke();
        if spec.axis_lines == AxisLines::Box {
            let corners = [
                Point::new(area.x, area.bottom()),
                Point::new(area.right(), area.bottom()),
                Point::new(area.right(), area.y),
                Point::new(area.x, area.y),
            ];
            for i in 0..4 {
                out.axes.push(Primitive::line(corners[i], corners[(i + 1) % 4], stroke.clone()));
            }
        } else {
            let x_end = Point::new(area.right() + axis.arrow_length, x_axis_y);
            let y_end = Point::new(y_axis_x, area.y - axis.arrow_length);
            out.axes.push(Primitive::line(Point::new(area.x, x_axis_y), x_end, stroke.clone()));
            out.axes.push(Primitive::line(Point::new(y_axis_x, area.bottom()), y_end, stroke.clone()));
            out.axes.push(self.arrowhead(x_end, (1.0, 0.0)));
            out.axes.push(self.arrowhead(y_end, (0.0, -1.0)));
        }

        // Tick marks point into the plot area; labels sit outside
        let flipped = spec.axis_lines == AxisLines::Right;
        let inward_y = if flipped { 1.0 } else { -1.0 };
        let inward_x = if flipped { -1.0 } else { 1.0 };

        for tick in &x_ticks {
            out.ticks.push(Primitive::line(
                Point::new(tick.position, x_axis_y),
                Point::new(tick.position, x_axis_y + inward_y * axis.tick_length),
                stroke.clone(),
            ));
            let (y, baseline) = if flipped {
                (x_axis_y - axis.label_offset, TextBaseline::Bottom)
            } else {
                (x_axis_y + axis.label_offset, TextBaseline::Top)
            };
            out.ticks.push(self.tick_label(Point::new(tick.position, y), &tick.label, TextAnchor::Middle, baseline));
        }
        for tick in &y_ticks {
            out.ticks.push(Primitive::line(
                Point::new(y_axis_x, tick.position),
                Point::new(y_axis_x + inward_x * axis.tick_length, tick.position),
                stroke.clone(),
            ));
            let (x, anchor) = if flipped {
                (y_axis_x + axis.label_offset, TextAnchor::Start)
            } else {
                (y_axis_x - axis.label_offset, TextAnchor::End)
            };
            out.ticks.push(self.tick_label(Point::new(x, tick.position), &tick.label, anchor, TextBaseline::Middle));
        }

        out.x_ticks = x_ticks;
        out.y_ticks = y_ticks;
    }

    fn compose_polar(&self, transform: &Transform, spec: &ChartSpec, out: &mut AxisPrimitives) {
        let axis = &self.config.axis;
        let range = transform.range();
        let area = transform.area();
        let center = area.center();
        let outer = area.inscribed_radius();

        let angle_ticks: Vec<Tick> = ticks::angle_ticks(range.ymin, range.ymax);
        let radial_ticks: Vec<Tick> = ticks::ticks(range.xmin, range.xmax, axis.y_tick_target)
            .into_iter()
            .map(|t| {
                let position = transform.radius_to_device(t.value);
                t.placed(position)
            })
            .collect();

        // Rings and spokes
        let grid_stroke = Stroke::solid(axis.major_grid_color, axis.grid_width);
        if spec.grid.minor() {
            let minor_stroke = Stroke::solid(axis.minor_grid_color, axis.grid_width);
            for r in minor_values(range.xmin, range.xmax, axis.y_tick_target, false, axis.minor_divisions) {
                out.grid.push(ring(center, transform.radius_to_device(r), minor_stroke.clone()));
            }
        }
        for tick in radial_ticks.iter().filter(|t| t.position > 0.0) {
            out.grid.push(ring(center, tick.position, grid_stroke.clone()));
        }
        for tick in &angle_ticks {
            out.grid.push(Primitive::line(center, transform.to_device(range.xmax, tick.value), grid_stroke.clone()));
        }

        if spec.axis_lines != AxisLines::None {
            out.axes.push(ring(center, outer, self.axis_stroke()));

            for tick in &angle_ticks {
                let rim = transform.to_device(range.xmax, tick.value);
                let (ux, uy) = unit(rim.x - center.x, rim.y - center.y);
                let label_at = Point::new(
                    rim.x + ux * (axis.label_offset + axis.tick_length),
                    rim.y + uy * (axis.label_offset + axis.tick_length),
                );
                let anchor = if ux > 0.3 {
                    TextAnchor::Start
                } else if ux < -0.3 {
                    TextAnchor::End
                } else {
                    TextAnchor::Middle
                };
                let baseline = if uy > 0.3 {
                    TextBaseline::Top
                } else if uy < -0.3 {
                    TextBaseline::Bottom
                } else {
                    TextBaseline::Middle
                };
                out.ticks.push(self.tick_label(label_at, &tick.label, anchor, baseline));
            }
            // Radial labels along the opening angle
            for tick in &radial_ticks {
                let at = transform.to_device(tick.value, range.ymin);
                out.ticks.push(self.tick_label(
                    Point::new(at.x, at.y + axis.label_offset),
                    &tick.label,
                    TextAnchor::Middle,
                    TextBaseline::Top,
                ));
            }
        }

        out.x_ticks = angle_ticks
            .into_iter()
            .map(|t| {
                let position = t.value.to_radians();
                t.placed(position)
            })
            .collect();
        out.y_ticks = radial_ticks;
    }

    fn compose_titles(&self, transform: &Transform, spec: &ChartSpec, labels: &mut Group) {
        let axis = &self.config.axis;
        let fonts = &self.config.fonts;
        let area = transform.area();
        let center_x = area.x + area.width / 2.0;

        if let Some(title) = &spec.title {
            labels.push(Primitive::text(
                Point::new(center_x, (area.y - axis.label_offset - axis.arrow_length).max(fonts.title)),
                title.clone(),
                fonts.title,
                axis.text_color,
                TextAnchor::Middle,
                TextBaseline::Bottom,
            ));
        }
        if let Some(xlabel) = &spec.xlabel {
            let y = area.bottom() + axis.tick_length + 2.0 * axis.label_offset + fonts.tick_label;
            labels.push(Primitive::text(
                Point::new(center_x, y),
                xlabel.clone(),
                fonts.axis_label,
                axis.text_color,
                TextAnchor::Middle,
                TextBaseline::Top,
            ));
        }
        if let Some(ylabel) = &spec.ylabel {
            let x = (area.x - 2.0 * axis.label_offset - 4.0 * fonts.tick_label).max(fonts.axis_label);
            labels.push(Primitive::Text {
                position: Point::new(x, area.y + area.height / 2.0),
                text: ylabel.clone(),
                font_size: fonts.axis_label,
                fill: axis.text_color,
                anchor: TextAnchor::Middle,
                baseline: TextBaseline::Bottom,
                rotation: -90.0,
            });
        }
    }

    /// Filled arrowhead whose tip is at `tip`, pointing along `direction`
    fn arrowhead(&self, tip: Point, direction: (f64, f64)) -> Primitive {
        let axis = &self.config.axis;
        let (dx, dy) = unit(direction.0, direction.1);
        let base = Point::new(tip.x - dx * axis.arrow_length, tip.y - dy * axis.arrow_length);
        let (px, py) = (-dy * axis.arrow_width, dx * axis.arrow_width);
        Primitive::Polygon {
            points: vec![
                tip,
                Point::new(base.x + px, base.y + py),
                Point::new(base.x - px, base.y - py),
            ],
            fill: Some(axis.line_color),
            stroke: None,
        }
    }
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = dx.hypot(dy);
    if len > 0.0 {
        (dx / len, dy / len)
    } else {
        (0.0, 0.0)
    }
}

fn ring(center: Point, radius: f64, stroke: Stroke) -> Primitive {
    Primitive::Circle {
        center,
        radius,
        fill: None,
        stroke: Some(stroke),
    }
}

fn axis_ticks(min: f64, max: f64, target: usize, log: bool) -> Vec<Tick> {
    if log {
        ticks::log_ticks(min, max, target)
    } else {
        ticks::ticks(min, max, target)
    }
}

/// Minor grid values: fifths of the major step on linear axes, the
/// 2..9 multiples of each decade on log axes spanning two decades
fn minor_values(min: f64, max: f64, target: usize, log: bool, divisions: usize) -> Vec<f64> {
    if !log || log10_clamped(max) - log10_clamped(min) < 2.0 {
        return ticks::minor_tick_values(min, max, target, divisions);
    }
    let first = log10_clamped(min).floor() as i32;
    let last = log10_clamped(max).ceil() as i32;
    (first..last)
        .flat_map(|k| (2..10).map(move |m| m as f64 * 10f64.powi(k)))
        .filter(|v| *v >= min && *v <= max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{DataRange, PlotArea};
    use crate::model::GridMode;

    fn transform(geometry: GeometryKind, range: DataRange) -> Transform {
        Transform::new(geometry, range, PlotArea::new(50.0, 30.0, 400.0, 300.0))
    }

    fn count_lines(group: &Group) -> usize {
        group
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count()
    }

    fn texts(group: &Group) -> Vec<String> {
        group
            .children
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_box_axes_have_four_sides_and_no_arrows() {
        let config = EngineConfig::default();
        let spec = ChartSpec::default();
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 10.0, 0.0, 10.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        assert_eq!(count_lines(&axes.axes), 4);
        assert!(axes.grid.is_empty());
    }

    #[test]
    fn test_left_axes_have_arrowheads() {
        let config = EngineConfig::default();
        let spec = ChartSpec {
            axis_lines: AxisLines::Left,
            ..ChartSpec::default()
        };
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 10.0, 0.0, 10.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        let arrows = axes
            .axes
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Polygon { .. }))
            .count();
        assert_eq!(arrows, 2);
        assert_eq!(count_lines(&axes.axes), 2);
    }

    #[test]
    fn test_major_grid_one_line_per_tick() {
        let config = EngineConfig::default();
        let spec = ChartSpec {
            grid: GridMode::Major,
            ..ChartSpec::default()
        };
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 97.0, -1.0, 1.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        assert_eq!(
            count_lines(&axes.grid),
            axes.x_ticks.len() + axes.y_ticks.len()
        );
        let values: Vec<f64> = axes.x_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
        assert_eq!(axes.x_ticks[0].position, 50.0);
    }

    #[test]
    fn test_minor_grid_adds_lines() {
        let config = EngineConfig::default();
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 10.0, 0.0, 10.0));
        let major = AxisComposer::new(&config).compose(
            &t,
            &ChartSpec {
                grid: GridMode::Major,
                ..ChartSpec::default()
            },
        );
        let both = AxisComposer::new(&config).compose(
            &t,
            &ChartSpec {
                grid: GridMode::Both,
                ..ChartSpec::default()
            },
        );
        assert!(count_lines(&both.grid) > count_lines(&major.grid));
    }

    #[test]
    fn test_tick_labels() {
        let config = EngineConfig::default();
        let spec = ChartSpec::default();
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 97.0, 0.0, 1.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        let labels = texts(&axes.ticks);
        assert!(labels.contains(&"80".to_string()));
        assert!(labels.contains(&"0.2".to_string()));
    }

    #[test]
    fn test_log_axis_ticks_at_decades() {
        let config = EngineConfig::default();
        let spec = ChartSpec::default();
        let geometry = GeometryKind::Logarithmic {
            log_x: false,
            log_y: true,
        };
        let t = transform(geometry, DataRange::new(0.0, 1.0, 1.0, 1000.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        let values: Vec<f64> = axes.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1.0, 10.0, 100.0, 1000.0]);
        let spacing = axes.y_ticks[0].position - axes.y_ticks[1].position;
        let next = axes.y_ticks[1].position - axes.y_ticks[2].position;
        assert!((spacing - next).abs() < 1e-9);
    }

    #[test]
    fn test_polar_rings_and_spokes() {
        let config = EngineConfig::default();
        let spec = ChartSpec::default();
        let t = transform(GeometryKind::Polar, DataRange::new(0.0, 1.0, 0.0, 360.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        assert_eq!(count_lines(&axes.grid), 8);
        let rings = axes
            .grid
            .children
            .iter()
            .filter(|p| matches!(p, Primitive::Circle { .. }))
            .count();
        assert!(rings >= 2);
        assert!(texts(&axes.ticks).contains(&"90°".to_string()));
    }

    #[test]
    fn test_titles() {
        let config = EngineConfig::default();
        let spec = ChartSpec {
            title: Some("Growth".to_string()),
            xlabel: Some("t".to_string()),
            ylabel: Some("N".to_string()),
            ..ChartSpec::default()
        };
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 1.0, 0.0, 1.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        assert_eq!(texts(&axes.labels), vec!["Growth", "t", "N"]);
    }

    #[test]
    fn test_axis_lines_none_draws_no_spines() {
        let config = EngineConfig::default();
        let spec = ChartSpec {
            axis_lines: AxisLines::None,
            ..ChartSpec::default()
        };
        let t = transform(GeometryKind::Cartesian, DataRange::new(0.0, 1.0, 0.0, 1.0));
        let axes = AxisComposer::new(&config).compose(&t, &spec);
        assert!(axes.axes.is_empty());
        assert!(axes.ticks.is_empty());
    }
}
