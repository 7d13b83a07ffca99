//! Series rendering
//!
//! Turns device-space points plus a series style into a stroke path and
//! marker primitives. Invalid samples split the path into disconnected
//! subpaths; they are never bridged.

use crate::config::EngineConfig;
use crate::markers::marker;
use crate::model::{Color, SeriesStyle};
use crate::primitives::{Group, PathData, Point, Primitive, Stroke, Subpath};

/// Output of rendering one series
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSeries {
    pub path: Option<Primitive>,
    pub markers: Vec<Primitive>,
}

impl RenderedSeries {
    /// Collect into a named group, path first
    pub fn into_group(self, name: impl Into<String>) -> Group {
        let mut group = Group::new(name);
        if let Some(path) = self.path {
            group.push(path);
        }
        group.extend(self.markers);
        group
    }
}

/// Series renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRenderer {
    /// Control point distance as a fraction of segment length
    pub tension: f64,
    /// Multiplier applied to the declared marker size
    pub marker_scale: f64,
}

impl Default for SeriesRenderer {
    fn default() -> Self {
        Self {
            tension: 0.2,
            marker_scale: 1.0,
        }
    }
}

impl SeriesRenderer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tension: config.series.smoothing_tension,
            marker_scale: config.series.marker_scale,
        }
    }

    /// Render device-space points; `None` entries are gaps
    pub fn render(&self, points: &[Option<Point>], style: &SeriesStyle, color: Color) -> RenderedSeries {
        let color = color.with_opacity(style.opacity);

        let path = if style.only_marks {
            None
        } else {
            let data = self.build_path(points, style.smooth);
            if data.is_empty() {
                None
            } else {
                Some(Primitive::Path {
                    data,
                    stroke: Some(
                        Stroke::solid(color, style.line_width)
                            .with_dash(style.dash.dash_array(style.line_width)),
                    ),
                    fill: None,
                })
            }
        };

        let markers = match style.effective_marker() {
            Some(shape) => {
                let size = style.marker_size * self.marker_scale;
                points
                    .iter()
                    .flatten()
                    .flat_map(|p| marker(shape, *p, size, color))
                    .collect()
            }
            None => Vec::new(),
        };

        RenderedSeries { path, markers }
    }

    /// One subpath per run of at least two consecutive valid points
    pub fn build_path(&self, points: &[Option<Point>], smooth: bool) -> PathData {
        let mut data = PathData::new();
        for run in runs(points) {
            if run.len() < 2 {
                continue;
            }
            let subpath = if smooth && run.len() >= 3 {
                smooth_subpath(&run, self.tension)
            } else {
                straight_subpath(&run)
            };
            data.subpaths.push(subpath);
        }
        data
    }
}

/// Maximal runs of consecutive valid points
pub fn runs(points: &[Option<Point>]) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(p) if p.x.is_finite() && p.y.is_finite() => current.push(*p),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn straight_subpath(run: &[Point]) -> Subpath {
    let mut subpath = Subpath::new(run[0]);
    for point in &run[1..] {
        subpath.line_to(*point);
    }
    subpath
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = dx.hypot(dy);
    if len > 0.0 {
        (dx / len, dy / len)
    } else {
        (0.0, 0.0)
    }
}

/// Unit tangent at each point: the mean of the incoming and outgoing
/// directions; endpoints use their only neighbor
fn tangents(run: &[Point]) -> Vec<(f64, f64)> {
    let n = run.len();
    (0..n)
        .map(|i| {
            let incoming = if i > 0 {
                unit(run[i].x - run[i - 1].x, run[i].y - run[i - 1].y)
            } else {
                (0.0, 0.0)
            };
            let outgoing = if i + 1 < n {
                unit(run[i + 1].x - run[i].x, run[i + 1].y - run[i].y)
            } else {
                (0.0, 0.0)
            };
            unit(incoming.0 + outgoing.0, incoming.1 + outgoing.1)
        })
        .collect()
}

fn smooth_subpath(run: &[Point], tension: f64) -> Subpath {
    let tangents = tangents(run);
    let mut subpath = Subpath::new(run[0]);
    for i in 0..run.len() - 1 {
        let (a, b) = (run[i], run[i + 1]);
        let reach = a.distance(b) * tension;
        let c1 = Point::new(a.x + tangents[i].0 * reach, a.y + tangents[i].1 * reach);
        let c2 = Point::new(
            b.x - tangents[i + 1].0 * reach,
            b.y - tangents[i + 1].1 * reach,
        );
        subpath.curve_to(c1, c2, b);
    }
    subpath
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DashStyle, MarkerShape};
    use crate::primitives::Segment;

    fn pts(values: &[Option<(f64, f64)>]) -> Vec<Option<Point>> {
        values
            .iter()
            .map(|v| v.map(|(x, y)| Point::new(x, y)))
            .collect()
    }

    fn path_of(rendered: &RenderedSeries) -> &PathData {
        match &rendered.path {
            Some(Primitive::Path { data, .. }) => data,
            other => panic!("Expected Path, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_point_splits_path() {
        let points = pts(&[
            Some((0.0, 0.0)),
            Some((1.0, 1.0)),
            None,
            Some((3.0, 1.0)),
            Some((4.0, 0.0)),
        ]);
        let rendered = SeriesRenderer::default().render(&points, &SeriesStyle::default(), Color::RED);
        let path = path_of(&rendered);
        assert_eq!(path.subpaths.len(), 2);
        assert_eq!(path.subpaths[0].vertices().len(), 2);
        assert_eq!(path.subpaths[1].start, Point::new(3.0, 1.0));
    }

    #[test]
    fn test_isolated_point_gets_marker_only() {
        let points = pts(&[Some((0.0, 0.0)), None, Some((2.0, 2.0)), None]);
        let rendered = SeriesRenderer::default().render(&points, &SeriesStyle::default(), Color::RED);
        assert!(rendered.path.is_none());
        assert_eq!(rendered.markers.len(), 2);
    }

    #[test]
    fn test_only_marks_and_no_marks() {
        let points = pts(&[Some((0.0, 0.0)), Some((1.0, 1.0))]);
        let renderer = SeriesRenderer::default();

        let style = SeriesStyle {
            only_marks: true,
            ..SeriesStyle::default()
        };
        let rendered = renderer.render(&points, &style, Color::RED);
        assert!(rendered.path.is_none());
        assert_eq!(rendered.markers.len(), 2);

        let style = SeriesStyle {
            no_marks: true,
            ..SeriesStyle::default()
        };
        let rendered = renderer.render(&points, &style, Color::RED);
        assert!(rendered.path.is_some());
        assert!(rendered.markers.is_empty());

        let style = SeriesStyle {
            marker: Some(MarkerShape::None),
            ..SeriesStyle::default()
        };
        assert!(renderer.render(&points, &style, Color::RED).markers.is_empty());
    }

    #[test]
    fn test_smoothing_uses_curves() {
        let points = pts(&[Some((0.0, 0.0)), Some((1.0, 2.0)), Some((2.0, 0.0))]);
        let style = SeriesStyle {
            smooth: true,
            ..SeriesStyle::default()
        };
        let rendered = SeriesRenderer::default().render(&points, &style, Color::RED);
        let subpath = &path_of(&rendered).subpaths[0];
        assert_eq!(subpath.segments.len(), 2);
        assert!(subpath
            .segments
            .iter()
            .all(|s| matches!(s, Segment::CurveTo { .. })));
        // Interior tangent at the peak is horizontal
        if let Segment::CurveTo { c2, .. } = subpath.segments[0] {
            assert!((c2.y - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_point_run_is_straight_even_when_smooth() {
        let points = pts(&[Some((0.0, 0.0)), Some((1.0, 1.0))]);
        let style = SeriesStyle {
            smooth: true,
            ..SeriesStyle::default()
        };
        let rendered = SeriesRenderer::default().render(&points, &style, Color::RED);
        let subpath = &path_of(&rendered).subpaths[0];
        assert!(matches!(subpath.segments[0], Segment::LineTo { .. }));
    }

    #[test]
    fn test_dash_and_opacity_applied() {
        let points = pts(&[Some((0.0, 0.0)), Some((1.0, 1.0))]);
        let style = SeriesStyle {
            dash: DashStyle::Dashed,
            opacity: 0.5,
            ..SeriesStyle::default()
        };
        let rendered = SeriesRenderer::default().render(&points, &style, Color::BLUE);
        match rendered.path {
            Some(Primitive::Path {
                stroke: Some(stroke),
                ..
            }) => {
                assert!(!stroke.dash.is_empty());
                assert_eq!(stroke.color.a, 128);
            }
            other => panic!("Expected stroked Path, got {:?}", other),
        }
    }

    #[test]
    fn test_runs_skip_non_finite() {
        let points = vec![
            Some(Point::new(0.0, 0.0)),
            Some(Point::new(f64::NAN, 1.0)),
            Some(Point::new(2.0, 2.0)),
        ];
        assert_eq!(runs(&points).len(), 2);
    }

    #[test]
    fn test_into_group_orders_path_first() {
        let points = pts(&[Some((0.0, 0.0)), Some((1.0, 1.0))]);
        let group = SeriesRenderer::default()
            .render(&points, &SeriesStyle::default(), Color::RED)
            .into_group("series-0");
        assert_eq!(group.children.len(), 3);
        assert!(matches!(group.children[0], Primitive::Path { .. }));
    }
}
