//! Render primitive tree
//!
//! The engine's output is a tree of groups and device-space primitives.
//! Device space has its origin at the top-left of the requested canvas,
//! x growing right and y growing down.

use crate::model::Color;
use serde::{Deserialize, Serialize};

/// A point in device space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Stroke paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash lengths in device units; empty means solid
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }

    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.dash = dash;
        self
    }
}

/// One drawing command after the subpath start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    LineTo { to: Point },
    /// Cubic Bézier
    CurveTo { c1: Point, c2: Point, to: Point },
}

impl Segment {
    pub fn end(&self) -> Point {
        match self {
            Segment::LineTo { to } | Segment::CurveTo { to, .. } => *to,
        }
    }
}

/// A connected piece of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub start: Point,
    pub segments: Vec<Segment>,
}

impl Subpath {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    pub fn line_to(&mut self, to: Point) {
        self.segments.push(Segment::LineTo { to });
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.segments.push(Segment::CurveTo { c1, c2, to });
    }

    /// Every on-curve point, start included
    pub fn vertices(&self) -> Vec<Point> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(Segment::end))
            .collect()
    }
}

/// Path geometry as a list of disconnected subpaths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub subpaths: Vec<Subpath>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

/// A render primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Primitive {
    /// Nested group
    Group(Group),
    /// A straight line
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    /// A general path
    Path {
        data: PathData,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    },
    /// A closed polygon
    Polygon {
        points: Vec<Point>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// A circle
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// An axis-aligned rectangle
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Positioned text
    Text {
        position: Point,
        text: String,
        font_size: f64,
        fill: Color,
        anchor: TextAnchor,
        baseline: TextBaseline,
        /// Rotation in degrees around `position`
        rotation: f64,
    },
}

impl Primitive {
    /// Horizontal or vertical text, unrotated
    pub fn text(
        position: Point,
        text: impl Into<String>,
        font_size: f64,
        fill: Color,
        anchor: TextAnchor,
        baseline: TextBaseline,
    ) -> Self {
        Primitive::Text {
            position,
            text: text.into(),
            font_size,
            fill,
            anchor,
            baseline,
            rotation: 0.0,
        }
    }

    pub fn line(from: Point, to: Point, stroke: Stroke) -> Self {
        Primitive::Line { from, to, stroke }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Primitive::Group(group) => Some(group),
            _ => None,
        }
    }
}

/// A named group of primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub children: Vec<Primitive>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.children.push(primitive);
    }

    pub fn push_group(&mut self, group: Group) {
        self.children.push(Primitive::Group(group));
    }

    pub fn extend(&mut self, primitives: impl IntoIterator<Item = Primitive>) {
        self.children.extend(primitives);
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct child group by name
    pub fn child(&self, name: &str) -> Option<&Group> {
        self.children
            .iter()
            .filter_map(Primitive::as_group)
            .find(|group| group.name == name)
    }

    /// Names of direct child groups, in order
    pub fn child_names(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(Primitive::as_group)
            .map(|group| group.name.as_str())
            .collect()
    }

    /// Number of leaf primitives in the subtree
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Primitive::Group(group) => group.leaf_count(),
                _ => 1,
            })
            .sum()
    }
}

/// Rendered chart output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChart {
    /// Width of the canvas
    pub width: f64,
    /// Height of the canvas
    pub height: f64,
    /// Root group in paint order
    pub root: Group,
    /// Series that were skipped, with the reason
    pub warnings: Vec<String>,
}

impl RenderedChart {
    /// Group for the series at `index`, if it rendered
    pub fn series_group(&self, index: usize) -> Option<&Group> {
        self.root.child(&format!("series-{}", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subpath_vertices() {
        let mut subpath = Subpath::new(Point::new(0.0, 0.0));
        subpath.line_to(Point::new(1.0, 1.0));
        subpath.curve_to(Point::new(1.5, 1.0), Point::new(2.0, 0.5), Point::new(2.0, 0.0));
        assert_eq!(
            subpath.vertices(),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)]
        );
        assert!(PathData::new().is_empty());
    }

    #[test]
    fn test_group_lookup() {
        let mut root = Group::new("root");
        let mut grid = Group::new("grid");
        grid.push(Primitive::line(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Stroke::solid(Color::GRAY, 0.5),
        ));
        root.push_group(grid);
        root.push_group(Group::new("axes"));

        assert_eq!(root.child_names(), vec!["grid", "axes"]);
        assert_eq!(root.child("grid").map(Group::leaf_count), Some(1));
        assert!(root.child("legend").is_none());
        assert_eq!(root.leaf_count(), 1);
    }

    #[test]
    fn test_primitive_serializes_with_tag() {
        let primitive = Primitive::Circle {
            center: Point::new(1.0, 2.0),
            radius: 3.0,
            fill: Some(Color::RED),
            stroke: None,
        };
        let json = serde_json::to_string(&primitive).unwrap();
        assert!(json.contains("\"type\":\"Circle\""));
    }
}
