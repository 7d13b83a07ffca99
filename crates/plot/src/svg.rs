//! SVG serialization of a rendered chart
//!
//! A reference consumer of the primitive tree: every group becomes a `<g>`
//! element with its name as the `class`, leaves map to the matching SVG
//! element.

use crate::model::Color;
use crate::primitives::{
    Group, PathData, Primitive, RenderedChart, Segment, Stroke, TextAnchor, TextBaseline,
};
use std::fmt::Write;

/// Serialize a rendered chart to an SVG document
pub fn to_svg(chart: &RenderedChart) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        chart.width, chart.height, chart.width, chart.height
    );
    svg.push('\n');
    write_group(&mut svg, &chart.root, 1);
    svg.push_str("</svg>\n");
    svg
}

fn write_group(out: &mut String, group: &Group, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, r#"{}<g class="{}">"#, indent, escape_xml(&group.name));
    for child in &group.children {
        match child {
            Primitive::Group(inner) => write_group(out, inner, depth + 1),
            leaf => {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&primitive_to_svg(leaf));
                out.push('\n');
            }
        }
    }
    let _ = writeln!(out, "{}</g>", indent);
}

fn primitive_to_svg(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Group(_) => String::new(),
        Primitive::Line { from, to, stroke } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attrs(Some(stroke))
        ),
        Primitive::Path { data, stroke, fill } => format!(
            r#"<path d="{}"{}{}/>"#,
            path_data(data),
            fill_attrs(*fill),
            stroke_attrs(stroke.as_ref())
        ),
        Primitive::Polygon {
            points,
            fill,
            stroke,
        } => {
            let points_str = points
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                r#"<polygon points="{}"{}{}/>"#,
                points_str,
                fill_attrs(*fill),
                stroke_attrs(stroke.as_ref())
            )
        }
        Primitive::Circle {
            center,
            radius,
            fill,
            stroke,
        } => format!(
            r#"<circle cx="{}" cy="{}" r="{}"{}{}/>"#,
            center.x,
            center.y,
            radius,
            fill_attrs(*fill),
            stroke_attrs(stroke.as_ref())
        ),
        Primitive::Rect {
            origin,
            width,
            height,
            fill,
            stroke,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
            origin.x,
            origin.y,
            width,
            height,
            fill_attrs(*fill),
            stroke_attrs(stroke.as_ref())
        ),
        Primitive::Text {
            position,
            text,
            font_size,
            fill,
            anchor,
            baseline,
            rotation,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let baseline_str = match baseline {
                TextBaseline::Top => "hanging",
                TextBaseline::Middle => "middle",
                TextBaseline::Bottom => "text-bottom",
            };
            let transform = if *rotation != 0.0 {
                format!(
                    r#" transform="rotate({} {} {})""#,
                    rotation, position.x, position.y
                )
            } else {
                String::new()
            };
            format!(
                r#"<text x="{}" y="{}" font-size="{}"{} text-anchor="{}" dominant-baseline="{}"{}>{}</text>"#,
                position.x,
                position.y,
                font_size,
                fill_attrs(Some(*fill)),
                anchor_str,
                baseline_str,
                transform,
                escape_xml(text)
            )
        }
    }
}

/// SVG path `d` attribute; each subpath starts with its own move-to
pub fn path_data(data: &PathData) -> String {
    let mut d = String::new();
    for subpath in &data.subpaths {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = write!(d, "M{},{}", subpath.start.x, subpath.start.y);
        for segment in &subpath.segments {
            match segment {
                Segment::LineTo { to } => {
                    let _ = write!(d, " L{},{}", to.x, to.y);
                }
                Segment::CurveTo { c1, c2, to } => {
                    let _ = write!(d, " C{},{} {},{} {},{}", c1.x, c1.y, c2.x, c2.y, to.x, to.y);
                }
            }
        }
    }
    d
}

fn fill_attrs(fill: Option<Color>) -> String {
    match fill {
        Some(color) => format!(r#" fill="{}""#, color.to_css()),
        None => r#" fill="none""#.to_string(),
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        stroke.color.to_css(),
        stroke.width
    );
    if !stroke.dash.is_empty() {
        let dash = stroke
            .dash
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, dash);
    }
    attrs
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Point, Subpath};

    fn chart_with(children: Vec<Primitive>) -> RenderedChart {
        let mut series = Group::new("series-0");
        series.extend(children);
        let mut root = Group::new("chart");
        root.push_group(series);
        RenderedChart {
            width: 200.0,
            height: 100.0,
            root,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_document_envelope() {
        let svg = to_svg(&chart_with(Vec::new()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 200 100""#));
        assert!(svg.contains(r#"<g class="series-0">"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_disconnected_subpaths_each_move() {
        let mut first = Subpath::new(Point::new(0.0, 0.0));
        first.line_to(Point::new(1.0, 1.0));
        let mut second = Subpath::new(Point::new(3.0, 3.0));
        second.curve_to(Point::new(4.0, 3.0), Point::new(5.0, 4.0), Point::new(6.0, 6.0));
        let data = PathData {
            subpaths: vec![first, second],
        };
        assert_eq!(path_data(&data), "M0,0 L1,1 M3,3 C4,3 5,4 6,6");
    }

    #[test]
    fn test_dashed_stroke() {
        let stroke = Stroke::solid(Color::RED, 2.0).with_dash(vec![6.0, 3.0]);
        let svg = to_svg(&chart_with(vec![Primitive::line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            stroke,
        )]));
        assert!(svg.contains(r#"stroke-dasharray="6,3""#));
        assert!(svg.contains(r#"stroke-width="2""#));
    }

    #[test]
    fn test_text_is_escaped_and_rotated() {
        let svg = to_svg(&chart_with(vec![Primitive::Text {
            position: Point::new(5.0, 50.0),
            text: "a < b & c".to_string(),
            font_size: 12.0,
            fill: Color::BLACK,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Bottom,
            rotation: -90.0,
        }]));
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains(r#"transform="rotate(-90 5 50)""#));
    }

    #[test]
    fn test_unfilled_polygon() {
        let svg = to_svg(&chart_with(vec![Primitive::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            fill: None,
            stroke: Some(Stroke::solid(Color::BLUE, 1.0)),
        }]));
        assert!(svg.contains(r#"<polygon points="0,0 1,0 0,1" fill="none""#));
    }
}
