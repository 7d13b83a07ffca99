//! Marker glyphs
//!
//! Each shape is a pure function of center, size and color.

use crate::model::{Color, MarkerShape};
use crate::primitives::{Point, Primitive, Stroke};
use std::f64::consts::{FRAC_PI_2, PI};

/// Ratio of a five-pointed star's inner to outer radius
const STAR_INNER_RATIO: f64 = 0.382;

/// Primitives for one marker centered at `center`; `size` is the radius
pub fn marker(shape: MarkerShape, center: Point, size: f64, color: Color) -> Vec<Primitive> {
    match shape {
        MarkerShape::None => Vec::new(),
        MarkerShape::Circle => vec![circle(center, size, color)],
        MarkerShape::Star => vec![star(center, size, color)],
        MarkerShape::Cross => cross(center, size, color),
        MarkerShape::Plus => plus(center, size, color),
        MarkerShape::Square => vec![square(center, size, color)],
        MarkerShape::Triangle => vec![triangle(center, size, color)],
    }
}

fn outline(color: Color) -> Stroke {
    Stroke::solid(color, 0.5)
}

fn circle(center: Point, size: f64, color: Color) -> Primitive {
    Primitive::Circle {
        center,
        radius: size,
        fill: Some(color),
        stroke: Some(outline(color)),
    }
}

fn star(center: Point, size: f64, color: Color) -> Primitive {
    let points = (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 {
                size
            } else {
                size * STAR_INNER_RATIO
            };
            // First vertex points straight up
            let angle = FRAC_PI_2 + i as f64 * PI / 5.0;
            Point::new(center.x + radius * angle.cos(), center.y - radius * angle.sin())
        })
        .collect();
    Primitive::Polygon {
        points,
        fill: Some(color),
        stroke: Some(outline(color)),
    }
}

fn cross(center: Point, size: f64, color: Color) -> Vec<Primitive> {
    let d = size * std::f64::consts::FRAC_1_SQRT_2;
    let stroke = Stroke::solid(color, (size / 3.0).max(1.0));
    vec![
        Primitive::line(
            Point::new(center.x - d, center.y - d),
            Point::new(center.x + d, center.y + d),
            stroke.clone(),
        ),
        Primitive::line(
            Point::new(center.x - d, center.y + d),
            Point::new(center.x + d, center.y - d),
            stroke,
        ),
    ]
}

fn plus(center: Point, size: f64, color: Color) -> Vec<Primitive> {
    let stroke = Stroke::solid(color, (size / 3.0).max(1.0));
    vec![
        Primitive::line(
            Point::new(center.x - size, center.y),
            Point::new(center.x + size, center.y),
            stroke.clone(),
        ),
        Primitive::line(
            Point::new(center.x, center.y - size),
            Point::new(center.x, center.y + size),
            stroke,
        ),
    ]
}

fn square(center: Point, size: f64, color: Color) -> Primitive {
    Primitive::Polygon {
        points: vec![
            Point::new(center.x - size, center.y - size),
            Point::new(center.x + size, center.y - size),
            Point::new(center.x + size, center.y + size),
            Point::new(center.x - size, center.y + size),
        ],
        fill: Some(color),
        stroke: Some(outline(color)),
    }
}

fn triangle(center: Point, size: f64, color: Color) -> Primitive {
    let half_base = size * 3f64.sqrt() / 2.0;
    Primitive::Polygon {
        points: vec![
            Point::new(center.x, center.y - size),
            Point::new(center.x + half_base, center.y + size / 2.0),
            Point::new(center.x - half_base, center.y + size / 2.0),
        ],
        fill: Some(color),
        stroke: Some(outline(color)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(10.0, 20.0);

    #[test]
    fn test_circle_marker() {
        let prims = marker(MarkerShape::Circle, CENTER, 3.0, Color::RED);
        assert_eq!(prims.len(), 1);
        match &prims[0] {
            Primitive::Circle { center, radius, .. } => {
                assert_eq!(*center, CENTER);
                assert_eq!(*radius, 3.0);
            }
            other => panic!("Expected Circle, got {:?}", other),
        }
    }

    #[test]
    fn test_star_has_ten_vertices() {
        let prims = marker(MarkerShape::Star, CENTER, 4.0, Color::BLUE);
        match &prims[0] {
            Primitive::Polygon { points, .. } => {
                assert_eq!(points.len(), 10);
                assert!((points[0].x - CENTER.x).abs() < 1e-9);
                assert!((points[0].y - (CENTER.y - 4.0)).abs() < 1e-9);
            }
            other => panic!("Expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_cross_and_plus_are_two_lines() {
        for shape in [MarkerShape::Cross, MarkerShape::Plus] {
            let prims = marker(shape, CENTER, 2.0, Color::BLACK);
            assert_eq!(prims.len(), 2);
            assert!(prims.iter().all(|p| matches!(p, Primitive::Line { .. })));
        }
    }

    #[test]
    fn test_polygon_shapes() {
        let square = marker(MarkerShape::Square, CENTER, 2.0, Color::BLACK);
        let triangle = marker(MarkerShape::Triangle, CENTER, 2.0, Color::BLACK);
        assert!(matches!(&square[0], Primitive::Polygon { points, .. } if points.len() == 4));
        assert!(matches!(&triangle[0], Primitive::Polygon { points, .. } if points.len() == 3));
    }

    #[test]
    fn test_none_marker_is_empty() {
        assert!(marker(MarkerShape::None, CENTER, 2.0, Color::BLACK).is_empty());
    }
}
