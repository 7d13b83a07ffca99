//! Legend composition
//!
//! Lays out one swatch and label per entry inside an anchored box. The
//! layout depends only on the entries and the container rectangle, never
//! on the data geometry.

use crate::config::{EngineConfig, LegendConfig};
use crate::coords::PlotArea;
use crate::markers::marker;
use crate::model::{Color, DashStyle, LegendAnchor, MarkerShape};
use crate::primitives::{Group, Point, Primitive, Stroke, TextAnchor, TextBaseline};

/// One legend row
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub dash: DashStyle,
    pub line_width: f64,
    /// Marker sample drawn on the swatch
    pub marker: Option<MarkerShape>,
    /// False for mark-only series
    pub show_line: bool,
}

/// Computed legend box geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBox {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

/// Legend composer
pub struct LegendComposer<'a> {
    metrics: &'a LegendConfig,
    font_size: f64,
    text_color: Color,
    marker_size: f64,
}

impl<'a> LegendComposer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            metrics: &config.legend,
            font_size: config.fonts.legend,
            text_color: config.axis.text_color,
            marker_size: 2.0 * config.series.marker_scale,
        }
    }

    fn label_width(&self, label: &str) -> f64 {
        label.chars().count() as f64 * self.font_size * self.metrics.char_width_factor
    }

    /// Size and position of the box for `entries`
    pub fn measure(&self, entries: &[LegendEntry], anchor: LegendAnchor, container: &PlotArea) -> LegendBox {
        let m = self.metrics;
        let widest = entries
            .iter()
            .map(|e| self.label_width(&e.label))
            .fold(0.0, f64::max);
        let rows = entries.len() as f64;
        let width = 2.0 * m.padding + m.swatch_width + m.swatch_gap + widest;
        let height = 2.0 * m.padding + rows * self.font_size + (rows - 1.0).max(0.0) * m.row_spacing;

        let (x, y) = match anchor {
            LegendAnchor::NorthEast => (container.right() - m.margin - width, container.y + m.margin),
            LegendAnchor::NorthWest => (container.x + m.margin, container.y + m.margin),
            LegendAnchor::SouthEast => (
                container.right() - m.margin - width,
                container.bottom() - m.margin - height,
            ),
            LegendAnchor::SouthWest => (container.x + m.margin, container.bottom() - m.margin - height),
            LegendAnchor::OuterNorthEast => (container.right() + m.margin, container.y),
        };
        LegendBox {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// Legend group, or `None` when there is nothing to show
    pub fn layout(&self, entries: &[LegendEntry], anchor: LegendAnchor, container: &PlotArea) -> Option<Group> {
        if entries.is_empty() {
            return None;
        }
        let m = self.metrics;
        let frame = self.measure(entries, anchor, container);

        let mut group = Group::new("legend");
        group.push(Primitive::Rect {
            origin: frame.origin,
            width: frame.width,
            height: frame.height,
            fill: Some(m.background),
            stroke: Some(Stroke::solid(m.border, 0.5)),
        });

        let swatch_x = frame.origin.x + m.padding;
        for (row, entry) in entries.iter().enumerate() {
            let center_y = frame.origin.y
                + m.padding
                + row as f64 * (self.font_size + m.row_spacing)
                + self.font_size / 2.0;

            if entry.show_line {
                group.push(Primitive::line(
                    Point::new(swatch_x, center_y),
                    Point::new(swatch_x + m.swatch_width, center_y),
                    Stroke::solid(entry.color, entry.line_width)
                        .with_dash(entry.dash.dash_array(entry.line_width)),
                ));
            }
            if let Some(shape) = entry.marker {
                let center = Point::new(swatch_x + m.swatch_width / 2.0, center_y);
                group.extend(marker(shape, center, self.marker_size, entry.color));
            }
            group.push(Primitive::text(
                Point::new(swatch_x + m.swatch_width + m.swatch_gap, center_y),
                entry.label.clone(),
                self.font_size,
                self.text_color,
                TextAnchor::Start,
                TextBaseline::Middle,
            ));
        }
        Some(group)
    }
}
