//! Engine configuration
//!
//! Every tunable layout and evaluation constant lives here. Configuration
//! is plain data: it is passed by reference into the renderer and never
//! mutated during a render.

use crate::error::{PlotError, PlotResult};
use crate::model::{default_palette, Color};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on the sample count of a symbolic series
pub const MAX_SAMPLES: usize = 10_000;

/// Minimum sample count of a symbolic series
pub const MIN_SAMPLES: usize = 2;

/// Bisections past the f64 mantissa width cannot narrow a pole further
pub const MAX_POLE_BISECTIONS: usize = 52;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Space reserved around the plot area
    pub margins: Margins,
    /// Font size hints in device units
    pub fonts: FontSizes,
    /// Axis and tick settings
    pub axis: AxisConfig,
    /// Legend box metrics
    pub legend: LegendConfig,
    /// Series drawing defaults
    pub series: SeriesConfig,
    /// Expression evaluation budgets
    pub evaluator: EvaluatorConfig,
    /// Fraction of the data span added on each side when auto-ranging
    pub auto_range_padding: f64,
    /// Maximum number of rendered charts kept by a render cache
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            fonts: FontSizes::default(),
            axis: AxisConfig::default(),
            legend: LegendConfig::default(),
            series: SeriesConfig::default(),
            evaluator: EvaluatorConfig::default(),
            auto_range_padding: 0.1,
            cache_capacity: 32,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> PlotResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| PlotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load engine config from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Reject values that would make layout degenerate
    pub fn validate(&self) -> PlotResult<()> {
        if self.series.palette.is_empty() {
            return Err(PlotError::Config("palette must not be empty".to_string()));
        }
        if self.axis.x_tick_target < 2 || self.axis.y_tick_target < 2 {
            return Err(PlotError::Config(
                "tick targets must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.auto_range_padding) {
            return Err(PlotError::Config(format!(
                "auto_range_padding {} outside [0, 1]",
                self.auto_range_padding
            )));
        }
        if self.evaluator.max_samples < MIN_SAMPLES {
            return Err(PlotError::Config(format!(
                "max_samples must be at least {}",
                MIN_SAMPLES
            )));
        }
        let evaluator = &self.evaluator;
        if evaluator.max_depth == 0 || evaluator.max_depth > expr::DEFAULT_MAX_DEPTH {
            return Err(PlotError::Config(format!(
                "max_depth {} outside [1, {}]",
                evaluator.max_depth,
                expr::DEFAULT_MAX_DEPTH
            )));
        }
        if evaluator.max_steps == 0 || evaluator.max_steps > expr::DEFAULT_MAX_STEPS {
            return Err(PlotError::Config(format!(
                "max_steps {} outside [1, {}]",
                evaluator.max_steps,
                expr::DEFAULT_MAX_STEPS
            )));
        }
        if evaluator.pole_bisections > MAX_POLE_BISECTIONS {
            return Err(PlotError::Config(format!(
                "pole_bisections {} above {}",
                evaluator.pole_bisections, MAX_POLE_BISECTIONS
            )));
        }
        Ok(())
    }

    /// Clamp a requested sample count into the permitted range
    pub fn clamp_samples(&self, samples: usize) -> usize {
        samples.clamp(MIN_SAMPLES, self.evaluator.max_samples.min(MAX_SAMPLES))
    }

    /// Palette color for the series at `index`
    pub fn palette_color(&self, index: usize) -> Color {
        if self.series.palette.is_empty() {
            return Color::BLACK;
        }
        self.series.palette[index % self.series.palette.len()]
    }
}

/// Space between the canvas edge and the plot area
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 20.0,
            bottom: 45.0,
            left: 55.0,
        }
    }
}

/// Font size hints for text primitives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontSizes {
    pub title: f64,
    pub axis_label: f64,
    pub tick_label: f64,
    pub legend: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 14.0,
            axis_label: 12.0,
            tick_label: 10.0,
            legend: 10.0,
        }
    }
}

/// Axis, tick, and grid appearance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxisConfig {
    /// Target tick count along x
    pub x_tick_target: usize,
    /// Target tick count along y
    pub y_tick_target: usize,
    /// Tick mark length
    pub tick_length: f64,
    /// Gap between tick mark and label
    pub label_offset: f64,
    /// Arrowhead length along the spine
    pub arrow_length: f64,
    /// Arrowhead half-width
    pub arrow_width: f64,
    pub line_color: Color,
    pub line_width: f64,
    pub major_grid_color: Color,
    pub minor_grid_color: Color,
    pub grid_width: f64,
    pub text_color: Color,
    /// Minor grid lines per major step
    pub minor_divisions: usize,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            x_tick_target: 6,
            y_tick_target: 6,
            tick_length: 5.0,
            label_offset: 4.0,
            arrow_length: 8.0,
            arrow_width: 3.5,
            line_color: Color::BLACK,
            line_width: 1.0,
            major_grid_color: Color::rgb(217, 217, 217),
            minor_grid_color: Color::rgb(240, 240, 240),
            grid_width: 0.5,
            text_color: Color::rgb(64, 64, 64),
            minor_divisions: 5,
        }
    }
}

/// Legend box metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegendConfig {
    /// Distance from the container edge
    pub margin: f64,
    /// Inner padding of the box
    pub padding: f64,
    /// Length of the line sample
    pub swatch_width: f64,
    /// Gap between swatch and label
    pub swatch_gap: f64,
    /// Vertical distance between rows
    pub row_spacing: f64,
    /// Average glyph advance as a fraction of the font size
    pub char_width_factor: f64,
    pub background: Color,
    pub border: Color,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            padding: 6.0,
            swatch_width: 24.0,
            swatch_gap: 6.0,
            row_spacing: 4.0,
            char_width_factor: 0.6,
            background: Color::rgba(255, 255, 255, 230),
            border: Color::rgb(128, 128, 128),
        }
    }
}

/// Series drawing defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeriesConfig {
    /// Colors assigned by series index when none is declared
    pub palette: Vec<Color>,
    /// Fraction of segment length used for smoothing control points
    pub smoothing_tension: f64,
    /// Marker size multiplier applied to the declared mark size
    pub marker_scale: f64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            smoothing_tension: 0.2,
            marker_scale: 1.0,
        }
    }
}

/// Expression evaluation budgets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum expression nesting depth
    pub max_depth: usize,
    /// Maximum tree nodes visited per sample
    pub max_steps: usize,
    /// Ceiling on the sample count of a symbolic series
    pub max_samples: usize,
    /// Bisection steps used when probing a suspected pole
    pub pole_bisections: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_depth: expr::DEFAULT_MAX_DEPTH,
            max_steps: expr::DEFAULT_MAX_STEPS,
            max_samples: MAX_SAMPLES,
            pole_bisections: 8,
        }
    }
}

impl EvaluatorConfig {
    pub fn limits(&self) -> expr::Limits {
        expr::Limits {
            max_steps: self.max_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.axis.x_tick_target, 6);
        assert_eq!(config.evaluator.max_depth, 64);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"auto_range_padding": 0.05, "axis": {"x_tick_target": 8}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.auto_range_padding, 0.05);
        assert_eq!(config.axis.x_tick_target, 8);
        assert_eq!(config.axis.y_tick_target, 6);
        assert_eq!(config.margins, Margins::default());
    }

    #[test]
    fn test_validate_rejects_empty_palette() {
        let mut config = EngineConfig::default();
        config.series.palette.clear();
        assert!(matches!(config.validate(), Err(PlotError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unbounded_evaluator() {
        let mut config = EngineConfig::default();
        config.evaluator.max_depth = 1_000_000;
        assert!(matches!(config.validate(), Err(PlotError::Config(_))));

        let mut config = EngineConfig::default();
        config.evaluator.max_steps = expr::DEFAULT_MAX_STEPS + 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.evaluator.pole_bisections = MAX_POLE_BISECTIONS + 1;
        assert!(config.validate().is_err());

        let json = r#"{"evaluator": {"max_depth": 1000000}}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_samples() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_samples(0), 2);
        assert_eq!(config.clamp_samples(100), 100);
        assert_eq!(config.clamp_samples(1_000_000), MAX_SAMPLES);
    }

    #[test]
    fn test_palette_wraps() {
        let config = EngineConfig::default();
        let n = config.series.palette.len();
        assert_eq!(config.palette_color(0), config.palette_color(n));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = EngineConfig::load_or_default(Path::new("/nonexistent/plot-config.json"));
        assert_eq!(config, EngineConfig::default());
    }
}
