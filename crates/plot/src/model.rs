//! Chart model types
//!
//! This module defines the parsed chart specification: axis options,
//! series declarations with their sources and styles, and the data point
//! type shared by every later stage.

use serde::{Deserialize, Serialize};

/// Default domain for function series when neither the series nor the
/// axis declares one
pub const DEFAULT_DOMAIN: Domain = Domain { lo: -5.0, hi: 5.0 };

/// Default sample count for function series
pub const DEFAULT_SAMPLES: usize = 25;

/// A parsed chart description. Replaced wholesale on every parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart title
    pub title: Option<String>,
    /// X axis label
    pub xlabel: Option<String>,
    /// Y axis label
    pub ylabel: Option<String>,
    /// Explicit data bounds; `None` means auto
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    /// Requested size in device units
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub grid: GridMode,
    pub axis_lines: AxisLines,
    /// Equal data units on both axes
    pub axis_equal: bool,
    pub legend_anchor: LegendAnchor,
    pub geometry: GeometryKind,
    /// Default domain for function series
    pub domain: Option<Domain>,
    /// Default sample count for function series
    pub samples: Option<usize>,
    /// Declared series in order
    pub series: Vec<SeriesDecl>,
}

impl ChartSpec {
    /// Whether any bound must be computed from the data
    pub fn needs_auto_range(&self) -> bool {
        self.xmin.is_none() || self.xmax.is_none() || self.ymin.is_none() || self.ymax.is_none()
    }

    /// Domain used by a function series
    pub fn domain_for(&self, series: &SeriesDecl) -> Domain {
        series.domain.or(self.domain).unwrap_or(DEFAULT_DOMAIN)
    }

    /// Sample count requested by a function series
    pub fn samples_for(&self, series: &SeriesDecl) -> usize {
        series.samples.or(self.samples).unwrap_or(DEFAULT_SAMPLES)
    }
}

/// A closed numeric interval written `lo:hi`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub lo: f64,
    pub hi: f64,
}

impl Domain {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Parse `lo:hi`; each end is a number or a constant expression such
    /// as `-pi` or `2*pi`
    pub fn parse(text: &str) -> Option<Self> {
        let (lo, hi) = text.split_once(':')?;
        Some(Self {
            lo: domain_bound(lo)?,
            hi: domain_bound(hi)?,
        })
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo.min(self.hi) && value <= self.lo.max(self.hi)
    }
}

fn domain_bound(text: &str) -> Option<f64> {
    let text = text.trim();
    let value = match text.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            let sample = expr::evaluate(text, &expr::Bindings::new());
            sample.valid.then_some(sample.value)?
        }
    };
    value.is_finite().then_some(value)
}

/// Grid drawing mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    #[default]
    None,
    Major,
    Minor,
    Both,
}

impl GridMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "none" | "false" => Some(GridMode::None),
            "major" | "true" | "" => Some(GridMode::Major),
            "minor" => Some(GridMode::Minor),
            "both" => Some(GridMode::Both),
            _ => None,
        }
    }

    pub fn major(&self) -> bool {
        matches!(self, GridMode::Major | GridMode::Both)
    }

    pub fn minor(&self) -> bool {
        matches!(self, GridMode::Minor | GridMode::Both)
    }
}

/// How the axis spines are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisLines {
    /// Spines along the left and bottom edges, arrows at the open ends
    Left,
    /// Spines along the right and top edges, arrows at the open ends
    Right,
    /// Spines through the data origin (clamped into the plot area)
    Center,
    /// Full rectangle, no arrows
    #[default]
    Box,
    None,
}

impl AxisLines {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "left" => Some(AxisLines::Left),
            "right" => Some(AxisLines::Right),
            "center" | "middle" => Some(AxisLines::Center),
            "box" => Some(AxisLines::Box),
            "none" => Some(AxisLines::None),
            _ => None,
        }
    }

    pub fn has_arrows(&self) -> bool {
        matches!(self, AxisLines::Left | AxisLines::Right | AxisLines::Center)
    }
}

/// Where the legend box is anchored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendAnchor {
    #[default]
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    /// Outside the plot area, to the right of its top edge
    OuterNorthEast,
}

impl LegendAnchor {
    pub fn parse(text: &str) -> Option<Self> {
        match text.replace('-', " ").as_str() {
            "north east" | "northeast" | "top right" => Some(LegendAnchor::NorthEast),
            "north west" | "northwest" | "top left" => Some(LegendAnchor::NorthWest),
            "south east" | "southeast" | "bottom right" => Some(LegendAnchor::SouthEast),
            "south west" | "southwest" | "bottom left" => Some(LegendAnchor::SouthWest),
            "outer north east" | "outer northeast" | "right" => Some(LegendAnchor::OuterNorthEast),
            _ => None,
        }
    }
}

/// Coordinate geometry of the chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeometryKind {
    #[default]
    Cartesian,
    /// First coordinate is the radius, second the angle in degrees
    Polar,
    /// Per-axis base-10 logarithmic scaling
    Logarithmic { log_x: bool, log_y: bool },
}

impl GeometryKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "cartesian" | "axis" | "linear" => Some(GeometryKind::Cartesian),
            "polar" | "polaraxis" => Some(GeometryKind::Polar),
            "semilogx" | "semilogxaxis" => Some(GeometryKind::Logarithmic {
                log_x: true,
                log_y: false,
            }),
            "semilogy" | "semilogyaxis" => Some(GeometryKind::Logarithmic {
                log_x: false,
                log_y: true,
            }),
            "loglog" | "loglogaxis" | "log" | "logarithmic" => Some(GeometryKind::Logarithmic {
                log_x: true,
                log_y: true,
            }),
            _ => None,
        }
    }

    /// Turn on logarithmic scaling for one axis, keeping the other as is
    pub fn with_log_axis(self, x_axis: bool) -> Self {
        let (mut log_x, mut log_y) = match self {
            GeometryKind::Logarithmic { log_x, log_y } => (log_x, log_y),
            _ => (false, false),
        };
        if x_axis {
            log_x = true;
        } else {
            log_y = true;
        }
        GeometryKind::Logarithmic { log_x, log_y }
    }

    pub fn log_x(&self) -> bool {
        matches!(self, GeometryKind::Logarithmic { log_x: true, .. })
    }

    pub fn log_y(&self) -> bool {
        matches!(self, GeometryKind::Logarithmic { log_y: true, .. })
    }
}

/// One plot statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDecl {
    pub source: SeriesSource,
    pub style: SeriesStyle,
    /// Domain override for symbolic sources
    pub domain: Option<Domain>,
    /// Sample count override for symbolic sources
    pub samples: Option<usize>,
    /// Legend label
    pub label: Option<String>,
    /// Points whose x falls outside are marked invalid
    pub restrict_x: Option<Domain>,
    /// Points whose y falls outside are marked invalid
    pub restrict_y: Option<Domain>,
    /// Keep only every n-th point
    pub each_nth_point: Option<usize>,
}

impl SeriesDecl {
    pub fn new(source: SeriesSource) -> Self {
        Self {
            source,
            style: SeriesStyle::default(),
            domain: None,
            samples: None,
            label: None,
            restrict_x: None,
            restrict_y: None,
            each_nth_point: None,
        }
    }

    /// Function series `y = f(x)`
    pub fn function(expression: impl Into<String>) -> Self {
        Self::new(SeriesSource::Function {
            expression: expression.into(),
        })
    }

    /// Explicit coordinate series
    pub fn coordinates(points: Vec<(f64, f64)>) -> Self {
        Self::new(SeriesSource::Coordinates { points })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

}

/// Where a series' points come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SeriesSource {
    /// Literal `(x, y)` pairs; unparseable numbers are kept as NaN
    Coordinates { points: Vec<(f64, f64)> },
    /// Delimited table text
    Table { text: String, options: TableOptions },
    /// `y = f(x)`
    Function { expression: String },
    /// `x = f(t)`, `y = g(t)`
    Parametric { x_expression: String, y_expression: String },
    /// `r = f(θ)`
    Polar { expression: String },
}

impl SeriesSource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SeriesSource::Coordinates { .. } => "coordinates",
            SeriesSource::Table { .. } => "table",
            SeriesSource::Function { .. } => "function",
            SeriesSource::Parametric { .. } => "parametric",
            SeriesSource::Polar { .. } => "polar",
        }
    }
}

/// Column selector in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// Numeric text selects by index, anything else by header name
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<usize>() {
            Ok(index) => ColumnRef::Index(index),
            Err(_) => ColumnRef::Name(text.trim().to_string()),
        }
    }
}

/// Cell separator in table text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDelimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    /// Any run of spaces or tabs
    Whitespace,
}

impl TableDelimiter {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "comma" | "," => Some(TableDelimiter::Comma),
            "semicolon" | ";" => Some(TableDelimiter::Semicolon),
            "tab" | "\\t" => Some(TableDelimiter::Tab),
            "space" | "whitespace" | " " => Some(TableDelimiter::Whitespace),
            _ => None,
        }
    }

    pub fn byte(&self) -> Option<u8> {
        match self {
            TableDelimiter::Comma => Some(b','),
            TableDelimiter::Semicolon => Some(b';'),
            TableDelimiter::Tab => Some(b'\t'),
            TableDelimiter::Whitespace => None,
        }
    }
}

/// How to read a delimited table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// `None` auto-detects a header from a non-numeric first row
    pub header: Option<bool>,
    pub delimiter: TableDelimiter,
    pub x: ColumnRef,
    pub y: ColumnRef,
    pub label: Option<ColumnRef>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            header: None,
            delimiter: TableDelimiter::Comma,
            x: ColumnRef::Index(0),
            y: ColumnRef::Index(1),
            label: None,
        }
    }
}

/// Per-series visual style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// `None` takes the palette color for the series index
    pub color: Option<Color>,
    pub line_width: f64,
    pub dash: DashStyle,
    pub opacity: f64,
    /// `None` means the option was absent
    pub marker: Option<MarkerShape>,
    pub marker_size: f64,
    pub only_marks: bool,
    pub no_marks: bool,
    pub smooth: bool,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            color: None,
            line_width: 1.0,
            dash: DashStyle::Solid,
            opacity: 1.0,
            marker: None,
            marker_size: 2.0,
            only_marks: false,
            no_marks: false,
            smooth: false,
        }
    }
}

impl SeriesStyle {
    /// Marker shape to draw, or `None` when markers are suppressed
    pub fn effective_marker(&self) -> Option<MarkerShape> {
        if self.no_marks {
            return None;
        }
        match self.marker.unwrap_or(MarkerShape::Circle) {
            MarkerShape::None => None,
            shape => Some(shape),
        }
    }
}

/// Stroke dash pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDotted,
    DenselyDashed,
    LooselyDashed,
}

impl DashStyle {
    pub fn parse(text: &str) -> Option<Self> {
        match text.replace(['-', ' '], "").as_str() {
            "solid" => Some(DashStyle::Solid),
            "dashed" => Some(DashStyle::Dashed),
            "dotted" => Some(DashStyle::Dotted),
            "dashdotted" | "dashdot" => Some(DashStyle::DashDotted),
            "denselydashed" => Some(DashStyle::DenselyDashed),
            "looselydashed" => Some(DashStyle::LooselyDashed),
            _ => None,
        }
    }

    /// Dash array in multiples of the line width; empty means solid
    pub fn pattern(&self) -> &'static [f64] {
        match self {
            DashStyle::Solid => &[],
            DashStyle::Dashed => &[3.0, 3.0],
            DashStyle::Dotted => &[1.0, 2.0],
            DashStyle::DashDotted => &[3.0, 2.0, 1.0, 2.0],
            DashStyle::DenselyDashed => &[3.0, 1.5],
            DashStyle::LooselyDashed => &[3.0, 6.0],
        }
    }

    /// Dash array in device units for a stroke of the given width
    pub fn dash_array(&self, line_width: f64) -> Vec<f64> {
        let unit = line_width.max(1.0) * 2.0;
        self.pattern().iter().map(|d| d * unit).collect()
    }
}

/// Marker glyph drawn at each data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    None,
    Circle,
    Star,
    Cross,
    Plus,
    Square,
    Triangle,
}

impl MarkerShape {
    /// Parse a mark name; unknown names fall back to a circle
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "none" => MarkerShape::None,
            "*" | "o" | "circle" | "ball" => MarkerShape::Circle,
            "star" => MarkerShape::Star,
            "x" | "cross" => MarkerShape::Cross,
            "+" | "plus" => MarkerShape::Plus,
            "square" | "square*" => MarkerShape::Square,
            "triangle" | "triangle*" => MarkerShape::Triangle,
            _ => MarkerShape::Circle,
        }
    }
}

/// One sample of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    /// False for failed evaluations and filtered points
    pub valid: bool,
}

impl DataPoint {
    /// A point that is valid iff both coordinates are finite
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            valid: x.is_finite() && y.is_finite(),
        }
    }

    /// An explicit gap at `x`
    pub fn invalid(x: f64) -> Self {
        Self {
            x,
            y: f64::NAN,
            valid: false,
        }
    }

    /// Same coordinates, marked invalid
    pub fn invalidated(self) -> Self {
        Self {
            valid: false,
            ..self
        }
    }
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (fully opaque)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Self::rgb(r, g, b))
        } else if hex.len() == 8 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Self::rgba(r, g, b, a))
        } else {
            None
        }
    }

    /// Parse a color name, `#hex`, or a `name!percent` tint
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            return Self::from_hex(text);
        }
        if let Some((name, percent)) = text.split_once('!') {
            let base = Self::named(name.trim())?;
            let percent = percent.trim().parse::<f64>().ok()?.clamp(0.0, 100.0);
            return Some(base.mix(Color::WHITE, percent / 100.0));
        }
        Self::named(text)
    }

    /// Look up a named color
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" => Self::CYAN,
            "magenta" => Self::MAGENTA,
            "gray" | "grey" => Self::GRAY,
            "orange" => Color::rgb(255, 128, 0),
            "purple" => Color::rgb(191, 0, 64),
            "violet" => Color::rgb(128, 0, 128),
            "brown" => Color::rgb(191, 128, 64),
            "lime" => Color::rgb(191, 255, 0),
            "olive" => Color::rgb(128, 128, 0),
            "pink" => Color::rgb(255, 191, 191),
            "teal" => Color::rgb(0, 128, 128),
            "darkgray" | "darkgrey" => Color::rgb(64, 64, 64),
            "lightgray" | "lightgrey" => Color::rgb(191, 191, 191),
            _ => return None,
        };
        Some(color)
    }

    /// Linear blend: `amount` of self, the rest of `other`
    pub fn mix(&self, other: Color, amount: f64) -> Self {
        let blend = |a: u8, b: u8| (a as f64 * amount + b as f64 * (1.0 - amount)).round() as u8;
        Self::rgba(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
            self.a,
        )
    }

    /// Same color with opacity scaled by `opacity`
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to CSS color string
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }

    // Predefined colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Default color palette for series
pub fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(79, 129, 189),   // Blue
        Color::rgb(192, 80, 77),    // Red
        Color::rgb(155, 187, 89),   // Green
        Color::rgb(128, 100, 162),  // Purple
        Color::rgb(75, 172, 198),   // Teal
        Color::rgb(247, 150, 70),   // Orange
        Color::rgb(119, 146, 60),   // Olive
        Color::rgb(166, 166, 166),  // Gray
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let color = Color::from_hex("#FF0000").unwrap();
        assert_eq!(color, Color::rgb(255, 0, 0));

        let color = Color::from_hex("#0000FF80").unwrap();
        assert_eq!(color, Color::rgba(0, 0, 255, 128));
        assert!(Color::from_hex("#12").is_none());
    }

    #[test]
    fn test_color_parse_names_and_tints() {
        assert_eq!(Color::parse("Red"), Some(Color::RED));
        assert_eq!(Color::parse("#00ff00"), Some(Color::GREEN));
        assert_eq!(Color::parse("black!50"), Some(Color::rgb(128, 128, 128)));
        assert!(Color::parse("chartreuse-ish").is_none());
    }

    #[test]
    fn test_color_to_css() {
        assert_eq!(Color::rgb(255, 128, 0).to_css(), "rgb(255, 128, 0)");
        assert!(Color::RED.with_opacity(0.5).to_css().starts_with("rgba(255, 0, 0,"));
    }

    #[test]
    fn test_domain_parse() {
        assert_eq!(Domain::parse("-2:3.5"), Some(Domain::new(-2.0, 3.5)));
        assert_eq!(Domain::parse(" 0 : 1 "), Some(Domain::new(0.0, 1.0)));
        assert!(Domain::parse("a:b").is_none());
        assert!(Domain::parse("5").is_none());
        let turn = Domain::parse("-pi:2*pi").unwrap();
        assert!((turn.lo + std::f64::consts::PI).abs() < 1e-12);
        assert!((turn.hi - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_marker_parse_defaults_to_circle() {
        assert_eq!(MarkerShape::parse("star"), MarkerShape::Star);
        assert_eq!(MarkerShape::parse("x"), MarkerShape::Cross);
        assert_eq!(MarkerShape::parse("diamond-ish"), MarkerShape::Circle);
        assert_eq!(MarkerShape::parse("none"), MarkerShape::None);
    }

    #[test]
    fn test_effective_marker() {
        let mut style = SeriesStyle::default();
        assert_eq!(style.effective_marker(), Some(MarkerShape::Circle));
        style.marker = Some(MarkerShape::None);
        assert_eq!(style.effective_marker(), None);
        style.marker = Some(MarkerShape::Star);
        style.no_marks = true;
        assert_eq!(style.effective_marker(), None);
    }

    #[test]
    fn test_dash_array_scales_with_width() {
        assert!(DashStyle::Solid.dash_array(2.0).is_empty());
        assert_eq!(DashStyle::Dashed.dash_array(1.0), vec![6.0, 6.0]);
        assert_eq!(DashStyle::parse("densely dashed"), Some(DashStyle::DenselyDashed));
    }

    #[test]
    fn test_geometry_log_axis() {
        let geometry = GeometryKind::Cartesian.with_log_axis(false);
        assert!(!geometry.log_x());
        assert!(geometry.log_y());
        let geometry = geometry.with_log_axis(true);
        assert!(geometry.log_x() && geometry.log_y());
    }

    #[test]
    fn test_data_point_validity() {
        assert!(DataPoint::new(1.0, 2.0).valid);
        assert!(!DataPoint::new(1.0, f64::NAN).valid);
        assert!(!DataPoint::new(f64::INFINITY, 0.0).valid);
        assert!(!DataPoint::invalid(0.0).valid);
    }

    #[test]
    fn test_spec_defaults() {
        let spec = ChartSpec::default();
        let series = SeriesDecl::function("x");
        assert_eq!(spec.domain_for(&series), DEFAULT_DOMAIN);
        assert_eq!(spec.samples_for(&series), DEFAULT_SAMPLES);
        assert!(spec.needs_auto_range());
    }
}
