//! Chart description parser
//!
//! Parses one axis block into a [`ChartSpec`]:
//!
//! ```text
//! begin-axis[xmin=-5, xmax=5, grid=major]
//!   plot[color=red, samples=50]{sin(x)}
//!   legend-entry{sine}
//!   plot coordinates {(0,0) (1,1) (2,4)}
//! end-axis
//! ```
//!
//! The LaTeX spellings `\begin{axis}`, `\addplot`, `\addlegendentry` and
//! `\legend{...}` are accepted as well. Parsing is purely structural: no
//! expression is evaluated and no range is checked. Unknown option keys
//! are ignored and malformed option values leave the option unset.

use crate::error::{PlotError, PlotResult};
use crate::model::*;

// =============================================================================
// Units
// =============================================================================

/// Device units per unit of length
pub fn unit_factor(unit: &str) -> Option<f64> {
    match unit {
        "" | "px" => Some(1.0),
        "pt" => Some(96.0 / 72.27),
        "bp" => Some(96.0 / 72.0),
        "in" => Some(96.0),
        "cm" => Some(96.0 / 2.54),
        "mm" => Some(9.6 / 2.54),
        "pc" => Some(16.0),
        "em" => Some(16.0),
        "ex" => Some(8.0),
        _ => None,
    }
}

/// Parse a length such as `8cm` or `120` into device units
pub fn parse_length(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value = number.trim().parse::<f64>().ok()?;
    let factor = unit_factor(unit.trim())?;
    let length = value * factor;
    length.is_finite().then_some(length)
}

// Named stroke widths, in points
const LINE_WIDTHS: [(&str, f64); 7] = [
    ("ultra-thin", 0.1),
    ("very-thin", 0.2),
    ("thin", 0.4),
    ("semithick", 0.6),
    ("thick", 0.8),
    ("very-thick", 1.2),
    ("ultra-thick", 1.6),
];

// =============================================================================
// Options
// =============================================================================

/// One `key=value` or bare flag from a bracketed option list
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    /// Lowercased, with spaces and hyphens folded to single hyphens
    pub key: String,
    pub value: Option<String>,
}

/// Fold a key so `line width`, `line-width` and `Line  Width` compare equal
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Drop one level of enclosing braces
fn unbrace(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with('{') && text.ends_with('}') && text.len() >= 2 {
        text[1..text.len() - 1].trim()
    } else {
        text
    }
}

/// Split at `separator` outside any bracket pair
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse the inside of a bracketed option list
pub fn parse_options(text: &str) -> Vec<OptionEntry> {
    split_top_level(text, ',')
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match split_top_level(item, '=').as_slice() {
            [key] => OptionEntry {
                key: normalize_key(key),
                value: None,
            },
            [key, ..] => OptionEntry {
                key: normalize_key(key),
                value: Some(unbrace(&item[key.len() + 1..]).to_string()),
            },
            [] => OptionEntry {
                key: String::new(),
                value: None,
            },
        })
        .collect()
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Some(true),
        Some(v) if v == "true" || v.is_empty() => Some(true),
        Some(v) if v == "false" => Some(false),
        _ => None,
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    let number = value?.trim().parse::<f64>().ok()?;
    number.is_finite().then_some(number)
}

fn parse_count(value: Option<&str>) -> Option<usize> {
    let number = parse_number(value)?;
    (number >= 0.0 && number.fract() == 0.0).then_some(number as usize)
}

/// Record a parsed value, or warn and leave the option unset
fn set_or_warn<T>(slot: &mut T, key: &str, value: Option<&str>, parsed: Option<T>) {
    match parsed {
        Some(parsed) => *slot = parsed,
        None => tracing::warn!("Ignoring malformed value for `{}`: {:?}", key, value),
    }
}

fn apply_axis_options(spec: &mut ChartSpec, entries: &[OptionEntry]) {
    for entry in entries {
        let key = entry.key.as_str();
        let value = entry.value.as_deref();
        match key {
            "title" => spec.title = value.map(str::to_string),
            "xlabel" => spec.xlabel = value.map(str::to_string),
            "ylabel" => spec.ylabel = value.map(str::to_string),
            "xmin" => spec.xmin = warn_none(key, value, parse_number(value)),
            "xmax" => spec.xmax = warn_none(key, value, parse_number(value)),
            "ymin" => spec.ymin = warn_none(key, value, parse_number(value)),
            "ymax" => spec.ymax = warn_none(key, value, parse_number(value)),
            "width" => spec.width = warn_none(key, value, value.and_then(parse_length)),
            "height" => spec.height = warn_none(key, value, value.and_then(parse_length)),
            "grid" => set_or_warn(
                &mut spec.grid,
                key,
                value,
                GridMode::parse(&value.unwrap_or("").to_lowercase()),
            ),
            "xmajorgrids" | "ymajorgrids" => {
                if parse_flag(value) == Some(true) && spec.grid == GridMode::None {
                    spec.grid = GridMode::Major;
                }
            }
            "axis-lines" | "axis-lines*" => set_or_warn(
                &mut spec.axis_lines,
                key,
                value,
                value.and_then(|v| AxisLines::parse(&v.to_lowercase())),
            ),
            "axis-equal" | "axis-equal-image" => {
                set_or_warn(&mut spec.axis_equal, key, value, parse_flag(value))
            }
            "legend-pos" | "legend-position" | "legend-anchor" => set_or_warn(
                &mut spec.legend_anchor,
                key,
                value,
                value.and_then(|v| LegendAnchor::parse(&v.to_lowercase())),
            ),
            "domain" => spec.domain = warn_none(key, value, value.and_then(Domain::parse)),
            "samples" => spec.samples = warn_none(key, value, parse_count(value)),
            "axis-type" | "geometry" => set_or_warn(
                &mut spec.geometry,
                key,
                value,
                value.and_then(|v| GeometryKind::parse(&normalize_key(v).replace('-', ""))),
            ),
            "xmode" | "ymode" => match value.map(|v| v.trim().to_lowercase()).as_deref() {
                Some("log") => spec.geometry = spec.geometry.with_log_axis(key == "xmode"),
                Some("normal") | Some("linear") => {}
                _ => tracing::warn!("Ignoring malformed value for `{}`: {:?}", key, value),
            },
            _ => tracing::debug!("Ignoring unknown axis option `{}`", key),
        }
    }
}

/// Keep a parsed optional value, warning when a given value was malformed
fn warn_none<T>(key: &str, value: Option<&str>, parsed: Option<T>) -> Option<T> {
    if parsed.is_none() {
        tracing::warn!("Ignoring malformed value for `{}`: {:?}", key, value);
    }
    parsed
}

/// Plot options that change how the payload is read
#[derive(Debug, Default)]
struct PayloadFlags {
    polar: bool,
}

fn apply_plot_options(series: &mut SeriesDecl, entries: &[OptionEntry]) -> PayloadFlags {
    let mut flags = PayloadFlags::default();
    let style = &mut series.style;
    for entry in entries {
        let key = entry.key.as_str();
        let value = entry.value.as_deref();
        match key {
            "color" | "draw" => {
                style.color = warn_none(key, value, value.and_then(Color::parse)).or(style.color)
            }
            "line-width" => set_or_warn(&mut style.line_width, key, value, value.and_then(parse_length)),
            "mark" => style.marker = value.map(MarkerShape::parse),
            "mark-size" => set_or_warn(&mut style.marker_size, key, value, value.and_then(parse_length)),
            "dash" | "dash-style" | "dash-pattern" => set_or_warn(
                &mut style.dash,
                key,
                value,
                value.and_then(|v| DashStyle::parse(&v.to_lowercase())),
            ),
            "opacity" => set_or_warn(
                &mut style.opacity,
                key,
                value,
                parse_number(value).map(|o| o.clamp(0.0, 1.0)),
            ),
            "smooth" => set_or_warn(&mut style.smooth, key, value, parse_flag(value)),
            "sharp-plot" => style.smooth = false,
            "only-marks" => set_or_warn(&mut style.only_marks, key, value, parse_flag(value)),
            "no-marks" | "no-markers" => set_or_warn(&mut style.no_marks, key, value, parse_flag(value)),
            "domain" => series.domain = warn_none(key, value, value.and_then(Domain::parse)),
            "samples" => series.samples = warn_none(key, value, parse_count(value)),
            "legend" | "label" => series.label = value.map(str::to_string),
            "restrict-x" | "restrict-x-to-domain" => {
                series.restrict_x = warn_none(key, value, value.and_then(Domain::parse))
            }
            "restrict-y" | "restrict-y-to-domain" => {
                series.restrict_y = warn_none(key, value, value.and_then(Domain::parse))
            }
            "each-nth-point" => series.each_nth_point = warn_none(key, value, parse_count(value)),
            "polar" => flags.polar = parse_flag(value).unwrap_or(true),
            "data-cs" => flags.polar = value.map(|v| v.trim() == "polar").unwrap_or(false),
            _ if value.is_none() => apply_plot_flag(style, key),
            _ => tracing::debug!("Ignoring unknown plot option `{}`", key),
        }
    }
    flags
}

/// Bare words: dash names, stroke widths and colors
fn apply_plot_flag(style: &mut SeriesStyle, key: &str) {
    if let Some(dash) = DashStyle::parse(key) {
        style.dash = dash;
    } else if let Some((_, points)) = LINE_WIDTHS.iter().find(|(name, _)| *name == key) {
        style.line_width = points * unit_factor("pt").unwrap_or(1.0);
    } else if let Some(color) = Color::parse(key) {
        style.color = Some(color);
    } else {
        tracing::debug!("Ignoring unknown plot flag `{}`", key);
    }
}

fn apply_table_options(options: &mut TableOptions, entries: &[OptionEntry]) {
    for entry in entries {
        let key = entry.key.as_str();
        let value = entry.value.as_deref();
        match key {
            "header" => match parse_flag(value) {
                Some(flag) => options.header = Some(flag),
                None => tracing::warn!("Ignoring malformed value for `header`: {:?}", value),
            },
            "col-sep" => set_or_warn(
                &mut options.delimiter,
                key,
                value,
                value.and_then(|v| TableDelimiter::parse(&v.to_lowercase())),
            ),
            "x" | "y" | "label" | "meta" => {
                let Some(column) = value.map(ColumnRef::parse) else {
                    tracing::warn!("Missing column for `{}`", key);
                    continue;
                };
                match key {
                    "x" => options.x = column,
                    "y" => options.y = column,
                    _ => options.label = Some(column),
                }
            }
            "x-index" | "y-index" => match parse_count(value) {
                Some(index) if key == "x-index" => options.x = ColumnRef::Index(index),
                Some(index) => options.y = ColumnRef::Index(index),
                None => tracing::warn!("Ignoring malformed value for `{}`: {:?}", key, value),
            },
            _ => tracing::debug!("Ignoring unknown table option `{}`", key),
        }
    }
}

// =============================================================================
// Scanner
// =============================================================================

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> PlotError {
        PlotError::parse(message, self.input, self.pos)
    }

    /// Skip whitespace and `%` line comments
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with('%') {
                let line_end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += line_end;
            } else {
                break;
            }
        }
    }

    /// Consume `literal` if the input continues with it
    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume a whole word; `plot` does not match `plotting`
    fn eat_word(&mut self, word: &str) -> bool {
        let rest = self.rest();
        if !rest.starts_with(word) {
            return false;
        }
        let boundary = rest[word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '-' || c == '_'));
        if boundary {
            self.pos += word.len();
        }
        boundary
    }

    /// Consume a bracketed region and return its inside
    fn delimited(&mut self, open: char, close: char) -> PlotResult<&'a str> {
        if self.peek() != Some(open) {
            return Err(self.error(format!("expected `{}`", open)));
        }
        let start = self.pos;
        let mut depth = 0usize;
        for (i, c) in self.rest().char_indices() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    let inner = &self.input[start + open.len_utf8()..start + i];
                    self.pos = start + i + close.len_utf8();
                    return Ok(inner);
                }
            }
        }
        Err(PlotError::parse(
            format!("unterminated `{}`", open),
            self.input,
            start,
        ))
    }

    /// Optional `[...]` option list
    fn options(&mut self) -> PlotResult<Vec<OptionEntry>> {
        self.skip_trivia();
        if self.peek() == Some('[') {
            Ok(parse_options(self.delimited('[', ']')?))
        } else {
            Ok(Vec::new())
        }
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Location of the opening marker of the axis block
struct BlockStart {
    offset: usize,
    body: usize,
    /// Environment name for the LaTeX spelling
    environment: Option<String>,
}

fn find_block_start(input: &str) -> Option<BlockStart> {
    let plain = input.find("begin-axis").map(|offset| BlockStart {
        offset,
        body: offset + "begin-axis".len(),
        environment: None,
    });

    let mut latex = None;
    let mut search = 0;
    while let Some(found) = input[search..].find("\\begin{") {
        let offset = search + found;
        let name_start = offset + "\\begin{".len();
        if let Some(close) = input[name_start..].find('}') {
            let name = input[name_start..name_start + close].trim();
            if name.ends_with("axis") {
                latex = Some(BlockStart {
                    offset,
                    body: name_start + close + 1,
                    environment: Some(name.to_string()),
                });
                break;
            }
        }
        search = name_start;
    }

    match (plain, latex) {
        (Some(a), Some(b)) => Some(if a.offset <= b.offset { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Parse a chart description
pub fn parse(input: &str) -> PlotResult<ChartSpec> {
    let start = find_block_start(input)
        .ok_or_else(|| PlotError::parse("missing axis block", input, 0))?;

    let mut spec = ChartSpec::default();
    if let Some(environment) = &start.environment {
        if let Some(geometry) = GeometryKind::parse(environment) {
            spec.geometry = geometry;
        }
    }
    let end_marker = start
        .environment
        .as_ref()
        .map(|name| format!("\\end{{{}}}", name));

    let mut scanner = Scanner::new(input, start.body);
    let options = scanner.options()?;
    apply_axis_options(&mut spec, &options);

    loop {
        scanner.skip_trivia();
        while scanner.eat(";") {
            scanner.skip_trivia();
        }
        if scanner.at_end() {
            return Err(PlotError::parse(
                "unterminated axis block",
                input,
                start.offset,
            ));
        }

        let closes = scanner.eat_word("end-axis")
            || end_marker.as_deref().is_some_and(|marker| scanner.eat(marker));
        if closes {
            break;
        }

        if scanner.eat_word("\\addplot") || scanner.eat_word("addplot") || scanner.eat_word("plot") {
            let series = parse_plot(&mut scanner)?;
            spec.series.push(series);
        } else if scanner.eat_word("\\addlegendentry")
            || scanner.eat_word("addlegendentry")
            || scanner.eat_word("legend-entry")
        {
            scanner.options()?;
            scanner.skip_trivia();
            let label = unbrace(scanner.delimited('{', '}')?).to_string();
            match spec.series.last_mut() {
                Some(series) => series.label = Some(label),
                None => tracing::warn!("Legend entry `{}` precedes every plot", label),
            }
        } else if scanner.eat_word("\\legend") || scanner.eat_word("legend") {
            scanner.skip_trivia();
            let labels = scanner.delimited('{', '}')?;
            let labels: Vec<&str> = split_top_level(labels, ',').into_iter().map(unbrace).collect();
            if labels.len() > spec.series.len() {
                tracing::warn!(
                    "{} legend labels for {} series",
                    labels.len(),
                    spec.series.len()
                );
            }
            for (series, label) in spec.series.iter_mut().zip(labels) {
                series.label = Some(label.to_string());
            }
        } else {
            return Err(scanner.error("unexpected statement"));
        }
    }

    tracing::debug!(
        "Parsed chart: {} series, geometry {:?}",
        spec.series.len(),
        spec.geometry
    );
    Ok(spec)
}

fn parse_plot(scanner: &mut Scanner) -> PlotResult<SeriesDecl> {
    scanner.eat("+");
    let options = scanner.options()?;
    scanner.skip_trivia();

    let source = if scanner.peek() == Some('{') {
        let expression = scanner.delimited('{', '}')?.trim().to_string();
        SeriesSource::Function { expression }
    } else if scanner.eat_word("expression") {
        scanner.skip_trivia();
        let expression = scanner.delimited('{', '}')?.trim().to_string();
        SeriesSource::Function { expression }
    } else if scanner.eat_word("coordinates") {
        scanner.skip_trivia();
        let offset = scanner.pos + 1;
        let body = scanner.delimited('{', '}')?;
        let points = parse_coordinates(body, scanner.input, offset)?;
        SeriesSource::Coordinates { points }
    } else if scanner.eat_word("table") {
        let mut table = TableOptions::default();
        apply_table_options(&mut table, &scanner.options()?);
        scanner.skip_trivia();
        let text = scanner.delimited('{', '}')?;
        SeriesSource::Table {
            text: text.trim_matches('\n').to_string(),
            options: table,
        }
    } else if scanner.peek() == Some('(') {
        let offset = scanner.pos;
        let inner = scanner.delimited('(', ')')?;
        match split_top_level(inner, ',').as_slice() {
            [x, y] => SeriesSource::Parametric {
                x_expression: unbrace(x).to_string(),
                y_expression: unbrace(y).to_string(),
            },
            _ => {
                return Err(PlotError::parse(
                    "parametric plot needs exactly two expressions",
                    scanner.input,
                    offset,
                ))
            }
        }
    } else {
        return Err(scanner.error("expected plot payload"));
    };

    let mut series = SeriesDecl::new(source);
    let flags = apply_plot_options(&mut series, &options);
    if flags.polar {
        if let SeriesSource::Function { expression } = &series.source {
            series.source = SeriesSource::Polar {
                expression: expression.clone(),
            };
        }
    }
    Ok(series)
}

/// Parse `(x,y) (x,y) ...`; unparseable numbers become NaN
fn parse_coordinates(body: &str, input: &str, offset: usize) -> PlotResult<Vec<(f64, f64)>> {
    let mut points = Vec::new();
    let mut rest = body;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let at = offset + (body.len() - trimmed.len());
        if !trimmed.starts_with('(') {
            return Err(PlotError::parse("malformed coordinate list", input, at));
        }
        let Some(close) = trimmed.find(')') else {
            return Err(PlotError::parse("unterminated coordinate", input, at));
        };
        let pair = &trimmed[1..close];
        let Some((x, y)) = pair.split_once(',') else {
            return Err(PlotError::parse("coordinate needs two values", input, at));
        };
        let number = |text: &str| unbrace(text).parse::<f64>().unwrap_or(f64::NAN);
        points.push((number(x), number(y)));
        rest = &trimmed[close + 1..];
    }
    Ok(points)
}
