//! Series data production
//!
//! Builds ordered point sequences from every source kind: explicit
//! coordinates, delimited tables, and sampled function, parametric and
//! polar expressions.

use crate::config::EngineConfig;
use crate::error::{PlotError, PlotResult};
use crate::model::{ChartSpec, DataPoint, Domain, SeriesDecl, SeriesSource};
use crate::resample::uniform_indices;
use crate::table::parse_table;
use expr::{Bindings, Expression, ParseOptions};
use std::f64::consts::TAU;

/// Parameter domain for polar curves when none is declared
pub const DEFAULT_POLAR_DOMAIN: Domain = Domain { lo: 0.0, hi: TAU };

const POLAR_VARIABLES: [&str; 4] = ["t", "θ", "theta", "x"];

/// Points produced for one series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesData {
    pub points: Vec<DataPoint>,
    /// Per-point labels; empty unless a table label column was selected
    pub labels: Vec<Option<String>>,
}

impl SeriesData {
    pub fn from_points(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            labels: Vec::new(),
        }
    }

    pub fn valid_count(&self) -> usize {
        self.points.iter().filter(|p| p.valid).count()
    }
}

/// Produces point data for the series of one chart
pub struct SeriesProducer<'a> {
    spec: &'a ChartSpec,
    config: &'a EngineConfig,
}

impl<'a> SeriesProducer<'a> {
    pub fn new(spec: &'a ChartSpec, config: &'a EngineConfig) -> Self {
        Self { spec, config }
    }

    /// Produce the points of the series at `index`.
    ///
    /// Fails with a series error when the source cannot be read or
    /// compiled, or yields no valid point at all.
    pub fn produce(&self, index: usize, series: &SeriesDecl) -> PlotResult<SeriesData> {
        let data = self
            .produce_raw(series)
            .map_err(|e| PlotError::series(index, e.to_string()))?;
        let data = apply_restrictions(data, series);
        tracing::trace!(
            "Series {} ({}): {} points, {} valid",
            index,
            series.source.kind_name(),
            data.points.len(),
            data.valid_count()
        );
        if data.valid_count() == 0 {
            return Err(PlotError::series(index, "no valid points"));
        }
        Ok(data)
    }

    fn produce_raw(&self, series: &SeriesDecl) -> PlotResult<SeriesData> {
        let samples = self.config.clamp_samples(self.spec.samples_for(series));
        match &series.source {
            SeriesSource::Coordinates { points } => {
                Ok(SeriesData::from_points(coordinate_points(points)))
            }
            SeriesSource::Table { text, options } => {
                let table = parse_table(text, options)?;
                let labels = if options.label.is_some() {
                    table.rows.iter().map(|row| row.label.clone()).collect()
                } else {
                    Vec::new()
                };
                Ok(SeriesData {
                    points: table.points(),
                    labels,
                })
            }
            SeriesSource::Function { expression } => {
                let compiled = self.compile(expression, &["x"])?;
                let domain = self.spec.domain_for(series);
                let points = sample_function(&compiled, domain, samples);
                Ok(SeriesData::from_points(insert_pole_gaps(
                    &compiled,
                    points,
                    self.config.evaluator.pole_bisections,
                )))
            }
            SeriesSource::Parametric {
                x_expression,
                y_expression,
            } => {
                let x = self.compile(x_expression, &["t"])?;
                let y = self.compile(y_expression, &["t"])?;
                let domain = self.spec.domain_for(series);
                Ok(SeriesData::from_points(sample_parametric(
                    &x, &y, domain, samples,
                )))
            }
            SeriesSource::Polar { expression } => {
                let r = self.compile(expression, &POLAR_VARIABLES)?;
                let domain = series
                    .domain
                    .or(self.spec.domain)
                    .unwrap_or(DEFAULT_POLAR_DOMAIN);
                Ok(SeriesData::from_points(sample_polar(&r, domain, samples)))
            }
        }
    }

    fn compile(&self, source: &str, variables: &[&str]) -> PlotResult<Expression> {
        let options = ParseOptions::default()
            .with_variables(variables)
            .with_max_depth(self.config.evaluator.max_depth);
        Expression::compile_with(source, options, self.config.evaluator.limits()).map_err(
            |error| PlotError::Expression {
                source_text: source.to_string(),
                error,
            },
        )
    }
}

/// Explicit coordinates, each validated as finite
pub fn coordinate_points(points: &[(f64, f64)]) -> Vec<DataPoint> {
    points.iter().map(|&(x, y)| DataPoint::new(x, y)).collect()
}

/// `samples` evenly spaced parameter values covering `domain`
pub fn sample_positions(domain: Domain, samples: usize) -> Vec<f64> {
    let samples = samples.max(2);
    let last = (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            if i == samples - 1 {
                domain.hi
            } else {
                domain.lo + domain.span() * i as f64 / last
            }
        })
        .collect()
}

fn evaluate_at(expression: &Expression, variables: &[&str], value: f64) -> Option<f64> {
    let mut bindings = Bindings::new();
    for name in variables {
        bindings.set(name, value);
    }
    let sample = expression.sample(&bindings);
    sample.valid.then_some(sample.value)
}

/// Sample `y = f(x)` uniformly; failed samples become explicit gaps
pub fn sample_function(expression: &Expression, domain: Domain, samples: usize) -> Vec<DataPoint> {
    sample_positions(domain, samples)
        .into_iter()
        .map(|x| match evaluate_at(expression, &["x"], x) {
            Some(y) => DataPoint::new(x, y),
            None => DataPoint::invalid(x),
        })
        .collect()
}

/// Sample `x(t)`, `y(t)` uniformly over the parameter domain
pub fn sample_parametric(
    x_expression: &Expression,
    y_expression: &Expression,
    domain: Domain,
    samples: usize,
) -> Vec<DataPoint> {
    sample_positions(domain, samples)
        .into_iter()
        .map(|t| {
            match (
                evaluate_at(x_expression, &["t"], t),
                evaluate_at(y_expression, &["t"], t),
            ) {
                (Some(x), Some(y)) => DataPoint::new(x, y),
                _ => DataPoint::invalid(t),
            }
        })
        .collect()
}

/// Sample `r(θ)` uniformly and convert to Cartesian; negative radii are
/// invalid
pub fn sample_polar(expression: &Expression, domain: Domain, samples: usize) -> Vec<DataPoint> {
    sample_positions(domain, samples)
        .into_iter()
        .map(|theta| match evaluate_at(expression, &POLAR_VARIABLES, theta) {
            Some(r) if r >= 0.0 => DataPoint::new(r * theta.cos(), r * theta.sin()),
            _ => DataPoint::invalid(theta),
        })
        .collect()
}

/// Insert explicit gaps at poles between uniform samples.
///
/// A sign change between two consecutive valid samples is bisected. If
/// a probe fails, or the magnitudes at the bracket grow instead of
/// shrinking, the bracket holds a pole and an invalid point is inserted
/// at its midpoint.
pub fn insert_pole_gaps(
    expression: &Expression,
    points: Vec<DataPoint>,
    bisections: usize,
) -> Vec<DataPoint> {
    if bisections == 0 || points.len() < 2 {
        return points;
    }
    let f = |x: f64| evaluate_at(expression, &["x"], x);

    let mut result = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        result.push(*point);
        let Some(next) = points.get(i + 1) else {
            continue;
        };
        if !(point.valid && next.valid) || point.y * next.y >= 0.0 {
            continue;
        }

        let (mut lo, mut hi) = (point.x, next.x);
        let (mut f_lo, mut f_hi) = (point.y, next.y);
        let mut pole = false;
        for _ in 0..bisections {
            let mid = (lo + hi) / 2.0;
            match f(mid) {
                None => {
                    pole = true;
                    break;
                }
                Some(value) if value * f_lo > 0.0 => {
                    lo = mid;
                    f_lo = value;
                }
                Some(value) => {
                    hi = mid;
                    f_hi = value;
                }
            }
        }
        let start = point.y.abs().max(next.y.abs());
        if pole || f_lo.abs().max(f_hi.abs()) > start {
            tracing::trace!("Pole near x = {}", (lo + hi) / 2.0);
            result.push(DataPoint::invalid((lo + hi) / 2.0));
        }
    }
    result
}

/// Apply `restrict-x`, `restrict-y` and `each-nth-point`
pub fn apply_restrictions(mut data: SeriesData, series: &SeriesDecl) -> SeriesData {
    if series.restrict_x.is_some() || series.restrict_y.is_some() {
        for point in data.points.iter_mut() {
            let outside_x = series.restrict_x.is_some_and(|d| !d.contains(point.x));
            let outside_y = series.restrict_y.is_some_and(|d| !d.contains(point.y));
            if outside_x || outside_y {
                *point = point.invalidated();
            }
        }
    }
    if let Some(n) = series.each_nth_point.filter(|n| *n > 1) {
        let keep = uniform_indices(&data.points, n);
        if !data.labels.is_empty() {
            data.labels = keep
                .iter()
                .map(|&i| data.labels.get(i).cloned().flatten())
                .collect();
        }
        data.points = keep.iter().map(|&i| data.points[i]).collect();
    }
    data
}
