//! Chart manager
//!
//! Owns the current chart description and drives a render: produce the
//! series, resolve the data range, build the transform, then compose
//! axes, series and legend into one primitive tree.
//!
//! The manager has two states. It starts unloaded; a successful
//! [`ChartManager::load_source`] replaces the chart wholesale and a
//! failed one leaves the previous state untouched. Renders take a snapshot
//! of the chart up front, so a concurrent load never tears a
//! render in progress.

use crate::axis::AxisComposer;
use crate::cache::{hash_source, RenderCache, RenderKey};
use crate::config::EngineConfig;
use crate::coords::{cartesian_to_polar, DataRange, PlotArea, Transform};
use crate::dsl;
use crate::error::PlotResult;
use crate::legend::{LegendComposer, LegendEntry};
use crate::model::{ChartSpec, DataPoint, GeometryKind, DEFAULT_DOMAIN};
use crate::primitives::{Group, Point, Primitive, RenderedChart, TextAnchor, TextBaseline};
use crate::render::SeriesRenderer;
use crate::series::{SeriesData, SeriesProducer};
use std::sync::{Arc, PoisonError, RwLock};

/// A successfully parsed chart description
#[derive(Debug, Clone)]
struct LoadedChart {
    spec: Arc<ChartSpec>,
    source_hash: u64,
}

/// Chart manager
#[derive(Debug, Default)]
pub struct ChartManager {
    config: EngineConfig,
    loaded: RwLock<Option<LoadedChart>>,
    /// Data range resolved by the most recent render
    last_range: RwLock<Option<DataRange>>,
}

impl ChartManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse `text` and, on success, replace the current specification
    pub fn load_source(&self, text: &str) -> PlotResult<Arc<ChartSpec>> {
        let spec = match dsl::parse(text) {
            Ok(spec) => Arc::new(spec),
            Err(e) => {
                tracing::warn!("Keeping previous chart, load failed: {}", e);
                return Err(e);
            }
        };
        let loaded = LoadedChart {
            spec: Arc::clone(&spec),
            source_hash: hash_source(text),
        };
        *self.loaded.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded);
        *self.last_range.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("Loaded chart with {} series", spec.series.len());
        Ok(spec)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Current specification, if loaded
    pub fn spec(&self) -> Option<Arc<ChartSpec>> {
        self.snapshot().map(|loaded| loaded.spec)
    }

    /// Hash of the source text the current specification was parsed from
    pub fn source_hash(&self) -> Option<u64> {
        self.snapshot().map(|loaded| loaded.source_hash)
    }

    /// Data range resolved by the most recent render
    pub fn last_range(&self) -> Option<DataRange> {
        *self.last_range.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Option<LoadedChart> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Render the current chart, or `None` when nothing is loaded
    pub fn render(&self, width: f64, height: f64) -> Option<RenderedChart> {
        let spec = self.spec()?;
        let (chart, range) = render_spec(&spec, &self.config, width, height);
        *self.last_range.write().unwrap_or_else(PoisonError::into_inner) = Some(range);
        Some(chart)
    }

    /// Render through a caller-owned cache
    pub fn render_cached(
        &self,
        cache: &mut RenderCache,
        width: f64,
        height: f64,
    ) -> Option<Arc<RenderedChart>> {
        let loaded = self.snapshot()?;
        let key = RenderKey::new(loaded.source_hash, width, height);
        cache.get_or_render(key, || {
            let (chart, range) = render_spec(&loaded.spec, &self.config, width, height);
            *self.last_range.write().unwrap_or_else(PoisonError::into_inner) = Some(range);
            Some(chart)
        })
    }

    /// Point data of every series, in declaration order
    pub fn series_data(&self) -> Option<Vec<PlotResult<SeriesData>>> {
        let spec = self.spec()?;
        Some(produce_all(&spec, &self.config))
    }
}

/// Produce every series of `spec`; failures stay in place as errors
pub fn produce_all(spec: &ChartSpec, config: &EngineConfig) -> Vec<PlotResult<SeriesData>> {
    let producer = SeriesProducer::new(spec, config);
    spec.series
        .iter()
        .enumerate()
        .map(|(index, series)| producer.produce(index, series))
        .collect()
}

/// Render a specification at the given canvas size.
///
/// Returns the chart and the resolved data range. A series that cannot
/// produce data is skipped and reported in the chart's warnings.
pub fn render_spec(
    spec: &ChartSpec,
    config: &EngineConfig,
    width: f64,
    height: f64,
) -> (RenderedChart, DataRange) {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let area = PlotArea::from_canvas(width, height, &config.margins);

    let mut warnings = Vec::new();
    let mut produced: Vec<(usize, SeriesData)> = Vec::new();
    for (index, result) in produce_all(spec, config).into_iter().enumerate() {
        match result {
            Ok(data) => produced.push((index, data)),
            Err(e) => {
                tracing::warn!("{}", e);
                warnings.push(e.to_string());
            }
        }
    }

    let range = resolve_range(spec, config, &area, &produced);
    let transform = Transform::new(spec.geometry, range, area);
    tracing::debug!(
        "Rendering {}x{} with range x [{}, {}] y [{}, {}]",
        width,
        height,
        transform.range().xmin,
        transform.range().xmax,
        transform.range().ymin,
        transform.range().ymax
    );

    let axis = AxisComposer::new(config).compose(&transform, spec);

    let renderer = SeriesRenderer::from_config(config);
    let mut series_groups = Vec::with_capacity(produced.len());
    let mut legend_entries = Vec::new();
    for (index, data) in &produced {
        let Some(decl) = spec.series.get(*index) else {
            continue;
        };
        let color = decl
            .style
            .color
            .unwrap_or_else(|| config.palette_color(*index));
        let device: Vec<Option<Point>> = data
            .points
            .iter()
            .map(|p| to_device(&transform, p))
            .collect();

        let mut group = renderer
            .render(&device, &decl.style, color)
            .into_group(format!("series-{}", index));
        for (point, label) in device.iter().zip(&data.labels) {
            if let (Some(point), Some(label)) = (point, label) {
                group.push(Primitive::text(
                    Point::new(point.x, point.y - config.axis.label_offset),
                    label.clone(),
                    config.fonts.tick_label,
                    color,
                    TextAnchor::Middle,
                    TextBaseline::Bottom,
                ));
            }
        }
        series_groups.push(group);

        if let Some(label) = &decl.label {
            legend_entries.push(LegendEntry {
                label: label.clone(),
                color: color.with_opacity(decl.style.opacity),
                dash: decl.style.dash,
                line_width: decl.style.line_width,
                marker: decl.style.effective_marker(),
                show_line: !decl.style.only_marks,
            });
        }
    }

    let legend = LegendComposer::new(config).layout(&legend_entries, spec.legend_anchor, &area);

    let mut root = Group::new("chart");
    root.push_group(axis.grid);
    root.push_group(axis.axes);
    root.push_group(axis.ticks);
    for group in series_groups {
        root.push_group(group);
    }
    root.push_group(axis.labels);
    if let Some(legend) = legend {
        root.push_group(legend);
    }

    let chart = RenderedChart {
        width,
        height,
        root,
        warnings,
    };
    (chart, transform.range())
}

/// Device position of a data point; `None` is a gap
fn to_device(transform: &Transform, point: &DataPoint) -> Option<Point> {
    if !point.valid {
        return None;
    }
    match transform.geometry() {
        GeometryKind::Polar => {
            let (radius, angle) = cartesian_to_polar(point.x, point.y);
            Some(transform.to_device(radius, angle))
        }
        GeometryKind::Logarithmic { log_x, log_y } => {
            if (log_x && point.x <= 0.0) || (log_y && point.y <= 0.0) {
                None
            } else {
                Some(transform.to_device(point.x, point.y))
            }
        }
        GeometryKind::Cartesian => Some(transform.to_device(point.x, point.y)),
    }
}

/// Resolve the data range: tight bounds around the produced data, padded,
/// then overridden by every explicit bound
fn resolve_range(
    spec: &ChartSpec,
    config: &EngineConfig,
    area: &PlotArea,
    produced: &[(usize, SeriesData)],
) -> DataRange {
    let points = produced.iter().flat_map(|(_, data)| data.points.iter());
    match spec.geometry {
        GeometryKind::Polar => resolve_polar_range(spec, config, points),
        geometry => {
            let (log_x, log_y) = (geometry.log_x(), geometry.log_y());
            let usable = points.filter(|p| (!log_x || p.x > 0.0) && (!log_y || p.y > 0.0));
            let auto = match DataRange::from_points(usable) {
                Some(tight) => tight.normalized().padded(config.auto_range_padding, log_x, log_y),
                None => fallback_range(spec, log_x, log_y),
            };
            let mut range = DataRange::new(
                spec.xmin.unwrap_or(auto.xmin),
                spec.xmax.unwrap_or(auto.xmax),
                spec.ymin.unwrap_or(auto.ymin),
                spec.ymax.unwrap_or(auto.ymax),
            )
            .normalized();
            if spec.axis_equal && geometry == GeometryKind::Cartesian {
                range = range.equalized(area);
            }
            range
        }
    }
}

/// Range used when no series produced a usable point
fn fallback_range(spec: &ChartSpec, log_x: bool, log_y: bool) -> DataRange {
    let domain = spec.domain.unwrap_or(DEFAULT_DOMAIN);
    let (xmin, xmax) = if log_x { (1.0, 10.0) } else { (domain.lo, domain.hi) };
    let (ymin, ymax) = if log_y { (1.0, 10.0) } else { (-1.0, 1.0) };
    DataRange::new(xmin, xmax, ymin, ymax)
}

/// Polar range as (radius, angle in degrees).
///
/// `ymin`/`ymax` bound the radius, which otherwise runs from zero to the
/// padded largest radius; `xmin`/`xmax` bound the angle, otherwise a full
/// turn.
fn resolve_polar_range<'a>(
    spec: &ChartSpec,
    config: &EngineConfig,
    points: impl Iterator<Item = &'a DataPoint>,
) -> DataRange {
    let largest = points
        .filter(|p| p.valid)
        .map(|p| p.x.hypot(p.y))
        .fold(0.0, f64::max);
    let auto_max = if largest > 0.0 {
        largest * (1.0 + config.auto_range_padding)
    } else {
        1.0
    };
    DataRange::new(
        spec.ymin.unwrap_or(0.0),
        spec.ymax.unwrap_or(auto_max),
        spec.xmin.unwrap_or(0.0),
        spec.xmax.unwrap_or(360.0),
    )
    .normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotError;

    #[test]
    fn test_unloaded_renders_nothing() {
        let manager = ChartManager::new();
        assert!(!manager.is_loaded());
        assert!(manager.render(400.0, 300.0).is_none());
        assert!(manager.spec().is_none());
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let manager = ChartManager::new();
        assert!(matches!(
            manager.load_source("plot{x}"),
            Err(PlotError::Parse { .. })
        ));
        assert!(!manager.is_loaded());

        manager
            .load_source("begin-axis plot{x} end-axis")
            .unwrap();
        let hash = manager.source_hash();
        assert!(manager.load_source("begin-axis plot{x").is_err());
        assert!(manager.is_loaded());
        assert_eq!(manager.source_hash(), hash);
        assert_eq!(manager.spec().unwrap().series.len(), 1);
    }

    #[test]
    fn test_paint_order() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis plot{x} legend-entry{a} plot{x^2} end-axis")
            .unwrap();
        let chart = manager.render(400.0, 300.0).unwrap();
        assert_eq!(
            chart.root.child_names(),
            vec!["grid", "axes", "ticks", "series-0", "series-1", "axis-labels", "legend"]
        );
    }

    #[test]
    fn test_no_labels_no_legend() {
        let manager = ChartManager::new();
        manager.load_source("begin-axis plot{x} end-axis").unwrap();
        let chart = manager.render(400.0, 300.0).unwrap();
        assert!(chart.root.child("legend").is_none());
    }

    #[test]
    fn test_auto_range_is_padded() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis plot coordinates {(0,0) (10,20)} end-axis")
            .unwrap();
        manager.render(400.0, 300.0).unwrap();
        let range = manager.last_range().unwrap();
        assert!((range.xmin + 1.0).abs() < 1e-9);
        assert!((range.xmax - 11.0).abs() < 1e-9);
        assert!((range.ymin + 2.0).abs() < 1e-9);
        assert!((range.ymax - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_bounds_override() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis[xmin=-5, xmax=5, ymin=-2] plot{sin(x)} end-axis")
            .unwrap();
        manager.render(400.0, 300.0).unwrap();
        let range = manager.last_range().unwrap();
        assert_eq!((range.xmin, range.xmax, range.ymin), (-5.0, 5.0, -2.0));
        assert!(range.ymax > 1.0);
    }

    #[test]
    fn test_bad_series_is_skipped_with_warning() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis plot{launch(x)} plot{x} end-axis")
            .unwrap();
        let chart = manager.render(400.0, 300.0).unwrap();
        assert_eq!(chart.warnings.len(), 1);
        assert!(chart.series_group(0).is_none());
        assert!(chart.series_group(1).is_some());
    }

    #[test]
    fn test_polar_range_is_radius_then_angle() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis[axis type=polar] plot[polar]{2} end-axis")
            .unwrap();
        manager.render(400.0, 400.0).unwrap();
        let range = manager.last_range().unwrap();
        assert_eq!(range.xmin, 0.0);
        assert!((range.xmax - 2.2).abs() < 1e-9);
        assert_eq!((range.ymin, range.ymax), (0.0, 360.0));
    }

    #[test]
    fn test_log_axis_drops_nonpositive_points() {
        let manager = ChartManager::new();
        manager
            .load_source("begin-axis[ymode=log] plot coordinates {(0,-1) (1,1) (2,100)} end-axis")
            .unwrap();
        manager.render(400.0, 300.0).unwrap();
        let range = manager.last_range().unwrap();
        assert!(range.ymin > 0.0);
    }

    #[test]
    fn test_render_cached() {
        let manager = ChartManager::new();
        manager.load_source("begin-axis plot{x} end-axis").unwrap();
        let mut cache = RenderCache::from_config(manager.config());
        let first = manager.render_cached(&mut cache, 300.0, 200.0).unwrap();
        let second = manager.render_cached(&mut cache, 300.0, 200.0).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
    }
}
