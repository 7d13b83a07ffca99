//! Plot - Declarative chart engine
//!
//! This crate provides:
//! - A parser for the chart description language (`begin-axis ... end-axis`)
//! - Series production from coordinates, delimited tables and sampled
//!   function, parametric and polar expressions
//! - Cartesian, polar and logarithmic coordinate transforms
//! - Tick planning and axis, grid and legend composition
//! - Path and marker rendering with gap handling and smoothing
//! - A device-independent primitive tree, with SVG serialization
//! - Point utilities: statistics, filtering, resampling, export
//!
//! [`ChartManager`] ties everything together:
//!
//! ```
//! use plot::ChartManager;
//!
//! let manager = ChartManager::new();
//! manager
//!     .load_source("begin-axis[xmin=-5,xmax=5] plot{sin(x)} end-axis")
//!     .unwrap();
//! let chart = manager.render(640.0, 480.0).unwrap();
//! assert!(chart.series_group(0).is_some());
//! ```

pub mod axis;
pub mod cache;
pub mod config;
pub mod coords;
pub mod dsl;
mod error;
pub mod export;
pub mod legend;
pub mod manager;
pub mod markers;
mod model;
pub mod primitives;
pub mod render;
pub mod resample;
pub mod series;
pub mod stats;
pub mod svg;
pub mod table;
pub mod ticks;

pub use cache::{RenderCache, RenderKey};
pub use config::EngineConfig;
pub use coords::{DataRange, PlotArea, Transform};
pub use dsl::parse;
pub use error::*;
pub use export::{export_delimited, export_json};
pub use manager::{render_spec, ChartManager};
pub use model::*;
pub use primitives::{Group, Point, Primitive, RenderedChart};
pub use series::SeriesData;
pub use stats::{summarize, Summary};
pub use ticks::{ticks, Tick};
