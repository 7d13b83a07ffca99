mod cli;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ExportFormat, RenderFormat};
use plot::resample::moving_average;
use plot::{
    export_delimited, export_json, summarize, ChartManager, ChartSpec, EngineConfig, RenderCache,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_WIDTH: f64 = 640.0;
const DEFAULT_HEIGHT: f64 = 480.0;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_or_default(path),
        None => EngineConfig::default(),
    };
    let manager = ChartManager::with_config(config);

    match cli.command {
        Commands::Render {
            input,
            output,
            width,
            height,
            format,
        } => {
            let spec = load(&manager, &input)?;
            let width = width.or(spec.width).unwrap_or(DEFAULT_WIDTH);
            let height = height.or(spec.height).unwrap_or(DEFAULT_HEIGHT);
            let mut cache = RenderCache::from_config(manager.config());
            let chart = manager
                .render_cached(&mut cache, width, height)
                .context("No chart loaded")?;
            let text = match format {
                RenderFormat::Svg => plot::svg::to_svg(&chart),
                RenderFormat::Json => serde_json::to_string_pretty(chart.as_ref())
                    .context("Failed to serialize chart")?,
            };
            write_output(output.as_deref(), &text)
        }
        Commands::Stats { input } => {
            let spec = load(&manager, &input)?;
            let series = manager.series_data().context("No chart loaded")?;
            println!(
                "{:>6}  {:<16} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "series", "label", "count", "mean", "median", "std", "min", "max", "q1", "q3"
            );
            for (index, result) in series.into_iter().enumerate() {
                let label = spec
                    .series
                    .get(index)
                    .and_then(|s| s.label.as_deref())
                    .unwrap_or("-");
                match result.ok().and_then(|data| summarize(&data.points)) {
                    Some(s) => println!(
                        "{:>6}  {:<16} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                        index, label, s.count, s.mean, s.median, s.std_dev, s.min, s.max, s.q1, s.q3
                    ),
                    None => println!("{:>6}  {:<16} {:>6}", index, label, 0),
                }
            }
            Ok(())
        }
        Commands::Export {
            input,
            series,
            format,
            moving_average: window,
            output,
        } => {
            load(&manager, &input)?;
            let mut all = manager.series_data().context("No chart loaded")?;
            if series >= all.len() {
                bail!("Series {} does not exist ({} declared)", series, all.len());
            }
            let data = all.swap_remove(series)?;
            let points = match window {
                Some(window) => moving_average(&data.points, window),
                None => data.points,
            };
            let text = match format {
                ExportFormat::Csv => export_delimited(&points, b',')?,
                ExportFormat::Tsv => export_delimited(&points, b'\t')?,
                ExportFormat::Json => export_json(&points)?,
            };
            write_output(output.as_deref(), &text)
        }
    }
}

/// Read and load a chart description
fn load(manager: &ChartManager, input: &Path) -> Result<Arc<ChartSpec>> {
    let source = read_input(input)?;
    let spec = manager
        .load_source(&source)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    tracing::debug!(
        "Loaded {} with {} series",
        input.display(),
        spec.series.len()
    );
    Ok(spec)
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        Ok(source)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
    }
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
