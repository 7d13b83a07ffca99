use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(author, version, about = "Render declarative chart descriptions", long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Engine configuration file (JSON). Falls back to the defaults when
    /// the file cannot be read or parsed.
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Render a chart description.
    Render {
        /// Chart description file, or `-` for standard input.
        input: PathBuf,

        /// Output file. Standard output when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width. Defaults to the chart's own width, then 640.
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height. Defaults to the chart's own height, then 480.
        #[arg(long)]
        height: Option<f64>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = RenderFormat::Svg)]
        format: RenderFormat,
    },
    /// Print a statistical summary of every series.
    Stats {
        /// Chart description file, or `-` for standard input.
        input: PathBuf,
    },
    /// Write the points of one series.
    Export {
        /// Chart description file, or `-` for standard input.
        input: PathBuf,

        /// Index of the series to export.
        #[arg(short, long, default_value_t = 0)]
        series: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Smooth y with a centered moving average over this many points.
        #[arg(long)]
        moving_average: Option<usize>,

        /// Output file. Standard output when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum RenderFormat {
    Svg,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ExportFormat {
    Csv,
    Tsv,
    Json,
}
