//! xtalk CLI: Optical crosstalk analysis for scintillator-cube arrays.
//!
//! Reads a directory of simulated event tables, accumulates crosstalk
//! statistics and writes plots plus a CSV/JSON summary.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use xtalk_core::{DetectorSpan, HistogramConfig};
use xtalk_io::{write_summaries, AddressMode, AnalysisConfig, AnalysisRun, InputFormat, RunSummary};
use xtalk_plot::{ImageFormat, Renderer};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Core(#[from] xtalk_core::Error),

    #[error("{0}")]
    Io(#[from] xtalk_io::Error),

    #[error("rendering failed: {0}")]
    Plot(#[from] xtalk_plot::Error),
}

/// Cell addressing mode.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// One file per cell, named root_X<n>_Y<n>
    Point,
    /// Extended beam, cell from the entry/exit planes (requires --grid)
    #[value(alias = "plane")]
    Beam,
}

impl From<Mode> for AddressMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Point => AddressMode::Point,
            Mode::Beam => AddressMode::Beam,
        }
    }
}

/// Image format of the plots.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

/// Event table format of the input files.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Input {
    /// One JSON object per line (*.jsonl)
    Jsonl,
    /// HDF5 compound dataset `cube` (*.h5)
    H5,
}

impl From<Input> for InputFormat {
    fn from(input: Input) -> Self {
        match input {
            Input::Jsonl => InputFormat::JsonLines,
            Input::H5 => InputFormat::Hdf5,
        }
    }
}

/// Optical crosstalk analysis for simulated scintillator-cube arrays.
#[derive(Parser, Debug)]
#[command(name = "xtalk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the simulation output files
    input: PathBuf,

    /// Cell addressing mode
    #[arg(short, long, value_enum)]
    mode: Mode,

    /// Grid side length (cells per axis); required in beam mode
    #[arg(short, long)]
    grid: Option<u32>,

    /// Output directory for plots and summaries
    #[arg(short, long, default_value = "xtalk_output")]
    output: PathBuf,

    /// Plot image format
    #[arg(short, long, value_enum, default_value = "png")]
    format: Format,

    /// Input event table format
    #[arg(long, value_enum, default_value = "jsonl")]
    input_format: Input,

    /// Lower edge of the detector span (mm)
    #[arg(long, default_value = "-50.0", allow_hyphen_values = true)]
    span_low: f64,

    /// Upper edge of the detector span (mm)
    #[arg(long, default_value = "50.0", allow_hyphen_values = true)]
    span_high: f64,

    /// Width of the central entry window as a fraction of the cell width
    #[arg(long, default_value = "0.5")]
    central_fraction: f64,

    /// Upper edge of the crosstalk ratio histograms
    #[arg(long, default_value = "0.25")]
    ratio_max: f64,

    /// Upper edge of the center-cube light-yield histogram (photoelectrons)
    #[arg(long, default_value = "600")]
    center_ly_max: i32,

    /// Upper edge of the neighbor light-yield histograms (photoelectrons)
    #[arg(long, default_value = "60")]
    neighbor_ly_max: i32,

    /// Upper edge of the hit time histograms (ns)
    #[arg(long, default_value = "50.0")]
    time_max: f64,

    /// Skip rendering; write only the CSV and JSON summaries
    #[arg(long)]
    no_plots: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Checks argument combinations clap cannot express on its own.
    ///
    /// The `plane` alias parses to beam mode, so the grid requirement is
    /// checked on the parsed value rather than on the raw argument.
    fn check_usage(&self) -> std::result::Result<(), clap::Error> {
        if matches!(self.mode, Mode::Beam) && self.grid.is_none() {
            return Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "--grid <GRID> is required in beam mode",
            ));
        }
        Ok(())
    }

    fn histogram_config(&self) -> HistogramConfig {
        HistogramConfig::default()
            .with_light_yield_max(self.center_ly_max, self.neighbor_ly_max)
            .with_ratio_max(self.ratio_max)
            .with_time_max(self.time_max)
    }

    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::new(&self.input)
            .with_mode(self.mode.into())
            .with_span(DetectorSpan::new(self.span_low, self.span_high)?)
            .with_central_fraction(self.central_fraction)
            .with_input_format(self.input_format.into())
            .with_histograms(self.histogram_config());
        if let Some(side) = self.grid {
            config = config.with_grid_side(side);
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Processed {} file(s) on a {}x{} grid",
        summary.files, summary.grid_side, summary.grid_side
    );
    println!(
        "Events: {} read, {} accumulated, {} pooled",
        summary.events_read, summary.events_accumulated, summary.events_pooled
    );
    println!(
        "Rejected: {} no hit, {} out of bounds, {} cell mismatch",
        summary.rejected.no_hit, summary.rejected.out_of_bounds, summary.rejected.cell_mismatch
    );
    println!(
        "{:<12} | {:>8} | {:>12} | {:>10} | {:>10}",
        "Neighbor", "Entries", "Crosstalk %", "Error %", "Slope"
    );
    println!("{:-<64}", "");
    for ch in &summary.channels {
        println!(
            "{:<12} | {:>8} | {:>12.3} | {:>10.3} | {:>10.4}",
            ch.channel,
            ch.entries,
            100.0 * ch.mean_ratio,
            100.0 * ch.std_error,
            ch.scatter_slope
        );
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.analysis_config()?;
    let output = AnalysisRun::execute(&config)?;

    let written = write_summaries(&cli.output, &output.maps, &output.summary)?;
    info!("wrote {} summary file(s) to {}", written.len(), cli.output.display());

    if !cli.no_plots {
        Renderer::new(&cli.output, cli.format.into()).render_all(&output.accumulators, &output.maps)?;
    }

    print_summary(&output.summary);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.check_usage() {
        e.exit();
    }
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
