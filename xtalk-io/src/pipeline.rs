//! Analysis run: locate, resolve, classify, accumulate, map.

use crate::locator::FileSetLocator;
use crate::reader::{EventFileReader, InputFormat};
use crate::{Error, Result};
use log::{debug, info, trace};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use xtalk_core::{
    AccumulatorSet, CellAddressResolver, CrosstalkMap, CrosstalkMapBuilder, DetectorGrid,
    DetectorSpan, EventClassifier, FileResolver, HistogramConfig, NeighborChannel,
    RejectionReason,
};

/// Cell addressing mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// One file per cell, grid side from the file count.
    #[default]
    Point,
    /// Extended beam, grid side given explicitly.
    Beam,
}

/// Configuration of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input_dir: PathBuf,
    pub mode: AddressMode,
    /// Grid side. Required in beam mode; in point mode it must agree with the
    /// file count when given.
    pub grid_side: Option<u32>,
    pub span: DetectorSpan,
    pub central_fraction: f64,
    pub input_format: InputFormat,
    pub histograms: HistogramConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            mode: AddressMode::Point,
            grid_side: None,
            span: DetectorSpan::default(),
            central_fraction: 0.5,
            input_format: InputFormat::JsonLines,
            histograms: HistogramConfig::default(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: AddressMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_grid_side(mut self, side: u32) -> Self {
        self.grid_side = Some(side);
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: DetectorSpan) -> Self {
        self.span = span;
        self
    }

    #[must_use]
    pub fn with_central_fraction(mut self, fraction: f64) -> Self {
        self.central_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.input_format = format;
        self
    }

    #[must_use]
    pub fn with_histograms(mut self, histograms: HistogramConfig) -> Self {
        self.histograms = histograms;
        self
    }

    /// Checks settings that do not depend on the input files.
    ///
    /// # Errors
    /// Returns a configuration error for a missing or zero grid side in beam
    /// mode, a central fraction outside (0, 1], or invalid histogram ranges.
    pub fn validate(&self) -> Result<()> {
        if self.mode == AddressMode::Beam && self.grid_side.is_none() {
            return Err(config_error("beam mode requires an explicit grid side"));
        }
        if self.grid_side == Some(0) {
            return Err(config_error("grid side must be at least 1"));
        }
        if !(self.central_fraction > 0.0 && self.central_fraction <= 1.0) {
            return Err(config_error(format!(
                "central fraction must be in (0, 1], got {}",
                self.central_fraction
            )));
        }
        self.histograms.validate()?;
        Ok(())
    }

    fn grid(&self, file_count: usize) -> Result<DetectorGrid> {
        match (self.mode, self.grid_side) {
            (AddressMode::Point, side) => {
                let grid = DetectorGrid::from_file_count(file_count, self.span)?;
                if let Some(side) = side.filter(|&s| s != grid.side()) {
                    return Err(config_error(format!(
                        "grid side {side} does not match {file_count} input file(s)"
                    )));
                }
                Ok(grid)
            }
            (AddressMode::Beam, Some(side)) => Ok(DetectorGrid::new(side, self.span)?),
            (AddressMode::Beam, None) => {
                Err(config_error("beam mode requires an explicit grid side"))
            }
        }
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::CoreError(xtalk_core::Error::ConfigError(message.into()))
}

/// Rejected events per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub no_hit: u64,
    pub out_of_bounds: u64,
    pub cell_mismatch: u64,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectionReason) {
        match reason {
            RejectionReason::NoHit => self.no_hit += 1,
            RejectionReason::OutOfBounds => self.out_of_bounds += 1,
            RejectionReason::CellMismatch => self.cell_mismatch += 1,
        }
    }

    #[must_use]
    pub fn get(&self, reason: RejectionReason) -> u64 {
        match reason {
            RejectionReason::NoHit => self.no_hit,
            RejectionReason::OutOfBounds => self.out_of_bounds,
            RejectionReason::CellMismatch => self.cell_mismatch,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.no_hit + self.out_of_bounds + self.cell_mismatch
    }
}

/// Pooled figures of one neighbor channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: &'static str,
    pub entries: u64,
    /// Mean pooled crosstalk ratio, NaN without samples.
    pub mean_ratio: f64,
    pub std_error: f64,
    /// Through-origin slope of neighbor vs. center light yield.
    pub scatter_slope: f64,
    /// Pearson correlation of neighbor and center light yield.
    pub scatter_correlation: f64,
}

/// Machine-readable outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub grid_side: u32,
    pub events_read: u64,
    pub events_accumulated: u64,
    pub events_pooled: u64,
    pub rejected: RejectionCounts,
    pub channels: Vec<ChannelSummary>,
}

impl RunSummary {
    fn new(files: usize, events_read: u64, rejected: RejectionCounts, acc: &AccumulatorSet) -> Self {
        let channels = NeighborChannel::ALL
            .iter()
            .map(|&channel| {
                let ch = acc.channel(channel);
                ChannelSummary {
                    channel: channel.name(),
                    entries: ch.ratio.entries(),
                    mean_ratio: ch.ratio.mean(),
                    std_error: ch.ratio.stats().std_error(),
                    scatter_slope: ch.scatter.slope_through_origin(),
                    scatter_correlation: ch.scatter.correlation(),
                }
            })
            .collect();
        Self {
            files,
            grid_side: acc.grid().side(),
            events_read,
            events_accumulated: acc.accumulated(),
            events_pooled: acc.pooled(),
            rejected,
            channels,
        }
    }
}

/// Everything a completed run produces.
#[derive(Debug)]
pub struct AnalysisOutput {
    pub accumulators: AccumulatorSet,
    pub maps: Vec<CrosstalkMap>,
    pub summary: RunSummary,
}

/// Drives one analysis run.
pub struct AnalysisRun;

impl AnalysisRun {
    /// Runs the analysis over every matching file of `config.input_dir`.
    ///
    /// Files are processed in sorted name order, each drained before the next
    /// is opened. Rejected events are counted and skipped; any other failure
    /// aborts the run.
    ///
    /// # Errors
    /// Returns `EmptyInput` when no file matches, a core error for an invalid
    /// configuration, a degenerate grid, a bad or duplicated point-mode file
    /// name (checked before any event is read), and an
    /// I/O error for unreadable or malformed event tables.
    pub fn execute(config: &AnalysisConfig) -> Result<AnalysisOutput> {
        config.validate()?;
        let marker = config.input_format.marker();
        let files = FileSetLocator::locate(&config.input_dir, marker);
        if files.is_empty() {
            return Err(Error::EmptyInput {
                dir: config.input_dir.clone(),
                marker: marker.to_string(),
            });
        }

        let grid = config.grid(files.len())?;
        info!(
            "{} file(s), {}x{} grid over [{}, {}) mm",
            files.len(),
            grid.side(),
            grid.side(),
            grid.span().low,
            grid.span().high
        );

        let resolver = match config.mode {
            AddressMode::Point => CellAddressResolver::point(grid, marker)?,
            AddressMode::Beam => CellAddressResolver::beam(grid),
        };
        let classifier = EventClassifier::new(grid, config.central_fraction)?;
        let mut acc = AccumulatorSet::new(grid, config.histograms.clone())?;

        let resolved = resolve_files(&resolver, &files)?;
        let mut events_read = 0u64;
        let mut rejected = RejectionCounts::default();
        for (name, file) in files.iter().zip(resolved) {
            let path = config.input_dir.join(name);
            let read = process_file(&path, config.input_format, |event| {
                match classifier.classify(&file, &event) {
                    Ok(class) => acc.accumulate(&class, &event),
                    Err(reason) => {
                        trace!("{name}: rejected event ({reason})");
                        rejected.record(reason);
                    }
                }
            })?;
            debug!("{name}: {read} event(s)");
            events_read += read;
        }

        let maps = CrosstalkMapBuilder::build(&acc);
        let summary = RunSummary::new(files.len(), events_read, rejected, &acc);
        info!(
            "read {} event(s): {} accumulated, {} pooled, {} rejected",
            summary.events_read,
            summary.events_accumulated,
            summary.events_pooled,
            rejected.total()
        );
        Ok(AnalysisOutput {
            accumulators: acc,
            maps,
            summary,
        })
    }
}

/// Resolves every file up front so a bad name aborts before any event is read.
fn resolve_files(resolver: &CellAddressResolver, files: &[String]) -> Result<Vec<FileResolver>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(files.len());
    for name in files {
        let file = resolver.for_file(name)?;
        if let FileResolver::Fixed(cell) = file {
            if !seen.insert(cell) {
                return Err(xtalk_core::Error::DuplicateCell {
                    x: cell.x,
                    y: cell.y,
                }
                .into());
            }
        }
        resolved.push(file);
    }
    Ok(resolved)
}

fn process_file<F>(path: &Path, format: InputFormat, mut sink: F) -> Result<u64>
where
    F: FnMut(xtalk_core::EventRecord),
{
    let mut count = 0;
    for event in EventFileReader::open(path, format)? {
        sink(event?);
        count += 1;
    }
    Ok(count)
}
