//! Summary writers for analysis results.

use crate::pipeline::RunSummary;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use xtalk_core::CrosstalkMap;

/// File name of the per-cell crosstalk dump.
pub const MAPS_CSV: &str = "crosstalk_maps.csv";
/// File name of the run summary.
pub const SUMMARY_JSON: &str = "summary.json";

/// Writer for analysis summaries.
pub struct SummaryWriter {
    writer: BufWriter<File>,
}

impl SummaryWriter {
    /// Creates a new file writer.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes crosstalk maps as CSV.
    ///
    /// One row per (channel, cell); empty cells are written as `NaN`.
    pub fn write_maps_csv(&mut self, maps: &[CrosstalkMap]) -> Result<()> {
        writeln!(self.writer, "channel,x,y,percent")?;
        for map in maps {
            let channel = map.channel().name();
            for (cell, percent) in map.iter() {
                writeln!(self.writer, "{channel},{},{},{percent}", cell.x, cell.y)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the run summary as pretty-printed JSON.
    pub fn write_summary_json(&mut self, summary: &RunSummary) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, summary)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes `crosstalk_maps.csv` and `summary.json` into `dir`.
///
/// Returns the paths written.
///
/// # Errors
/// Returns an error if the directory or either file cannot be written.
pub fn write_summaries(
    dir: &Path,
    maps: &[CrosstalkMap],
    summary: &RunSummary,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let maps_path = dir.join(MAPS_CSV);
    SummaryWriter::create(&maps_path)?.write_maps_csv(maps)?;
    let summary_path = dir.join(SUMMARY_JSON);
    SummaryWriter::create(&summary_path)?.write_summary_json(summary)?;
    Ok(vec![maps_path, summary_path])
}
