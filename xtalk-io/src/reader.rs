//! Event table readers.
//!
//! Each input file holds one table of events. JSON-lines files carry one
//! `EventRecord` object per line; HDF5 files carry a compound dataset `cube`.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use xtalk_core::EventRecord;

/// On-disk event table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One JSON object per line.
    #[default]
    JsonLines,
    /// HDF5 compound dataset.
    Hdf5,
}

impl InputFormat {
    /// File name marker identifying input files of this format.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            InputFormat::JsonLines => ".jsonl",
            InputFormat::Hdf5 => ".h5",
        }
    }
}

/// Streaming reader over the events of one input file.
pub enum EventFileReader {
    JsonLines(JsonLinesReader),
    #[cfg(feature = "hdf5")]
    Hdf5(crate::hdf5::Hdf5EventReader),
}

impl EventFileReader {
    /// Opens `path` as an event table of the given format.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, or if the format is not
    /// compiled into this build.
    pub fn open<P: AsRef<Path>>(path: P, format: InputFormat) -> Result<Self> {
        match format {
            InputFormat::JsonLines => Ok(EventFileReader::JsonLines(JsonLinesReader::open(path)?)),
            #[cfg(feature = "hdf5")]
            InputFormat::Hdf5 => Ok(EventFileReader::Hdf5(
                crate::hdf5::Hdf5EventReader::open(path)?,
            )),
            #[cfg(not(feature = "hdf5"))]
            InputFormat::Hdf5 => Err(Error::UnsupportedFormat(
                "HDF5 input requires the `hdf5` feature".to_string(),
            )),
        }
    }
}

impl Iterator for EventFileReader {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EventFileReader::JsonLines(reader) => reader.next(),
            #[cfg(feature = "hdf5")]
            EventFileReader::Hdf5(reader) => reader.next(),
        }
    }
}

/// Reader for JSON-lines event tables.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct JsonLinesReader {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line_no: usize,
}

impl JsonLinesReader {
    /// Opens a JSON-lines file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.as_ref().to_path_buf(),
            line_no: 0,
        })
    }
}

impl Iterator for JsonLinesReader {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(serde_json::from_str(trimmed).map_err(|e| Error::MalformedEvent {
                path: self.path.clone(),
                record: self.line_no,
                message: e.to_string(),
            }));
        }
    }
}
