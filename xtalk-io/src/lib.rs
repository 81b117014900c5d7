//! xtalk-io: Input discovery, event table readers and the analysis run.
//!
//! Event tables are read from JSON-lines files, or from HDF5 files with the
//! `hdf5` feature enabled.

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod locator;
pub mod pipeline;
mod reader;
mod writer;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use hdf5::{write_events_hdf5, Hdf5EventReader};
pub use locator::FileSetLocator;
pub use pipeline::{
    AddressMode, AnalysisConfig, AnalysisOutput, AnalysisRun, ChannelSummary, RejectionCounts,
    RunSummary,
};
pub use reader::{EventFileReader, InputFormat, JsonLinesReader};
pub use writer::{write_summaries, SummaryWriter, MAPS_CSV, SUMMARY_JSON};
