//! HDF5 event tables.
//!
//! Events are stored as a 1-D compound dataset named `cube`, one row per
//! event, with the same fields as the JSON-lines layout.

use crate::{Error, Result};
use hdf5::File;
use ndarray::{Array1, ArrayView1};
use std::path::Path;
use xtalk_core::{EventRecord, PlanePosition, NEIGHBOR_COUNT};

/// Name of the event dataset.
pub const EVENT_DATASET: &str = "cube";

/// One row of the `cube` dataset.
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct CubeRow {
    pub center_ly: i32,
    pub neighbor_ly: [i32; NEIGHBOR_COUNT],
    pub neighbor_ly_delta: [i32; NEIGHBOR_COUNT],
    pub neighbor_ly_cherenkov: [i32; NEIGHBOR_COUNT],
    pub neighbor_ly_optical: [i32; NEIGHBOR_COUNT],
    pub center_time: f64,
    pub neighbor_time: [f64; NEIGHBOR_COUNT],
    pub entry: [f64; 3],
    pub exit: [f64; 3],
    pub gun: [f64; 2],
}

impl From<CubeRow> for EventRecord {
    fn from(row: CubeRow) -> Self {
        EventRecord {
            center_ly: row.center_ly,
            neighbor_ly: row.neighbor_ly,
            neighbor_ly_delta: row.neighbor_ly_delta,
            neighbor_ly_cherenkov: row.neighbor_ly_cherenkov,
            neighbor_ly_optical: row.neighbor_ly_optical,
            center_time: row.center_time,
            neighbor_time: row.neighbor_time,
            entry: PlanePosition::from(row.entry),
            exit: PlanePosition::from(row.exit),
            gun: row.gun,
        }
    }
}

impl From<&EventRecord> for CubeRow {
    fn from(event: &EventRecord) -> Self {
        CubeRow {
            center_ly: event.center_ly,
            neighbor_ly: event.neighbor_ly,
            neighbor_ly_delta: event.neighbor_ly_delta,
            neighbor_ly_cherenkov: event.neighbor_ly_cherenkov,
            neighbor_ly_optical: event.neighbor_ly_optical,
            center_time: event.center_time,
            neighbor_time: event.neighbor_time,
            entry: event.entry.into(),
            exit: event.exit.into(),
            gun: event.gun,
        }
    }
}

/// Reads every row of the `cube` dataset up front and yields them in order.
pub struct Hdf5EventReader {
    rows: std::vec::IntoIter<CubeRow>,
}

impl Hdf5EventReader {
    /// Opens an HDF5 event table.
    ///
    /// # Errors
    /// Returns an error if the file or the `cube` dataset cannot be read, or
    /// if the dataset is not one-dimensional.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = file.dataset(EVENT_DATASET)?;
        if dataset.ndim() != 1 {
            return Err(Error::MalformedEvent {
                path: path.to_path_buf(),
                record: 0,
                message: format!("dataset '{EVENT_DATASET}' must be 1-D, found {}-D", dataset.ndim()),
            });
        }
        let rows: Array1<CubeRow> = dataset.read_1d()?;
        log::debug!("read {} row(s) from {}", rows.len(), path.display());
        Ok(Self {
            rows: rows.to_vec().into_iter(),
        })
    }
}

impl Iterator for Hdf5EventReader {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| Ok(row.into()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Writes events as a `cube` dataset.
///
/// # Errors
/// Returns an error if the file or dataset cannot be created.
pub fn write_events_hdf5<P: AsRef<Path>>(path: P, events: &[EventRecord]) -> Result<()> {
    let file = File::create(path)?;
    let rows: Vec<CubeRow> = events.iter().map(CubeRow::from).collect();
    let dataset = file
        .new_dataset::<CubeRow>()
        .shape((rows.len(),))
        .create(EVENT_DATASET)?;
    dataset.write(ArrayView1::from(rows.as_slice()))?;
    Ok(())
}
