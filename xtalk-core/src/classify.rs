//! Event classification into per-cell and pooled statistics.

use crate::event::EventRecord;
use crate::geometry::{CellCoord, DetectorGrid};
use crate::resolver::{FileResolver, RejectionReason};
use crate::{Error, Result};

/// Outcome of classifying one resolved event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Cell the event belongs to.
    pub cell: CellCoord,
    /// Resolved and on the grid: feeds the hit-map and per-cell statistics.
    pub valid_for_map: bool,
    /// Also entered through the central part of its cell: feeds the pooled
    /// statistics.
    pub valid_for_pooled: bool,
}

/// Decides which statistics an event may contribute to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventClassifier {
    grid: DetectorGrid,
    central_fraction: f64,
}

impl EventClassifier {
    /// Creates a classifier.
    ///
    /// `central_fraction` is the width of the accepted central window as a
    /// fraction of the cell width; 1.0 accepts the whole cell.
    ///
    /// # Errors
    /// Returns `ConfigError` unless `0 < central_fraction <= 1`.
    pub fn new(grid: DetectorGrid, central_fraction: f64) -> Result<Self> {
        if !(central_fraction > 0.0 && central_fraction <= 1.0) {
            return Err(Error::ConfigError(format!(
                "central fraction must be in (0, 1], got {central_fraction}"
            )));
        }
        Ok(Self {
            grid,
            central_fraction,
        })
    }

    #[must_use]
    pub fn grid(&self) -> &DetectorGrid {
        &self.grid
    }

    /// Resolves and classifies an event.
    ///
    /// # Errors
    /// Returns the rejection reason when the event is excluded entirely.
    pub fn classify(
        &self,
        resolver: &FileResolver,
        event: &EventRecord,
    ) -> std::result::Result<Classification, RejectionReason> {
        let cell = resolver.resolve(event)?;
        let valid_for_map = self.grid.contains(cell);
        let valid_for_pooled = valid_for_map && self.is_central(cell, event);
        Ok(Classification {
            cell,
            valid_for_map,
            valid_for_pooled,
        })
    }

    /// Whether the entry point lies in the central window of `cell`.
    #[must_use]
    pub fn is_central(&self, cell: CellCoord, event: &EventRecord) -> bool {
        if !event.entry.is_hit() {
            return false;
        }
        let half = self.central_fraction / 2.0;
        let u = self.grid.offset_in_cell(event.entry.x, cell.x);
        let v = self.grid.offset_in_cell(event.entry.y, cell.y);
        (u - 0.5).abs() <= half && (v - 0.5).abs() <= half
    }
}
