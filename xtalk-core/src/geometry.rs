//! Detector grid geometry.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer address of one cube in the detector grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellCoord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the 1-indexed (bin x, bin y) pair used by map layouts.
    #[inline]
    #[must_use]
    pub fn bin(&self) -> (u32, u32) {
        (self.x + 1, self.y + 1)
    }
}

/// Physical extent covered by the grid along x and y, in mm.
///
/// The span is half-open: `low` is inside, `high` is outside.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorSpan {
    pub low: f64,
    pub high: f64,
}

impl Default for DetectorSpan {
    fn default() -> Self {
        Self {
            low: -50.0,
            high: 50.0,
        }
    }
}

impl DetectorSpan {
    /// Creates a span, rejecting empty or non-finite ranges.
    ///
    /// # Errors
    /// Returns `ConfigError` if `low >= high` or either bound is not finite.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::ConfigError(format!(
                "detector span [{low}, {high}) is empty"
            )));
        }
        Ok(Self { low, high })
    }

    /// Width of the span.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Whether `pos` lies in `[low, high)`.
    #[inline]
    #[must_use]
    pub fn contains(&self, pos: f64) -> bool {
        pos >= self.low && pos < self.high
    }
}

/// Side length and physical span of an N x N cube array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorGrid {
    side: u32,
    span: DetectorSpan,
}

impl DetectorGrid {
    /// Creates a grid with an explicit side length.
    ///
    /// # Errors
    /// Returns `ConfigError` if `side` is zero.
    pub fn new(side: u32, span: DetectorSpan) -> Result<Self> {
        if side == 0 {
            return Err(Error::ConfigError("grid side must be at least 1".into()));
        }
        Ok(Self { side, span })
    }

    /// Infers the side length from the number of per-cell files.
    ///
    /// # Errors
    /// Returns `DegenerateGrid` unless `file_count` is a non-zero perfect square.
    pub fn from_file_count(file_count: usize, span: DetectorSpan) -> Result<Self> {
        let side = integer_sqrt(file_count);
        if side == 0 || side * side != file_count {
            return Err(Error::DegenerateGrid(file_count));
        }
        let side = u32::try_from(side).map_err(|_| Error::DegenerateGrid(file_count))?;
        Self::new(side, span)
    }

    /// Number of cells per axis.
    #[inline]
    #[must_use]
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        (self.side as usize) * (self.side as usize)
    }

    #[inline]
    #[must_use]
    pub fn span(&self) -> DetectorSpan {
        self.span
    }

    /// Physical width of one cell.
    #[inline]
    #[must_use]
    pub fn cell_width(&self) -> f64 {
        self.span.width() / f64::from(self.side)
    }

    /// Whether `cell` addresses a cell of this grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.side && cell.y < self.side
    }

    /// Checks that `cell` lies on the grid.
    ///
    /// # Errors
    /// Returns `InvalidCoordinate` for out-of-range cells.
    pub fn check(&self, cell: CellCoord) -> Result<CellCoord> {
        if self.contains(cell) {
            Ok(cell)
        } else {
            Err(Error::InvalidCoordinate {
                x: cell.x,
                y: cell.y,
                side: self.side,
            })
        }
    }

    /// Bins a position along one axis, `None` outside the span.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bin_of(&self, pos: f64) -> Option<u32> {
        if !self.span.contains(pos) {
            return None;
        }
        let bin = ((pos - self.span.low) / self.span.width() * f64::from(self.side)).floor();
        // Rounding at the upper edge can land exactly on `side`.
        Some((bin as u32).min(self.side - 1))
    }

    /// Fractional offset of `pos` inside cell `index`, 0.0 at its lower edge.
    ///
    /// Values outside `[0, 1)` mean the position is in another cell.
    #[inline]
    #[must_use]
    pub fn offset_in_cell(&self, pos: f64, index: u32) -> f64 {
        (pos - self.span.low) / self.cell_width() - f64::from(index)
    }

    /// Row-major storage index of `cell`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> usize {
        cell.y as usize * self.side as usize + cell.x as usize
    }

    /// Iterates all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.side).flat_map(move |y| (0..self.side).map(move |x| CellCoord::new(x, y)))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    root
}
