//! Per-neighbor crosstalk maps.

use crate::accumulator::AccumulatorSet;
use crate::cell_grid::CellGrid;
use crate::channel::NeighborChannel;
use crate::geometry::CellCoord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean crosstalk in percent per cell, for one neighbor direction.
///
/// Bins are 1-indexed: cell (x, y) is stored at bin (x + 1, y + 1). Cells
/// without samples hold NaN.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrosstalkMap {
    channel: NeighborChannel,
    values: CellGrid<f64>,
}

impl CrosstalkMap {
    /// Creates a map with every cell undefined.
    #[must_use]
    pub fn empty(channel: NeighborChannel, side: u32) -> Self {
        Self {
            channel,
            values: CellGrid::new(side, f64::NAN),
        }
    }

    /// Stores `percent` for a 0-indexed cell.
    pub fn set(&mut self, cell: CellCoord, percent: f64) {
        if let Some(v) = self.values.get_mut(cell) {
            *v = percent;
        }
    }

    #[must_use]
    pub fn channel(&self) -> NeighborChannel {
        self.channel
    }

    #[must_use]
    pub fn side(&self) -> u32 {
        self.values.side()
    }

    /// Value at a 1-indexed bin, `None` outside `1..=N`.
    #[must_use]
    pub fn bin(&self, bin_x: u32, bin_y: u32) -> Option<f64> {
        self.values.get_bin(bin_x, bin_y).copied()
    }

    /// Value for a 0-indexed cell.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<f64> {
        let (bx, by) = cell.bin();
        self.bin(bx, by)
    }

    /// Iterates `(cell, percent)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, f64)> + '_ {
        self.values.iter().map(|(cell, v)| (cell, *v))
    }

    /// Finite (min, max) over defined cells, `None` if every cell is NaN.
    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .values()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Converts per-cell ratio statistics into crosstalk maps.
pub struct CrosstalkMapBuilder;

impl CrosstalkMapBuilder {
    /// Builds the map of one neighbor channel.
    #[must_use]
    pub fn build_channel(acc: &AccumulatorSet, channel: NeighborChannel) -> CrosstalkMap {
        let grid = acc.grid();
        let mut map = CrosstalkMap::empty(channel, grid.side());
        for cell in grid.cells() {
            let Some(stats) = acc.cell(channel, cell) else {
                continue;
            };
            if stats.ratio.entries() > 0 {
                map.set(cell, 100.0 * stats.ratio.mean());
            }
        }
        map
    }

    /// Builds one map per neighbor channel, in channel index order.
    #[must_use]
    pub fn build(acc: &AccumulatorSet) -> Vec<CrosstalkMap> {
        NeighborChannel::ALL
            .iter()
            .map(|&channel| Self::build_channel(acc, channel))
            .collect()
    }
}
