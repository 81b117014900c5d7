//! Dense per-cell storage.

use crate::geometry::CellCoord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense N x N array of values, one per cell, row-major by y.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellGrid<T> {
    side: u32,
    values: Vec<T>,
}

impl<T: Clone> CellGrid<T> {
    /// Creates a grid with every cell set to `fill`.
    #[must_use]
    pub fn new(side: u32, fill: T) -> Self {
        let n = side as usize;
        Self {
            side,
            values: vec![fill; n * n],
        }
    }
}

impl<T> CellGrid<T> {
    #[inline]
    #[must_use]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> Option<usize> {
        (cell.x < self.side && cell.y < self.side)
            .then(|| cell.y as usize * self.side as usize + cell.x as usize)
    }

    /// Value at a 0-indexed cell.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&T> {
        self.index(cell).map(|i| &self.values[i])
    }

    /// Mutable value at a 0-indexed cell.
    pub fn get_mut(&mut self, cell: CellCoord) -> Option<&mut T> {
        self.index(cell).map(move |i| &mut self.values[i])
    }

    /// Value at a 1-indexed bin, (1, 1) being cell (0, 0).
    #[must_use]
    pub fn get_bin(&self, bin_x: u32, bin_y: u32) -> Option<&T> {
        if bin_x == 0 || bin_y == 0 {
            return None;
        }
        self.get(CellCoord::new(bin_x - 1, bin_y - 1))
    }

    /// Iterates `(cell, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &T)> + '_ {
        let side = self.side as usize;
        self.values.iter().enumerate().map(move |(i, v)| {
            #[allow(clippy::cast_possible_truncation)]
            let cell = CellCoord::new((i % side) as u32, (i / side) as u32);
            (cell, v)
        })
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_and_bin_addressing() {
        let mut grid = CellGrid::new(3, 0u64);
        *grid.get_mut(CellCoord::new(2, 1)).unwrap() += 4;
        assert_eq!(grid.get(CellCoord::new(2, 1)), Some(&4));
        assert_eq!(grid.get_bin(3, 2), Some(&4));
        assert_eq!(grid.get_bin(0, 2), None);
        assert_eq!(grid.get_bin(4, 1), None);
        assert_eq!(grid.get(CellCoord::new(3, 0)), None);
        let (cell, value) = grid.iter().find(|(_, v)| **v > 0).unwrap();
        assert_eq!((cell, *value), (CellCoord::new(2, 1), 4));
    }
}
