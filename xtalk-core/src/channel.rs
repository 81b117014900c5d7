//! Neighbor readout channels around the center cube.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of neighbor channels around the center cube.
pub const NEIGHBOR_COUNT: usize = 8;

/// Geometric relation of a neighbor cube to the center cube.
///
/// The discriminant is the stable channel index used in event tables and
/// output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NeighborChannel {
    UpperLeft = 0,
    Upper = 1,
    UpperRight = 2,
    Left = 3,
    Right = 4,
    LowerLeft = 5,
    Lower = 6,
    LowerRight = 7,
}

impl NeighborChannel {
    /// All channels in index order.
    pub const ALL: [NeighborChannel; NEIGHBOR_COUNT] = [
        NeighborChannel::UpperLeft,
        NeighborChannel::Upper,
        NeighborChannel::UpperRight,
        NeighborChannel::Left,
        NeighborChannel::Right,
        NeighborChannel::LowerLeft,
        NeighborChannel::Lower,
        NeighborChannel::LowerRight,
    ];

    /// Stable channel index, 0-7.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a channel by index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NeighborChannel::UpperLeft => "upper_left",
            NeighborChannel::Upper => "upper",
            NeighborChannel::UpperRight => "upper_right",
            NeighborChannel::Left => "left",
            NeighborChannel::Right => "right",
            NeighborChannel::LowerLeft => "lower_left",
            NeighborChannel::Lower => "lower",
            NeighborChannel::LowerRight => "lower_right",
        }
    }

    /// Human readable title for plot captions.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            NeighborChannel::UpperLeft => "Upper-left cube",
            NeighborChannel::Upper => "Upper cube",
            NeighborChannel::UpperRight => "Upper-right cube",
            NeighborChannel::Left => "Left cube",
            NeighborChannel::Right => "Right cube",
            NeighborChannel::LowerLeft => "Lower-left cube",
            NeighborChannel::Lower => "Lower cube",
            NeighborChannel::LowerRight => "Lower-right cube",
        }
    }

    /// Cell offset (dx, dy) from the center cube; +y is up.
    #[must_use]
    pub fn offset(self) -> (i32, i32) {
        match self {
            NeighborChannel::UpperLeft => (-1, 1),
            NeighborChannel::Upper => (0, 1),
            NeighborChannel::UpperRight => (1, 1),
            NeighborChannel::Left => (-1, 0),
            NeighborChannel::Right => (1, 0),
            NeighborChannel::LowerLeft => (-1, -1),
            NeighborChannel::Lower => (0, -1),
            NeighborChannel::LowerRight => (1, -1),
        }
    }
}

impl std::fmt::Display for NeighborChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_stable() {
        for (i, channel) in NeighborChannel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
            assert_eq!(NeighborChannel::from_index(i), Some(*channel));
        }
        assert_eq!(NeighborChannel::from_index(NEIGHBOR_COUNT), None);
    }

    #[test]
    fn test_offsets_are_distinct_and_mirrored() {
        let offsets: Vec<_> = NeighborChannel::ALL.iter().map(|c| c.offset()).collect();
        for (i, a) in offsets.iter().enumerate() {
            assert_ne!(*a, (0, 0));
            assert!(offsets[i + 1..].iter().all(|b| b != a));
            // Channel i and 7 - i sit on opposite sides.
            let opposite = offsets[NEIGHBOR_COUNT - 1 - i];
            assert_eq!((a.0 + opposite.0, a.1 + opposite.1), (0, 0));
        }
    }
}
