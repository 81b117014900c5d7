//! Per-event simulation records.

use crate::channel::{NeighborChannel, NEIGHBOR_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sub-component value meaning "not applicable" for this event.
pub const NOT_APPLICABLE: i32 = -1;

/// Hit time value meaning "no hit".
pub const NO_HIT_TIME: f64 = 0.0;

/// Beam position at one measurement plane, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 3]", into = "[f64; 3]"))]
pub struct PlanePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PlanePosition {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether the beam reached this plane.
    ///
    /// The simulation writes z = 0 for a plane the beam never crossed. Planes
    /// sit on the cube faces, so a real crossing always has z != 0.
    #[inline]
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_hit(&self) -> bool {
        self.z != 0.0
    }
}

impl From<[f64; 3]> for PlanePosition {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<PlanePosition> for [f64; 3] {
    fn from(p: PlanePosition) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One simulated event as read from an event table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventRecord {
    /// Detected photons in the center cube.
    pub center_ly: i32,
    /// Detected photons per neighbor channel.
    pub neighbor_ly: [i32; NEIGHBOR_COUNT],
    /// Delta-ray induced part of each neighbor yield.
    #[cfg_attr(feature = "serde", serde(default = "not_applicable"))]
    pub neighbor_ly_delta: [i32; NEIGHBOR_COUNT],
    /// Cherenkov induced part of each neighbor yield.
    #[cfg_attr(feature = "serde", serde(default = "not_applicable"))]
    pub neighbor_ly_cherenkov: [i32; NEIGHBOR_COUNT],
    /// True optical crosstalk part of each neighbor yield.
    #[cfg_attr(feature = "serde", serde(default = "not_applicable"))]
    pub neighbor_ly_optical: [i32; NEIGHBOR_COUNT],
    #[cfg_attr(feature = "serde", serde(default))]
    pub center_time: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neighbor_time: [f64; NEIGHBOR_COUNT],
    /// Upstream measurement plane.
    pub entry: PlanePosition,
    /// Downstream measurement plane.
    pub exit: PlanePosition,
    /// Beam-gun (x, y) position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gun: [f64; 2],
}

#[cfg(feature = "serde")]
fn not_applicable() -> [i32; NEIGHBOR_COUNT] {
    [NOT_APPLICABLE; NEIGHBOR_COUNT]
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            center_ly: 0,
            neighbor_ly: [0; NEIGHBOR_COUNT],
            neighbor_ly_delta: [NOT_APPLICABLE; NEIGHBOR_COUNT],
            neighbor_ly_cherenkov: [NOT_APPLICABLE; NEIGHBOR_COUNT],
            neighbor_ly_optical: [NOT_APPLICABLE; NEIGHBOR_COUNT],
            center_time: NO_HIT_TIME,
            neighbor_time: [NO_HIT_TIME; NEIGHBOR_COUNT],
            entry: PlanePosition::default(),
            exit: PlanePosition::default(),
            gun: [0.0; 2],
        }
    }
}

/// Light-yield components recorded per neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SubComponent {
    DeltaRay,
    Cherenkov,
    Optical,
}

impl SubComponent {
    pub const ALL: [SubComponent; 3] = [
        SubComponent::DeltaRay,
        SubComponent::Cherenkov,
        SubComponent::Optical,
    ];

    /// Position in `SubComponent::ALL`.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SubComponent::DeltaRay => "delta",
            SubComponent::Cherenkov => "cherenkov",
            SubComponent::Optical => "optical",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            SubComponent::DeltaRay => "delta-ray",
            SubComponent::Cherenkov => "Cherenkov",
            SubComponent::Optical => "optical crosstalk",
        }
    }
}

impl EventRecord {
    /// Neighbor light yield.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, channel: NeighborChannel) -> i32 {
        self.neighbor_ly[channel.index()]
    }

    /// Sub-component yield, `None` when marked not applicable.
    ///
    /// Any negative count is treated as a sentinel.
    #[must_use]
    pub fn sub_component(&self, channel: NeighborChannel, component: SubComponent) -> Option<i32> {
        let values = match component {
            SubComponent::DeltaRay => &self.neighbor_ly_delta,
            SubComponent::Cherenkov => &self.neighbor_ly_cherenkov,
            SubComponent::Optical => &self.neighbor_ly_optical,
        };
        let value = values[channel.index()];
        (value >= 0).then_some(value)
    }

    /// Center hit time, `None` without a hit.
    #[inline]
    #[must_use]
    pub fn center_hit_time(&self) -> Option<f64> {
        non_zero(self.center_time)
    }

    /// Neighbor hit time, `None` without a hit.
    #[inline]
    #[must_use]
    pub fn neighbor_hit_time(&self, channel: NeighborChannel) -> Option<f64> {
        non_zero(self.neighbor_time[channel.index()])
    }

    /// Crosstalk ratio `neighbor / center`, `None` when the center saw no light.
    #[must_use]
    pub fn crosstalk_ratio(&self, channel: NeighborChannel) -> Option<f64> {
        if self.center_ly == 0 {
            return None;
        }
        Some(f64::from(self.neighbor(channel)) / f64::from(self.center_ly))
    }
}

#[allow(clippy::float_cmp)]
fn non_zero(t: f64) -> Option<f64> {
    (t != NO_HIT_TIME).then_some(t)
}
