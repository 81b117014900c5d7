//! Cell address resolution.
//!
//! Point-source runs carry one file per cell and encode the cell in the file
//! name. Extended-beam runs spread the beam over the array and resolve the cell
//! per event from the measured entry and exit positions.

use crate::event::{EventRecord, PlanePosition};
use crate::geometry::{CellCoord, DetectorGrid};
use crate::{Error, Result};
use regex::Regex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why an event was excluded from the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectionReason {
    /// A measurement plane reports z = 0, the beam did not reach the cubes.
    NoHit,
    /// The beam crossed a plane outside the detector span.
    OutOfBounds,
    /// Entry and exit fall into different cells.
    CellMismatch,
}

impl RejectionReason {
    pub const ALL: [RejectionReason; 3] = [
        RejectionReason::NoHit,
        RejectionReason::OutOfBounds,
        RejectionReason::CellMismatch,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RejectionReason::NoHit => "no_hit",
            RejectionReason::OutOfBounds => "out_of_bounds",
            RejectionReason::CellMismatch => "cell_mismatch",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `root_X<n>_Y<n><marker>` file names.
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    regex: Regex,
}

impl FileNamePattern {
    /// Builds the pattern for files carrying `marker` (e.g. `.jsonl`).
    ///
    /// # Errors
    /// Returns `ConfigError` if the pattern cannot be compiled.
    pub fn new(marker: &str) -> Result<Self> {
        let pattern = format!(r"^root_X(\d+)_Y(\d+){}$", regex::escape(marker));
        let regex = Regex::new(&pattern).map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(Self { regex })
    }

    /// Extracts the cell coordinate from a file name.
    ///
    /// The whole name must match; prefixed or suffixed copies are rejected.
    ///
    /// # Errors
    /// Returns `InvalidFileName` if the name does not match.
    pub fn parse(&self, file_name: &str) -> Result<CellCoord> {
        let invalid = || Error::InvalidFileName(file_name.to_string());
        let caps = self.regex.captures(file_name).ok_or_else(invalid)?;
        let x = caps[1].parse::<u32>().map_err(|_| invalid())?;
        let y = caps[2].parse::<u32>().map_err(|_| invalid())?;
        Ok(CellCoord::new(x, y))
    }
}

/// Cell addressing strategy, selected once per run.
#[derive(Debug, Clone)]
pub enum CellAddressResolver {
    /// One file per cell, cell taken from the file name.
    Point {
        grid: DetectorGrid,
        pattern: FileNamePattern,
    },
    /// Cell binned per event from the beam position.
    Beam { grid: DetectorGrid },
}

impl CellAddressResolver {
    /// Point-source resolver for files carrying `marker`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file name pattern cannot be built.
    pub fn point(grid: DetectorGrid, marker: &str) -> Result<Self> {
        Ok(CellAddressResolver::Point {
            grid,
            pattern: FileNamePattern::new(marker)?,
        })
    }

    #[must_use]
    pub fn beam(grid: DetectorGrid) -> Self {
        CellAddressResolver::Beam { grid }
    }

    #[must_use]
    pub fn grid(&self) -> &DetectorGrid {
        match self {
            CellAddressResolver::Point { grid, .. } | CellAddressResolver::Beam { grid } => grid,
        }
    }

    /// Prepares event resolution for one input file.
    ///
    /// In point mode a malformed name or a cell off the grid is fatal.
    ///
    /// # Errors
    /// Returns `InvalidFileName` or `InvalidCoordinate` in point mode.
    pub fn for_file(&self, file_name: &str) -> Result<FileResolver> {
        match self {
            CellAddressResolver::Point { grid, pattern } => {
                let cell = grid.check(pattern.parse(file_name)?)?;
                Ok(FileResolver::Fixed(cell))
            }
            CellAddressResolver::Beam { grid } => Ok(FileResolver::Beam(*grid)),
        }
    }
}

/// Per-file event resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileResolver {
    /// Every event of the file belongs to this cell.
    Fixed(CellCoord),
    /// Resolve each event from its entry and exit positions.
    Beam(DetectorGrid),
}

impl FileResolver {
    /// Resolves the cell of one event.
    ///
    /// # Errors
    /// Returns the rejection reason for events excluded from the analysis.
    pub fn resolve(&self, event: &EventRecord) -> std::result::Result<CellCoord, RejectionReason> {
        match self {
            FileResolver::Fixed(cell) => Ok(*cell),
            FileResolver::Beam(grid) => resolve_beam(grid, event),
        }
    }
}

fn resolve_beam(
    grid: &DetectorGrid,
    event: &EventRecord,
) -> std::result::Result<CellCoord, RejectionReason> {
    if !event.entry.is_hit() || !event.exit.is_hit() {
        return Err(RejectionReason::NoHit);
    }
    let entry = plane_cell(grid, &event.entry).ok_or(RejectionReason::OutOfBounds)?;
    let exit = plane_cell(grid, &event.exit).ok_or(RejectionReason::OutOfBounds)?;
    if entry != exit {
        return Err(RejectionReason::CellMismatch);
    }
    Ok(entry)
}

fn plane_cell(grid: &DetectorGrid, plane: &PlanePosition) -> Option<CellCoord> {
    Some(CellCoord::new(grid.bin_of(plane.x)?, grid.bin_of(plane.y)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DetectorSpan;

    fn grid(side: u32) -> DetectorGrid {
        DetectorGrid::new(side, DetectorSpan::new(0.0, 10.0 * f64::from(side)).unwrap()).unwrap()
    }

    fn beam_event(entry: (f64, f64, f64), exit: (f64, f64, f64)) -> EventRecord {
        EventRecord {
            entry: PlanePosition::new(entry.0, entry.1, entry.2),
            exit: PlanePosition::new(exit.0, exit.1, exit.2),
            ..EventRecord::default()
        }
    }

    #[test]
    fn test_parse_file_names_round_trip() {
        let pattern = FileNamePattern::new(".jsonl").unwrap();
        for x in 0..5 {
            for y in 0..5 {
                let name = format!("root_X{x}_Y{y}.jsonl");
                assert_eq!(pattern.parse(&name).unwrap(), CellCoord::new(x, y));
            }
        }
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        let pattern = FileNamePattern::new(".jsonl").unwrap();
        for name in [
            "root_X1_Y.jsonl",
            "root_x1_y2.jsonl",
            "root_X1_Y2.h5",
            "X1_Y2.jsonl",
            "root_X1-Y2.jsonl",
            "root_X99999999999_Y0.jsonl",
            "backup_of_root_X1_Y2.jsonl",
            "root_X1_Y2.jsonl.bak",
            "xroot_X1_Y2.jsonl.old",
        ] {
            assert!(
                matches!(pattern.parse(name), Err(Error::InvalidFileName(_))),
                "{name} should not parse"
            );
        }
    }

    #[test]
    fn test_point_resolver_checks_range() {
        let resolver = CellAddressResolver::point(grid(2), ".jsonl").unwrap();
        assert_eq!(
            resolver.for_file("root_X1_Y0.jsonl").unwrap(),
            FileResolver::Fixed(CellCoord::new(1, 0))
        );
        assert!(matches!(
            resolver.for_file("root_X2_Y0.jsonl"),
            Err(Error::InvalidCoordinate { x: 2, y: 0, side: 2 })
        ));
    }

    #[test]
    fn test_fixed_resolver_ignores_event_geometry() {
        let file = FileResolver::Fixed(CellCoord::new(3, 1));
        let event = beam_event((0.0, 0.0, 0.0), (99.0, 99.0, 0.0));
        assert_eq!(file.resolve(&event), Ok(CellCoord::new(3, 1)));
    }

    #[test]
    fn test_beam_resolution() {
        let resolver = CellAddressResolver::beam(grid(3));
        let file = resolver.for_file("anything.jsonl").unwrap();

        let straight = beam_event((15.0, 25.0, -5.0), (16.0, 24.0, 5.0));
        assert_eq!(file.resolve(&straight), Ok(CellCoord::new(1, 2)));

        let scattered = beam_event((15.0, 25.0, -5.0), (21.0, 24.0, 5.0));
        assert_eq!(file.resolve(&scattered), Err(RejectionReason::CellMismatch));

        let outside = beam_event((-1.0, 5.0, -5.0), (-1.0, 5.0, 5.0));
        assert_eq!(file.resolve(&outside), Err(RejectionReason::OutOfBounds));

        let at_edge = beam_event((30.0, 5.0, -5.0), (29.0, 5.0, 5.0));
        assert_eq!(file.resolve(&at_edge), Err(RejectionReason::OutOfBounds));

        let missed = beam_event((15.0, 15.0, -5.0), (15.0, 15.0, 0.0));
        assert_eq!(file.resolve(&missed), Err(RejectionReason::NoHit));
    }
}
