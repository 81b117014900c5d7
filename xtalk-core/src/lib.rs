//! xtalk-core: Cell addressing, event classification and crosstalk
//! accumulation for scintillator-cube detector arrays.
//!
//! The pipeline is resolve -> classify -> accumulate -> map. Reading event
//! tables and rendering live in `xtalk-io` and `xtalk-plot`.

pub mod accumulator;
pub mod cell_grid;
pub mod channel;
pub mod classify;
pub mod error;
pub mod event;
pub mod geometry;
pub mod map;
pub mod resolver;
pub mod stats;

pub use accumulator::{AccumulatorSet, CellAccumulators, ChannelAccumulators, HistogramConfig};
pub use cell_grid::CellGrid;
pub use channel::{NeighborChannel, NEIGHBOR_COUNT};
pub use classify::{Classification, EventClassifier};
pub use error::{Error, Result};
pub use event::{EventRecord, PlanePosition, SubComponent, NOT_APPLICABLE};
pub use geometry::{CellCoord, DetectorGrid, DetectorSpan};
pub use map::{CrosstalkMap, CrosstalkMapBuilder};
pub use resolver::{CellAddressResolver, FileNamePattern, FileResolver, RejectionReason};
pub use stats::{Binning, Histogram1D, Histogram2D, RunningStats};
