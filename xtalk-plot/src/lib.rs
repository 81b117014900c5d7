//! xtalk-plot: Rendering of crosstalk analysis results.
//!
//! Histograms are drawn as bars, 2-D histograms as colored cells and per-cell
//! grids as Viridis heat-maps, to PNG or SVG through `plotters`.

pub mod chart;
mod error;
mod render;

pub use chart::{GridPlot, HistogramPlot, Plot, ScatterPlot};
pub use error::{Error, Result};
pub use render::{ImageFormat, Renderer};
