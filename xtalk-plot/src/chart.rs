//! Chart kinds: 1-D histograms as bars, 2-D histograms as colored cells and
//! per-cell grids as heat-maps.

use crate::Result;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use xtalk_core::{CellCoord, CellGrid, CrosstalkMap, Histogram1D, Histogram2D};

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Something that can be drawn onto a drawing area.
///
/// `text` is false for backends that cannot render glyphs; titles, tick
/// labels and axis descriptions are then left out.
pub trait Plot {
    /// # Errors
    /// Returns an error if the backend fails to draw.
    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, text: bool) -> Result<()>;
}

fn frame<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    text: bool,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder.margin(15);
    if text {
        builder
            .caption(title, ("sans-serif", 22))
            .x_label_area_size(45)
            .y_label_area_size(60);
    } else {
        builder.x_label_area_size(5).y_label_area_size(5);
    }
    builder
}

fn axes<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x_desc: &str,
    y_desc: &str,
    text: bool,
) -> Result<()> {
    let mut mesh = chart.configure_mesh();
    if text {
        mesh.x_desc(x_desc).y_desc(y_desc);
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;
    Ok(())
}

/// Bar chart of a 1-D histogram.
pub struct HistogramPlot<'a> {
    pub title: String,
    pub x_desc: &'a str,
    pub hist: &'a Histogram1D,
}

impl Plot for HistogramPlot<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, text: bool) -> Result<()> {
        let binning = self.hist.binning();
        let peak = self.hist.counts().iter().copied().max().unwrap_or(0).max(1);
        let title = format!("{} (entries {})", self.title, self.hist.entries());
        let mut chart = frame(area, &title, text)
            .build_cartesian_2d(binning.low..binning.high, 0.0..peak as f64 * 1.1)?;
        axes(&mut chart, self.x_desc, "Events", text)?;

        chart.draw_series(
            self.hist
                .iter_bins()
                .filter(|&(_, _, c)| c > 0)
                .map(|(lo, hi, c)| Rectangle::new([(lo, 0.0), (hi, c as f64)], BLUE.mix(0.6).filled())),
        )?;
        Ok(())
    }
}

/// 2-D histogram drawn as cells colored by count.
pub struct ScatterPlot<'a> {
    pub title: String,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub hist: &'a Histogram2D,
}

impl Plot for ScatterPlot<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, text: bool) -> Result<()> {
        let xb = self.hist.x_binning();
        let yb = self.hist.y_binning();
        let peak = self.hist.max_count().max(1) as f64;
        let mut chart = frame(area, &self.title, text)
            .build_cartesian_2d(xb.low..xb.high, yb.low..yb.high)?;
        axes(&mut chart, self.x_desc, self.y_desc, text)?;

        chart.draw_series(self.hist.iter_filled().map(|((x0, x1), (y0, y1), c)| {
            let color = ViridisRGB.get_color(c as f64 / peak);
            Rectangle::new([(x0, y0), (x1, y1)], color.filled())
        }))?;
        Ok(())
    }
}

/// Heat-map over the detector cells. Bins are labelled 1..=N; NaN cells stay
/// blank.
pub struct GridPlot {
    pub title: String,
    pub side: u32,
    pub cells: Vec<(CellCoord, f64)>,
}

impl GridPlot {
    /// Heat-map of a crosstalk map in percent.
    #[must_use]
    pub fn from_map(title: String, map: &CrosstalkMap) -> Self {
        Self {
            title,
            side: map.side(),
            cells: map.iter().collect(),
        }
    }

    /// Heat-map of per-cell event counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(title: String, counts: &CellGrid<u64>) -> Self {
        Self {
            title,
            side: counts.side(),
            cells: counts.iter().map(|(cell, &n)| (cell, n as f64)).collect(),
        }
    }

    /// Finite (min, max) over the cells.
    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .map(|&(_, v)| v)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl Plot for GridPlot {
    fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, text: bool) -> Result<()> {
        let range = self.range();
        let title = match range {
            Some((lo, hi)) => format!("{} [{lo:.3}, {hi:.3}]", self.title),
            None => self.title.clone(),
        };
        let upper = f64::from(self.side) + 0.5;
        let mut chart = frame(area, &title, text).build_cartesian_2d(0.5..upper, 0.5..upper)?;
        axes(&mut chart, "Cell X", "Cell Y", text)?;

        let Some((lo, hi)) = range else {
            return Ok(());
        };
        let span = hi - lo;
        chart.draw_series(
            self.cells
                .iter()
                .filter(|(_, v)| v.is_finite())
                .map(|&(cell, v)| {
                    let norm = if span > 0.0 { (v - lo) / span } else { 0.5 };
                    let x = f64::from(cell.x) + 0.5;
                    let y = f64::from(cell.y) + 0.5;
                    Rectangle::new(
                        [(x, y), (x + 1.0, y + 1.0)],
                        ViridisRGB.get_color(norm.clamp(0.0, 1.0)).filled(),
                    )
                }),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtalk_core::NeighborChannel;

    #[test]
    fn test_grid_range_ignores_nan() {
        let mut map = CrosstalkMap::empty(NeighborChannel::Right, 2);
        map.set(CellCoord::new(0, 1), 4.0);
        map.set(CellCoord::new(1, 1), 1.5);
        let plot = GridPlot::from_map("map".to_string(), &map);
        assert_eq!(plot.cells.len(), 4);
        assert_eq!(plot.range(), Some((1.5, 4.0)));
    }

    #[test]
    fn test_grid_from_counts() {
        let mut counts = CellGrid::new(2, 0u64);
        *counts.get_mut(CellCoord::new(1, 0)).unwrap() = 7;
        let plot = GridPlot::from_counts("hits".to_string(), &counts);
        assert_eq!(plot.side, 2);
        assert_eq!(plot.range(), Some((0.0, 7.0)));
    }
}
