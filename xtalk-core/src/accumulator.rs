//! Crosstalk accumulation.
//!
//! `AccumulatorSet` owns every distribution filled during a run. Pooled
//! distributions only see events entering through the central part of their
//! cell; per-cell distributions see every event resolved to a cell.

use std::collections::HashMap;

use crate::cell_grid::CellGrid;
use crate::channel::{NeighborChannel, NEIGHBOR_COUNT};
use crate::classify::Classification;
use crate::event::{EventRecord, SubComponent};
use crate::geometry::{CellCoord, DetectorGrid};
use crate::stats::{Binning, Histogram1D, Histogram2D};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Histogram ranges for one run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistogramConfig {
    /// Upper edge of the center light-yield axis (photons).
    pub center_ly_max: i32,
    /// Upper edge of the neighbor light-yield axis (photons).
    pub neighbor_ly_max: i32,
    /// Crosstalk ratio axis `[0, ratio_max)`.
    pub ratio_max: f64,
    pub ratio_bins: usize,
    /// Hit time axis `[0, time_max)` in ns.
    pub time_max: f64,
    pub time_bins: usize,
    /// Time difference axis `[-time_diff_range, time_diff_range)` in ns.
    pub time_diff_range: f64,
    pub time_diff_bins: usize,
    /// Bins per axis of the beam-gun position histograms.
    pub gun_bins: usize,
    /// Bins per axis of the per-cell scatter histograms.
    pub cell_scatter_bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            center_ly_max: 600,
            neighbor_ly_max: 60,
            ratio_max: 0.25,
            ratio_bins: 100,
            time_max: 50.0,
            time_bins: 100,
            time_diff_range: 10.0,
            time_diff_bins: 100,
            gun_bins: 100,
            cell_scatter_bins: 20,
        }
    }
}

impl HistogramConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the light-yield axis limits.
    #[must_use]
    pub fn with_light_yield_max(mut self, center: i32, neighbor: i32) -> Self {
        self.center_ly_max = center;
        self.neighbor_ly_max = neighbor;
        self
    }

    /// Sets the crosstalk ratio axis limit.
    #[must_use]
    pub fn with_ratio_max(mut self, ratio_max: f64) -> Self {
        self.ratio_max = ratio_max;
        self
    }

    /// Sets the hit time axis limit.
    #[must_use]
    pub fn with_time_max(mut self, time_max: f64) -> Self {
        self.time_max = time_max;
        self
    }

    /// Checks that every axis is non-empty.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first bad axis.
    pub fn validate(&self) -> Result<()> {
        let bad = |what: &str| Err(Error::ConfigError(format!("{what} must be positive")));
        if self.center_ly_max <= 0 {
            return bad("center light-yield maximum");
        }
        if self.neighbor_ly_max <= 0 {
            return bad("neighbor light-yield maximum");
        }
        if !(self.ratio_max > 0.0) {
            return bad("ratio maximum");
        }
        if !(self.time_max > 0.0) {
            return bad("time maximum");
        }
        if !(self.time_diff_range > 0.0) {
            return bad("time difference range");
        }
        if self.ratio_bins == 0
            || self.time_bins == 0
            || self.time_diff_bins == 0
            || self.gun_bins == 0
            || self.cell_scatter_bins == 0
        {
            return bad("bin count");
        }
        Ok(())
    }

    fn center_ly(&self) -> Binning {
        Binning::integer(0, self.center_ly_max)
    }

    fn neighbor_ly(&self) -> Binning {
        Binning::integer(0, self.neighbor_ly_max)
    }

    fn ratio(&self) -> Binning {
        Binning::new(self.ratio_bins, 0.0, self.ratio_max)
    }

    fn time(&self) -> Binning {
        Binning::new(self.time_bins, 0.0, self.time_max)
    }

    fn time_diff(&self) -> Binning {
        Binning::new(
            self.time_diff_bins,
            -self.time_diff_range,
            self.time_diff_range,
        )
    }

    fn cell_scatter(&self) -> (Binning, Binning) {
        let n = self.cell_scatter_bins;
        (
            Binning::new(n, 0.0, f64::from(self.center_ly_max)),
            Binning::new(n, 0.0, f64::from(self.neighbor_ly_max)),
        )
    }
}

/// Pooled distributions of one neighbor channel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelAccumulators {
    pub channel: NeighborChannel,
    pub light_yield: Histogram1D,
    /// Indexed in `SubComponent::ALL` order.
    pub sub_components: [Histogram1D; 3],
    pub ratio: Histogram1D,
    /// Joint (center, neighbor) light yield.
    pub scatter: Histogram2D,
    pub time: Histogram1D,
    /// `neighbor time - center time`.
    pub time_diff: Histogram1D,
}

impl ChannelAccumulators {
    fn new(channel: NeighborChannel, config: &HistogramConfig) -> Self {
        let ly = Histogram1D::new(config.neighbor_ly());
        Self {
            channel,
            light_yield: ly.clone(),
            sub_components: [ly.clone(), ly.clone(), ly],
            ratio: Histogram1D::new(config.ratio()),
            scatter: Histogram2D::new(config.center_ly(), config.neighbor_ly()),
            time: Histogram1D::new(config.time()),
            time_diff: Histogram1D::new(config.time_diff()),
        }
    }

    #[must_use]
    pub fn sub_component(&self, component: SubComponent) -> &Histogram1D {
        &self.sub_components[component.index()]
    }
}

/// Per-(channel, cell) distributions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellAccumulators {
    pub ratio: Histogram1D,
    pub scatter: Histogram2D,
}

/// All distributions of one analysis run.
#[derive(Debug, Clone)]
pub struct AccumulatorSet {
    grid: DetectorGrid,
    config: HistogramConfig,
    center_ly: Histogram1D,
    center_time: Histogram1D,
    gun_x: Histogram1D,
    gun_y: Histogram1D,
    hit_map: CellGrid<u64>,
    channels: Vec<ChannelAccumulators>,
    cells: HashMap<(NeighborChannel, CellCoord), CellAccumulators>,
    accumulated: u64,
    pooled: u64,
}

impl AccumulatorSet {
    /// Creates empty accumulators sized for `grid`.
    ///
    /// # Errors
    /// Returns `ConfigError` if the histogram configuration is invalid.
    pub fn new(grid: DetectorGrid, config: HistogramConfig) -> Result<Self> {
        config.validate()?;
        let span = grid.span();
        let gun = Binning::new(config.gun_bins, span.low, span.high);
        Ok(Self {
            grid,
            center_ly: Histogram1D::new(config.center_ly()),
            center_time: Histogram1D::new(config.time()),
            gun_x: Histogram1D::new(gun),
            gun_y: Histogram1D::new(gun),
            hit_map: CellGrid::new(grid.side(), 0),
            channels: NeighborChannel::ALL
                .iter()
                .map(|&c| ChannelAccumulators::new(c, &config))
                .collect(),
            cells: HashMap::with_capacity(NEIGHBOR_COUNT * grid.cell_count()),
            accumulated: 0,
            pooled: 0,
            config,
        })
    }

    /// Adds one classified event.
    ///
    /// Events not valid for the map leave every distribution untouched.
    pub fn accumulate(&mut self, class: &Classification, event: &EventRecord) {
        if !class.valid_for_map || !self.grid.contains(class.cell) {
            return;
        }
        let cell = class.cell;
        self.accumulated += 1;
        if class.valid_for_pooled {
            self.pooled += 1;
        }

        if let Some(hits) = self.hit_map.get_mut(cell) {
            *hits += 1;
        }
        self.gun_x.fill(event.gun[0]);
        self.gun_y.fill(event.gun[1]);
        if let Some(t) = event.center_hit_time() {
            self.center_time.fill(t);
        }

        let center = f64::from(event.center_ly);
        if class.valid_for_pooled {
            self.center_ly.fill(center);
        }

        for channel in NeighborChannel::ALL {
            let neighbor = f64::from(event.neighbor(channel));
            let ratio = event.crosstalk_ratio(channel);

            let per_cell = self.cell_entry(channel, cell);
            per_cell.scatter.fill(center, neighbor);
            if let Some(r) = ratio {
                per_cell.ratio.fill(r);
            }

            let pooled = &mut self.channels[channel.index()];
            if class.valid_for_pooled {
                pooled.light_yield.fill(neighbor);
                for (hist, component) in pooled.sub_components.iter_mut().zip(SubComponent::ALL) {
                    if let Some(value) = event.sub_component(channel, component) {
                        hist.fill(f64::from(value));
                    }
                }
                if let Some(r) = ratio {
                    pooled.ratio.fill(r);
                }
                pooled.scatter.fill(center, neighbor);
            }

            if let Some(t) = event.neighbor_hit_time(channel) {
                pooled.time.fill(t);
                if let Some(t0) = event.center_hit_time() {
                    pooled.time_diff.fill(t - t0);
                }
            }
        }
    }

    fn cell_entry(&mut self, channel: NeighborChannel, cell: CellCoord) -> &mut CellAccumulators {
        let config = &self.config;
        self.cells.entry((channel, cell)).or_insert_with(|| {
            let (x, y) = config.cell_scatter();
            CellAccumulators {
                ratio: Histogram1D::new(config.ratio()),
                scatter: Histogram2D::new(x, y),
            }
        })
    }

    #[must_use]
    pub fn grid(&self) -> &DetectorGrid {
        &self.grid
    }

    #[must_use]
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Events that reached the accumulators.
    #[must_use]
    pub fn accumulated(&self) -> u64 {
        self.accumulated
    }

    /// Events that also entered the pooled distributions.
    #[must_use]
    pub fn pooled(&self) -> u64 {
        self.pooled
    }

    #[must_use]
    pub fn center_light_yield(&self) -> &Histogram1D {
        &self.center_ly
    }

    #[must_use]
    pub fn center_time(&self) -> &Histogram1D {
        &self.center_time
    }

    #[must_use]
    pub fn gun_x(&self) -> &Histogram1D {
        &self.gun_x
    }

    #[must_use]
    pub fn gun_y(&self) -> &Histogram1D {
        &self.gun_y
    }

    #[must_use]
    pub fn hit_map(&self) -> &CellGrid<u64> {
        &self.hit_map
    }

    #[must_use]
    pub fn channel(&self, channel: NeighborChannel) -> &ChannelAccumulators {
        &self.channels[channel.index()]
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelAccumulators> {
        self.channels.iter()
    }

    /// Per-cell distributions, `None` if the cell never saw an event.
    #[must_use]
    pub fn cell(&self, channel: NeighborChannel, cell: CellCoord) -> Option<&CellAccumulators> {
        self.cells.get(&(channel, cell))
    }
}
