//! Incremental statistics and fixed-bin histograms.
//!
//! Every accumulator keeps exact moments over all fills, independent of its
//! binning. Bins exist only for rendering.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Count, sum and sum of squares of a stream of values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunningStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    #[inline]
    #[must_use]
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// Arithmetic mean, NaN when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Population variance, NaN when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0)
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Standard error of the mean, NaN when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn std_error(&self) -> f64 {
        self.std_dev() / (self.count as f64).sqrt()
    }

    /// Smallest sample, NaN when empty.
    #[must_use]
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.min
        }
    }

    /// Largest sample, NaN when empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.max
        }
    }
}

/// Uniform binning of `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binning {
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

impl Binning {
    /// Creates a binning; degenerate inputs collapse to a single unit bin.
    #[must_use]
    pub fn new(bins: usize, low: f64, high: f64) -> Self {
        if bins == 0 || low.partial_cmp(&high) != Some(std::cmp::Ordering::Less) {
            return Self {
                bins: 1,
                low,
                high: low + 1.0,
            };
        }
        Self { bins, low, high }
    }

    /// Binning with one bin per integer value in `[low, high)`.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn integer(low: i32, high: i32) -> Self {
        let bins = i64::from(high) - i64::from(low);
        Self::new(bins.max(0) as usize, f64::from(low), f64::from(high))
    }

    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self) -> f64 {
        (self.high - self.low) / self.bins as f64
    }

    /// Bin index of `value`, `None` outside the range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index(&self, value: f64) -> Option<usize> {
        if !(value >= self.low && value < self.high) {
            return None;
        }
        let idx = ((value - self.low) / self.width()) as usize;
        Some(idx.min(self.bins - 1))
    }

    /// Lower edge of bin `i`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn edge(&self, i: usize) -> f64 {
        self.low + i as f64 * self.width()
    }
}

/// One-dimensional histogram with exact running moments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram1D {
    binning: Binning,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
    stats: RunningStats,
}

impl Histogram1D {
    #[must_use]
    pub fn new(binning: Binning) -> Self {
        Self {
            binning,
            counts: vec![0; binning.bins],
            underflow: 0,
            overflow: 0,
            stats: RunningStats::new(),
        }
    }

    /// Adds one sample; out-of-range samples still enter the moments.
    pub fn fill(&mut self, value: f64) {
        self.stats.push(value);
        match self.binning.index(value) {
            Some(i) => self.counts[i] += 1,
            None if value < self.binning.low => self.underflow += 1,
            None => self.overflow += 1,
        }
    }

    #[must_use]
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[must_use]
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    #[must_use]
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    #[must_use]
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Number of fills, including out-of-range ones.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.stats.count()
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    /// Iterates `(lower edge, upper edge, count)` per bin.
    pub fn iter_bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.binning.edge(i), self.binning.edge(i + 1), c))
    }
}

/// Two-dimensional histogram with joint moments for correlation and slope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram2D {
    x_binning: Binning,
    y_binning: Binning,
    counts: Vec<u64>,
    outside: u64,
    x: RunningStats,
    y: RunningStats,
    sum_xy: f64,
}

impl Histogram2D {
    #[must_use]
    pub fn new(x_binning: Binning, y_binning: Binning) -> Self {
        Self {
            x_binning,
            y_binning,
            counts: vec![0; x_binning.bins * y_binning.bins],
            outside: 0,
            x: RunningStats::new(),
            y: RunningStats::new(),
            sum_xy: 0.0,
        }
    }

    /// Adds one (x, y) point.
    pub fn fill(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
        self.sum_xy += x * y;
        match (self.x_binning.index(x), self.y_binning.index(y)) {
            (Some(i), Some(j)) => self.counts[j * self.x_binning.bins + i] += 1,
            _ => self.outside += 1,
        }
    }

    #[must_use]
    pub fn x_binning(&self) -> &Binning {
        &self.x_binning
    }

    #[must_use]
    pub fn y_binning(&self) -> &Binning {
        &self.y_binning
    }

    /// Count in bin (i, j), `None` off the binned area.
    #[must_use]
    pub fn count(&self, i: usize, j: usize) -> Option<u64> {
        if i >= self.x_binning.bins || j >= self.y_binning.bins {
            return None;
        }
        self.counts.get(j * self.x_binning.bins + i).copied()
    }

    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Points that fell outside the binned area.
    #[must_use]
    pub fn outside(&self) -> u64 {
        self.outside
    }

    #[must_use]
    pub fn entries(&self) -> u64 {
        self.x.count()
    }

    #[must_use]
    pub fn x_stats(&self) -> &RunningStats {
        &self.x
    }

    #[must_use]
    pub fn y_stats(&self) -> &RunningStats {
        &self.y
    }

    /// Least-squares slope of `y = k x`, NaN without any nonzero x.
    #[must_use]
    pub fn slope_through_origin(&self) -> f64 {
        let sxx = self.sum_xx();
        if sxx == 0.0 {
            return f64::NAN;
        }
        self.sum_xy / sxx
    }

    /// Pearson correlation coefficient, NaN when either axis has no spread.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn correlation(&self) -> f64 {
        let n = self.entries();
        if n == 0 {
            return f64::NAN;
        }
        let cov = self.sum_xy / n as f64 - self.x.mean() * self.y.mean();
        let denom = self.x.std_dev() * self.y.std_dev();
        if denom == 0.0 {
            return f64::NAN;
        }
        cov / denom
    }

    fn sum_xx(&self) -> f64 {
        self.x.sum_sq()
    }

    /// Iterates `((x_lo, x_hi), (y_lo, y_hi), count)` over non-empty bins.
    pub fn iter_filled(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64), u64)> + '_ {
        let nx = self.x_binning.bins;
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(move |(k, &c)| {
                let (i, j) = (k % nx, k / nx);
                (
                    (self.x_binning.edge(i), self.x_binning.edge(i + 1)),
                    (self.y_binning.edge(j), self.y_binning.edge(j + 1)),
                    c,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_running_stats_moments() {
        let mut stats = RunningStats::new();
        assert!(stats.mean().is_nan());
        assert!(stats.min().is_nan());
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 8);
        assert_relative_eq!(stats.mean(), 5.0);
        assert_relative_eq!(stats.variance(), 4.0);
        assert_relative_eq!(stats.std_dev(), 2.0);
        assert_relative_eq!(stats.std_error(), 2.0 / 8f64.sqrt());
        assert_relative_eq!(stats.min(), 2.0);
        assert_relative_eq!(stats.max(), 9.0);
    }

    #[test]
    fn test_binning() {
        let b = Binning::new(10, 0.0, 1.0);
        assert_eq!(b.index(0.0), Some(0));
        assert_eq!(b.index(0.95), Some(9));
        assert_eq!(b.index(1.0), None);
        assert_eq!(b.index(-0.01), None);
        assert_eq!(b.index(f64::NAN), None);
        assert_relative_eq!(b.edge(3), 0.3);

        let ints = Binning::integer(-1, 3);
        assert_eq!(ints.bins, 4);
        assert_eq!(ints.index(-1.0), Some(0));
        assert_eq!(ints.index(2.0), Some(3));

        let degenerate = Binning::new(0, 5.0, 5.0);
        assert_eq!(degenerate.bins, 1);
    }

    #[test]
    fn test_histogram_under_and_overflow() {
        let mut h = Histogram1D::new(Binning::new(4, 0.0, 4.0));
        for v in [-1.0, 0.5, 1.5, 1.7, 4.0, 10.0] {
            h.fill(v);
        }
        assert_eq!(h.counts(), &[1, 2, 0, 0]);
        assert_eq!(h.underflow(), 1);
        assert_eq!(h.overflow(), 2);
        assert_eq!(h.entries(), 6);
        assert_relative_eq!(h.mean(), 16.7 / 6.0, epsilon = 1e-12);
        let bins: Vec<_> = h.iter_bins().collect();
        assert_eq!(bins[1], (1.0, 2.0, 2));
    }

    #[test]
    fn test_histogram2d_slope_and_correlation() {
        let mut h = Histogram2D::new(Binning::new(10, 0.0, 100.0), Binning::new(10, 0.0, 10.0));
        for x in [10.0, 20.0, 30.0, 40.0] {
            h.fill(x, 0.05 * x);
        }
        h.fill(200.0, 10.0);
        assert_eq!(h.entries(), 5);
        assert_eq!(h.outside(), 1);
        assert_eq!(h.count(1, 0), Some(1));
        assert_eq!(h.count(4, 2), Some(1));
        assert_eq!(h.count(0, 0), Some(0));
        assert_eq!(h.count(10, 0), None);
        assert_eq!(h.count(0, 10), None);
        assert_relative_eq!(h.slope_through_origin(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(h.correlation(), 1.0, epsilon = 1e-9);
        assert_eq!(h.iter_filled().count(), 4);
    }

    #[test]
    fn test_histogram2d_empty_estimators_are_nan() {
        let h = Histogram2D::new(Binning::new(2, 0.0, 1.0), Binning::new(2, 0.0, 1.0));
        assert!(h.slope_through_origin().is_nan());
        assert!(h.correlation().is_nan());
        assert_eq!(h.max_count(), 0);
    }
}
