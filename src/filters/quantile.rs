//! Sliding-window quantile and median filters.
//!
//! Ranked buffers (bool and unsigned) keep a histogram of the window that is
//! updated column by column: when the window moves one pixel right, only the
//! cells of the structuring element's run-length spans that leave and enter
//! the window are touched. A cursor into the histogram tracks the bin holding
//! the requested rank, together with the number of window values in the bins
//! before it, so each step only moves the cursor by the amount the update
//! shifted it.
//!
//! Ranks are counted from the largest value: quantile 0.0 selects the window
//! maximum and quantile 1.0 the minimum.

use std::cmp::Ordering;

use ndarray::Axis;

use crate::element::{Element, ElementKind};
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::StructuringElement;
use crate::Matrix;

/// Histogram of a window plus a cursor on the bin of a tracked rank.
///
/// Bin 0 holds the largest element value.
struct RankWindow {
    histogram: Vec<usize>,
    cursor: usize,
    /// Number of values in bins before `cursor`.
    before_cursor: usize,
}

impl RankWindow {
    fn new(bins: usize) -> Self {
        Self {
            histogram: vec![0; bins],
            cursor: 0,
            before_cursor: 0,
        }
    }

    fn clear(&mut self) {
        self.histogram.fill(0);
        self.cursor = 0;
        self.before_cursor = 0;
    }

    #[inline]
    fn add(&mut self, bin: usize) {
        self.histogram[bin] += 1;
        if bin < self.cursor {
            self.before_cursor += 1;
        }
    }

    #[inline]
    fn remove(&mut self, bin: usize) {
        self.histogram[bin] -= 1;
        if bin < self.cursor {
            self.before_cursor -= 1;
        }
    }

    /// Bin of the value at position `rank`. The window must hold more than
    /// `rank` values.
    fn seek(&mut self, rank: usize) -> usize {
        while self.before_cursor > rank {
            self.cursor -= 1;
            self.before_cursor -= self.histogram[self.cursor];
        }
        while self.before_cursor + self.histogram[self.cursor] <= rank {
            self.before_cursor += self.histogram[self.cursor];
            self.cursor += 1;
        }
        self.cursor
    }

    /// Bin of the value at position `rank - 1`, valid right after `seek(rank)`.
    fn preceding(&self, rank: usize) -> usize {
        if rank > self.before_cursor {
            return self.cursor;
        }
        (0..self.cursor)
            .rev()
            .find(|&bin| self.histogram[bin] > 0)
            .unwrap_or(self.cursor)
    }
}

impl<T: Element> Matrix<T> {
    /// Replace every pixel by the value at the given quantile of its window.
    ///
    /// With `n` set cells, the selected position is `floor(quantile * n)`,
    /// capped at `n - 1`. For quantile 0.5 over an even number of cells the
    /// two middle values are averaged and rounded up. Only pixels whose whole
    /// window fits inside the buffer are written.
    ///
    /// # Arguments
    /// * `element` - Window shape and anchor
    /// * `quantile` - Rank position in [0, 1], 0 = maximum, 1 = minimum
    /// * `z` - Layer to filter
    ///
    /// # Errors
    /// `InvalidQuantile` outside [0, 1], `Unsupported` for signed and float
    /// buffers, `EmptyStructuringElement` when no cell is set.
    #[tracing::instrument(level = "debug", skip(self, element), fields(cells = element.count_set()))]
    pub fn filter_quantile(&mut self, element: &StructuringElement, quantile: f64, z: usize) -> MatrixResult<()> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(MatrixError::InvalidQuantile(quantile));
        }
        self.check_layer(z)?;
        let Some(ranks) = T::RANKS else {
            return Err(MatrixError::unsupported("quantile filter", T::KIND));
        };
        let cells = element.count_set();
        if cells == 0 {
            return Err(MatrixError::EmptyStructuringElement);
        }

        let threshold = ((quantile * cells as f64).floor() as usize).min(cells - 1);
        let average_middle = T::KIND != ElementKind::Bool && quantile == 0.5 && cells % 2 == 0;

        let footprint = element.footprint();
        let columns = footprint.columns(self.width());
        if columns.is_empty() {
            return Ok(());
        }

        let spans: Vec<(usize, usize, usize)> = element
            .run_length_code()
            .iter()
            .map(|span| (span.start.x as usize, span.start.y as usize, span.length as usize))
            .collect();
        let bin_of = |v: T| ranks - 1 - v.rank();
        let value_of = |bin: usize| T::from_rank(ranks - 1 - bin);

        let source = self.values.index_axis(Axis(0), z).to_owned();
        let mut window = RankWindow::new(ranks);

        for y in footprint.rows(self.height()) {
            let top = y - footprint.top;

            window.clear();
            let left = columns.start - footprint.left;
            for &(sx, sy, length) in &spans {
                for dx in 0..length {
                    window.add(bin_of(source[[top + sy, left + sx + dx]]));
                }
            }

            for x in columns.clone() {
                if x > columns.start {
                    let left = x - footprint.left;
                    for &(sx, sy, length) in &spans {
                        let row = top + sy;
                        let leaving = left + sx - 1;
                        window.remove(bin_of(source[[row, leaving]]));
                        window.add(bin_of(source[[row, leaving + length]]));
                    }
                }

                let bin = window.seek(threshold);
                self.values[[z, y, x]] = if average_middle {
                    let other = window.preceding(threshold);
                    let mean = (value_of(bin).to_f64() + value_of(other).to_f64()) / 2.0;
                    T::from_f64((mean + 0.5).floor())
                } else {
                    value_of(bin)
                };
            }
        }
        Ok(())
    }

    /// Median of every window.
    ///
    /// Ranked buffers use the histogram quantile filter at 0.5. Signed and
    /// float buffers sort each window and take the middle value, or the mean
    /// of the two middle values for an even cell count (rounded for integral
    /// kinds).
    #[tracing::instrument(level = "debug", skip(self, element), fields(cells = element.count_set()))]
    pub fn filter_median(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        if T::KIND.is_ranked() {
            let kind = T::KIND;
            tracing::debug!(%kind, "median delegates to the quantile filter");
            return self.filter_quantile(element, 0.5, z);
        }
        self.check_layer(z)?;

        let cells = element.set_cells();
        if cells.is_empty() {
            return Err(MatrixError::EmptyStructuringElement);
        }

        let footprint = element.footprint();
        let source = self.values.index_axis(Axis(0), z).to_owned();
        let mut window = Vec::with_capacity(cells.len());
        let middle = cells.len() / 2;

        for y in footprint.rows(self.height()) {
            let top = y - footprint.top;
            for x in footprint.columns(self.width()) {
                let left = x - footprint.left;

                window.clear();
                window.extend(cells.iter().map(|&(cx, cy)| source[[top + cy, left + cx]]));
                window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

                self.values[[z, y, x]] = if cells.len() % 2 == 1 {
                    window[middle]
                } else {
                    let mean = (window[middle - 1].to_f64() + window[middle].to_f64()) / 2.0;
                    T::from_f64_rounded(mean)
                };
            }
        }
        Ok(())
    }
}
