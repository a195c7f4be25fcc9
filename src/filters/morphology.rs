//! Morphology filters: erode, dilate, open, close.
//!
//! Unsigned buffers go through the histogram quantile filter (1.0 for
//! erosion, 0.0 for dilation). Bool, signed and float buffers take the
//! minimum or maximum of each window directly; for bool this is the classic
//! "all set cells hit true" / "any set cell hits true" rule.
//!
//! Only pixels whose full window lies inside the buffer are written.

use ndarray::Axis;

use crate::element::{Element, ElementKind};
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::StructuringElement;
use crate::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Minimum,
    Maximum,
}

impl<T: Element> Matrix<T> {
    /// Shrink bright regions: each pixel becomes the minimum of its window.
    #[tracing::instrument(level = "debug", skip(self, element))]
    pub fn erode(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        if T::KIND == ElementKind::Unsigned {
            tracing::debug!("erode delegates to the quantile filter");
            return self.filter_quantile(element, 1.0, z);
        }
        self.window_extremum(element, z, Extremum::Minimum)
    }

    /// Grow bright regions: each pixel becomes the maximum of its window.
    #[tracing::instrument(level = "debug", skip(self, element))]
    pub fn dilate(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        if T::KIND == ElementKind::Unsigned {
            tracing::debug!("dilate delegates to the quantile filter");
            return self.filter_quantile(element, 0.0, z);
        }
        self.window_extremum(element, z, Extremum::Maximum)
    }

    /// Erode, then dilate with the same element.
    pub fn open(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        self.erode(element, z)?;
        self.dilate(element, z)
    }

    /// Dilate, then erode with the same element.
    pub fn close(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        self.dilate(element, z)?;
        self.erode(element, z)
    }

    fn window_extremum(&mut self, element: &StructuringElement, z: usize, extremum: Extremum) -> MatrixResult<()> {
        self.check_layer(z)?;
        let cells = element.set_cells();
        if cells.is_empty() {
            return Err(MatrixError::EmptyStructuringElement);
        }

        let footprint = element.footprint();
        let source = self.values.index_axis(Axis(0), z).to_owned();

        for y in footprint.rows(self.height()) {
            let top = y - footprint.top;
            for x in footprint.columns(self.width()) {
                let left = x - footprint.left;

                let mut window = cells.iter().map(|&(cx, cy)| source[[top + cy, left + cx]]);
                let first = window.next().unwrap_or(T::ZERO);
                let result = window.fold(first, |acc, v| match extremum {
                    Extremum::Minimum if v < acc => v,
                    Extremum::Maximum if v > acc => v,
                    _ => acc,
                });
                self.values[[z, y, x]] = result;
            }
        }
        Ok(())
    }
}
