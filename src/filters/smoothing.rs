//! Conservative smoothing.

use ndarray::Axis;

use crate::element::{Element, ElementKind};
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::StructuringElement;
use crate::Matrix;

impl<T: Element> Matrix<T> {
    /// Pull outliers back into the range of their neighbors.
    ///
    /// For each pixel, the minimum and maximum over the set cells of
    /// `element` other than the reference cell are computed. A center value
    /// below that range is raised to the minimum, one above it is lowered to
    /// the maximum. Bool buffers are left untouched.
    #[tracing::instrument(level = "debug", skip(self, element))]
    pub fn filter_conservative_smoothing(&mut self, element: &StructuringElement, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if T::KIND == ElementKind::Bool {
            tracing::debug!("conservative smoothing skipped for bool buffer");
            return Ok(());
        }

        let reference = (element.reference_x(), element.reference_y());
        let cells = element.set_cells();
        if cells.is_empty() {
            return Err(MatrixError::EmptyStructuringElement);
        }
        let neighbors: Vec<(usize, usize)> = cells.into_iter().filter(|&cell| cell != reference).collect();
        if neighbors.is_empty() {
            tracing::debug!("structuring element has no neighbor cells");
            return Ok(());
        }

        let footprint = element.footprint();
        let source = self.values.index_axis(Axis(0), z).to_owned();

        for y in footprint.rows(self.height()) {
            let top = y - footprint.top;
            for x in footprint.columns(self.width()) {
                let left = x - footprint.left;

                let mut low = T::MAX;
                let mut high = T::MIN;
                for &(cx, cy) in &neighbors {
                    let v = source[[top + cy, left + cx]];
                    if v < low {
                        low = v;
                    }
                    if v > high {
                        high = v;
                    }
                }

                let center = source[[y, x]];
                if center < low {
                    self.values[[z, y, x]] = low;
                } else if center > high {
                    self.values[[z, y, x]] = high;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_is_clamped_to_neighbors() {
        let mut m = Matrix::<u8>::from_layer(3, 3, vec![10, 12, 10, 11, 200, 14, 10, 10, 13]).unwrap();
        m.filter_conservative_smoothing(&StructuringElement::brick(3, 3), 0).unwrap();
        assert_eq!(m.value(1, 1, 0), 14);

        let mut dip = Matrix::<i16>::from_layer(3, 3, vec![-3, -2, -1, 0, -90, 1, 2, 3, 4]).unwrap();
        dip.filter_conservative_smoothing(&StructuringElement::brick(3, 3), 0).unwrap();
        assert_eq!(dip.value(1, 1, 0), -3);
    }

    #[test]
    fn test_value_inside_range_is_kept() {
        let mut m = Matrix::<u8>::from_layer(3, 3, vec![0, 50, 0, 50, 30, 50, 0, 50, 0]).unwrap();
        m.filter_conservative_smoothing(&StructuringElement::brick(3, 3), 0).unwrap();
        assert_eq!(m.value(1, 1, 0), 30);
    }

    #[test]
    fn test_bool_and_single_cell_are_noops() {
        let mut b = Matrix::<bool>::new(3, 3, 1);
        b.set_value(true, 1, 1, 0).unwrap();
        b.filter_conservative_smoothing(&StructuringElement::brick(3, 3), 0).unwrap();
        assert!(b.value(1, 1, 0));

        let mut m = Matrix::<u8>::from_layer(1, 1, vec![9]).unwrap();
        m.filter_conservative_smoothing(&StructuringElement::brick(1, 1), 0).unwrap();
        assert_eq!(m.value(0, 0, 0), 9);
    }
}
