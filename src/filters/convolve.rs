//! Linear convolution with a [`Filter`] kernel.

use ndarray::Axis;

use crate::element::Element;
use crate::error::{MatrixError, MatrixResult};
use crate::kernel::Filter;
use crate::Matrix;

impl<T: Element> Matrix<T> {
    /// Convolve layer z with `filter`.
    ///
    /// For every pixel whose kernel footprint fits inside the buffer the
    /// weighted sum is multiplied by the pre-factor, rounded half away from
    /// zero, optionally shifted by half the element range or reflected when
    /// negative, and finally clamped to the element range. Border pixels keep
    /// their values.
    ///
    /// # Arguments
    /// * `filter` - Kernel, anchor and output scaling
    /// * `z` - Layer to filter
    #[tracing::instrument(level = "debug", skip(self, filter), fields(kernel_width = filter.width(), kernel_height = filter.height()))]
    pub fn filter(&mut self, filter: &Filter, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if filter.kernel().is_empty() {
            return Err(MatrixError::geometry("kernel has no cells"));
        }

        let source = self.values.index_axis(Axis(0), z).to_owned();
        let kernel = filter.kernel().values.index_axis(Axis(0), 0);
        let footprint = filter.footprint();

        let half_range = if T::KIND.is_integral() {
            ((T::MAX.to_f64() - T::MIN.to_f64()) / 2.0).floor()
        } else {
            0.0
        };

        for y in footprint.rows(self.height()) {
            let top = y - footprint.top;
            for x in footprint.columns(self.width()) {
                let left = x - footprint.left;

                let mut sum = 0.0;
                for ((ky, kx), &weight) in kernel.indexed_iter() {
                    if weight != 0 {
                        sum += weight as f64 * source[[top + ky, left + kx]].to_f64();
                    }
                }

                let mut result = sum * filter.pre_factor;
                if T::KIND.is_integral() {
                    result = result.round();
                }
                if filter.shift_result_values {
                    result += half_range;
                }
                if filter.invert_negative_result_values && result < 0.0 {
                    result = -result;
                }

                let clamped = result.clamp(T::MIN.to_f64(), T::MAX.to_f64());
                self.values[[z, y, x]] = T::from_f64(clamped);
            }
        }
        Ok(())
    }
}
