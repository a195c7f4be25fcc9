//! Background flood fill and value replacement.

use std::collections::VecDeque;

use ndarray::Axis;

use crate::element::Element;
use crate::error::MatrixResult;
use crate::Matrix;

impl<T: Element> Matrix<T> {
    /// Replace every `current` value of layer z with `new`.
    pub fn replace(&mut self, current: T, new: T, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        self.values
            .index_axis_mut(Axis(0), z)
            .mapv_inplace(|v| if v == current { new } else { v });
        Ok(())
    }

    /// Fill the background region reachable from the border.
    ///
    /// Every pixel equal to `background` that is 4-connected to the buffer
    /// border through other background pixels becomes `fill`. Enclosed
    /// background pockets are left alone. Buffers narrower or shorter than
    /// three pixels have no interior, so all background pixels are replaced.
    ///
    /// # Arguments
    /// * `background` - Value of the region to fill
    /// * `fill` - Replacement value
    /// * `z` - Layer to fill
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn fill_background(&mut self, background: T, fill: T, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if background == fill {
            return Ok(());
        }

        let (width, height) = (self.width(), self.height());
        if width < 3 || height < 3 {
            tracing::debug!(width, height, "buffer too small for flood fill, replacing");
            return self.replace(background, fill, z);
        }

        let mut queue = VecDeque::new();
        for x in 0..width {
            self.flood_visit(&mut queue, x, 0, z, background, fill);
            self.flood_visit(&mut queue, x, height - 1, z, background, fill);
        }
        for y in 1..height - 1 {
            self.flood_visit(&mut queue, 0, y, z, background, fill);
            self.flood_visit(&mut queue, width - 1, y, z, background, fill);
        }

        let mut filled = queue.len();
        while let Some((x, y)) = queue.pop_front() {
            let before = queue.len();
            if x > 0 {
                self.flood_visit(&mut queue, x - 1, y, z, background, fill);
            }
            if y > 0 {
                self.flood_visit(&mut queue, x, y - 1, z, background, fill);
            }
            if y + 1 < height {
                self.flood_visit(&mut queue, x, y + 1, z, background, fill);
            }
            if x + 1 < width {
                self.flood_visit(&mut queue, x + 1, y, z, background, fill);
            }
            filled += queue.len() - before;
        }

        tracing::debug!(filled, "background filled");
        Ok(())
    }

    /// Fill a background pixel and queue it. Pixels are filled when queued,
    /// so each one enters the queue at most once.
    #[inline]
    fn flood_visit(
        &mut self,
        queue: &mut VecDeque<(usize, usize)>,
        x: usize,
        y: usize,
        z: usize,
        background: T,
        fill: T,
    ) {
        let slot = &mut self.values[[z, y, x]];
        if *slot == background {
            *slot = fill;
            queue.push_back((x, y));
        }
    }
}
