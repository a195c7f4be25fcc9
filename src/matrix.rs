//! Layered pixel buffer.
//!
//! A [`Matrix`] owns a 3-D grid of scalars with axes (layer, row, column).
//! Every layer is a contiguous row-major block of `width * height` values,
//! which is what image loaders and displays exchange.
//!
//! ## Access policy
//!
//! Reads outside the grid return the element's zero value and writes outside
//! are dropped. The checked variants ([`Matrix::try_value`],
//! [`Matrix::set_value`]) report the miss instead.

use std::ops::Range;

use ndarray::{Array3, ArrayView2, Axis};

use crate::element::{Element, ElementKind};
use crate::error::{MatrixError, MatrixResult};

#[derive(Debug, Clone)]
pub struct Matrix<T: Element> {
    /// Standard layout, shape (layers, height, width).
    pub(crate) values: Array3<T>,
}

impl<T: Element> Matrix<T> {
    /// Zero-filled buffer. Zero dimensions are clamped to 1.
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        Self::with_value(width, height, layers, T::ZERO)
    }

    /// Buffer with every value of every layer set to `value`.
    pub fn with_value(width: usize, height: usize, layers: usize, value: T) -> Self {
        let (width, height, layers) = (width.max(1), height.max(1), layers.max(1));
        tracing::trace!(width, height, layers, "matrix created");
        Self {
            values: Array3::from_elem((layers, height, width), value),
        }
    }

    /// Wrap an array of shape (layers, height, width).
    pub fn from_array(values: Array3<T>) -> MatrixResult<Self> {
        let (layers, height, width) = values.dim();
        if layers == 0 || height == 0 || width == 0 {
            return Err(MatrixError::geometry(format!(
                "array shape ({layers}, {height}, {width}) has an empty axis"
            )));
        }

        let values = if values.is_standard_layout() {
            values
        } else {
            values.as_standard_layout().into_owned()
        };
        Ok(Self { values })
    }

    /// Single-layer buffer from a row-major vector.
    pub fn from_layer(width: usize, height: usize, data: Vec<T>) -> MatrixResult<Self> {
        let values = Array3::from_shape_vec((1, height, width), data)
            .map_err(|e| MatrixError::geometry(e.to_string()))?;
        Self::from_array(values)
    }

    pub fn as_array(&self) -> &Array3<T> {
        &self.values
    }

    pub fn into_array(self) -> Array3<T> {
        self.values
    }

    pub fn width(&self) -> usize {
        self.values.dim().2
    }

    pub fn height(&self) -> usize {
        self.values.dim().1
    }

    pub fn layers(&self) -> usize {
        self.values.dim().0
    }

    /// True only for a moved-out husk (see [`Default`]).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.width() && y < self.height() && z < self.layers()
    }

    pub(crate) fn check_layer(&self, z: usize) -> MatrixResult<()> {
        if z < self.layers() {
            Ok(())
        } else {
            Err(MatrixError::LayerOutOfRange {
                layer: z,
                layers: self.layers(),
            })
        }
    }

    fn layer_range(&self, z: usize) -> Range<usize> {
        let size = self.width() * self.height();
        z * size..(z + 1) * size
    }

    // ========================================================================
    // Single values
    // ========================================================================

    /// Value at (x, y) of layer z, or zero outside the grid.
    pub fn value(&self, x: usize, y: usize, z: usize) -> T {
        self.try_value(x, y, z).unwrap_or(T::ZERO)
    }

    pub fn try_value(&self, x: usize, y: usize, z: usize) -> Option<T> {
        self.values.get((z, y, x)).copied()
    }

    pub fn set_value(&mut self, value: T, x: usize, y: usize, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        match self.values.get_mut((z, y, x)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MatrixError::OutOfBounds { x, y }),
        }
    }

    /// Clipped write.
    #[inline]
    pub(crate) fn put(&mut self, value: T, x: usize, y: usize, z: usize) {
        if let Some(slot) = self.values.get_mut((z, y, x)) {
            *slot = value;
        }
    }

    /// Clipped write at a possibly negative position.
    #[inline]
    pub(crate) fn put_signed(&mut self, value: T, x: i64, y: i64, z: usize) {
        if x >= 0 && y >= 0 {
            self.put(value, x as usize, y as usize, z);
        }
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Row-major values of layer z.
    pub fn layer(&self, z: usize) -> Option<&[T]> {
        if z >= self.layers() {
            return None;
        }
        let range = self.layer_range(z);
        self.values.as_slice().map(|all| &all[range])
    }

    pub fn layer_mut(&mut self, z: usize) -> Option<&mut [T]> {
        if z >= self.layers() {
            return None;
        }
        let range = self.layer_range(z);
        self.values.as_slice_mut().map(|all| &mut all[range])
    }

    /// Layer z as a (height, width) view.
    pub fn layer_view(&self, z: usize) -> Option<ArrayView2<'_, T>> {
        (z < self.layers()).then(|| self.values.index_axis(Axis(0), z))
    }

    /// Pack the given layers pixel by pixel: `[l0, l1, .., l0, l1, ..]`.
    pub fn interleaved(&self, layer_indices: &[usize]) -> MatrixResult<Vec<T>> {
        for &z in layer_indices {
            self.check_layer(z)?;
        }

        let mut packed = Vec::with_capacity(self.width() * self.height() * layer_indices.len());
        for y in 0..self.height() {
            for x in 0..self.width() {
                for &z in layer_indices {
                    packed.push(self.values[[z, y, x]]);
                }
            }
        }
        Ok(packed)
    }

    /// Inverse of [`Matrix::interleaved`].
    pub fn set_interleaved(&mut self, buffer: &[T], layer_indices: &[usize]) -> MatrixResult<()> {
        for &z in layer_indices {
            self.check_layer(z)?;
        }

        let channels = layer_indices.len();
        let required = self.width() * self.height() * channels;
        if buffer.len() < required {
            return Err(MatrixError::geometry(format!(
                "interleaved buffer has {} values, {required} required",
                buffer.len()
            )));
        }

        let width = self.width();
        for y in 0..self.height() {
            for x in 0..width {
                for (i, &z) in layer_indices.iter().enumerate() {
                    self.values[[z, y, x]] = buffer[(y * width + x) * channels + i];
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Bulk writes
    // ========================================================================

    pub fn set_all_values(&mut self, value: T, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        self.values.index_axis_mut(Axis(0), z).fill(value);
        Ok(())
    }

    pub fn set_row(&mut self, value: T, y: usize, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if y >= self.height() {
            return Err(MatrixError::OutOfBounds { x: 0, y });
        }
        self.values
            .index_axis_mut(Axis(0), z)
            .index_axis_mut(Axis(0), y)
            .fill(value);
        Ok(())
    }

    pub fn set_column(&mut self, value: T, x: usize, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if x >= self.width() {
            return Err(MatrixError::OutOfBounds { x, y: 0 });
        }
        self.values
            .index_axis_mut(Axis(0), z)
            .index_axis_mut(Axis(1), x)
            .fill(value);
        Ok(())
    }

    /// Zero every layer.
    pub fn clear(&mut self) {
        self.values.fill(T::ZERO);
    }

    // ========================================================================
    // Value mappings
    // ========================================================================

    /// Complement every value: bools flip, unsigned values map to `max - v`.
    pub fn invert(&mut self) -> MatrixResult<()> {
        if !T::KIND.is_ranked() {
            return Err(MatrixError::unsupported("invert", T::KIND));
        }
        self.values
            .mapv_inplace(|v| v.complement().unwrap_or(v));
        Ok(())
    }

    /// Two-level quantization of all layers: values below `threshold` become
    /// the element minimum, all others the maximum.
    pub fn binarize(&mut self, threshold: T) {
        self.values
            .mapv_inplace(|v| if v < threshold { T::MIN } else { T::MAX });
    }

    /// Map every value through `lookup_table`, indexed by value.
    ///
    /// The table must cover the full value range of a ranked element kind.
    pub fn apply_lookup_table(&mut self, lookup_table: &[T]) -> MatrixResult<()> {
        let Some(ranks) = T::RANKS else {
            return Err(MatrixError::unsupported("lookup table", T::KIND));
        };
        if lookup_table.len() < ranks {
            return Err(MatrixError::LookupTableTooShort {
                expected: ranks,
                actual: lookup_table.len(),
            });
        }

        self.values.mapv_inplace(|v| lookup_table[v.rank()]);
        Ok(())
    }

    /// Stretch values linearly so the smallest maps to zero and the largest
    /// to the element maximum. Leaves a constant buffer untouched.
    pub fn spread(&mut self) -> MatrixResult<()> {
        if !T::KIND.is_ranked() {
            return Err(MatrixError::unsupported("spread", T::KIND));
        }

        let minimum = self.minimum().to_f64();
        let maximum = self.maximum().to_f64();
        if maximum == minimum {
            tracing::debug!(value = minimum, "spread skipped on constant buffer");
            return Ok(());
        }

        let range = maximum - minimum;
        let top = T::MAX.to_f64();
        self.values
            .mapv_inplace(|v| T::from_f64_rounded((v.to_f64() - minimum) * top / range));
        Ok(())
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Smallest value over all layers.
    pub fn minimum(&self) -> T {
        self.values
            .iter()
            .fold(T::MAX, |acc, &v| if v < acc { v } else { acc })
    }

    /// Largest value over all layers.
    pub fn maximum(&self) -> T {
        self.values
            .iter()
            .fold(T::MIN, |acc, &v| if v > acc { v } else { acc })
    }

    pub fn sum_of_all_values(&self, z: usize) -> MatrixResult<f64> {
        self.check_layer(z)?;
        Ok(self
            .values
            .index_axis(Axis(0), z)
            .iter()
            .map(|v| v.to_f64())
            .sum())
    }

    // ========================================================================
    // Generators
    // ========================================================================

    /// Fill all layers with a running counter that wraps at the element width.
    pub fn set_increasing_values(&mut self) {
        let mut counter = 0u64;
        for v in self.values.iter_mut() {
            *v = T::wrapping_from(counter);
            counter += 1;
        }
    }

    /// Fill all layers with deterministic pseudo-random values.
    ///
    /// Integral kinds receive generator output truncated to their width,
    /// float kinds receive values in [0, 1).
    pub fn set_random_values(&mut self, seed: u64) {
        let mut rng = SimpleRng::new(seed);
        for v in self.values.iter_mut() {
            *v = match T::KIND {
                ElementKind::Float => T::from_f64(rng.next_f64()),
                _ => T::wrapping_from(rng.next_u32() as u64),
            };
        }
    }

    /// `C(width - 1, x) * C(height - 1, y)`, the 2-D binomial kernel.
    pub fn set_binomial_values(&mut self, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        let (width, height) = (self.width(), self.height());
        for y in 0..height {
            let row_weight = binomial_coefficient(height - 1, y);
            for x in 0..width {
                let weight = binomial_coefficient(width - 1, x) * row_weight;
                self.values[[z, y, x]] = T::from_f64_rounded(weight);
            }
        }
        Ok(())
    }
}

impl<T: Element> Default for Matrix<T> {
    /// Empty 0x0x0 husk, the state a buffer is left in by `std::mem::take`.
    fn default() -> Self {
        Self {
            values: Array3::from_elem((0, 0, 0), T::ZERO),
        }
    }
}

impl<T: Element> PartialEq for Matrix<T> {
    /// Dimensions first, then a bitwise comparison of every layer.
    fn eq(&self, other: &Self) -> bool {
        self.values.dim() == other.values.dim()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a.same_bits(*b))
    }
}

/// `n over k` as a float, zero for `k > n`.
pub(crate) fn binomial_coefficient(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    (1..=k).fold(1.0, |acc, i| acc * (n + 1 - i) as f64 / i as f64)
}

/// MINSTD linear congruential generator, deterministic per seed.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.wrapping_add(1) % 2147483647,
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271) % 2147483647;
        self.state as u32
    }

    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 2147483647.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let m = Matrix::<u8>::new(0, 0, 0);
        assert_eq!((m.width(), m.height(), m.layers()), (1, 1, 1));
    }

    #[test]
    fn test_get_set_round_trip_and_clip() {
        let mut m = Matrix::<u16>::new(4, 3, 2);
        m.set_value(1234, 3, 2, 1).unwrap();
        assert_eq!(m.value(3, 2, 1), 1234);

        assert_eq!(m.set_value(9, 4, 0, 0), Err(MatrixError::OutOfBounds { x: 4, y: 0 }));
        assert!(matches!(
            m.set_value(9, 0, 0, 2),
            Err(MatrixError::LayerOutOfRange { layer: 2, layers: 2 })
        ));
        assert_eq!(m.value(4, 0, 0), 0);
        assert_eq!(m.try_value(0, 3, 0), None);
    }

    #[test]
    fn test_with_value_fills_every_layer() {
        let m = Matrix::with_value(2, 2, 3, 7u8);
        assert!((0..3).all(|z| m.layer(z).unwrap().iter().all(|&v| v == 7)));
    }

    #[test]
    fn test_layer_is_row_major() {
        let mut m = Matrix::<u8>::new(3, 2, 2);
        m.set_value(5, 2, 1, 1).unwrap();
        let layer = m.layer(1).unwrap();
        assert_eq!(layer.len(), 6);
        assert_eq!(layer[1 * 3 + 2], 5);
        assert!(m.layer(2).is_none());

        m.layer_mut(0).unwrap()[4] = 9;
        assert_eq!(m.value(1, 1, 0), 9);
    }

    #[test]
    fn test_interleaved_round_trip() {
        let mut m = Matrix::<u8>::new(2, 1, 3);
        m.set_value(1, 0, 0, 0).unwrap();
        m.set_value(2, 0, 0, 2).unwrap();
        m.set_value(3, 1, 0, 1).unwrap();

        let packed = m.interleaved(&[2, 0]).unwrap();
        assert_eq!(packed, vec![2, 1, 0, 0]);

        let mut other = Matrix::<u8>::new(2, 1, 3);
        other.set_interleaved(&packed, &[2, 0]).unwrap();
        assert_eq!(other.value(0, 0, 0), 1);
        assert_eq!(other.value(0, 0, 2), 2);
        assert!(other.set_interleaved(&packed[..3], &[2, 0]).is_err());
    }

    #[test]
    fn test_row_and_column() {
        let mut m = Matrix::<i16>::new(4, 3, 1);
        m.set_row(-2, 1, 0).unwrap();
        m.set_column(5, 3, 0).unwrap();
        assert_eq!(m.value(0, 1, 0), -2);
        assert_eq!(m.value(3, 1, 0), 5);
        assert_eq!(m.value(3, 2, 0), 5);
        assert_eq!(m.value(0, 2, 0), 0);
        assert!(m.set_row(1, 3, 0).is_err());
    }

    #[test]
    fn test_invert_per_kind() {
        let mut m = Matrix::with_value(2, 2, 1, 200u8);
        m.invert().unwrap();
        assert_eq!(m.value(1, 1, 0), 55);

        let mut b = Matrix::with_value(1, 1, 1, true);
        b.invert().unwrap();
        assert!(!b.value(0, 0, 0));

        let mut s = Matrix::<i16>::new(1, 1, 1);
        assert!(matches!(s.invert(), Err(MatrixError::Unsupported { .. })));
    }

    #[test]
    fn test_binarize() {
        let mut m = Matrix::<u8>::from_layer(3, 1, vec![10, 100, 200]).unwrap();
        m.binarize(100);
        assert_eq!(m.layer(0).unwrap(), &[0, 255, 255]);
    }

    #[test]
    fn test_lookup_table() {
        let mut m = Matrix::<u8>::from_layer(2, 1, vec![0, 10]).unwrap();
        let lut: Vec<u8> = (0..=255u8).map(|v| v.saturating_mul(2)).collect();
        m.apply_lookup_table(&lut).unwrap();
        assert_eq!(m.layer(0).unwrap(), &[0, 20]);

        assert_eq!(
            m.apply_lookup_table(&lut[..10]),
            Err(MatrixError::LookupTableTooShort { expected: 256, actual: 10 })
        );

        let mut f = Matrix::<f32>::new(1, 1, 1);
        assert!(f.apply_lookup_table(&[0.0]).is_err());
    }

    #[test]
    fn test_spread_stretches_to_full_range() {
        let mut m = Matrix::<u8>::from_layer(3, 1, vec![50, 75, 100]).unwrap();
        m.spread().unwrap();
        assert_eq!(m.layer(0).unwrap(), &[0, 128, 255]);

        let mut flat = Matrix::with_value(2, 2, 1, 9u8);
        flat.spread().unwrap();
        assert_eq!(flat.value(0, 0, 0), 9);
    }

    #[test]
    fn test_minimum_maximum_span_layers() {
        let mut m = Matrix::with_value(2, 2, 2, 10u8);
        m.set_value(3, 1, 1, 1).unwrap();
        m.set_value(40, 0, 1, 0).unwrap();
        assert_eq!(m.minimum(), 3);
        assert_eq!(m.maximum(), 40);
        assert_eq!(m.sum_of_all_values(0).unwrap(), 70.0);
    }

    #[test]
    fn test_increasing_values_wrap() {
        let mut m = Matrix::<u8>::new(16, 17, 1);
        m.set_increasing_values();
        assert_eq!(m.value(15, 0, 0), 15);
        assert_eq!(m.value(0, 16, 0), 0);
    }

    #[test]
    fn test_random_values_are_deterministic() {
        let mut a = Matrix::<u8>::new(8, 8, 1);
        let mut b = Matrix::<u8>::new(8, 8, 1);
        a.set_random_values(42);
        b.set_random_values(42);
        assert_eq!(a, b);
        b.set_random_values(43);
        assert_ne!(a, b);

        let mut f = Matrix::<f32>::new(4, 4, 1);
        f.set_random_values(1);
        assert!(f.as_array().iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_binomial_values() {
        let mut m = Matrix::<u16>::new(3, 3, 1);
        m.set_binomial_values(0).unwrap();
        assert_eq!(m.layer(0).unwrap(), &[1, 2, 1, 2, 4, 2, 1, 2, 1]);
    }

    #[test]
    fn test_equality_compares_dimensions_and_bits() {
        let a = Matrix::<f32>::new(2, 2, 1);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.set_value(-0.0, 0, 0, 0).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, Matrix::<f32>::new(2, 2, 2));
    }

    #[test]
    fn test_take_leaves_empty_husk() {
        let mut m = Matrix::with_value(3, 3, 1, 1u8);
        let moved = std::mem::take(&mut m);
        assert_eq!(moved.width(), 3);
        assert!(m.is_empty());
        assert_eq!((m.width(), m.height(), m.layers()), (0, 0, 0));
    }

    #[test]
    fn test_from_array_rejects_empty_axis() {
        assert!(Matrix::<u8>::from_array(Array3::from_elem((1, 0, 2), 0)).is_err());
        assert!(Matrix::<u8>::from_layer(2, 2, vec![0; 3]).is_err());
    }
}
