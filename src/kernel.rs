//! Structuring elements and convolution kernels.
//!
//! Both are a small buffer composed with an anchor ("reference point") that
//! is aligned with the target pixel while a window operation sweeps the
//! image. A [`Filter`] additionally carries the scaling policy applied to the
//! weighted sum.

use std::ops::Range;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{MatrixError, MatrixResult};
use crate::geometry::RunLengthCode;
use crate::matrix::binomial_coefficient;
use crate::Matrix;

// ============================================================================
// Footprint
// ============================================================================

/// Extent of a window around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Footprint {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Footprint {
    fn new(width: usize, height: usize, reference_x: usize, reference_y: usize) -> Self {
        Self {
            left: reference_x,
            top: reference_y,
            right: width.saturating_sub(reference_x + 1),
            bottom: height.saturating_sub(reference_y + 1),
        }
    }

    /// Rows whose window lies fully inside a buffer of `height` rows.
    pub fn rows(&self, height: usize) -> Range<usize> {
        self.top..height.saturating_sub(self.bottom)
    }

    /// Columns whose window lies fully inside a buffer of `width` columns.
    pub fn columns(&self, width: usize) -> Range<usize> {
        self.left..width.saturating_sub(self.right)
    }
}

fn check_reference(width: usize, height: usize, reference_x: usize, reference_y: usize) -> MatrixResult<()> {
    if reference_x >= width || reference_y >= height {
        return Err(MatrixError::geometry(format!(
            "reference point ({reference_x}, {reference_y}) is outside the {width}x{height} element"
        )));
    }
    Ok(())
}

// ============================================================================
// Structuring element
// ============================================================================

/// Boolean mask with a reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuringElement {
    mask: Matrix<bool>,
    reference_x: usize,
    reference_y: usize,
}

/// Text form of a structuring element.
///
/// Each row string is one mask row; `#`, `x`, `X` and `1` mark set cells,
/// anything else is clear. Short rows are padded with clear cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuringElementConfig {
    pub rows: Vec<String>,
    /// Anchor as `[x, y]`. Defaults to the center cell.
    #[serde(default)]
    pub reference: Option<[usize; 2]>,
}

impl StructuringElement {
    pub fn new(mask: Matrix<bool>, reference_x: usize, reference_y: usize) -> MatrixResult<Self> {
        check_reference(mask.width(), mask.height(), reference_x, reference_y)?;
        Ok(Self {
            mask,
            reference_x,
            reference_y,
        })
    }

    /// Element anchored at its center cell.
    pub fn centered(mask: Matrix<bool>) -> Self {
        let (reference_x, reference_y) = (mask.width() / 2, mask.height() / 2);
        Self {
            mask,
            reference_x,
            reference_y,
        }
    }

    /// Fully set `width` x `height` rectangle.
    pub fn brick(width: usize, height: usize) -> Self {
        Self::centered(Matrix::with_value(width, height, 1, true))
    }

    /// Plus shape of `size` x `size` with one-pixel arms.
    pub fn cross(size: usize) -> Self {
        let size = size.max(1);
        let mut mask = Matrix::<bool>::new(size, size, 1);
        let center = size / 2;
        for i in 0..size {
            mask.put(true, i, center, 0);
            mask.put(true, center, i, 0);
        }
        Self::centered(mask)
    }

    /// Disk of the given radius in a `(2r + 1)` square.
    pub fn disk(radius: usize) -> Self {
        let size = 2 * radius + 1;
        let mut mask = Matrix::<bool>::new(size, size, 1);
        let r2 = (radius * radius) as i64;
        for y in 0..size {
            for x in 0..size {
                let dx = x as i64 - radius as i64;
                let dy = y as i64 - radius as i64;
                if dx * dx + dy * dy <= r2 {
                    mask.put(true, x, y, 0);
                }
            }
        }
        Self::centered(mask)
    }

    pub fn from_config(config: &StructuringElementConfig) -> MatrixResult<Self> {
        let height = config.rows.len();
        let width = config.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(MatrixError::geometry("structuring element has no rows"));
        }

        let mut mask = Matrix::<bool>::new(width, height, 1);
        for (y, row) in config.rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if matches!(c, '#' | 'x' | 'X' | '1') {
                    mask.put(true, x, y, 0);
                }
            }
        }

        match config.reference {
            Some([x, y]) => Self::new(mask, x, y),
            None => Ok(Self::centered(mask)),
        }
    }

    pub fn from_json(json: &str) -> MatrixResult<Self> {
        let config: StructuringElementConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    pub fn mask(&self) -> &Matrix<bool> {
        &self.mask
    }

    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    pub fn reference_x(&self) -> usize {
        self.reference_x
    }

    pub fn reference_y(&self) -> usize {
        self.reference_y
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.mask.value(x, y, 0)
    }

    /// Number of set cells.
    pub fn count_set(&self) -> usize {
        self.mask.as_array().iter().filter(|&&v| v).count()
    }

    /// Set cells as row-major spans in element coordinates.
    pub fn run_length_code(&self) -> RunLengthCode {
        self.mask.run_length_code(true, 0).unwrap_or_default()
    }

    /// Set cells as `(x, y)` offsets into the element.
    pub(crate) fn set_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(self.count_set());
        for y in 0..self.height() {
            for x in 0..self.width() {
                if self.is_set(x, y) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    pub(crate) fn footprint(&self) -> Footprint {
        Footprint::new(self.width(), self.height(), self.reference_x, self.reference_y)
    }
}

// ============================================================================
// Convolution kernel
// ============================================================================

/// Signed weight kernel with reference point and output scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    kernel: Matrix<i16>,
    reference_x: usize,
    reference_y: usize,
    /// Multiplied onto the weighted sum before rounding.
    pub pre_factor: f64,
    /// Add half the element range to re-center signed results.
    pub shift_result_values: bool,
    /// Reflect negative results to positive before clamping.
    pub invert_negative_result_values: bool,
}

fn default_pre_factor() -> f64 {
    1.0
}

/// Serialized form of a [`Filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub width: usize,
    pub height: usize,
    /// Row-major weights, `width * height` of them.
    pub values: Vec<i16>,
    /// Anchor as `[x, y]`. Defaults to the center cell.
    #[serde(default)]
    pub reference: Option<[usize; 2]>,
    #[serde(default = "default_pre_factor")]
    pub pre_factor: f64,
    #[serde(default)]
    pub shift_result_values: bool,
    #[serde(default)]
    pub invert_negative_result_values: bool,
}

impl Filter {
    pub fn new(kernel: Matrix<i16>, reference_x: usize, reference_y: usize) -> MatrixResult<Self> {
        check_reference(kernel.width(), kernel.height(), reference_x, reference_y)?;
        Ok(Self {
            kernel,
            reference_x,
            reference_y,
            pre_factor: 1.0,
            shift_result_values: false,
            invert_negative_result_values: false,
        })
    }

    /// Kernel anchored at its center cell.
    pub fn centered(kernel: Matrix<i16>) -> Self {
        let (reference_x, reference_y) = (kernel.width() / 2, kernel.height() / 2);
        Self {
            kernel,
            reference_x,
            reference_y,
            pre_factor: 1.0,
            shift_result_values: false,
            invert_negative_result_values: false,
        }
    }

    pub fn from_config(config: &KernelConfig) -> MatrixResult<Self> {
        if config.values.len() != config.width * config.height {
            return Err(MatrixError::geometry(format!(
                "kernel of {}x{} needs {} values, got {}",
                config.width,
                config.height,
                config.width * config.height,
                config.values.len()
            )));
        }

        let kernel = Matrix::from_layer(config.width, config.height, config.values.clone())?;
        let mut filter = match config.reference {
            Some([x, y]) => Self::new(kernel, x, y)?,
            None => Self::centered(kernel),
        };
        filter.pre_factor = config.pre_factor;
        filter.shift_result_values = config.shift_result_values;
        filter.invert_negative_result_values = config.invert_negative_result_values;
        Ok(filter)
    }

    pub fn from_json(json: &str) -> MatrixResult<Self> {
        let config: KernelConfig = serde_json::from_str(json)?;
        Self::from_config(&config)
    }

    /// Normalized binomial smoothing kernel of `size` x `size`.
    pub fn binomial(size: usize) -> Self {
        let size = size.max(1);
        let values = Array3::from_shape_fn((1, size, size), |(_, y, x)| {
            let weight = binomial_coefficient(size - 1, x) * binomial_coefficient(size - 1, y);
            i16::from_f64_rounded(weight)
        });
        let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
        let mut filter = Self::centered(Matrix { values });
        filter.pre_factor = 1.0 / sum;
        filter
    }

    /// Box average over `width` x `height`.
    pub fn mean(width: usize, height: usize) -> Self {
        let kernel = Matrix::with_value(width, height, 1, 1i16);
        let count = (kernel.width() * kernel.height()) as f64;
        let mut filter = Self::centered(kernel);
        filter.pre_factor = 1.0 / count;
        filter
    }

    /// Responds to intensity changes along x.
    pub fn sobel_horizontal() -> Self {
        Self::gradient(vec![-1, 0, 1, -2, 0, 2, -1, 0, 1])
    }

    /// Responds to intensity changes along y.
    pub fn sobel_vertical() -> Self {
        Self::gradient(vec![-1, -2, -1, 0, 0, 0, 1, 2, 1])
    }

    pub fn laplace() -> Self {
        Self::gradient(vec![0, 1, 0, 1, -4, 1, 0, 1, 0])
    }

    fn gradient(weights: Vec<i16>) -> Self {
        let mut kernel = Matrix::<i16>::new(3, 3, 1);
        if let Some(layer) = kernel.layer_mut(0) {
            layer.copy_from_slice(&weights);
        }
        let mut filter = Self::centered(kernel);
        filter.invert_negative_result_values = true;
        filter
    }

    pub fn kernel(&self) -> &Matrix<i16> {
        &self.kernel
    }

    pub fn width(&self) -> usize {
        self.kernel.width()
    }

    pub fn height(&self) -> usize {
        self.kernel.height()
    }

    pub fn reference_x(&self) -> usize {
        self.reference_x
    }

    pub fn reference_y(&self) -> usize {
        self.reference_y
    }

    pub(crate) fn footprint(&self) -> Footprint {
        Footprint::new(self.width(), self.height(), self.reference_x, self.reference_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_ranges() {
        let se = StructuringElement::new(Matrix::with_value(3, 2, 1, true), 0, 1).unwrap();
        let fp = se.footprint();
        assert_eq!((fp.left, fp.top, fp.right, fp.bottom), (0, 1, 2, 0));
        assert_eq!(fp.columns(5), 0..3);
        assert_eq!(fp.rows(4), 1..4);
        assert!(fp.columns(1).is_empty());
    }

    #[test]
    fn test_centered_on_empty_buffer() {
        let se = StructuringElement::centered(Matrix::default());
        assert_eq!(se.count_set(), 0);
        let fp = se.footprint();
        assert_eq!(fp.rows(5), 0..5);
        assert_eq!(fp.columns(5), 0..5);

        let filter = Filter::centered(Matrix::default());
        assert_eq!((filter.width(), filter.height()), (0, 0));
        assert_eq!(filter.footprint().columns(3), 0..3);
    }

    #[test]
    fn test_reference_must_lie_inside() {
        let err = StructuringElement::new(Matrix::new(3, 3, 1), 3, 0).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidGeometry(_)));
    }

    #[test]
    fn test_presets() {
        assert_eq!(StructuringElement::brick(3, 2).count_set(), 6);
        assert_eq!(StructuringElement::cross(5).count_set(), 9);

        let disk = StructuringElement::disk(2);
        assert_eq!((disk.width(), disk.reference_x()), (5, 2));
        assert_eq!(disk.count_set(), 13);
        assert!(!disk.is_set(0, 0));
    }

    #[test]
    fn test_run_length_code_of_cross() {
        let spans = StructuringElement::cross(3).run_length_code();
        let lengths: Vec<u32> = spans.iter().map(|s| s.length).collect();
        assert_eq!(lengths, vec![1, 3, 1]);
        assert_eq!(spans[0].start.x, 1.0);
    }

    #[test]
    fn test_structuring_element_from_json() {
        let se = StructuringElement::from_json(r####"{"rows": [".#.", "###"], "reference": [1, 1]}"####)
            .unwrap();
        assert_eq!((se.width(), se.height()), (3, 2));
        assert_eq!(se.count_set(), 4);
        assert_eq!(se.set_cells(), vec![(1, 0), (0, 1), (1, 1), (2, 1)]);

        assert!(matches!(
            StructuringElement::from_json(r#"{"rows": []}"#),
            Err(MatrixError::InvalidGeometry(_))
        ));
        assert!(matches!(
            StructuringElement::from_json("{"),
            Err(MatrixError::Config(_))
        ));
    }

    #[test]
    fn test_kernel_from_json_defaults() {
        let filter = Filter::from_json(r#"{"width": 3, "height": 1, "values": [1, 2, 1]}"#).unwrap();
        assert_eq!(filter.pre_factor, 1.0);
        assert_eq!((filter.reference_x(), filter.reference_y()), (1, 0));
        assert!(!filter.shift_result_values);
        assert_eq!(filter.kernel().layer(0).unwrap(), &[1, 2, 1]);

        let err = Filter::from_json(r#"{"width": 2, "height": 2, "values": [1]}"#).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidGeometry(_)));
    }

    #[test]
    fn test_kernel_presets() {
        let binomial = Filter::binomial(3);
        assert_eq!(binomial.kernel().layer(0).unwrap(), &[1, 2, 1, 2, 4, 2, 1, 2, 1]);
        assert!((binomial.pre_factor - 1.0 / 16.0).abs() < 1e-12);

        let mean = Filter::mean(2, 2);
        assert_eq!((mean.reference_x(), mean.reference_y()), (1, 1));
        assert!((mean.pre_factor - 0.25).abs() < 1e-12);

        assert!(Filter::laplace().invert_negative_result_values);
        assert_eq!(Filter::sobel_vertical().kernel().value(1, 2, 0), 2);
    }
}
