//! StagMatrix: layered pixel buffers and classical raster operations.
//!
//! A [`Matrix`] stores one or more layers of a scalar element type
//! (`bool`, unsigned, signed or floating point) and provides:
//!
//! - **Rasterization**: points, lines with optional arrowheads, circles,
//!   rectangles (also rotated), polylines, chain codes, run-length spans,
//!   structuring element stamps and histogram bar charts
//! - **Statistics**: histograms, run-length extraction, span statistics,
//!   line averages
//! - **Filters**: convolution, sliding-window quantile and median,
//!   conservative smoothing, edge search along a line
//! - **Morphology**: erode, dilate, open, close
//! - **Transforms**: mirror, quarter rotations, crop, polar unwrap
//! - **Selection**: background flood fill, value replacement
//!
//! ## Buffer Layout
//!
//! The store is an `ndarray::Array3` with axes (layer, row, column) in
//! standard layout. Each layer is one contiguous row-major slice of
//! `width * height` values, available through [`Matrix::layer`].
//!
//! ## Failure Policy
//!
//! Reads outside the grid return zero. Everything that can refuse to act
//! (shape not inside, unsupported element kind, bad quantile) returns a
//! [`MatrixError`] and leaves the buffer unchanged.

pub mod element;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod kernel;
pub mod matrix;
pub mod selection;
pub mod statistics;

mod draw;
mod transform;

pub use element::{Element, ElementKind};
pub use error::{MatrixError, MatrixResult};
pub use filters::EdgeSearch;
pub use kernel::{Filter, KernelConfig, StructuringElement, StructuringElementConfig};
pub use matrix::Matrix;
pub use statistics::Statistics;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::Axis;
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::geometry::{Circle, Point};
    use crate::{Matrix, MatrixError, StructuringElement};

    fn to_py_err(err: MatrixError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn to_matrix(image: PyReadonlyArray2<'_, u8>) -> PyResult<Matrix<u8>> {
        let values = image.as_array().to_owned().insert_axis(Axis(0));
        Matrix::from_array(values).map_err(to_py_err)
    }

    fn to_numpy<'py>(py: Python<'py>, matrix: Matrix<u8>) -> Bound<'py, PyArray2<u8>> {
        matrix.into_array().index_axis_move(Axis(0), 0).into_pyarray(py)
    }

    /// Run a window operation with a square brick on a grayscale image.
    fn with_brick<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
        op: impl FnOnce(&mut Matrix<u8>, &StructuringElement) -> crate::MatrixResult<()>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let mut matrix = to_matrix(image)?;
        let element = StructuringElement::brick(size, size);
        op(&mut matrix, &element).map_err(to_py_err)?;
        Ok(to_numpy(py, matrix))
    }

    // ========================================================================
    // Window filters
    // ========================================================================

    /// Median over a `size` x `size` window.
    #[pyfunction]
    pub fn median<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.filter_median(se, 0))
    }

    /// Quantile over a `size` x `size` window. 0.0 = maximum, 1.0 = minimum.
    #[pyfunction]
    pub fn quantile<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
        quantile: f64,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.filter_quantile(se, quantile, 0))
    }

    #[pyfunction]
    pub fn conservative_smoothing<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.filter_conservative_smoothing(se, 0))
    }

    // ========================================================================
    // Morphology
    // ========================================================================

    #[pyfunction]
    pub fn erode<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.erode(se, 0))
    }

    #[pyfunction]
    pub fn dilate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.dilate(se, 0))
    }

    #[pyfunction]
    pub fn open<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.open(se, 0))
    }

    #[pyfunction]
    pub fn close<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        size: usize,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        with_brick(py, image, size, |m, se| m.close(se, 0))
    }

    // ========================================================================
    // Selection and transforms
    // ========================================================================

    /// Flood fill the border-connected `background` region with `fill`.
    #[pyfunction]
    pub fn fill_background<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        background: u8,
        fill: u8,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let mut matrix = to_matrix(image)?;
        matrix.fill_background(background, fill, 0).map_err(to_py_err)?;
        Ok(to_numpy(py, matrix))
    }

    /// Unwrap the disk at (center_x, center_y) into (radius, angle) space.
    #[pyfunction]
    pub fn polar_transform<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        center_x: f64,
        center_y: f64,
        radius: u32,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let matrix = to_matrix(image)?;
        let circle = Circle::new(Point::new(center_x, center_y), radius);
        let unwrapped = matrix.polar_transform(&circle).map_err(to_py_err)?;
        Ok(to_numpy(py, unwrapped))
    }

    /// Python module definition
    #[pymodule]
    pub fn stag_matrix(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Window filters
        m.add_function(wrap_pyfunction!(median, m)?)?;
        m.add_function(wrap_pyfunction!(quantile, m)?)?;
        m.add_function(wrap_pyfunction!(conservative_smoothing, m)?)?;

        // Morphology
        m.add_function(wrap_pyfunction!(erode, m)?)?;
        m.add_function(wrap_pyfunction!(dilate, m)?)?;
        m.add_function(wrap_pyfunction!(open, m)?)?;
        m.add_function(wrap_pyfunction!(close, m)?)?;

        // Selection and transforms
        m.add_function(wrap_pyfunction!(fill_background, m)?)?;
        m.add_function(wrap_pyfunction!(polar_transform, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::stag_matrix;
