//! Window filters and line probes.
//!
//! Every filter reads from a frozen copy of the processed layer and writes
//! into the live buffer, so results never feed back into the same pass.
//! Pixels whose window does not fit inside the buffer keep their values.
//!
//! ## Filter Categories
//!
//! - **Convolution**: weighted sums with a [`Filter`](crate::Filter) kernel
//! - **Rank**: quantile and median over a structuring element
//! - **Smoothing**: conservative smoothing
//! - **Morphology**: erode, dilate, open, close
//! - **Edge search**: contrast changes along a line

pub mod convolve;
pub mod edge;
pub mod morphology;
pub mod quantile;
pub mod smoothing;

pub use edge::EdgeSearch;
