//! Region operations.
//!
//! - **Background fill**: flood fill of the region connected to the border
//! - **Replace**: swap one value for another across a layer

pub mod fill;
