//! Geometric descriptors consumed by the rasterizer and the queries.
//!
//! All descriptors are plain values. Coordinates are `f64` pixel positions
//! with y pointing down; a position addresses the pixel it rounds to.
//! Angles are in degrees, counter-clockwise as seen on screen.

pub mod code;
pub mod line;
pub mod point;
pub mod shape;

pub use code::{ChainDirection, Edge, Edges, FreemanCode, RunLength, RunLengthCode};
pub use line::{Line, LinePoints};
pub use point::Point;
pub use shape::{Circle, PolyLine, Rectangle};
