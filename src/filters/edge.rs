//! Edge search along a line.
//!
//! The line is walked point by point. Each sample is either the pixel value
//! or, with a smoothing width above one, the mean over a cross-section
//! perpendicular to the line. A sample is compared with the one `step_size`
//! points earlier and an edge is reported when the difference exceeds the
//! contrast threshold in either direction.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::MatrixResult;
use crate::geometry::{Edge, Edges, Line, Point};
use crate::Matrix;

/// Parameters of [`Matrix::find_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSearch {
    /// Minimum absolute difference between compared samples.
    pub min_contrast: f64,
    /// Cross-section width in pixels. 1 samples the line itself.
    pub smoothing_width: u32,
    /// Distance in samples between the compared values.
    pub step_size: usize,
}

impl Default for EdgeSearch {
    fn default() -> Self {
        Self {
            min_contrast: 0.0,
            smoothing_width: 1,
            step_size: 1,
        }
    }
}

impl EdgeSearch {
    pub fn with_contrast(min_contrast: f64) -> Self {
        Self {
            min_contrast,
            ..Self::default()
        }
    }
}

impl<T: Element> Matrix<T> {
    /// Find contrast changes along `line` in layer z.
    ///
    /// # Returns
    /// One [`Edge`] per leading sample whose difference to the trailing
    /// sample exceeds `search.min_contrast`, positioned on the leading
    /// sample. Positive contrast means the values rise along the line.
    #[tracing::instrument(level = "debug", skip(self, line), fields(angle = line.angle()))]
    pub fn find_edges(&self, line: &Line, search: &EdgeSearch, z: usize) -> MatrixResult<Edges> {
        self.check_layer(z)?;
        let angle = line.angle();

        let samples = line
            .points()
            .map(|(x, y)| {
                let position = Point::new(x as f64, y as f64);
                self.cross_section_mean(position, angle, search.smoothing_width, z)
                    .map(|value| (position, value))
            })
            .collect::<MatrixResult<Vec<_>>>()?;

        let step = search.step_size.max(1);
        let edges: Edges = samples
            .windows(step + 1)
            .filter_map(|window| {
                let (position, leading) = window[step];
                let contrast = leading - window[0].1;
                (contrast.abs() > search.min_contrast).then_some(Edge {
                    position,
                    angle,
                    contrast,
                })
            })
            .collect();

        tracing::debug!(samples = samples.len(), edges = edges.len(), "edge search done");
        Ok(edges)
    }

    fn cross_section_mean(&self, position: Point, angle: f64, width: u32, z: usize) -> MatrixResult<f64> {
        if width <= 1 {
            let (x, y) = position.signed_pixel();
            return Ok(self.signed_value(x, y, z).to_f64());
        }

        // Diagonal sections cover fewer grid points per unit length.
        let rad = angle.to_radians();
        let correction = rad.sin().abs() + rad.cos().abs();
        let half = (width / 2) as f64;
        let behind = half * correction;
        let ahead = (if width % 2 == 0 { half - 1.0 } else { half }) * correction;

        let section = Line::new(
            position.end_point(angle - 90.0, behind),
            position.end_point(angle + 90.0, ahead),
        );
        self.average_along_line(&section, z)
    }
}
