//! Rasterization of geometric descriptors into a buffer.
//!
//! Shapes that must lie inside the buffer (points, lines, axis-aligned and
//! rotated rectangles, structuring element stamps) are checked up front and
//! rejected with [`MatrixError::NotInside`] without writing anything.
//! Polyline segments and run-length spans are drawn as lines, so one that
//! leaves the buffer is skipped whole. Circles and chain codes are clipped
//! pixel by pixel.

use crate::element::Element;
use crate::error::{MatrixError, MatrixResult};
use crate::geometry::{Circle, FreemanCode, Line, Point, PolyLine, Rectangle, RunLengthCode};
use crate::kernel::StructuringElement;
use crate::Matrix;

const ARROW_ANGLE: f64 = 135.0;
const ARROW_LENGTH: f64 = 3.0;

impl<T: Element> Matrix<T> {
    // ========================================================================
    // Inside predicates
    // ========================================================================

    /// True when the point rounds to a pixel of the grid.
    pub fn is_point_inside_image(&self, point: &Point) -> bool {
        match point.pixel() {
            Some((x, y)) => x < self.width() && y < self.height(),
            None => false,
        }
    }

    pub fn is_line_inside_image(&self, line: &Line) -> bool {
        self.is_point_inside_image(&line.start) && self.is_point_inside_image(&line.end)
    }

    /// All four corners, after rotation, are inside.
    pub fn is_rectangle_inside_image(&self, rectangle: &Rectangle) -> bool {
        rectangle
            .corners()
            .iter()
            .all(|corner| self.is_point_inside_image(corner))
    }

    pub fn is_circle_inside_image(&self, circle: &Circle) -> bool {
        let (cx, cy) = circle.center.signed_pixel();
        let r = circle.radius as i64;
        cx - r >= 0 && cy - r >= 0 && cx + r < self.width() as i64 && cy + r < self.height() as i64
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    pub fn set_point(&mut self, value: T, point: &Point, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        match point.pixel() {
            Some((x, y)) if x < self.width() && y < self.height() => {
                self.values[[z, y, x]] = value;
                Ok(())
            }
            _ => Err(MatrixError::NotInside("point")),
        }
    }

    /// Draw a line, endpoints included.
    ///
    /// Vertical and horizontal lines take a direct fill, all others are
    /// walked with Bresenham's algorithm.
    pub fn set_line(&mut self, value: T, line: &Line, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if !self.is_line_inside_image(line) {
            return Err(MatrixError::NotInside("line"));
        }

        let (x0, y0) = line.start.signed_pixel();
        let (x1, y1) = line.end.signed_pixel();

        if x0 == x1 {
            let x = x0 as usize;
            for y in y0.min(y1)..=y0.max(y1) {
                self.values[[z, y as usize, x]] = value;
            }
        } else if y0 == y1 {
            let y = y0 as usize;
            let (from, to) = (x0.min(x1) as usize, x0.max(x1) as usize);
            let width = self.width();
            if let Some(layer) = self.layer_mut(z) {
                layer[y * width + from..=y * width + to].fill(value);
            }
        } else {
            for (x, y) in line.points() {
                self.values[[z, y as usize, x as usize]] = value;
            }
        }
        Ok(())
    }

    /// Draw a line plus a two-stroke arrowhead at its end point.
    ///
    /// Arrowhead strokes that leave the buffer are skipped.
    pub fn set_line_with_arrow(&mut self, value: T, line: &Line, z: usize) -> MatrixResult<()> {
        self.set_line(value, line, z)?;

        let angle = line.angle();
        for side in [ARROW_ANGLE, -ARROW_ANGLE] {
            let stroke = Line::from_angle(line.end, angle + side, ARROW_LENGTH);
            if self.set_line(value, &stroke, z).is_err() {
                tracing::trace!(angle = angle + side, "arrowhead stroke outside buffer");
            }
        }
        Ok(())
    }

    /// Midpoint circle, optionally filled. Pixels outside the buffer are dropped.
    pub fn set_circle(&mut self, value: T, circle: &Circle, fill: bool, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;

        let (cx, cy) = circle.center.signed_pixel();
        let mut x = circle.radius as i64;
        let mut y = 0i64;
        let mut decision = 1 - x;

        while y <= x {
            if fill {
                self.put_span(value, cx - x, cx + x, cy + y, z);
                self.put_span(value, cx - x, cx + x, cy - y, z);
                self.put_span(value, cx - y, cx + y, cy + x, z);
                self.put_span(value, cx - y, cx + y, cy - x, z);
            } else {
                for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                    self.put_signed(value, cx + dx, cy + dy, z);
                }
            }

            y += 1;
            if decision <= 0 {
                decision += 2 * y + 1;
            } else {
                x -= 1;
                decision += 2 * (y - x) + 1;
            }
        }
        Ok(())
    }

    /// Filled or outlined rectangle. Rotated rectangles go through their
    /// polygon outline.
    pub fn set_rectangle(&mut self, value: T, rectangle: &Rectangle, fill: bool, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        if rectangle.width == 0 || rectangle.height == 0 {
            return Err(MatrixError::geometry(format!(
                "rectangle of {}x{} has no pixels",
                rectangle.width, rectangle.height
            )));
        }
        if !self.is_rectangle_inside_image(rectangle) {
            return Err(MatrixError::NotInside("rectangle"));
        }

        if rectangle.angle != 0.0 {
            let outline = rectangle.to_poly_line();
            return if fill {
                self.set_run_length_code(value, &outline.to_run_length_code(), z)
            } else {
                self.set_poly_line(value, &outline, z)
            };
        }

        let corners = rectangle.corners();
        if fill {
            let (x0, y0) = corners[0].signed_pixel();
            let (x1, y1) = corners[2].signed_pixel();
            for y in y0..=y1 {
                self.put_span(value, x0, x1, y, z);
            }
            Ok(())
        } else {
            for i in 0..4 {
                self.set_line(value, &Line::new(corners[i], corners[(i + 1) % 4]), z)?;
            }
            Ok(())
        }
    }

    /// Draw consecutive segments. A segment with an endpoint outside the
    /// buffer is skipped, not clipped.
    pub fn set_poly_line(&mut self, value: T, poly_line: &PolyLine, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        for segment in poly_line.segments() {
            if self.is_line_inside_image(&segment) {
                self.set_line(value, &segment, z)?;
            } else {
                tracing::trace!(?segment, "poly line segment skipped");
            }
        }
        Ok(())
    }

    /// Plot the start point and every position reached by the chain code.
    pub fn set_freeman_code(&mut self, value: T, code: &FreemanCode, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        for (x, y) in code.positions() {
            self.put_signed(value, x, y, z);
        }
        Ok(())
    }

    /// Draw every span as a horizontal line. A span reaching outside the
    /// buffer is skipped.
    pub fn set_run_length_code(&mut self, value: T, spans: &RunLengthCode, z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        for span in spans.iter().filter(|s| s.length > 0) {
            let line = Line::new(span.start, span.end());
            if !self.is_line_inside_image(&line) {
                tracing::trace!(?span, "run length span skipped");
                continue;
            }
            let (x, y) = span.start.signed_pixel();
            self.put_span(value, x, x + span.length as i64 - 1, y, z);
        }
        Ok(())
    }

    /// Stamp the set cells of `element` with its reference point on `anchor`.
    ///
    /// The whole element must fit; nothing is written otherwise.
    pub fn set_structuring_element(
        &mut self,
        value: T,
        element: &StructuringElement,
        anchor: &Point,
        z: usize,
    ) -> MatrixResult<()> {
        self.check_layer(z)?;
        let (ax, ay) = anchor.signed_pixel();
        let left = ax - element.reference_x() as i64;
        let top = ay - element.reference_y() as i64;
        let fits = left >= 0
            && top >= 0
            && left + element.width() as i64 <= self.width() as i64
            && top + element.height() as i64 <= self.height() as i64;
        if !fits {
            return Err(MatrixError::NotInside("structuring element"));
        }

        for (x, y) in element.set_cells() {
            self.values[[z, top as usize + y, left as usize + x]] = value;
        }
        Ok(())
    }

    /// Render a histogram as a bar chart into layer z.
    ///
    /// Bars grow from the bottom row and are drawn with the element maximum.
    /// Leaves the layer untouched when there are more bins than columns or
    /// every count is zero.
    pub fn set_histogram(&mut self, histogram: &[usize], z: usize) -> MatrixResult<()> {
        self.check_layer(z)?;
        let bins = histogram.len();
        let max_count = histogram.iter().copied().max().unwrap_or(0);
        if bins == 0 || bins > self.width() || max_count == 0 {
            tracing::debug!(bins, max_count, "histogram not drawn");
            return Ok(());
        }

        self.set_all_values(T::ZERO, z)?;
        let bar_width = self.width() / bins;
        let height = self.height();
        for (i, &count) in histogram.iter().enumerate() {
            let bar_height = count * height / max_count;
            for x in i * bar_width..(i + 1) * bar_width {
                for y in height - bar_height..height {
                    self.values[[z, y, x]] = T::MAX;
                }
            }
        }
        Ok(())
    }

    /// Clipped horizontal span `x0..=x1` on row y.
    fn put_span(&mut self, value: T, x0: i64, x1: i64, y: i64, z: usize) {
        if y < 0 || y >= self.height() as i64 {
            return;
        }
        let from = x0.max(0);
        let to = x1.min(self.width() as i64 - 1);
        for x in from..=to {
            self.values[[z, y as usize, x as usize]] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RunLength;

    fn count(m: &Matrix<u8>, value: u8) -> usize {
        m.as_array().iter().filter(|&&v| v == value).count()
    }

    #[test]
    fn test_inside_predicates() {
        let m = Matrix::<u8>::new(5, 4, 1);
        assert!(m.is_point_inside_image(&Point::new(4.0, 3.0)));
        assert!(!m.is_point_inside_image(&Point::new(5.0, 0.0)));
        assert!(!m.is_point_inside_image(&Point::new(-1.0, 0.0)));
        assert!(m.is_circle_inside_image(&Circle::new(Point::new(2.0, 2.0), 1)));
        assert!(!m.is_circle_inside_image(&Circle::new(Point::new(2.0, 2.0), 2)));
        assert!(!m.is_rectangle_inside_image(&Rectangle::new(Point::new(1.0, 1.0), 5, 1)));
    }

    #[test]
    fn test_set_point_rejects_outside() {
        let mut m = Matrix::<u8>::new(3, 3, 1);
        m.set_point(7, &Point::new(1.4, 2.0), 0).unwrap();
        assert_eq!(m.value(1, 2, 0), 7);
        assert_eq!(m.set_point(7, &Point::new(3.0, 0.0), 0), Err(MatrixError::NotInside("point")));
    }

    #[test]
    fn test_vertical_and_diagonal_lines() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        m.set_line(1, &Line::new(Point::new(2.0, 4.0), Point::new(2.0, 1.0)), 0).unwrap();
        assert_eq!(count(&m, 1), 4);
        assert_eq!(m.value(2, 0, 0), 0);

        m.clear();
        m.set_line(1, &Line::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0)), 0).unwrap();
        assert!((0..5).all(|i| m.value(i, i, 0) == 1));
        assert_eq!(count(&m, 1), 5);
    }

    #[test]
    fn test_line_outside_writes_nothing() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        let line = Line::new(Point::new(0.0, 0.0), Point::new(9.0, 0.0));
        assert_eq!(m.set_line(1, &line, 0), Err(MatrixError::NotInside("line")));
        assert_eq!(count(&m, 1), 0);
    }

    #[test]
    fn test_arrow_adds_strokes_at_end() {
        let mut m = Matrix::<u8>::new(12, 12, 1);
        let line = Line::new(Point::new(1.0, 6.0), Point::new(8.0, 6.0));
        m.set_line_with_arrow(1, &line, 0).unwrap();
        assert!(count(&m, 1) > 8);
        assert_eq!(m.value(6, 4, 0), 1);
        assert_eq!(m.value(6, 8, 0), 1);
    }

    #[test]
    fn test_circle_outline_is_symmetric() {
        let mut m = Matrix::<u8>::new(9, 9, 1);
        m.set_circle(1, &Circle::new(Point::new(4.0, 4.0), 3), false, 0).unwrap();
        for (x, y) in [(7, 4), (1, 4), (4, 7), (4, 1)] {
            assert_eq!(m.value(x, y, 0), 1);
        }
        assert_eq!(m.value(4, 4, 0), 0);
    }

    #[test]
    fn test_filled_circle_clips_at_border() {
        let mut m = Matrix::<u8>::new(4, 4, 1);
        m.set_circle(1, &Circle::new(Point::new(0.0, 0.0), 2), true, 0).unwrap();
        assert_eq!(m.value(0, 0, 0), 1);
        assert_eq!(m.value(2, 0, 0), 1);
        assert_eq!(m.value(3, 3, 0), 0);
    }

    #[test]
    fn test_rectangle_fill_and_outline() {
        let mut m = Matrix::<u8>::new(6, 6, 1);
        let rect = Rectangle::new(Point::new(1.0, 1.0), 4, 3);
        m.set_rectangle(1, &rect, true, 0).unwrap();
        assert_eq!(count(&m, 1), 12);

        m.clear();
        m.set_rectangle(1, &rect, false, 0).unwrap();
        assert_eq!(count(&m, 1), 10);
        assert_eq!(m.value(2, 2, 0), 0);
    }

    #[test]
    fn test_rotated_rectangle_fill() {
        let mut m = Matrix::<u8>::new(10, 10, 1);
        let rect = Rectangle::rotated(Point::new(2.0, 7.0), 4, 4, 90.0);
        m.set_rectangle(1, &rect, true, 0).unwrap();
        // A quarter turn maps the square onto the grid again.
        assert_eq!(count(&m, 1), 16);
        assert_eq!(m.value(2, 4, 0), 1);
        assert_eq!(m.value(5, 7, 0), 1);
    }

    #[test]
    fn test_rotated_rectangle_outline() {
        let mut m = Matrix::<u8>::new(8, 10, 1);
        let rect = Rectangle::rotated(Point::new(2.0, 7.0), 5, 3, 90.0);
        m.set_rectangle(1, &rect, false, 0).unwrap();

        for (x, y) in [(2, 7), (2, 3), (4, 3), (4, 7)] {
            assert_eq!(m.value(x, y, 0), 1, "corner ({x}, {y})");
        }
        for y in 4..=6 {
            assert_eq!(m.value(3, y, 0), 0);
        }
        assert_eq!(count(&m, 1), 12);
    }

    #[test]
    fn test_empty_rectangle_is_rejected() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        for rect in [
            Rectangle::new(Point::new(1.0, 1.0), 0, 3),
            Rectangle::new(Point::new(1.0, 1.0), 3, 0),
        ] {
            for fill in [true, false] {
                assert!(matches!(
                    m.set_rectangle(7, &rect, fill, 0),
                    Err(MatrixError::InvalidGeometry(_))
                ));
            }
        }
        assert_eq!(count(&m, 7), 0);
    }

    #[test]
    fn test_run_length_span_outside_is_skipped() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        let spans = vec![
            RunLength::new(Point::new(3.0, 0.0), 4),
            RunLength::new(Point::new(1.0, 2.0), 3),
        ];
        m.set_run_length_code(7, &spans, 0).unwrap();
        assert_eq!(count(&m, 7), 3);
        assert_eq!(m.value(3, 0, 0), 0);
        assert_eq!(m.value(4, 0, 0), 0);
        assert_eq!(m.value(3, 2, 0), 7);
    }

    #[test]
    fn test_poly_line_skips_outside_segments() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        let poly = PolyLine::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(9.0, 4.0),
        ]);
        m.set_poly_line(1, &poly, 0).unwrap();
        assert_eq!(count(&m, 1), 5);
    }

    #[test]
    fn test_freeman_code_clips() {
        let mut m = Matrix::<u8>::new(3, 3, 1);
        let code = FreemanCode::from_symbols(Point::new(1.0, 1.0), &[0, 0, 0, 6]).unwrap();
        m.set_freeman_code(1, &code, 0).unwrap();
        assert_eq!(m.value(1, 1, 0), 1);
        assert_eq!(m.value(2, 1, 0), 1);
        assert_eq!(count(&m, 1), 2);
    }

    #[test]
    fn test_structuring_element_stamp() {
        let mut m = Matrix::<u8>::new(5, 5, 1);
        let cross = StructuringElement::cross(3);
        m.set_structuring_element(9, &cross, &Point::new(1.0, 1.0), 0).unwrap();
        assert_eq!(count(&m, 9), 5);
        assert_eq!(m.value(0, 0, 0), 0);

        let err = m.set_structuring_element(9, &cross, &Point::new(4.0, 2.0), 0);
        assert_eq!(err, Err(MatrixError::NotInside("structuring element")));
        assert_eq!(count(&m, 9), 5);
    }

    #[test]
    fn test_histogram_bars() {
        let mut m = Matrix::<u8>::new(4, 4, 1);
        m.set_histogram(&[2, 4], 0).unwrap();
        assert_eq!(m.value(0, 3, 0), 255);
        assert_eq!(m.value(1, 2, 0), 255);
        assert_eq!(m.value(0, 1, 0), 0);
        assert_eq!(m.value(3, 0, 0), 255);

        let before = m.clone();
        m.set_histogram(&[1, 1, 1, 1, 1], 0).unwrap();
        assert_eq!(m, before);
    }
}
