//! Geometric transforms: mirror, quarter rotations, crop, polar unwrap.
//!
//! In-place transforms rebuild the store from a reordered view of the old
//! one, so every output value is read from the untouched source.

use std::f64::consts::PI;

use ndarray::{s, Axis};

use crate::element::Element;
use crate::error::{MatrixError, MatrixResult};
use crate::geometry::{Circle, Rectangle};
use crate::Matrix;

impl<T: Element> Matrix<T> {
    fn relayout(&mut self) {
        self.values = self.values.as_standard_layout().into_owned();
    }

    /// Flip upside down: row y becomes row `height - 1 - y`.
    pub fn mirror_on_horizontal_axis(&mut self) {
        self.values.invert_axis(Axis(1));
        self.relayout();
    }

    /// Flip left to right: column x becomes column `width - 1 - x`.
    pub fn mirror_on_vertical_axis(&mut self) {
        self.values.invert_axis(Axis(2));
        self.relayout();
    }

    /// Quarter turn clockwise. Width and height swap.
    pub fn rotate_by_90_degree_clockwise(&mut self) {
        // new[y][x] = old[old_height - 1 - x][y]
        self.values.swap_axes(1, 2);
        self.values.invert_axis(Axis(2));
        self.relayout();
    }

    /// Quarter turn counter-clockwise. Width and height swap.
    pub fn rotate_by_90_degree_counter_clockwise(&mut self) {
        // new[y][x] = old[x][old_width - 1 - y]
        self.values.swap_axes(1, 2);
        self.values.invert_axis(Axis(1));
        self.relayout();
    }

    pub fn rotate_by_180_degree(&mut self) {
        self.values.invert_axis(Axis(1));
        self.values.invert_axis(Axis(2));
        self.relayout();
    }

    /// Copy of the area under an axis-aligned rectangle, all layers.
    ///
    /// # Errors
    /// `InvalidGeometry` for rotated or empty rectangles, `NotInside` when
    /// the rectangle leaves the buffer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn crop(&self, region: &Rectangle) -> MatrixResult<Matrix<T>> {
        if region.angle != 0.0 {
            return Err(MatrixError::geometry("rotated crop regions are not supported"));
        }
        if region.width == 0 || region.height == 0 {
            return Err(MatrixError::geometry("crop region is empty"));
        }
        if !self.is_rectangle_inside_image(region) {
            return Err(MatrixError::NotInside("crop region"));
        }

        let (x, y) = region.origin.signed_pixel();
        let (x, y) = (x as usize, y as usize);
        let (width, height) = (region.width as usize, region.height as usize);
        let cropped = self.values.slice(s![.., y..y + height, x..x + width]).to_owned();
        Matrix::from_array(cropped)
    }

    /// Unwrap the disk under `circle` into a rectangle.
    ///
    /// Output row r samples the ring at radius r, output column a the angle
    /// `a * 360 / circumference` degrees, counter-clockwise from east. The
    /// circumference is `round(2 * pi * radius)`; the output width is that
    /// value rounded up to a multiple of four, and the padding columns stay
    /// zero.
    ///
    /// # Errors
    /// `NotInside` when the circle leaves the buffer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn polar_transform(&self, circle: &Circle) -> MatrixResult<Matrix<T>> {
        if !self.is_circle_inside_image(circle) {
            return Err(MatrixError::NotInside("circle"));
        }

        let radius = circle.radius as usize;
        let circumference = (radius as f64 * 2.0 * PI + 0.5) as usize;
        let width = circumference.div_ceil(4) * 4;
        let (cx, cy) = circle.center.signed_pixel();

        let mut unwrapped = Matrix::new(width, radius, self.layers());
        for z in 0..self.layers() {
            for r in 0..radius {
                for a in 0..circumference {
                    let angle = ((a as f64 * 360.0 / circumference as f64) as i64 as f64).to_radians();
                    let dx = (r as f64 * angle.cos()) as i64;
                    let dy = (r as f64 * angle.sin()) as i64;
                    unwrapped.values[[z, r, a]] = self.values[[z, (cy + dy) as usize, (cx + dx) as usize]];
                }
            }
        }
        Ok(unwrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn counting(width: usize, height: usize) -> Matrix<u8> {
        let mut m = Matrix::<u8>::new(width, height, 2);
        m.set_increasing_values();
        m
    }

    #[test]
    fn test_mirrors() {
        let mut m = Matrix::<u8>::from_layer(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        m.mirror_on_horizontal_axis();
        assert_eq!(m.layer(0).unwrap(), &[4, 5, 6, 1, 2, 3]);
        m.mirror_on_vertical_axis();
        assert_eq!(m.layer(0).unwrap(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_rotate_clockwise() {
        let mut m = Matrix::<u8>::from_layer(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        m.rotate_by_90_degree_clockwise();
        assert_eq!((m.width(), m.height()), (2, 3));
        assert_eq!(m.layer(0).unwrap(), &[4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn test_rotate_counter_clockwise() {
        let mut m = Matrix::<u8>::from_layer(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        m.rotate_by_90_degree_counter_clockwise();
        assert_eq!((m.width(), m.height()), (2, 3));
        assert_eq!(m.layer(0).unwrap(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_opposite_rotations_cancel() {
        let original = counting(5, 3);
        let mut m = original.clone();
        m.rotate_by_90_degree_clockwise();
        m.rotate_by_90_degree_counter_clockwise();
        assert_eq!(m, original);

        m.rotate_by_180_degree();
        assert_eq!(m.value(0, 0, 1), original.value(4, 2, 1));
        m.rotate_by_180_degree();
        assert_eq!(m, original);
    }

    #[test]
    fn test_crop() {
        let m = counting(5, 4);
        let cropped = m.crop(&Rectangle::new(Point::new(1.0, 2.0), 3, 2)).unwrap();
        assert_eq!((cropped.width(), cropped.height(), cropped.layers()), (3, 2, 2));
        assert_eq!(cropped.value(0, 0, 0), m.value(1, 2, 0));
        assert_eq!(cropped.value(2, 1, 1), m.value(3, 3, 1));
    }

    #[test]
    fn test_crop_rejections() {
        let m = counting(5, 4);
        assert_eq!(
            m.crop(&Rectangle::new(Point::new(3.0, 0.0), 3, 2)),
            Err(MatrixError::NotInside("crop region"))
        );
        assert!(matches!(
            m.crop(&Rectangle::rotated(Point::new(0.0, 0.0), 2, 2, 10.0)),
            Err(MatrixError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_polar_transform_dimensions_and_rays() {
        let mut m = Matrix::<u8>::new(11, 11, 1);
        // Ray pointing east from the center.
        for x in 5..11 {
            m.set_value(200, x, 5, 0).unwrap();
        }
        let unwrapped = m.polar_transform(&Circle::new(Point::new(5.0, 5.0), 5)).unwrap();
        // round(2 * pi * 5) = 31, padded to 32.
        assert_eq!((unwrapped.width(), unwrapped.height()), (32, 5));
        assert!((0..5).all(|r| unwrapped.value(0, r, 0) == 200));
        assert_eq!(unwrapped.value(31, 4, 0), 0);
        assert_eq!(unwrapped.value(15, 4, 0), 0);
    }

    #[test]
    fn test_polar_transform_requires_inside_circle() {
        let m = Matrix::<u8>::new(6, 6, 1);
        assert_eq!(
            m.polar_transform(&Circle::new(Point::new(2.0, 2.0), 3)),
            Err(MatrixError::NotInside("circle"))
        );
    }
}
