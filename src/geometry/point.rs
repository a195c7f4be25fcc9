use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Grid position this point falls on, `None` for negative or non-finite
    /// coordinates.
    pub fn pixel(self) -> Option<(usize, usize)> {
        let (x, y) = (self.x.round(), self.y.round());
        if x >= 0.0 && y >= 0.0 && x.is_finite() && y.is_finite() {
            Some((x as usize, y as usize))
        } else {
            None
        }
    }

    /// Rounded grid position, possibly negative.
    pub fn signed_pixel(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }

    /// Point reached by walking `distance` from here in direction `angle`.
    pub fn end_point(self, angle: f64, distance: f64) -> Point {
        let rad = angle.to_radians();
        Point::new(self.x + distance * rad.cos(), self.y - distance * rad.sin())
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}
