use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Line of `length` leaving `start` in direction `angle` (degrees).
    pub fn from_angle(start: Point, angle: f64, length: f64) -> Self {
        Self::new(start, start.end_point(angle, length))
    }

    /// Direction from start to end in degrees, in (-180, 180].
    pub fn angle(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let rise = self.start.y - self.end.y;
        rise.atan2(dx).to_degrees()
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Grid points covered by the line, endpoint inclusive.
    ///
    /// The iterator is lazy and finite; call `points()` again to restart.
    pub fn points(&self) -> LinePoints {
        LinePoints::new(self.start.signed_pixel(), self.end.signed_pixel())
    }
}

/// Bresenham walk between two grid positions.
#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i64,
    y: i64,
    x1: i64,
    y1: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    done: bool,
}

impl LinePoints {
    fn new((x0, y0): (i64, i64), (x1, y1): (i64, i64)) -> Self {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LinePoints {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(current);
        }

        let e2 = 2 * self.err;
        if e2 > self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_are_endpoint_inclusive() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(3.0, 1.0));
        let points: Vec<_> = line.points().collect();
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(3, 1)));
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_points_restart() {
        let line = Line::new(Point::new(5.0, 5.0), Point::new(1.0, 2.0));
        assert_eq!(line.points().count(), line.points().count());
        assert_eq!(line.points().last(), Some((1, 2)));
    }

    #[test]
    fn test_degenerate_line_yields_single_point() {
        let line = Line::new(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        assert_eq!(line.points().collect::<Vec<_>>(), vec![(2, 2)]);
    }

    #[test]
    fn test_angle_round_trip() {
        let line = Line::from_angle(Point::new(10.0, 10.0), 45.0, 4.0);
        assert!((line.angle() - 45.0).abs() < 1e-9);
        assert!((line.length() - 4.0).abs() < 1e-9);
    }
}
