use kurbo::{Affine, BezPath, Shape};
use serde::{Deserialize, Serialize};

use super::{Line, Point, RunLength, RunLengthCode};
use crate::Matrix;

/// Axis-aligned rectangle, optionally rotated about its origin corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub origin: Point,
    pub width: u32,
    pub height: u32,
    /// Rotation in degrees. Zero selects the axis-aligned fast paths.
    #[serde(default)]
    pub angle: f64,
}

impl Rectangle {
    pub const fn new(origin: Point, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
            angle: 0.0,
        }
    }

    pub const fn rotated(origin: Point, width: u32, height: u32, angle: f64) -> Self {
        Self {
            origin,
            width,
            height,
            angle,
        }
    }

    /// The four corner pixels, clockwise from the origin.
    pub fn corners(&self) -> [Point; 4] {
        let right = self.origin.x + self.width.saturating_sub(1) as f64;
        let bottom = self.origin.y + self.height.saturating_sub(1) as f64;
        let corners = [
            self.origin,
            Point::new(right, self.origin.y),
            Point::new(right, bottom),
            Point::new(self.origin.x, bottom),
        ];

        if self.angle == 0.0 {
            return corners;
        }

        // kurbo rotates toward +y, which is clockwise on screen.
        let rotation = Affine::rotate_about(-self.angle.to_radians(), kurbo::Point::from(self.origin));
        corners.map(|corner| Point::from(rotation * kurbo::Point::from(corner)))
    }

    /// Closed outline through the four corners.
    pub fn to_poly_line(&self) -> PolyLine {
        let corners = self.corners();
        let mut points = corners.to_vec();
        points.push(corners[0]);
        PolyLine::new(points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: u32,
}

impl Circle {
    pub const fn new(center: Point, radius: u32) -> Self {
        Self { center, radius }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolyLine {
    pub points: Vec<Point>,
}

impl PolyLine {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive segments in order.
    pub fn segments(&self) -> impl Iterator<Item = Line> + '_ {
        self.points.windows(2).map(|pair| Line::new(pair[0], pair[1]))
    }

    /// Spans covering the polygon's outline and interior.
    ///
    /// The polygon is closed implicitly. Interior pixels are those whose
    /// centers have a non-zero winding number.
    pub fn to_run_length_code(&self) -> RunLengthCode {
        let Some(first) = self.points.first() else {
            return RunLengthCode::new();
        };

        let pixels: Vec<(i64, i64)> = self.points.iter().map(|p| p.signed_pixel()).collect();
        let (mut min_x, mut min_y) = first.signed_pixel();
        let (mut max_x, mut max_y) = (min_x, min_y);
        for &(x, y) in &pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let width = (max_x - min_x + 1) as usize;
        let height = (max_y - min_y + 1) as usize;
        let mut scratch = Matrix::<bool>::new(width, height, 1);

        let mut path = BezPath::new();
        path.move_to(kurbo::Point::from(*first));
        for p in &self.points[1..] {
            path.line_to(kurbo::Point::from(*p));
        }
        path.close_path();

        for y in 0..height {
            for x in 0..width {
                let center = kurbo::Point::new((x as i64 + min_x) as f64, (y as i64 + min_y) as f64);
                if path.winding(center) != 0 {
                    scratch.put(true, x, y, 0);
                }
            }
        }

        let mut outline: Vec<Point> = pixels
            .iter()
            .map(|&(x, y)| Point::new((x - min_x) as f64, (y - min_y) as f64))
            .collect();
        outline.push(outline[0]);
        for segment in PolyLine::new(outline).segments() {
            for (x, y) in segment.points() {
                scratch.put_signed(true, x, y, 0);
            }
        }

        scratch
            .runs_of(true, 0)
            .into_iter()
            .map(|span| {
                RunLength::new(
                    Point::new(span.start.x + min_x as f64, span.start.y + min_y as f64),
                    span.length,
                )
            })
            .collect()
    }
}
