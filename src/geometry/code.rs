use serde::{Deserialize, Serialize};

use super::Point;
use crate::error::{MatrixError, MatrixResult};

/// Freeman direction. Symbols run counter-clockwise from east:
///
/// ```text
/// 3 2 1
/// 4 * 0
/// 5 6 7
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainDirection {
    East = 0,
    NorthEast = 1,
    North = 2,
    NorthWest = 3,
    West = 4,
    SouthWest = 5,
    South = 6,
    SouthEast = 7,
}

impl ChainDirection {
    /// Grid offset of one step.
    pub const fn step(self) -> (i64, i64) {
        match self {
            ChainDirection::East => (1, 0),
            ChainDirection::NorthEast => (1, -1),
            ChainDirection::North => (0, -1),
            ChainDirection::NorthWest => (-1, -1),
            ChainDirection::West => (-1, 0),
            ChainDirection::SouthWest => (-1, 1),
            ChainDirection::South => (0, 1),
            ChainDirection::SouthEast => (1, 1),
        }
    }
}

impl TryFrom<u8> for ChainDirection {
    type Error = MatrixError;

    fn try_from(symbol: u8) -> MatrixResult<Self> {
        Ok(match symbol {
            0 => ChainDirection::East,
            1 => ChainDirection::NorthEast,
            2 => ChainDirection::North,
            3 => ChainDirection::NorthWest,
            4 => ChainDirection::West,
            5 => ChainDirection::SouthWest,
            6 => ChainDirection::South,
            7 => ChainDirection::SouthEast,
            other => {
                return Err(MatrixError::geometry(format!(
                    "chain code symbol {other} is not in 0..=7"
                )))
            }
        })
    }
}

/// Chain code: a start point and a sequence of unit steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreemanCode {
    pub start: Point,
    pub directions: Vec<ChainDirection>,
}

impl FreemanCode {
    pub fn new(start: Point, directions: Vec<ChainDirection>) -> Self {
        Self { start, directions }
    }

    pub fn from_symbols(start: Point, symbols: &[u8]) -> MatrixResult<Self> {
        let directions = symbols
            .iter()
            .map(|&s| ChainDirection::try_from(s))
            .collect::<MatrixResult<Vec<_>>>()?;
        Ok(Self::new(start, directions))
    }

    /// Every visited grid position, starting with the start point.
    pub fn positions(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let start = self.start.signed_pixel();
        std::iter::once(start).chain(self.directions.iter().scan(start, |pos, dir| {
            let (dx, dy) = dir.step();
            pos.0 += dx;
            pos.1 += dy;
            Some(*pos)
        }))
    }
}

/// Horizontal run of `length` pixels starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunLength {
    pub start: Point,
    pub length: u32,
}

impl RunLength {
    pub const fn new(start: Point, length: u32) -> Self {
        Self { start, length }
    }

    /// Last pixel of the run. Equal to `start` for an empty run.
    pub fn end(&self) -> Point {
        Point::new(
            self.start.x + self.length.saturating_sub(1) as f64,
            self.start.y,
        )
    }
}

/// Row-major sequence of spans.
pub type RunLengthCode = Vec<RunLength>;

/// Contrast change found along a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub position: Point,
    /// Direction of the probed line in degrees.
    pub angle: f64,
    /// Leading minus trailing sample. Positive for dark-to-bright.
    pub contrast: f64,
}

pub type Edges = Vec<Edge>;
