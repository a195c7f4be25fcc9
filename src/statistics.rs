//! Histograms, run-length extraction and span statistics.

use crate::element::Element;
use crate::error::{MatrixError, MatrixResult};
use crate::geometry::{Line, Point, RunLength, RunLengthCode};
use crate::Matrix;

/// Min, max and mean over a set of pixels.
///
/// All three are `None` when no pixel was visited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics<T> {
    pub minimum: Option<T>,
    pub maximum: Option<T>,
    pub mean: Option<f64>,
    pub count: usize,
}

impl<T> Default for Statistics<T> {
    fn default() -> Self {
        Self {
            minimum: None,
            maximum: None,
            mean: None,
            count: 0,
        }
    }
}

impl<T: Element> Matrix<T> {
    /// Count of every value of layer z, indexed by value.
    ///
    /// Defined for bool and unsigned buffers only.
    pub fn histogram(&self, z: usize) -> MatrixResult<Vec<usize>> {
        let Some(ranks) = T::RANKS else {
            return Err(MatrixError::unsupported("histogram", T::KIND));
        };
        self.check_layer(z)?;

        let mut histogram = vec![0usize; ranks];
        for &v in self.values.index_axis(ndarray::Axis(0), z).iter() {
            histogram[v.rank()] += 1;
        }
        Ok(histogram)
    }

    /// Maximal horizontal runs of `value` in layer z, row-major.
    pub fn run_length_code(&self, value: T, z: usize) -> MatrixResult<RunLengthCode> {
        self.check_layer(z)?;
        Ok(self.runs_of(value, z))
    }

    /// Runs of `value` in a layer already known to exist.
    pub(crate) fn runs_of(&self, value: T, z: usize) -> RunLengthCode {
        let width = self.width();
        let mut spans = RunLengthCode::new();

        for y in 0..self.height() {
            let mut run_start = None;
            for x in 0..width {
                let matches = self.values[[z, y, x]] == value;
                match (matches, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(start)) => {
                        spans.push(run(start, x, y));
                        run_start = None;
                    }
                    _ => {}
                }
            }
            if let Some(start) = run_start {
                spans.push(run(start, width, y));
            }
        }
        spans
    }

    /// Statistics over every pixel covered by `spans`.
    ///
    /// Span pixels outside the buffer are ignored.
    pub fn statistics(&self, spans: &[RunLength], z: usize) -> MatrixResult<Statistics<T>> {
        self.check_layer(z)?;
        let mut stats = Statistics::default();
        let mut sum = 0.0;

        for span in spans {
            let (x0, y) = span.start.signed_pixel();
            if y < 0 || y >= self.height() as i64 {
                continue;
            }
            let from = x0.max(0);
            let to = (x0 + span.length as i64).min(self.width() as i64);
            for x in from..to {
                let v = self.values[[z, y as usize, x as usize]];
                stats.minimum = Some(match stats.minimum {
                    Some(m) if m <= v => m,
                    _ => v,
                });
                stats.maximum = Some(match stats.maximum {
                    Some(m) if m >= v => m,
                    _ => v,
                });
                sum += v.to_f64();
                stats.count += 1;
            }
        }

        if stats.count > 0 {
            stats.mean = Some(sum / stats.count as f64);
        }
        Ok(stats)
    }

    /// Mean value over the grid points of `line`. Points outside the buffer
    /// read as zero.
    pub fn average_along_line(&self, line: &Line, z: usize) -> MatrixResult<f64> {
        self.check_layer(z)?;
        let (sum, count) = line.points().fold((0.0, 0usize), |(sum, count), (x, y)| {
            (sum + self.signed_value(x, y, z).to_f64(), count + 1)
        });
        Ok(sum / count.max(1) as f64)
    }

    pub(crate) fn signed_value(&self, x: i64, y: i64, z: usize) -> T {
        if x < 0 || y < 0 {
            return T::ZERO;
        }
        self.value(x as usize, y as usize, z)
    }
}

fn run(start: usize, end: usize, y: usize) -> RunLength {
    RunLength::new(Point::new(start as f64, y as f64), (end - start) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_values() {
        let mut m = Matrix::<u8>::new(3, 2, 1);
        m.set_value(7, 0, 0, 0).unwrap();
        m.set_value(7, 2, 1, 0).unwrap();
        let histogram = m.histogram(0).unwrap();
        assert_eq!(histogram.len(), 256);
        assert_eq!(histogram[0], 4);
        assert_eq!(histogram[7], 2);

        let b = Matrix::with_value(2, 2, 1, true);
        assert_eq!(b.histogram(0).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_histogram_unsupported_for_signed() {
        let m = Matrix::<i16>::new(2, 2, 1);
        assert!(matches!(m.histogram(0), Err(MatrixError::Unsupported { .. })));
        let f = Matrix::<f32>::new(2, 2, 1);
        assert!(f.histogram(0).is_err());
    }

    #[test]
    fn test_run_length_code_closes_runs_at_row_end() {
        let m = Matrix::<u8>::from_layer(4, 2, vec![1, 1, 0, 1, 0, 0, 1, 1]).unwrap();
        let spans = m.run_length_code(1, 0).unwrap();
        assert_eq!(
            spans,
            vec![
                RunLength::new(Point::new(0.0, 0.0), 2),
                RunLength::new(Point::new(3.0, 0.0), 1),
                RunLength::new(Point::new(2.0, 1.0), 2),
            ]
        );
    }

    #[test]
    fn test_statistics_over_spans() {
        let m = Matrix::<u8>::from_layer(4, 2, vec![1, 2, 3, 4, 10, 20, 30, 40]).unwrap();
        let spans = vec![
            RunLength::new(Point::new(1.0, 0.0), 2),
            RunLength::new(Point::new(3.0, 1.0), 5),
        ];
        let stats = m.statistics(&spans, 0).unwrap();
        assert_eq!(stats.minimum, Some(2));
        assert_eq!(stats.maximum, Some(40));
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, Some(15.0));
    }

    #[test]
    fn test_statistics_of_empty_spans_has_no_mean() {
        let m = Matrix::<u8>::new(2, 2, 1);
        let stats = m.statistics(&[RunLength::new(Point::new(0.0, 0.0), 0)], 0).unwrap();
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn test_average_along_line() {
        let m = Matrix::<u8>::from_layer(3, 1, vec![10, 20, 60]).unwrap();
        let line = Line::new(Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert_eq!(m.average_along_line(&line, 0).unwrap(), 30.0);

        let past_end = Line::new(Point::new(2.0, 0.0), Point::new(3.0, 0.0));
        assert_eq!(m.average_along_line(&past_end, 0).unwrap(), 30.0);
    }
}
