//! Snapshot: one mini-batch worth of a layer's output.
//!
//! Stored row-major as `f64`: `rows` batch examples × `cols` features.

use crate::error::{DelveError, Result};
use std::ops::Index;

/// A 2-D (batch × feature) observation of a single layer's output.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Row-major: data[r * cols + c]
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Snapshot {
    /// Create a zero snapshot of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Wrap flat row-major data.
    ///
    /// Fails if `data.len() != rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(DelveError::ShapeMismatch {
                rows,
                cols,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(DelveError::RaggedRows {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Batch size.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Feature count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Get the raw row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Borrow row `r`, or `None` if out of range.
    pub fn row(&self, r: usize) -> Option<&[f64]> {
        if r >= self.rows {
            return None;
        }
        let base = r * self.cols;
        Some(&self.data[base..base + self.cols])
    }

    /// True if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Index<(usize, usize)> for Snapshot {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &Self::Output {
        assert!(c < self.cols, "column {} out of range for {} columns", c, self.cols);
        &self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_shape_check() {
        assert!(Snapshot::from_flat(2, 3, vec![0.0; 6]).is_ok());
        let err = Snapshot::from_flat(2, 3, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, DelveError::ShapeMismatch { expected: 6, got: 5, .. }));
    }

    #[test]
    fn test_from_rows_and_index() {
        let s = Snapshot::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(s.shape(), (3, 2));
        assert_eq!(s[(2, 1)], 6.0);
        assert_eq!(s.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(s.row(3), None);
    }

    #[test]
    #[should_panic(expected = "column 2 out of range")]
    fn test_index_column_past_end_panics() {
        let s = Snapshot::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let _ = s[(0, 2)];
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Snapshot::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, DelveError::RaggedRows { row: 1, expected: 2, got: 1 }));
    }

    #[test]
    fn test_empty_and_finite() {
        assert!(Snapshot::zeros(0, 4).is_empty());
        assert!(Snapshot::from_rows(&[]).unwrap().is_empty());

        let s = Snapshot::from_flat(1, 2, vec![1.0, f64::NAN]).unwrap();
        assert!(!s.is_finite());
        assert!(Snapshot::zeros(2, 2).is_finite());
    }
}
