use crate::error::{RebalanceError, RebalanceResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D feature matrix: one row per sample, one column per feature.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> RebalanceResult<Self> {
        if data.len() != rows * cols {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// An empty matrix with a fixed column count, ready for `push_row`.
    pub fn with_cols(cols: usize) -> Self {
        Matrix {
            data: Vec::new(),
            rows: 0,
            cols,
        }
    }

    /// Create a matrix from a slice of rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> RebalanceResult<Self> {
        if rows.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let cols = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(data, rows.len(), cols)
    }

    /// Create a matrix from equally long columns.
    pub fn from_columns(columns: &[Vec<f64>]) -> RebalanceResult<Self> {
        if columns.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![rows],
                got: vec![bad.len()],
            });
        }
        let cols = columns.len();
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for column in columns {
                data.push(column[i]);
            }
        }
        Matrix::new(data, rows, cols)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Checked element access.
    pub fn get(&self, i: usize, j: usize) -> RebalanceResult<f64> {
        if i >= self.rows {
            return Err(RebalanceError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        if j >= self.cols {
            return Err(RebalanceError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(self.data[i * self.cols + j])
    }

    /// Borrow row `i`. Panics if `i >= rows`, like slice indexing.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a zero-column matrix has no data anyway
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Copy column `j` out.
    pub fn col(&self, j: usize) -> RebalanceResult<Vec<f64>> {
        if j >= self.cols {
            return Err(RebalanceError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    // ─── Row / column selection ─────────────────────────────────────────────

    /// Gather rows by index (indices may repeat).
    pub fn select_rows(&self, indices: &[usize]) -> RebalanceResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            if i >= self.rows {
                return Err(RebalanceError::IndexOutOfBounds {
                    index: i,
                    axis: 0,
                    size: self.rows,
                });
            }
            data.extend_from_slice(self.row(i));
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    /// Gather columns by index, in the given order.
    pub fn select_cols(&self, indices: &[usize]) -> RebalanceResult<Matrix> {
        if let Some(&bad) = indices.iter().find(|&&j| j >= self.cols) {
            return Err(RebalanceError::IndexOutOfBounds {
                index: bad,
                axis: 1,
                size: self.cols,
            });
        }
        let mut data = Vec::with_capacity(self.rows * indices.len());
        for row in self.iter_rows() {
            data.extend(indices.iter().map(|&j| row[j]));
        }
        Matrix::new(data, self.rows, indices.len())
    }

    /// Append one row.
    pub fn push_row(&mut self, row: &[f64]) -> RebalanceResult<()> {
        if row.len() != self.cols {
            return Err(RebalanceError::ShapeMismatch {
                expected: vec![self.cols],
                got: vec![row.len()],
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Stack matrices vertically. All parts must share a column count.
    pub fn vstack(parts: &[&Matrix]) -> RebalanceResult<Matrix> {
        let cols = match parts.first() {
            Some(m) => m.cols,
            None => return Err(RebalanceError::EmptyInput("vstack of no matrices".into())),
        };
        let mut data = Vec::new();
        let mut rows = 0;
        for m in parts {
            if m.cols != cols {
                return Err(RebalanceError::ShapeMismatch {
                    expected: vec![m.rows, cols],
                    got: vec![m.rows, m.cols],
                });
            }
            data.extend_from_slice(&m.data);
            rows += m.rows;
        }
        Matrix::new(data, rows, cols)
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    /// Per-column mean.
    pub fn mean_axis0(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        let n = self.rows.max(1) as f64;
        sums.into_iter().map(|s| s / n).collect()
    }
}

/// Squared Euclidean distance between two equally long rows.
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

// ─── Display ────────────────────────────────────────────────────────────────

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for row in self.iter_rows().take(8) {
            write!(f, "  [")?;
            for (j, v) in row.iter().take(8).enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", v)?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(Matrix::new(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
        assert!(m.get(2, 0).is_err());
    }

    #[test]
    fn test_from_rows_and_columns_agree() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let b = Matrix::from_columns(&[vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]).unwrap();
        assert_eq!(a, b);
        assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_select_rows_and_cols() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let r = m.select_rows(&[1, 1, 0]).unwrap();
        assert_eq!(r.data(), &[4.0, 5.0, 6.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
        let c = m.select_cols(&[2, 0]).unwrap();
        assert_eq!(c.data(), &[3.0, 1.0, 6.0, 4.0]);
        assert!(m.select_cols(&[3]).is_err());
    }

    #[test]
    fn test_vstack_and_push_row() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let mut b = Matrix::with_cols(2);
        b.push_row(&[3.0, 4.0]).unwrap();
        assert!(b.push_row(&[1.0]).is_err());
        let s = Matrix::vstack(&[&a, &b]).unwrap();
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_mean_axis0() {
        let m = Matrix::from_rows(&[vec![1.0, 10.0], vec![3.0, 30.0]]).unwrap();
        assert_eq!(m.mean_axis0(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_squared_distance() {
        assert_eq!(squared_distance(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
