//! Dense row-major `f32` matrix used as the internal reshape representation.

use crate::{Result, WeightsError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMajorMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl RowMajorMatrix {
    /// Wrap `data` as a `rows x cols` matrix, filled row by row.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            WeightsError::InvalidDimensions(format!("{rows} x {cols} overflows usize"))
        })?;
        if data.len() != expected {
            return Err(WeightsError::ShapeMismatch { expected, actual: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn transpose(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        transpose_into(&self.data, self.rows, self.cols, &mut data);
        Self { rows: self.cols, cols: self.rows, data }
    }

    /// Reinterpret the same row-major buffer with a new shape.
    pub fn reshape(self, rows: usize, cols: usize) -> Result<Self> {
        Self::from_vec(rows, cols, self.data)
    }
}

/// Write the transpose of the `rows x cols` block `src` into `dst`.
pub fn transpose_into(src: &[f32], rows: usize, cols: usize, dst: &mut [f32]) {
    debug_assert_eq!(src.len(), rows * cols);
    debug_assert_eq!(dst.len(), rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(rows: usize, cols: usize) -> RowMajorMatrix {
        let data = (0..rows * cols).map(|i| i as f32).collect();
        RowMajorMatrix::from_vec(rows, cols, data).unwrap()
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = RowMajorMatrix::from_vec(2, 3, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, WeightsError::ShapeMismatch { expected: 6, actual: 5 }));
    }

    #[test]
    fn transpose_2x3() {
        let m = sequential(2, 3);
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn transpose_twice_is_identity() {
        let m = sequential(4, 7);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn get_and_row() {
        let m = sequential(3, 4);
        assert_eq!(m.get(1, 2), Some(6.0));
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.row(2), &[8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn reshape_keeps_buffer_order() {
        let m = sequential(2, 6).reshape(3, 4).unwrap();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0, 7.0]);
        assert!(sequential(2, 6).reshape(5, 2).is_err());
    }
}
