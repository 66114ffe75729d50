//! Layout transformation from serialized tensor order to oriented matrices.
//!
//! Convolution kernels are serialized in `(height, width, input_depth,
//! output_depth)` order, output depth varying fastest. The inference engine
//! wants one row per output channel with columns nested as `(input_depth,
//! height, width)`, width varying fastest:
//!
//! ```text
//! source index  i = o + O * (d + D * (w + W * h))
//! target        row = o,  col = d * H * W + h * W + w
//! ```
//!
//! Both transforms are pure index permutations; no value is altered.

use serde::{Deserialize, Serialize};
use tracing::trace;
use yolo_common::matrix::transpose_into;
use yolo_common::{KernelFormat, Result, RowMajorMatrix, WeightsError};

/// Declared dimensions of a convolution kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelShape {
    pub width: usize,
    pub height: usize,
    pub input_depth: usize,
    pub output_depth: usize,
}

impl KernelShape {
    pub fn new(width: usize, height: usize, input_depth: usize, output_depth: usize) -> Self {
        Self { width, height, input_depth, output_depth }
    }

    /// A 1x1 kernel.
    pub fn pointwise(input_depth: usize, output_depth: usize) -> Self {
        Self::new(1, 1, input_depth, output_depth)
    }

    pub fn is_pointwise(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Number of columns in the oriented matrix: `input_depth * height * width`.
    pub fn columns(&self) -> usize {
        self.input_depth * self.height * self.width
    }

    /// Total element count, rejecting zero or overflowing dimensions.
    pub fn element_count(&self) -> Result<usize> {
        for (label, value) in [
            ("width", self.width),
            ("height", self.height),
            ("input_depth", self.input_depth),
            ("output_depth", self.output_depth),
        ] {
            if value == 0 {
                return Err(WeightsError::InvalidDimensions(format!("{label} must be positive")));
            }
        }
        [self.height, self.input_depth, self.output_depth]
            .into_iter()
            .try_fold(self.width, usize::checked_mul)
            .ok_or_else(|| WeightsError::InvalidDimensions(format!("{self} overflows usize")))
    }
}

impl std::fmt::Display for KernelShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}x{}", self.width, self.height, self.input_depth, self.output_depth)
    }
}

/// Reorient a serialized convolution kernel.
///
/// Returns an `output_depth x (input_depth * height * width)` matrix and its
/// format. Pointwise kernels report their columns as input depth alone.
///
/// # Errors
///
/// [`WeightsError::ShapeMismatch`] if `flat.len()` is not the product of the
/// dimensions, [`WeightsError::InvalidDimensions`] for a zero dimension.
pub fn reshape_kernel(flat: Vec<f32>, shape: KernelShape) -> Result<(RowMajorMatrix, KernelFormat)> {
    let expected = shape.element_count()?;
    if flat.len() != expected {
        return Err(WeightsError::ShapeMismatch { expected, actual: flat.len() });
    }

    let spatial = shape.height * shape.width;
    let depth = shape.input_depth;

    // (h, w, d) x o  ->  o x (h, w, d)
    let by_output =
        RowMajorMatrix::from_vec(spatial * depth, shape.output_depth, flat)?.transpose();

    if shape.is_pointwise() {
        trace!("Pointwise kernel {}: transpose only", shape);
        return Ok((by_output, KernelFormat::pointwise()));
    }

    // Per output channel: (h * w) x d  ->  d x (h * w)
    let mut oriented = RowMajorMatrix::zeros(shape.output_depth, shape.columns());
    for o in 0..shape.output_depth {
        transpose_into(by_output.row(o), spatial, depth, oriented.row_mut(o));
    }

    trace!("Reshaped kernel {} into {}x{}", shape, oriented.rows(), oriented.cols());
    Ok((oriented, KernelFormat::spatial()))
}

/// Wrap per-channel scalars as an `output_depth x 1` column vector.
pub fn reshape_vector(flat: Vec<f32>, output_depth: usize) -> Result<RowMajorMatrix> {
    if output_depth == 0 {
        return Err(WeightsError::InvalidDimensions("output_depth must be positive".into()));
    }
    if flat.len() != output_depth {
        return Err(WeightsError::ShapeMismatch { expected: output_depth, actual: flat.len() });
    }
    RowMajorMatrix::from_vec(output_depth, 1, flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolo_common::Dimension;

    fn sequential(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn kernel_3x3x2x4_matches_index_formula() {
        let shape = KernelShape::new(3, 3, 2, 4);
        let (w, h, d, o) = (3, 3, 2, 4);
        let (m, _) = reshape_kernel(sequential(w * h * d * o), shape).unwrap();
        assert_eq!((m.rows(), m.cols()), (4, 18));

        for hh in 0..h {
            for ww in 0..w {
                for dd in 0..d {
                    for oo in 0..o {
                        let src = oo + o * (dd + d * (ww + w * hh));
                        let col = dd * h * w + hh * w + ww;
                        assert_eq!(m.get(oo, col), Some(src as f32), "h={hh} w={ww} d={dd} o={oo}");
                    }
                }
            }
        }
    }

    #[test]
    fn non_square_kernel_keeps_width_fastest() {
        // width 2, height 1: columns for a single input channel are [w0, w1]
        let (m, fmt) = reshape_kernel(sequential(4), KernelShape::new(2, 1, 1, 2)).unwrap();
        assert_eq!(m.row(0), &[0.0, 2.0]);
        assert_eq!(m.row(1), &[1.0, 3.0]);
        assert_eq!(fmt.column_dimensions.len(), 3);
    }

    #[test]
    fn pointwise_is_plain_transpose() {
        let shape = KernelShape::pointwise(3, 2);
        let flat = sequential(6);
        let expected = RowMajorMatrix::from_vec(3, 2, flat.clone()).unwrap().transpose();
        let (m, fmt) = reshape_kernel(flat, shape).unwrap();
        assert_eq!(m, expected);
        assert_eq!(fmt.column_dimensions, vec![Dimension::InputDepth]);
        assert_eq!(fmt.row_dimensions, vec![Dimension::OutputDepth]);
    }

    #[test]
    fn kernel_length_off_by_one() {
        let shape = KernelShape::new(3, 3, 2, 4);
        for len in [71, 73, 0, 1] {
            let err = reshape_kernel(sequential(len), shape).unwrap_err();
            assert!(
                matches!(err, WeightsError::ShapeMismatch { expected: 72, actual } if actual == len),
                "len {len}: {err}"
            );
        }
    }

    #[test]
    fn kernel_zero_dimension_rejected() {
        let err = reshape_kernel(Vec::new(), KernelShape::new(3, 0, 2, 4)).unwrap_err();
        assert!(matches!(err, WeightsError::InvalidDimensions(ref m) if m.contains("height")));
    }

    #[test]
    fn kernel_overflow_rejected() {
        let shape = KernelShape::new(usize::MAX, 2, 1, 1);
        assert!(matches!(shape.element_count(), Err(WeightsError::InvalidDimensions(_))));
    }

    #[test]
    fn vector_is_column() {
        let m = reshape_vector(vec![4.0, 5.0, 6.0], 3).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 1));
        assert_eq!(m.get(2, 0), Some(6.0));
    }

    #[test]
    fn vector_length_mismatch() {
        assert!(matches!(
            reshape_vector(vec![1.0; 4], 3),
            Err(WeightsError::ShapeMismatch { expected: 3, actual: 4 })
        ));
        assert!(matches!(reshape_vector(vec![], 0), Err(WeightsError::InvalidDimensions(_))));
    }
}
