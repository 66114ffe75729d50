//! Property tests for kernel and vector reorientation

use proptest::prelude::*;
use yolo_weights::{KernelShape, RowMajorMatrix, WeightsError, reshape_kernel, reshape_vector};

fn shape_strategy() -> impl Strategy<Value = KernelShape> {
    (1usize..=5, 1usize..=5, 1usize..=6, 1usize..=6)
        .prop_map(|(w, h, d, o)| KernelShape::new(w, h, d, o))
}

fn sequential(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

proptest! {
    #[test]
    fn kernel_follows_index_mapping(shape in shape_strategy()) {
        let KernelShape { width: w, height: h, input_depth: d, output_depth: o } = shape;
        let (m, _) = reshape_kernel(sequential(w * h * d * o), shape).unwrap();
        prop_assert_eq!((m.rows(), m.cols()), (o, d * h * w));

        for hh in 0..h {
            for ww in 0..w {
                for dd in 0..d {
                    for oo in 0..o {
                        let src = oo + o * (dd + d * (ww + w * hh));
                        let col = dd * h * w + hh * w + ww;
                        prop_assert_eq!(m.get(oo, col), Some(src as f32));
                    }
                }
            }
        }
    }

    #[test]
    fn kernel_is_a_permutation(
        shape in shape_strategy(),
        seed in prop::collection::vec(-1.0e3f32..1.0e3, 1..8),
    ) {
        let n = shape.element_count().unwrap();
        let flat: Vec<f32> = (0..n).map(|i| seed[i % seed.len()] + i as f32).collect();
        let (m, _) = reshape_kernel(flat.clone(), shape).unwrap();

        let mut before = flat;
        let mut after = m.into_vec();
        before.sort_by(f32::total_cmp);
        after.sort_by(f32::total_cmp);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn pointwise_kernel_is_transpose(d in 1usize..=16, o in 1usize..=16) {
        let flat = sequential(d * o);
        let expected = RowMajorMatrix::from_vec(d, o, flat.clone()).unwrap().transpose();
        let (m, fmt) = reshape_kernel(flat, KernelShape::pointwise(d, o)).unwrap();
        prop_assert_eq!(m, expected);
        prop_assert_eq!(fmt.column_dimensions.len(), 1);
    }

    #[test]
    fn kernel_rejects_wrong_length(shape in shape_strategy(), delta in 1usize..4, longer in any::<bool>()) {
        let n = shape.element_count().unwrap();
        let len = if longer { n + delta } else { n.saturating_sub(delta) };
        let err = reshape_kernel(sequential(len), shape).unwrap_err();
        let is_mismatch = matches!(err, WeightsError::ShapeMismatch { expected, actual } if expected == n && actual == len);
        prop_assert!(is_mismatch);
    }

    #[test]
    fn vector_preserves_order(values in prop::collection::vec(-10.0f32..10.0, 1..64)) {
        let m = reshape_vector(values.clone(), values.len()).unwrap();
        prop_assert_eq!(m.cols(), 1);
        prop_assert_eq!(m.into_vec(), values);
    }
}
