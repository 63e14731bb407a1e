use tensorgrad::{Error, Tensor};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    fn matrix(rows: usize, cols: usize, data: &[f64]) -> Tensor {
        Tensor::from_data(data.to_vec(), &[rows, cols]).unwrap()
    }

    #[test]
    fn test_factories() {
        let z = Tensor::zeros(&[2, 3]);
        assert_eq!(z.shape(), &[2, 3]);
        assert_eq!(z.to_vec(), vec![0.0; 6]);
        assert_eq!(Tensor::ones(&[4]).to_vec(), vec![1.0; 4]);
        assert_eq!(Tensor::fill(&[2, 2], 7.5).to_vec(), vec![7.5; 4]);

        let s = Tensor::single(3.0);
        assert_eq!(s.shape(), &[1]);
        assert_eq!(s.element().unwrap(), 3.0);
    }

    #[test]
    fn test_from_data_rejects_wrong_length() {
        let err = Tensor::from_data(vec![1.0, 2.0, 3.0], &[2, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::ElementCount {
                shape: vec![2, 2],
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn test_strides_are_row_major() {
        let t = Tensor::zeros(&[2, 3, 4]);
        assert_eq!(t.strides(), vec![12, 4, 1]);
        assert_eq!(t.strides().len(), t.shape().len());

        let reshaped = t.reshape(&[6, 4]).unwrap();
        assert_eq!(reshaped.strides(), vec![4, 1]);
        assert!(matches!(t.reshape(&[5, 5]), Err(Error::ElementCount { .. })));
    }

    #[test]
    fn test_index_full_and_partial() {
        let t = Tensor::from_data((0..24).map(|i| i as f64).collect(), &[2, 3, 4]).unwrap();

        let scalar = t.index(&[1, 2, 3]).unwrap();
        assert_eq!(scalar.shape(), &[1]);
        assert_eq!(scalar.element().unwrap(), 23.0);

        let row = t.index(&[0, 1]).unwrap();
        assert_eq!(row.shape(), &[4]);
        assert_eq!(row.to_vec(), vec![4.0, 5.0, 6.0, 7.0]);

        let plane = t.index(&[1]).unwrap();
        assert_eq!(plane.shape(), &[3, 4]);
        assert_eq!(plane.element().unwrap_err(), Error::NotScalar { shape: vec![3, 4] });
        assert_eq!(plane.index(&[0, 0]).unwrap().element().unwrap(), 12.0);
    }

    #[test]
    fn test_index_out_of_range() {
        let t = Tensor::zeros(&[2, 2]);
        assert!(matches!(t.index(&[2, 0]), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(t.index(&[0, 0, 0]), Err(Error::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_element_requires_single_value() {
        assert!(matches!(
            Tensor::ones(&[2]).element(),
            Err(Error::NotScalar { .. })
        ));
    }

    #[test]
    fn test_apply_sees_flat_index() {
        let t = Tensor::fill(&[2, 2], 10.0);
        let out = t.apply(|v, i| v + i as f64);
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.to_vec(), vec![10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_elementwise_arithmetic() {
        let a = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = matrix(2, 2, &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!((&a + &b).to_vec(), vec![5.0; 4]);
        assert_eq!((&a - &b).to_vec(), vec![-3.0, -1.0, 1.0, 3.0]);
        assert_eq!((&a * &b).to_vec(), vec![4.0, 6.0, 6.0, 4.0]);
        assert_eq!((&a / &b).to_vec(), vec![0.25, 2.0 / 3.0, 1.5, 4.0]);

        assert_eq!((&a + 1.0).to_vec(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!((&a * 2.0).to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
        assert_eq!((a.clone() - 1.0).to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!((-a).to_vec(), vec![-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_elementwise_shape_mismatch() {
        let a = Tensor::ones(&[2, 2]);
        let b = Tensor::ones(&[4]);
        assert_eq!(
            a.checked_add(&b).unwrap_err(),
            Error::ShapeMismatch {
                op: "add",
                lhs: vec![2, 2],
                rhs: vec![4]
            }
        );
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_operator_panics_on_mismatch() {
        let _ = Tensor::ones(&[2]) * Tensor::ones(&[3]);
    }

    #[test]
    fn test_matmul() {
        let a = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = matrix(2, 2, &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(a.matmul(&b).unwrap(), matrix(2, 2, &[19.0, 22.0, 43.0, 50.0]));
    }

    #[test]
    fn test_matmul_only_needs_inner_dims_to_agree() {
        // operands of different shapes are fine as long as cols(a) == rows(b)
        let a = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = matrix(3, 1, &[1.0, 0.0, -1.0]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &[2, 1]);
        assert_eq!(c.to_vec(), vec![-2.0, -2.0]);

        assert!(matches!(b.matmul(&b), Err(Error::ShapeMismatch { op: "matmul", .. })));
        assert!(matches!(
            Tensor::ones(&[3]).matmul(&b),
            Err(Error::RankUnsupported { op: "matmul", rank: 1 })
        ));
    }

    #[test]
    fn test_matmul_agrees_with_nalgebra() {
        let a_data: Vec<f64> = (0..12).map(|i| i as f64 * 0.5 - 2.0).collect();
        let b_data: Vec<f64> = (0..8).map(|i| (i * i) as f64 / 3.0).collect();
        let a = matrix(3, 4, &a_data);
        let b = matrix(4, 2, &b_data);

        let expected = DMatrix::from_row_slice(3, 4, &a_data) * DMatrix::from_row_slice(4, 2, &b_data);
        let got = a.matmul(&b).unwrap();
        assert_eq!(got.shape(), &[3, 2]);
        for r in 0..3 {
            for c in 0..2 {
                let value = got.index(&[r, c]).unwrap().element().unwrap();
                assert_abs_diff_eq!(value, expected[(r, c)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_transpose() {
        let t = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let tt = t.transpose().unwrap();
        assert_eq!(tt.shape(), &[3, 2]);
        assert_eq!(tt.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert!(matches!(
            Tensor::zeros(&[2, 2, 2]).transpose(),
            Err(Error::RankUnsupported { rank: 3, .. })
        ));
    }

    #[test]
    fn test_sum_relu_power() {
        let t = Tensor::vector(vec![-2.0, 0.0, 3.0]);
        assert_eq!(t.sum(), Tensor::single(1.0));
        assert_eq!(t.relu().to_vec(), vec![0.0, 0.0, 3.0]);
        assert_eq!(t.power(2.0).to_vec(), vec![4.0, 0.0, 9.0]);
        assert_eq!(Tensor::single(8.0).power(-1.0).element().unwrap(), 0.125);
    }

    #[test]
    fn test_comparisons_use_the_sum() {
        let loss = Tensor::single(0.5);
        assert!(loss < 1.0);
        assert!(loss > 0.25);
        assert!(loss <= 0.5);
        assert!(loss == 0.5);

        // [3, -1] sums to 2, so it compares as 2 against another tensor
        let a = Tensor::vector(vec![3.0, -1.0]);
        let b = Tensor::vector(vec![1.0, 1.5]);
        assert_eq!(a.compare_sum(&b), Some(Ordering::Less));
        assert_eq!(a.compare_sum(&Tensor::vector(vec![1.0, 1.0])), Some(Ordering::Equal));
        // exact equality still looks at every element
        assert_ne!(a, Tensor::vector(vec![1.0, 1.0]));
    }

    #[test]
    fn test_render() {
        assert_eq!(Tensor::vector(vec![1.0, 2.5]).to_string(), "[1 2.5]");
        assert_eq!(
            matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]).to_string(),
            "[1 2]\n[3 4]"
        );
        assert_eq!(
            Tensor::zeros(&[1, 1, 1]).render().unwrap_err(),
            Error::RankUnsupported { op: "render", rank: 3 }
        );
    }

    #[test]
    fn test_serde_keeps_shape() {
        let t = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let json = serde_json::to_string(&t).unwrap();
        let back: Tensor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    fn shape_and_data() -> impl Strategy<Value = (Vec<usize>, Vec<f64>)> {
        prop::collection::vec(1usize..5, 1..4).prop_flat_map(|shape| {
            let n: usize = shape.iter().product();
            (Just(shape), prop::collection::vec(-100.0f64..100.0, n))
        })
    }

    proptest! {
        #[test]
        fn prop_transpose_round_trip(rows in 1usize..6, cols in 1usize..6, seed in -50.0f64..50.0) {
            let data: Vec<f64> = (0..rows * cols).map(|i| seed + i as f64).collect();
            let t = Tensor::from_data(data, &[rows, cols]).unwrap();
            let back = t.transpose().unwrap().transpose().unwrap();
            prop_assert_eq!(back, t);
        }

        #[test]
        fn prop_shape_invariant_holds((shape, data) in shape_and_data()) {
            let t = Tensor::from_data(data, &shape).unwrap();
            let results = [
                t.clone(),
                &t + &t,
                &t * 0.5,
                t.relu(),
                t.power(2.0),
                t.apply(|v, _| v.abs()),
            ];
            for r in results {
                prop_assert_eq!(r.len(), r.shape().iter().product::<usize>());
                prop_assert_eq!(r.strides().len(), r.shape().len());
                prop_assert_eq!(r.shape(), t.shape());
            }
            prop_assert_eq!(t.sum().len(), 1);
        }
    }
}
