use approx::assert_abs_diff_eq;

use crate::tensor::Tensor;

#[test]
fn test_sum_and_mean() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    assert_eq!(t.sum(), 10.0);
    assert_eq!(t.mean(), 2.5);
    assert_eq!(Tensor::zeros(&[0]).mean(), 0.0);
}

#[test]
fn test_sum_and_mean_axis_keep() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let rows = t.sum_axis_keep(1).unwrap();
    assert_eq!(rows.shape(), &[2, 1]);
    assert_eq!(rows.to_vec(), vec![6.0, 15.0]);

    let cols = t.mean_axis_keep(0).unwrap();
    assert_eq!(cols.shape(), &[1, 3]);
    assert_eq!(cols.to_vec(), vec![2.5, 3.5, 4.5]);

    assert!(t.sum_axis_keep(2).is_err());
}

#[test]
fn test_sum_to_shape() {
    let g = Tensor::ones(&[4, 2, 3]);
    // 多出的前导维度直接求和，目标为1的维度求和并保留
    let reduced = g.sum_to_shape(&[1, 3]).unwrap();
    assert_eq!(reduced.shape(), &[1, 3]);
    assert_eq!(reduced.to_vec(), vec![8.0, 8.0, 8.0]);

    let scalar = g.sum_to_shape(&[]).unwrap();
    assert_eq!(scalar.number(), Some(24.0));

    assert!(g.sum_to_shape(&[2, 2]).is_err());
}

#[test]
fn test_matmul_and_transpose() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]);
    let c = a.matmul(&b).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c.to_vec(), vec![4.0, 5.0, 10.0, 11.0]);

    let t = a.transpose().unwrap();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

    // 内维不一致
    assert!(a.matmul(&a).is_err());
    // 非2维
    assert!(Tensor::zeros(&[2, 2, 2]).matmul(&a).is_err());
}

#[test]
fn test_softmax_axis1() {
    let t = Tensor::new(&[0.0, 0.0, 1.0, 1000.0, 0.0, 0.0], &[2, 3]);
    let s = t.softmax_axis1().unwrap();
    let v = s.to_vec();
    // 每行之和为1
    assert_abs_diff_eq!(v[0] + v[1] + v[2], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(v[3] + v[4] + v[5], 1.0, epsilon = 1e-6);
    // 大数值也不会溢出
    assert_abs_diff_eq!(v[3], 1.0, epsilon = 1e-6);
    let e = std::f32::consts::E;
    assert_abs_diff_eq!(v[2], e / (2.0 + e), epsilon = 1e-6);
}

#[test]
fn test_argmax_rows() {
    let t = Tensor::new(&[0.1, 0.7, 0.2, 0.9, 0.05, 0.05], &[2, 3, 1, 1]);
    assert_eq!(t.argmax_rows(), vec![1, 0]);
}
