//! transforms 模块单元测试

use approx::assert_abs_diff_eq;

use crate::data::DataError;
use crate::data::transforms::{get_val_set, scale_pixels, vec_to_onehot};
use crate::tensor::Tensor;

#[test]
fn test_scale_pixels() {
    let scaled = scale_pixels(&[0, 128, 255, 64], &[2, 2]).unwrap();
    assert_eq!(scaled.shape(), &[2, 2]);
    let values = scaled.to_vec();
    assert_abs_diff_eq!(values[0], 0.0);
    assert_abs_diff_eq!(values[1], 0.5);
    // 除以256：最大值严格小于1
    assert_abs_diff_eq!(values[2], 255.0 / 256.0);
    assert_abs_diff_eq!(values[3], 0.25);

    assert!(scale_pixels(&[1, 2, 3], &[2, 2]).is_err());
}

#[test]
fn test_vec_to_onehot() {
    let encoded = vec_to_onehot(&[0, 2, 1, 2]).unwrap();
    assert_eq!(encoded.shape(), &[4, 3]);
    assert_eq!(
        encoded.to_vec(),
        vec![
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]
    );
}

#[test]
fn test_vec_to_onehot_width_is_distinct_label_count() {
    // 只出现了 0 和 3：宽度为2，标签3越界
    assert!(matches!(
        vec_to_onehot(&[0, 3]),
        Err(DataError::IndexOutOfBounds { index: 3, len: 2 })
    ));
}

#[test]
fn test_get_val_set() {
    let x = Tensor::new(&(0..10).map(|i| i as f32).collect::<Vec<_>>(), &[5, 2]);
    let y = Tensor::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[5, 1]);
    let (x_train, y_train, x_val, y_val) = get_val_set(&x, &y, 2).unwrap();

    assert_eq!(x_train.shape(), &[3, 2]);
    assert_eq!(y_train.to_vec(), vec![0.0, 1.0, 2.0]);
    assert_eq!(x_val.to_vec(), vec![6.0, 7.0, 8.0, 9.0]);
    assert_eq!(y_val.to_vec(), vec![3.0, 4.0]);

    let (_, _, x_val, _) = get_val_set(&x, &y, 0).unwrap();
    assert_eq!(x_val.rows(), 0);
    assert!(get_val_set(&x, &y, 6).is_err());
}
