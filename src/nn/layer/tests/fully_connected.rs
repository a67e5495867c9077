use super::run_layer;
use crate::nn::{FullyConnected, Init, Layer, TraitLayer};
use crate::tensor::Tensor;

#[test]
fn test_fully_connected_shapes() {
    let layer: Layer = FullyConnected::new(Some(3)).into();
    assert_eq!(layer.get_output_dim(&[5, 2, 2, 1]).unwrap(), vec![5, 3, 1, 1]);

    let params = layer.get_init_params(&[5, 2, 2, 1]).unwrap().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].shape(), &[4, 3]);
    assert_eq!(params[1], Tensor::zeros(&[1, 3]));
    assert!(!layer.mods_io_dim());
}

#[test]
fn test_fully_connected_units_follow_label() {
    let mut layer: Layer = FullyConnected::new(None).into();
    assert!(layer.mods_io_dim());
    // 宽度尚未确定
    assert!(layer.get_output_dim(&[1, 4, 1, 1]).is_err());

    layer.set_final_output_shape(&[10, 7, 1, 1]);
    assert_eq!(layer.get_output_dim(&[1, 4, 1, 1]).unwrap(), vec![1, 7, 1, 1]);
}

#[test]
fn test_fully_connected_forward() {
    // 权重全为1、偏置为0：每个输出都等于输入特征之和
    let layer: Layer = FullyConnected::new(Some(2)).init(Init::Ones).into();
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3, 1, 1]);
    let (output, updates, _) = run_layer(&layer, &x, false);
    assert_eq!(output.shape(), &[2, 2, 1, 1]);
    assert_eq!(output.to_vec(), vec![6.0, 6.0, 15.0, 15.0]);
    assert_eq!(updates, 0);
}
