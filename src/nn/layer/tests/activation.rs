use approx::assert_abs_diff_eq;

use super::run_layer;
use crate::nn::{Activation, ActivationKind, Layer, TraitLayer};
use crate::tensor::Tensor;

#[test]
fn test_activation_kind_from_str() {
    assert_eq!("softmax".parse::<ActivationKind>().unwrap(), ActivationKind::Softmax);
    assert_eq!("ReLU".parse::<ActivationKind>().unwrap(), ActivationKind::Relu);
    assert!("swish".parse::<ActivationKind>().is_err());
}

#[test]
fn test_activation_has_no_params() {
    let layer: Layer = Activation::new(ActivationKind::Tanh).into();
    assert_eq!(layer.get_init_params(&[1, 3, 1, 1]).unwrap(), None);
    assert_eq!(layer.get_output_dim(&[2, 3, 1, 1]).unwrap(), vec![2, 3, 1, 1]);
}

#[test]
fn test_softmax_activation_over_channels() {
    let layer: Layer = Activation::new(ActivationKind::Softmax).into();
    let x = Tensor::new(&[1.0, 1.0, 0.0, 10.0], &[2, 2, 1, 1]);
    let (output, _, _) = run_layer(&layer, &x, true);
    let v = output.to_vec();
    assert_abs_diff_eq!(v[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(v[1], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(v[2] + v[3], 1.0, epsilon = 1e-6);
    assert!(v[3] > 0.99);
}

#[test]
fn test_linear_activation_is_identity() {
    let layer: Layer = Activation::new(ActivationKind::Linear).into();
    let x = Tensor::new(&[-1.0, 2.0], &[2, 1, 1, 1]);
    let (output, _, _) = run_layer(&layer, &x, false);
    assert_eq!(output, x);
}
