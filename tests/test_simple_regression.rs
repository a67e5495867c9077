/*
 * @Date         : 2026-02-10
 * @Description  : 简单线性回归测试：y = 2x + 1，单个全连接层 + 均方误差 + SGD，
 *                 凸问题，训练后参数应收敛到真值附近
 */
use approx::assert_abs_diff_eq;
use okapi::nn::{
    Activation, ActivationKind, Branch, FullyConnected, MeanSquaredError, Model, ModelError, SGD,
    TrainConfig,
};
use okapi::tensor::Tensor;

#[test]
fn test_simple_regression() -> Result<(), ModelError> {
    let _ = env_logger::builder().is_test(true).try_init();

    let xs = (0..10).map(|i| i as f32 / 10.0).collect::<Vec<_>>();
    let ys = xs.iter().map(|x| 2.0 * x + 1.0).collect::<Vec<_>>();
    let x = Tensor::new(&xs, &[10, 1]);
    let y = Tensor::new(&ys, &[10, 1]);

    let mut tree = Branch::new();
    tree.add_input(&x);
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Linear));

    let mut model = Model::new();
    model.set_tree(tree);
    model.set_loss(MeanSquaredError::new(0.0));
    model.set_optimizer(SGD::new(0.2));

    let config = TrainConfig::new()
        .epochs(1000)
        .batch_size(10)
        .shuffle(false)
        .verbose(false);
    let report = model.train(&[x.clone()], &y, &config)?;
    assert!(report.final_loss().unwrap_or(f32::MAX) < 1e-4);

    // 参数顺序：权重 [1, 1]，偏置 [1]
    let params = model.get_params_as_vec()?;
    assert_eq!(params.len(), 2);
    assert_abs_diff_eq!(params[0], 2.0, epsilon = 0.05);
    assert_abs_diff_eq!(params[1], 1.0, epsilon = 0.05);

    let prediction = model.predict(&[Tensor::new(&[0.5, 3.0], &[2, 1])])?;
    assert_eq!(prediction.shape(), &[2, 1]);
    assert_abs_diff_eq!(prediction.to_vec()[0], 2.0, epsilon = 0.05);
    assert_abs_diff_eq!(prediction.to_vec()[1], 7.0, epsilon = 0.2);
    Ok(())
}
