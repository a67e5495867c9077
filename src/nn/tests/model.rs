use approx::assert_abs_diff_eq;

use super::{separable_data, softmax_model};
use crate::nn::{
    Activation, ActivationKind, BatchNorm, Branch, Dropout, FullyConnected, Model, ModelError,
    PRelu, RMSprop, TrainConfig, TraitOptimizer,
};

fn quiet(epochs: usize) -> TrainConfig {
    TrainConfig::new()
        .epochs(epochs)
        .batch_size(4)
        .shuffle(false)
        .verbose(false)
}

#[test]
fn test_training_on_separable_data() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    let report = model.train(&[x.clone()], &y, &quiet(60)).unwrap();

    // 全批量梯度下降：损失逐epoch下降
    assert_eq!(report.epoch_losses.len(), 60);
    for pair in report.epoch_losses.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-6, "{pair:?}");
    }
    assert!(report.final_loss().unwrap() < report.epoch_losses[0]);

    let accuracy = model.get_accuracy(&[x.clone()], &y, 2, false).unwrap();
    assert_abs_diff_eq!(accuracy, 100.0, epsilon = 1e-4);
}

#[test]
fn test_predict_shape_follows_label_rank() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    model.compile(&[x.clone()], &y, true).unwrap();
    assert!(model.is_compiled());

    let prediction = model.predict(&[x.clone()]).unwrap();
    assert_eq!(prediction.shape(), &[4, 2]);
    for row in prediction.to_vec().chunks(2) {
        assert_abs_diff_eq!(row[0] + row[1], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_train_and_test_loss_agree_without_regularization() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    model.compile(&[x.clone()], &y, true).unwrap();
    let train = model.get_train_loss(&[x.clone()], &y).unwrap();
    let test = model.get_test_loss(&[x.clone()], &y).unwrap();
    assert_abs_diff_eq!(train, test, epsilon = 1e-6);
}

#[test]
fn test_errors_before_compile() {
    let (x, y) = separable_data();
    let model = softmax_model(&x);
    assert!(matches!(model.predict(&[x.clone()]), Err(ModelError::NotCompiled)));
    assert!(matches!(
        model.get_test_loss(&[x.clone()], &y),
        Err(ModelError::NotCompiled)
    ));

    let mut empty = Model::new();
    assert!(matches!(
        empty.compile(&[x], &y, true),
        Err(ModelError::TreeNotSet)
    ));
}

#[test]
fn test_data_input_count_is_checked() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    assert!(matches!(
        model.compile(&[x.clone(), x.clone()], &y, true),
        Err(ModelError::DataInputCount {
            expected: 1,
            got: 2
        })
    ));

    model.compile(&[x.clone()], &y, true).unwrap();
    assert!(matches!(
        model.predict(&[]),
        Err(ModelError::DataInputCount {
            expected: 1,
            got: 0
        })
    ));
}

#[test]
fn test_recompile_without_initialization_keeps_params() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    model.train(&[x.clone()], &y, &quiet(5)).unwrap();
    let trained = model.get_params_as_vec().unwrap();

    model.compile(&[x.clone()], &y, false).unwrap();
    assert_eq!(model.get_params_as_vec().unwrap(), trained);

    // 重新初始化时，结构不变的参数原地覆写，不会注册新的共享变量
    let stored = model.store().len();
    model.compile(&[x.clone()], &y, true).unwrap();
    assert_eq!(model.store().len(), stored);
    assert_ne!(model.get_params_as_vec().unwrap(), trained);
}

#[test]
fn test_learning_rate_change_applies_without_recompile() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    model.train(&[x.clone()], &y, &quiet(2)).unwrap();
    let trained = model.get_params_as_vec().unwrap();

    // 经`optimizer_mut`修改，下次训练开始时生效
    model.optimizer_mut().set_hyperparameter("lr", 0.0).unwrap();
    model.train(&[x.clone()], &y, &quiet(2)).unwrap();
    assert_eq!(model.get_params_as_vec().unwrap(), trained);

    model.optimizer_mut().set_learning_rate(0.5);
    model.train(&[x.clone()], &y, &quiet(1)).unwrap();
    assert_ne!(model.get_params_as_vec().unwrap(), trained);
}

#[test]
fn test_rmsprop_hyperparameter_change_keeps_compiled_step() {
    let (x, y) = separable_data();
    let mut model = softmax_model(&x);
    model.set_optimizer(RMSprop::new(0.05, 0.9, 1e-8));
    model.train(&[x.clone()], &y, &quiet(2)).unwrap();
    let trained = model.get_params_as_vec().unwrap();
    let stored = model.store().len();

    model.set_hyperparameter("learning_rate", 0.0).unwrap();
    assert_eq!(model.optimizer().learning_rate(), 0.0);
    model.train(&[x.clone()], &y, &quiet(2)).unwrap();
    assert_eq!(model.get_params_as_vec().unwrap(), trained);
    // 未重新编译，也没有注册新的共享变量
    assert!(model.is_compiled());
    assert_eq!(model.store().len(), stored);

    assert!(matches!(
        model.set_hyperparameter("beta1", 0.9),
        Err(ModelError::UnknownHyperparameter(_))
    ));
}

#[test]
fn test_multi_branch_model_trains() {
    let (x, y) = separable_data();
    let first = x.narrow(1, 0, 1).unwrap();
    let second = x.narrow(1, 1, 1).unwrap();

    let mut left = Branch::new();
    left.add_input(&first);
    left.add_layer(FullyConnected::new(Some(3)));
    left.add_layer(PRelu::new());

    let mut tree = Branch::new();
    tree.add_branch(left);
    tree.add_input(&second);
    tree.add_layer(BatchNorm::new());
    tree.add_layer(Dropout::new(0.1));
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Softmax));

    let mut model = Model::new();
    model.set_tree(tree);
    let report = model
        .train(&[first.clone(), second.clone()], &y, &quiet(3))
        .unwrap();
    assert_eq!(report.epoch_losses.len(), 3);
    assert!(report.epoch_losses.iter().all(|l| l.is_finite()));

    let prediction = model.predict(&[first, second]).unwrap();
    assert_eq!(prediction.shape(), &[4, 2]);
    // 参数：左分支 FC(1->3) 与 PReLU，根分支 BatchNorm 与 FC(4->2)
    assert_eq!(model.params().unwrap().branches.len(), 2);
    assert_eq!(model.num_params().unwrap(), (3 + 3) + 3 + (4 + 4) + (8 + 2));
}

#[test]
fn test_shuffled_training_with_seed_is_reproducible() {
    let (x, y) = separable_data();
    let config = TrainConfig::new()
        .epochs(4)
        .batch_size(2)
        .seed(3)
        .verbose(false);

    let mut first = softmax_model(&x);
    first.compile(&[x.clone()], &y, true).unwrap();
    let init = first.get_params_as_vec().unwrap();
    let report_a = first.train(&[x.clone()], &y, &config).unwrap();

    let mut second = softmax_model(&x);
    second.compile(&[x.clone()], &y, true).unwrap();
    second.set_params_as_vec(&init).unwrap();
    let report_b = second.train(&[x.clone()], &y, &config).unwrap();

    assert_eq!(report_a, report_b);
}
