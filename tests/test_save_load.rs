/*
 * @Date         : 2026-02-10
 * @Description  : 模型/参数/配置的保存与加载：含嵌套分支、BatchNorm、PReLU、Dropout 的模型
 *                 训练后保存，加载后预测必须与保存前完全一致
 */
use std::fs;

use okapi::nn::{
    Activation, ActivationKind, BatchNorm, Branch, Dropout, FullyConnected, Model, ModelError,
    PRelu, TrainConfig,
};
use okapi::tensor::Tensor;

fn get_data() -> (Tensor, Tensor, Tensor) {
    let left = Tensor::new(&[0.1, 0.9, 0.2, 0.8, 0.7, 0.3, 0.6, 0.4], &[4, 2]);
    let right = Tensor::new(&[1.0, 0.0, 1.0, 0.0], &[4, 1]);
    let y = Tensor::new(&[0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0], &[4, 2]);
    (left, right, y)
}

fn build_tree(left: &Tensor, right: &Tensor) -> Branch {
    let mut nested = Branch::new();
    nested.add_input(left);
    nested.add_layer(FullyConnected::new(Some(4)));
    nested.add_layer(PRelu::new());
    nested.add_layer(Dropout::new(0.2));

    let mut tree = Branch::new();
    tree.add_branch(nested);
    tree.add_input(right);
    tree.add_layer(BatchNorm::new());
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Softmax));
    tree
}

fn trained_model() -> Result<(Model, Tensor, Tensor, Tensor), ModelError> {
    let (left, right, y) = get_data();
    let mut model = Model::new();
    model.set_tree(build_tree(&left, &right));
    let config = TrainConfig::new()
        .epochs(5)
        .batch_size(2)
        .seed(1)
        .verbose(false);
    model.train(&[left.clone(), right.clone()], &y, &config)?;
    Ok((model, left, right, y))
}

#[test]
fn test_save_and_load_model() -> Result<(), ModelError> {
    let _ = env_logger::builder().is_test(true).try_init();
    let (model, left, right, y) = trained_model()?;
    let inputs = [left, right];
    let expected = model.predict(&inputs)?;
    let expected_loss = model.get_test_loss(&inputs, &y)?;

    let path = std::env::temp_dir().join("okapi_save_load_model.bin");
    model.save_model(&path)?;
    let loaded = Model::load_model(&path)?;
    fs::remove_file(&path).ok();

    assert!(loaded.is_compiled());
    assert_eq!(loaded.predict(&inputs)?, expected);
    assert_eq!(loaded.get_test_loss(&inputs, &y)?, expected_loss);
    assert_eq!(loaded.get_params_as_vec()?, model.get_params_as_vec()?);
    assert_eq!(loaded.optimizer(), model.optimizer());
    Ok(())
}

#[test]
fn test_loaded_model_keeps_training() -> Result<(), ModelError> {
    let (model, left, right, y) = trained_model()?;
    let path = std::env::temp_dir().join("okapi_save_load_resume.bin");
    model.save_model(&path)?;
    let mut loaded = Model::load_model(&path)?;
    fs::remove_file(&path).ok();

    let config = TrainConfig::new()
        .epochs(2)
        .batch_size(2)
        .initialize_params(false)
        .verbose(false);
    let before = loaded.get_params_as_vec()?;
    loaded.train(&[left, right], &y, &config)?;
    assert_ne!(loaded.get_params_as_vec()?, before);
    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<(), ModelError> {
    let (model, left, right, y) = trained_model()?;
    let inputs = [left.clone(), right.clone()];
    let path = std::env::temp_dir().join("okapi_save_load_params.bin");
    model.save_params(&path)?;

    // 同样的网络结构，重新编译（随机初始化）后加载参数
    let mut fresh = Model::new();
    fresh.set_tree(build_tree(&left, &right));
    fresh.compile(&inputs, &y, true)?;
    fresh.load_params(&path)?;
    fs::remove_file(&path).ok();

    assert_eq!(fresh.predict(&inputs)?, model.predict(&inputs)?);
    Ok(())
}

#[test]
fn test_load_params_into_other_structure_fails() -> Result<(), ModelError> {
    let (model, left, _, y) = trained_model()?;
    let path = std::env::temp_dir().join("okapi_save_load_params_mismatch.bin");
    model.save_params(&path)?;

    let mut other = Model::new();
    let mut tree = Branch::new();
    tree.add_input(&left);
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Softmax));
    other.set_tree(tree);
    other.compile(&[left], &y, true)?;
    let result = other.load_params(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(ModelError::ParamStructureMismatch(_))));
    Ok(())
}

#[test]
fn test_train_config_json() -> Result<(), ModelError> {
    let config = TrainConfig::new().epochs(7).batch_size(3).seed(9);
    let path = std::env::temp_dir().join("okapi_train_config.json");
    config.to_json_file(&path)?;
    let loaded = TrainConfig::from_json_file(&path)?;
    fs::remove_file(&path).ok();
    assert_eq!(loaded, config);
    Ok(())
}
