//! MNIST 多层感知机训练示例
//!
//! 3 个 512 单元的全连接层（各接一个 PReLU），输出层宽度由标签推断，Softmax 输出。
//! 数据缺失时自动下载到`./datasets/mnist`。
//!
//! ## 运行方式
//! ```bash
//! RUST_LOG=info cargo run --release --example mnist_mlp
//! ```

use std::time::Instant;

use okapi::data::load_mnist;
use okapi::nn::{
    Activation, ActivationKind, Branch, FullyConnected, Model, ModelError, PRelu, RMSprop,
    TrainConfig,
};

fn main() -> Result<(), ModelError> {
    env_logger::init();

    // ========== 超参数 ==========
    let hidden_units = 512;
    let hidden_layers = 3;
    let epochs = 24;
    let batch_size = 128;
    let lr = 0.00005;
    let val_size = 10000;

    // ========== 数据准备 ==========
    let mnist = load_mnist(None, val_size)?;
    println!(
        "训练集: {:?}，验证集: {:?}，测试集: {:?}",
        mnist.x_train.shape(),
        mnist.x_val.shape(),
        mnist.x_test.shape()
    );

    // ========== 组网 ==========
    let mut tree = Branch::new();
    tree.add_input(&mnist.x_train);
    for _ in 0..hidden_layers {
        tree.add_layer(FullyConnected::new(Some(hidden_units)));
        tree.add_layer(PRelu::new());
    }
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Softmax));

    let mut model = Model::new();
    model.set_tree(tree);
    model.set_optimizer(RMSprop::new(lr, 0.99, 1e-8));

    // ========== 训练 ==========
    let start = Instant::now();
    let config = TrainConfig::new().epochs(epochs).batch_size(batch_size);
    let report = model.train(&[mnist.x_train.clone()], &mnist.y_train, &config)?;
    println!(
        "训练完成，最终损失 {:?}，耗时 {:.1}s，参数量 {}",
        report.final_loss(),
        start.elapsed().as_secs_f32(),
        model.num_params()?
    );

    // ========== 评估 ==========
    let train_accuracy = model.get_accuracy(&[mnist.x_train], &mnist.y_train, batch_size, false)?;
    let val_accuracy = model.get_accuracy(&[mnist.x_val], &mnist.y_val, batch_size, false)?;
    let test_accuracy = model.get_accuracy(&[mnist.x_test], &mnist.y_test, batch_size, false)?;
    println!("Accuracy: {train_accuracy:.2}%");
    println!("Validation accuracy: {val_accuracy:.2}%");
    println!("Test accuracy: {test_accuracy:.2}%");
    Ok(())
}
