mod config;
mod function;
mod loss_accuracy;
mod model;

use crate::nn::{Activation, ActivationKind, Branch, FullyConnected, Model, SGD};
use crate::tensor::Tensor;

/// 线性可分的四样本二分类数据：第一个特征大于第二个时属于第0类
pub(crate) fn separable_data() -> (Tensor, Tensor) {
    let x = Tensor::new(&[2.0, 0.0, 1.5, 0.5, 0.0, 2.0, 0.5, 1.5], &[4, 2]);
    let y = Tensor::new(&[1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], &[4, 2]);
    (x, y)
}

/// 单输入、全连接 + softmax 的模型
pub(crate) fn softmax_model(x: &Tensor) -> Model {
    let mut tree = Branch::new();
    tree.add_input(x);
    tree.add_layer(FullyConnected::new(None));
    tree.add_layer(Activation::new(ActivationKind::Softmax));

    let mut model = Model::new();
    model.set_tree(tree);
    model.set_optimizer(SGD::new(0.5));
    model
}
