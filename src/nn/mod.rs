/*
 * @Date         : 2026-02-08
 * @Description  : 负责神经网络（neural network）的组网、编译与训练：
 *                 计算图引擎、共享变量仓库、层/分支树、损失与准确率、优化器及 Model
 */

mod accuracy;
mod branch;
mod config;
mod error;
mod graph;
pub mod initializers;
pub mod layer;
mod loss;
mod model;
pub mod optimizer;
mod params;
mod store;

pub use accuracy::{Accuracy, Binary, Categorical, TraitAccuracy};
pub use branch::{Branch, DataInput, Input, MergeMode};
pub use config::{DreamConfig, TrainConfig};
pub use error::ModelError;
pub use graph::{Function, Graph, GraphError, NodeId, Update};
pub use initializers::Init;
pub use layer::{
    Activation, ActivationKind, BatchNorm, Dropout, FullyConnected, Layer, LayerBinding,
    LayerOutput, PRelu, TraitLayer,
};
pub use loss::{Crossentropy, Loss, MeanSquaredError, TraitLoss};
pub use model::{DreamPrediction, Model, TrainReport};
pub use optimizer::{Optimizer, RMSprop, SGD, TraitOptimizer};
pub use params::{BranchInit, BranchParams, InitSet, LayerInit, LayerParams, ParamSet};
pub use store::{SharedId, SharedStore};

#[cfg(test)]
mod tests;
