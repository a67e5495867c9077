/*
 * @Date         : 2026-02-07
 * @Description  : Model：持有网络树、损失/准确率、两个优化器（训练用与做梦用）、共享变量仓库与参数集合，
 *                 负责编译、训练、评估、参数读写、做梦模式与持久化。
 *
 * 状态：未编译 -> 已编译（`compile`或首次`train`触发）；
 * 做梦模式有独立的编译状态，首次`predict_dream`时才编译，与主编译互不触发。
 */

mod compile;
mod dream;
mod io;
mod params;
mod train;

pub use dream::DreamPrediction;
pub use train::TrainReport;

use serde::{Deserialize, Serialize};

use crate::nn::{
    Accuracy, Branch, Graph, GraphError, Loss, ModelError, Optimizer, ParamSet, RMSprop, SharedStore,
    TraitOptimizer,
};
use crate::tensor::Tensor;

use self::compile::Compiled;
use self::dream::DreamCompiled;

#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    tree: Option<Branch>,
    loss: Loss,
    accuracy: Accuracy,
    optimizer: Optimizer,
    dream_optimizer: Optimizer,
    store: SharedStore,
    params: Option<ParamSet>,
    /// 标签的原始维数，预测结果按此维数展平
    num_output_dims: Option<usize>,
    /// 编译时（规范化为4维后）的标签形状，加载模型后据此重新编译
    label_shape: Option<Vec<usize>>,
    #[serde(skip)]
    compiled: Option<Compiled>,
    #[serde(skip)]
    dream: Option<DreamCompiled>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            tree: None,
            loss: Loss::default(),
            accuracy: Accuracy::default(),
            optimizer: RMSprop::new(0.001, 0.99, 1e-8).into(),
            dream_optimizer: RMSprop::new(0.1, 0.99, 1e-8).into(),
            store: SharedStore::new(),
            params: None,
            num_output_dims: None,
            label_shape: None,
            compiled: None,
            dream: None,
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓设置↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn set_tree(&mut self, tree: Branch) {
        self.tree = Some(tree);
    }

    pub fn set_loss(&mut self, loss: impl Into<Loss>) {
        self.loss = loss.into();
    }

    pub fn set_accuracy(&mut self, accuracy: impl Into<Accuracy>) {
        self.accuracy = accuracy.into();
    }

    /// 更换训练优化器（下次编译时生效）
    pub fn set_optimizer(&mut self, optimizer: impl Into<Optimizer>) {
        self.optimizer = optimizer.into();
    }

    /// 更换做梦优化器（下次做梦编译时生效）
    pub fn set_dream_optimizer(&mut self, optimizer: impl Into<Optimizer>) {
        self.dream_optimizer = optimizer.into();
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑设置↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    pub fn tree(&self) -> Option<&Branch> {
        self.tree.as_ref()
    }

    pub fn loss(&self) -> &Loss {
        &self.loss
    }

    pub fn accuracy(&self) -> &Accuracy {
        &self.accuracy
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    /// 经此修改的超参数在下次`train`开始时写回仓库
    pub fn optimizer_mut(&mut self) -> &mut Optimizer {
        &mut self.optimizer
    }

    /// 修改训练优化器的超参数并立即写回仓库，已编译的训练函数下一步即按新值更新
    pub fn set_hyperparameter(&mut self, name: &str, value: f32) -> Result<(), ModelError> {
        self.optimizer.set_hyperparameter(name, value)?;
        self.optimizer.sync_hyperparameters(&mut self.store)
    }

    pub fn dream_optimizer(&self) -> &Optimizer {
        &self.dream_optimizer
    }

    pub fn dream_optimizer_mut(&mut self) -> &mut Optimizer {
        &mut self.dream_optimizer
    }

    pub fn params(&self) -> Option<&ParamSet> {
        self.params.as_ref()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn is_dream_compiled(&self) -> bool {
        self.dream.is_some()
    }

    /// 已编译模型的计算图（节点数可用于观察编译结果）
    pub fn graph(&self) -> Option<&Graph> {
        self.compiled.as_ref().map(|compiled| &compiled.graph)
    }

    fn tree_ref(&self) -> Result<&Branch, ModelError> {
        self.tree.as_ref().ok_or(ModelError::TreeNotSet)
    }

    fn compiled_ref(&self) -> Result<&Compiled, ModelError> {
        self.compiled.as_ref().ok_or(ModelError::NotCompiled)
    }

    fn params_ref(&self) -> Result<&ParamSet, ModelError> {
        self.params.as_ref().ok_or(ModelError::ParamsNotInitialized)
    }
}

/// 所有数组统一规范化为4维
fn canonicalize(x: &[Tensor]) -> Vec<Tensor> {
    x.iter().map(Tensor::atleast_4d).collect()
}

/// 取出单输出函数的标量结果
fn scalar_output(outputs: &[Tensor]) -> Result<f32, ModelError> {
    outputs
        .first()
        .and_then(Tensor::number)
        .ok_or_else(|| GraphError::ComputationError("期望得到标量输出".to_string()).into())
}
