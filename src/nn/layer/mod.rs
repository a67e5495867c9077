/*
 * @Date         : 2026-02-05
 * @Description  : Layer 模块：统一的层接口`TraitLayer`，经`enum_dispatch`分派到各具体层。
 *
 * 约定：
 * - 形状一律是包含样本维的4维形状`[n, c, h, w]`；
 * - 层只描述“参数长什么样、输出怎么算”，参数数值由 Model 持有（存放在`SharedStore`中）；
 * - 可选能力（不可训练状态、副作用更新、按标签形状调整输出）都是带默认实现的方法。
 */

mod activation;
mod batch_norm;
mod dropout;
mod fully_connected;
mod prelu;

pub use activation::{Activation, ActivationKind};
pub use batch_norm::BatchNorm;
pub use dropout::Dropout;
pub use fully_connected::FullyConnected;
pub use prelu::PRelu;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::nn::{Graph, GraphError, NodeId, Update};
use crate::tensor::Tensor;

/// 求层输出时，该层参数/状态在计算图中对应的（共享）节点
#[derive(Debug, Clone, Copy)]
pub struct LayerBinding<'a> {
    pub params: &'a [NodeId],
    pub state: &'a [NodeId],
}

impl LayerBinding<'_> {
    pub(crate) fn param(&self, index: usize, layer: &str) -> Result<NodeId, GraphError> {
        self.params.get(index).copied().ok_or_else(|| {
            GraphError::InvalidOperation(format!("{layer}层缺少第{index}个参数"))
        })
    }

    pub(crate) fn state(&self, index: usize, layer: &str) -> Result<NodeId, GraphError> {
        self.state.get(index).copied().ok_or_else(|| {
            GraphError::InvalidOperation(format!("{layer}层缺少第{index}个状态"))
        })
    }
}

/// 层的输出表达式及其副作用更新
#[derive(Debug, Clone)]
pub struct LayerOutput {
    pub output: NodeId,
    pub updates: Vec<Update>,
}

impl From<NodeId> for LayerOutput {
    fn from(output: NodeId) -> Self {
        Self {
            output,
            updates: Vec::new(),
        }
    }
}

#[enum_dispatch]
pub trait TraitLayer {
    /// 由输入形状推断输出形状
    fn get_output_dim(&self, input_shape: &[usize]) -> Result<Vec<usize>, GraphError>;

    /// 给定输入形状，生成可训练参数的初始值；无参数的层返回`None`
    fn get_init_params(&self, input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError>;

    /// 不可训练的层状态（如滑动统计量）的初始值
    fn get_init_state(&self, _input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        Ok(None)
    }

    /// 构建该层的输出表达式。`is_test`为真时按推理模式构建
    fn get_output(
        &self,
        graph: &mut Graph,
        input: NodeId,
        binding: &LayerBinding,
        is_test: bool,
    ) -> Result<LayerOutput, GraphError>;

    /// 输出形状是否取决于下游（即标签）形状
    fn mods_io_dim(&self) -> bool {
        false
    }

    /// 按标签形状调整本层输出，仅在`mods_io_dim`为真时被调用
    fn set_final_output_shape(&mut self, _shape: &[usize]) {}
}

#[enum_dispatch(TraitLayer)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Layer {
    FullyConnected,
    Activation,
    PRelu,
    Dropout,
    BatchNorm,
}

/// 取样本维之外的特征数
pub(crate) fn features_of(shape: &[usize]) -> usize {
    shape.iter().skip(1).product::<usize>()
}

#[cfg(test)]
mod tests;
