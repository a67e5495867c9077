/*
 * @Date         : 2026-02-05
 * @Description  : 无参数的激活层
 */

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{LayerBinding, LayerOutput, TraitLayer};
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationKind {
    /// 沿通道维（轴1）归一化
    Softmax,
    Relu,
    Sigmoid,
    Tanh,
    /// 恒等映射
    Linear,
}

impl FromStr for ActivationKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "softmax" => Ok(Self::Softmax),
            "relu" => Ok(Self::Relu),
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            "linear" => Ok(Self::Linear),
            other => Err(GraphError::InvalidOperation(format!(
                "未知的激活函数：{other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    kind: ActivationKind,
}

impl Activation {
    pub const fn new(kind: ActivationKind) -> Self {
        Self { kind }
    }

    pub const fn kind(&self) -> ActivationKind {
        self.kind
    }
}

impl TraitLayer for Activation {
    fn get_output_dim(&self, input_shape: &[usize]) -> Result<Vec<usize>, GraphError> {
        Ok(input_shape.to_vec())
    }

    fn get_init_params(&self, _input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        Ok(None)
    }

    fn get_output(
        &self,
        graph: &mut Graph,
        input: NodeId,
        _binding: &LayerBinding,
        _is_test: bool,
    ) -> Result<LayerOutput, GraphError> {
        let output = match self.kind {
            ActivationKind::Softmax => graph.new_softmax_node(input)?,
            ActivationKind::Relu => graph.new_relu_node(input)?,
            ActivationKind::Sigmoid => graph.new_sigmoid_node(input)?,
            ActivationKind::Tanh => graph.new_tanh_node(input)?,
            ActivationKind::Linear => input,
        };
        Ok(output.into())
    }
}
