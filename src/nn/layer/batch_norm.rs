/*
 * @Date         : 2026-02-05
 * @Description  : BatchNorm 层：沿样本维做归一化，并以副作用更新维护滑动均值/方差
 */

use serde::{Deserialize, Serialize};

use super::{LayerBinding, LayerOutput, TraitLayer};
use crate::nn::{Graph, GraphError, NodeId, Update};
use crate::tensor::Tensor;

/// # 参数
/// - `gamma`（缩放，初值1）、`beta`（平移，初值0），形状均为`[1, c, h, w]`
///
/// # 状态（不参与训练）
/// - 滑动均值（初值0）、滑动方差（初值1），形状同上
///
/// 训练模式用当前批次的统计量，并产生两条更新：
/// `running = momentum * running + (1 - momentum) * batch_stat`；
/// 推理模式直接用滑动统计量，不产生更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNorm {
    momentum: f32,
    epsilon: f32,
}

impl BatchNorm {
    pub const fn new() -> Self {
        Self {
            momentum: 0.9,
            epsilon: 1e-5,
        }
    }

    pub const fn momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub const fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    fn stat_shape(input_shape: &[usize]) -> Vec<usize> {
        let mut shape = input_shape.to_vec();
        if let Some(rows) = shape.first_mut() {
            *rows = 1;
        }
        shape
    }

    /// `gamma * (x - mean) / sqrt(var + eps) + beta`
    fn normalize(
        &self,
        graph: &mut Graph,
        input: NodeId,
        mean: NodeId,
        var: NodeId,
        gamma: NodeId,
        beta: NodeId,
    ) -> Result<NodeId, GraphError> {
        let centered = graph.new_subtract_node(input, mean)?;
        let eps = graph.new_scalar_node(self.epsilon);
        let shifted_var = graph.new_add_node(var, eps)?;
        let std = graph.new_sqrt_node(shifted_var)?;
        let normalized = graph.new_divide_node(centered, std)?;
        let scaled = graph.new_multiply_node(gamma, normalized)?;
        graph.new_add_node(scaled, beta)
    }

    fn moving_average(
        &self,
        graph: &mut Graph,
        running: NodeId,
        batch: NodeId,
    ) -> Result<NodeId, GraphError> {
        let keep = graph.new_scalar_node(self.momentum);
        let take = graph.new_scalar_node(1.0 - self.momentum);
        let old = graph.new_multiply_node(keep, running)?;
        let new = graph.new_multiply_node(take, batch)?;
        graph.new_add_node(old, new)
    }
}

impl Default for BatchNorm {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitLayer for BatchNorm {
    fn get_output_dim(&self, input_shape: &[usize]) -> Result<Vec<usize>, GraphError> {
        Ok(input_shape.to_vec())
    }

    fn get_init_params(&self, input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        let shape = Self::stat_shape(input_shape);
        Ok(Some(vec![Tensor::ones(&shape), Tensor::zeros(&shape)]))
    }

    fn get_init_state(&self, input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        let shape = Self::stat_shape(input_shape);
        Ok(Some(vec![Tensor::zeros(&shape), Tensor::ones(&shape)]))
    }

    fn get_output(
        &self,
        graph: &mut Graph,
        input: NodeId,
        binding: &LayerBinding,
        is_test: bool,
    ) -> Result<LayerOutput, GraphError> {
        let gamma = binding.param(0, "BatchNorm")?;
        let beta = binding.param(1, "BatchNorm")?;
        let running_mean = binding.state(0, "BatchNorm")?;
        let running_var = binding.state(1, "BatchNorm")?;

        if is_test {
            let output =
                self.normalize(graph, input, running_mean, running_var, gamma, beta)?;
            return Ok(output.into());
        }

        let mean = graph.new_mean_axis_node(input, 0)?;
        let centered = graph.new_subtract_node(input, mean)?;
        let squared = graph.new_square_node(centered)?;
        let var = graph.new_mean_axis_node(squared, 0)?;
        let output = self.normalize(graph, input, mean, var, gamma, beta)?;

        let new_mean = self.moving_average(graph, running_mean, mean)?;
        let new_var = self.moving_average(graph, running_var, var)?;
        Ok(LayerOutput {
            output,
            updates: vec![
                Update::new(running_mean, new_mean),
                Update::new(running_var, new_var),
            ],
        })
    }
}
