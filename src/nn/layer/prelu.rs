/*
 * @Date         : 2026-02-05
 * @Description  : PReLU 层：负半轴斜率可学习的ReLU
 */

use serde::{Deserialize, Serialize};

use super::{LayerBinding, LayerOutput, TraitLayer};
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

/// `f(x) = max(0, x) + alpha * min(0, x)`，`alpha`逐元素可学习
///
/// `alpha`形状为`[1, c, h, w]`（即不含样本维的输入形状），初值0.25
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PRelu {
    alpha_init: f32,
}

impl PRelu {
    pub const fn new() -> Self {
        Self { alpha_init: 0.25 }
    }

    pub const fn with_alpha(alpha_init: f32) -> Self {
        Self { alpha_init }
    }
}

impl Default for PRelu {
    fn default() -> Self {
        Self::new()
    }
}

impl TraitLayer for PRelu {
    fn get_output_dim(&self, input_shape: &[usize]) -> Result<Vec<usize>, GraphError> {
        Ok(input_shape.to_vec())
    }

    fn get_init_params(&self, input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        let mut shape = input_shape.to_vec();
        if let Some(rows) = shape.first_mut() {
            *rows = 1;
        }
        Ok(Some(vec![Tensor::full(&shape, self.alpha_init)]))
    }

    fn get_output(
        &self,
        graph: &mut Graph,
        input: NodeId,
        binding: &LayerBinding,
        _is_test: bool,
    ) -> Result<LayerOutput, GraphError> {
        let alpha = binding.param(0, "PRelu")?;
        let positive = graph.new_relu_node(input)?;
        let negated = graph.new_negate_node(input)?;
        let negative = graph.new_relu_node(negated)?;
        let scaled = graph.new_multiply_node(alpha, negative)?;
        Ok(graph.new_subtract_node(positive, scaled)?.into())
    }
}
