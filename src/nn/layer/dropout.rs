/*
 * @Date         : 2026-02-05
 * @Description  : Dropout 层：训练时随机丢弃，推理时恒等
 */

use serde::{Deserialize, Serialize};

use super::{LayerBinding, LayerOutput, TraitLayer};
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    pub const fn new(rate: f32) -> Self {
        Self { rate }
    }

    pub const fn rate(&self) -> f32 {
        self.rate
    }
}

impl TraitLayer for Dropout {
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
        is_test: bool,
    ) -> Result<LayerOutput, GraphError> {
        if is_test || self.rate == 0.0 {
            return Ok(input.into());
        }
        Ok(graph.new_dropout_node(input, self.rate)?.into())
    }
}
