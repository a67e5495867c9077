/*
 * @Date         : 2026-02-05
 * @Description  : FullyConnected (全连接) 层
 */

use serde::{Deserialize, Serialize};

use super::{features_of, LayerBinding, LayerOutput, TraitLayer};
use crate::nn::initializers::Init;
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;

/// FullyConnected (全连接) 层：`output = flatten(x) @ W + b`
///
/// # 输入/输出形状
/// - 输入：`[n, c, h, w]`（先展平为`[n, c*h*w]`）
/// - 输出：`[n, units, 1, 1]`
///
/// # 参数
/// - `W`：`[c*h*w, units]`，默认 Glorot 均匀分布初始化
/// - `b`：`[1, units]`，零初始化
///
/// 不指定`units`时，该层作为输出层由 Model 按标签形状自动确定宽度。
///
/// # 使用示例
/// ```ignore
/// let hidden = FullyConnected::new(Some(128));
/// let output = FullyConnected::new(None); // 宽度随标签
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullyConnected {
    units: Option<usize>,
    /// 宽度是否由标签形状决定
    auto_units: bool,
    init: Init,
}

impl FullyConnected {
    pub fn new(units: Option<usize>) -> Self {
        Self {
            units,
            auto_units: units.is_none(),
            init: Init::GlorotUniform,
        }
    }

    /// 更换权重的初始化方式
    pub fn init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    pub fn units(&self) -> Option<usize> {
        self.units
    }

    fn resolved_units(&self) -> Result<usize, GraphError> {
        self.units.ok_or_else(|| {
            GraphError::InvalidOperation(
                "FullyConnected层的宽度尚未确定（既未指定，也未经标签形状推断）".to_string(),
            )
        })
    }
}

impl TraitLayer for FullyConnected {
    fn get_output_dim(&self, input_shape: &[usize]) -> Result<Vec<usize>, GraphError> {
        let rows = input_shape.first().copied().unwrap_or(1);
        Ok(vec![rows, self.resolved_units()?, 1, 1])
    }

    fn get_init_params(&self, input_shape: &[usize]) -> Result<Option<Vec<Tensor>>, GraphError> {
        let units = self.resolved_units()?;
        let in_features = features_of(input_shape);
        let weights = self.init.generate(&[in_features, units]);
        let bias = Tensor::zeros(&[1, units]);
        Ok(Some(vec![weights, bias]))
    }

    fn get_output(
        &self,
        graph: &mut Graph,
        input: NodeId,
        binding: &LayerBinding,
        _is_test: bool,
    ) -> Result<LayerOutput, GraphError> {
        let units = self.resolved_units()?;
        let weights = binding.param(0, "FullyConnected")?;
        let bias = binding.param(1, "FullyConnected")?;

        let flat = graph.new_flatten_node(input, 2)?;
        let product = graph.new_mat_mul_node(flat, weights)?;
        let output = graph.new_add_node(product, bias)?;
        Ok(graph.new_reshape_node(output, &[units, 1, 1])?.into())
    }

    fn mods_io_dim(&self) -> bool {
        self.auto_units
    }

    fn set_final_output_shape(&mut self, shape: &[usize]) {
        self.units = Some(features_of(shape));
    }
}
