/*
 * @Date         : 2026-02-05
 * @Description  : 损失函数：给定预测与标签的表达式，构建标量损失表达式。
 *                 训练损失在此基础上附加（可选的）L2正则项，测试损失不含正则项。
 */

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::nn::{Graph, GraphError, NodeId};

/// 预测值截断到`[EPSILON, 1 - EPSILON]`，避免`ln(0)`
const EPSILON: f32 = 1e-7;

#[enum_dispatch]
pub trait TraitLoss {
    /// 不含正则项的损失
    fn get_loss(&self, graph: &mut Graph, y_hat: NodeId, y: NodeId) -> Result<NodeId, GraphError>;

    /// L2正则系数，0表示不正则化
    fn l2(&self) -> f32;

    /// 训练损失：`loss + l2 * Σ sum(p²)`，`p`取遍所有可训练参数
    fn get_train_loss(
        &self,
        graph: &mut Graph,
        y_hat: NodeId,
        y: NodeId,
        params: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let loss = self.get_loss(graph, y_hat, y)?;
        let l2 = self.l2();
        if l2 == 0.0 || params.is_empty() {
            return Ok(loss);
        }
        let mut penalty = None;
        for param in params {
            let squared = graph.new_square_node(*param)?;
            let sum = graph.new_sum_node(squared)?;
            penalty = Some(match penalty {
                Some(acc) => graph.new_add_node(acc, sum)?,
                None => sum,
            });
        }
        match penalty {
            Some(penalty) => {
                let weight = graph.new_scalar_node(l2);
                let weighted = graph.new_multiply_node(weight, penalty)?;
                graph.new_add_node(loss, weighted)
            }
            None => Ok(loss),
        }
    }
}

#[enum_dispatch(TraitLoss)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loss {
    Crossentropy,
    MeanSquaredError,
}

impl Default for Loss {
    fn default() -> Self {
        Crossentropy::default().into()
    }
}

/// 多分类交叉熵：`-mean_n(Σ_k y * ln(clip(y_hat)))`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Crossentropy {
    pub l2: f32,
}

impl Crossentropy {
    pub const fn new(l2: f32) -> Self {
        Self { l2 }
    }
}

impl TraitLoss for Crossentropy {
    fn get_loss(&self, graph: &mut Graph, y_hat: NodeId, y: NodeId) -> Result<NodeId, GraphError> {
        let y_hat = graph.new_flatten_node(y_hat, 2)?;
        let y = graph.new_flatten_node(y, 2)?;
        let clipped = graph.new_clip_node(y_hat, EPSILON, 1.0 - EPSILON)?;
        let log = graph.new_ln_node(clipped)?;
        let weighted = graph.new_multiply_node(y, log)?;
        let per_example = graph.new_sum_axis_node(weighted, 1)?;
        let mean = graph.new_mean_node(per_example)?;
        graph.new_negate_node(mean)
    }

    fn l2(&self) -> f32 {
        self.l2
    }
}

/// 均方误差：`mean((y_hat - y)²)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanSquaredError {
    pub l2: f32,
}

impl MeanSquaredError {
    pub const fn new(l2: f32) -> Self {
        Self { l2 }
    }
}

impl TraitLoss for MeanSquaredError {
    fn get_loss(&self, graph: &mut Graph, y_hat: NodeId, y: NodeId) -> Result<NodeId, GraphError> {
        let diff = graph.new_subtract_node(y_hat, y)?;
        let squared = graph.new_square_node(diff)?;
        graph.new_mean_node(squared)
    }

    fn l2(&self) -> f32 {
        self.l2
    }
}
