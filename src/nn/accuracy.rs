/*
 * @Date         : 2026-02-05
 * @Description  : 准确率：构建取值在[0, 1]的标量表达式（不可求导）
 */

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::nn::{Graph, GraphError, NodeId};

#[enum_dispatch]
pub trait TraitAccuracy {
    fn get_accuracy(
        &self,
        graph: &mut Graph,
        y_hat: NodeId,
        y: NodeId,
    ) -> Result<NodeId, GraphError>;
}

#[enum_dispatch(TraitAccuracy)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accuracy {
    Categorical,
    Binary,
}

impl Default for Accuracy {
    fn default() -> Self {
        Categorical.into()
    }
}

/// 逐样本比较预测与标签的argmax
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categorical;

impl TraitAccuracy for Categorical {
    fn get_accuracy(
        &self,
        graph: &mut Graph,
        y_hat: NodeId,
        y: NodeId,
    ) -> Result<NodeId, GraphError> {
        let y_hat = graph.new_flatten_node(y_hat, 2)?;
        let y = graph.new_flatten_node(y, 2)?;
        graph.new_categorical_accuracy_node(y_hat, y)
    }
}

/// 预测按阈值二值化后逐元素比较
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub threshold: f32,
}

impl Default for Binary {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl TraitAccuracy for Binary {
    fn get_accuracy(
        &self,
        graph: &mut Graph,
        y_hat: NodeId,
        y: NodeId,
    ) -> Result<NodeId, GraphError> {
        graph.new_binary_accuracy_node(y_hat, y, self.threshold)
    }
}
