/*
 * @Date         : 2026-02-04
 * @Description  : 计算图节点：`NodeId`与各类运算（Op）的定义
 */

use serde::{Deserialize, Serialize};

use crate::nn::SharedId;
use crate::tensor::Tensor;

/// 节点在图中的id（即其创建顺序，因此父节点的id总是小于子节点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// 一条“副作用更新”：求值后把`value`的结果写回`target`（必须是共享节点）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub target: NodeId,
    pub value: NodeId,
}

impl Update {
    pub const fn new(target: NodeId, value: NodeId) -> Self {
        Self { target, value }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Op {
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓叶子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 占位输入，每次调用时由外部按槽位填值
    Input { slot: usize },
    /// 读取共享仓库中的变量
    Shared(SharedId),
    Constant(Tensor),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑叶子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓逐元素（可广播）↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Div(NodeId, NodeId),
    Neg(NodeId),
    Exp(NodeId),
    Log(NodeId),
    Sqrt(NodeId),
    Square(NodeId),
    Tanh(NodeId),
    Sigmoid(NodeId),
    Relu(NodeId),
    Clip { x: NodeId, min: f32, max: f32 },
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑逐元素（可广播）↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓形状/矩阵↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    MatMul(NodeId, NodeId),
    /// 保留首维，其余重塑为`tail`
    ReshapeTail { x: NodeId, tail: Vec<usize> },
    Flatten { x: NodeId, ndim: usize },
    Concat { inputs: Vec<NodeId>, axis: usize },
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑形状/矩阵↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓归约↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Sum(NodeId),
    Mean(NodeId),
    SumAxis { x: NodeId, axis: usize },
    MeanAxis { x: NodeId, axis: usize },
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑归约↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    Softmax(NodeId),
    /// 反向dropout：训练时以`rate`概率置零，其余元素放大`1 / (1 - rate)`
    Dropout { x: NodeId, rate: f32 },

    // 以下不可求导
    CategoricalAccuracy { pred: NodeId, target: NodeId },
    BinaryAccuracy { pred: NodeId, target: NodeId, threshold: f32 },
    /// `cost`（标量）对`wrt`的梯度，求值时按需做一次反向传播
    Grad { cost: NodeId, wrt: NodeId },
}

impl Op {
    pub(crate) fn parents(&self) -> Vec<NodeId> {
        match self {
            Self::Input { .. } | Self::Shared(_) | Self::Constant(_) => vec![],
            Self::Add(a, b)
            | Self::Sub(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::MatMul(a, b) => vec![*a, *b],
            Self::Neg(x)
            | Self::Exp(x)
            | Self::Log(x)
            | Self::Sqrt(x)
            | Self::Square(x)
            | Self::Tanh(x)
            | Self::Sigmoid(x)
            | Self::Relu(x)
            | Self::Sum(x)
            | Self::Mean(x)
            | Self::Softmax(x) => vec![*x],
            Self::Clip { x, .. }
            | Self::ReshapeTail { x, .. }
            | Self::Flatten { x, .. }
            | Self::SumAxis { x, .. }
            | Self::MeanAxis { x, .. }
            | Self::Dropout { x, .. } => vec![*x],
            Self::Concat { inputs, .. } => inputs.clone(),
            Self::CategoricalAccuracy { pred, target } | Self::BinaryAccuracy { pred, target, .. } => {
                vec![*pred, *target]
            }
            Self::Grad { cost, wrt } => vec![*cost, *wrt],
        }
    }

    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "Input",
            Self::Shared(_) => "Shared",
            Self::Constant(_) => "Constant",
            Self::Add(..) => "Add",
            Self::Sub(..) => "Sub",
            Self::Mul(..) => "Mul",
            Self::Div(..) => "Div",
            Self::Neg(_) => "Neg",
            Self::Exp(_) => "Exp",
            Self::Log(_) => "Log",
            Self::Sqrt(_) => "Sqrt",
            Self::Square(_) => "Square",
            Self::Tanh(_) => "Tanh",
            Self::Sigmoid(_) => "Sigmoid",
            Self::Relu(_) => "Relu",
            Self::Clip { .. } => "Clip",
            Self::MatMul(..) => "MatMul",
            Self::ReshapeTail { .. } => "Reshape",
            Self::Flatten { .. } => "Flatten",
            Self::Concat { .. } => "Concat",
            Self::Sum(_) => "Sum",
            Self::Mean(_) => "Mean",
            Self::SumAxis { .. } => "SumAxis",
            Self::MeanAxis { .. } => "MeanAxis",
            Self::Softmax(_) => "Softmax",
            Self::Dropout { .. } => "Dropout",
            Self::CategoricalAccuracy { .. } => "CategoricalAccuracy",
            Self::BinaryAccuracy { .. } => "BinaryAccuracy",
            Self::Grad { .. } => "Grad",
        }
    }
}
