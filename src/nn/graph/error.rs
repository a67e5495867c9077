/*
 * @Date         : 2026-02-04
 * @Description  : Graph 模块的错误类型
 */

use thiserror::Error;

use crate::errors::TensorError;
use crate::nn::{NodeId, SharedId};

/// Graph 构建与求值的错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("节点{0:?}不存在")]
    NodeNotFound(NodeId),
    #[error("共享变量{0:?}不存在")]
    SharedNotFound(SharedId),
    #[error("无效操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配（{message}）：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("计算错误：{0}")]
    ComputationError(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
