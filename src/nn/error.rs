/*
 * @Date         : 2026-02-05
 * @Description  : Model 层面的错误类型：结构性配置错误、前置条件不满足，以及下层错误的包装
 */

use thiserror::Error;

use crate::data::DataError;
use crate::errors::TensorError;
use crate::nn::GraphError;

#[derive(Debug, Error)]
pub enum ModelError {
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓结构性错误↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    #[error("不支持的合并方式：{0}（仅支持flat_append）")]
    UnsupportedMergeMode(String),
    #[error("分支没有任何输入")]
    EmptyBranch,
    #[error("参数向量长度不符：期望{expected}，实际{got}")]
    ParamVectorLength { expected: usize, got: usize },
    #[error("参数结构不匹配：{0}")]
    ParamStructureMismatch(String),
    #[error("数据输入数量不符：网络需要{expected}个，实际提供{got}个")]
    DataInputCount { expected: usize, got: usize },
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑结构性错误↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓前置条件↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    #[error("优化器尚未build，累积量未分配")]
    OptimizerNotBuilt,
    #[error("模型尚未编译")]
    NotCompiled,
    #[error("模型尚未设置网络树")]
    TreeNotSet,
    #[error("模型参数尚未初始化")]
    ParamsNotInitialized,
    #[error("做梦模式的自由输入发生变化：编译时为{compiled:?}，本次为{got:?}")]
    DreamLayoutChanged {
        compiled: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("做梦模式至少需要一个固定输入")]
    NoFixedDreamInput,
    #[error("做梦模式有{free}个自由输入，但提供了{shapes}个形状")]
    DreamShapeCount { free: usize, shapes: usize },
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑前置条件↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    #[error("未知的超参数：{0}")]
    UnknownHyperparameter(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("序列化错误：{0}")]
    Bincode(#[from] bincode::Error),
    #[error("配置解析错误：{0}")]
    Json(#[from] serde_json::Error),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}
