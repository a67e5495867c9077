use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("数据长度{data_len}与形状{shape:?}不符")]
    DataLengthMismatch { data_len: usize, shape: Vec<usize> },
    #[error("形状{from:?}无法重塑为{to:?}")]
    ReshapeError { from: Vec<usize>, to: Vec<usize> },
    // 张量二元运算
    #[error("形状无法广播：第一个张量的形状为{left:?}，第二个张量的形状为{right:?}")]
    BroadcastError { left: Vec<usize>, right: Vec<usize> },
    #[error("形状不一致：期望{expected:?}，实际{got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("{op}要求{expected}维张量，但得到的是{got}维")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("轴{axis}超出了{ndim}维张量的范围")]
    AxisOutOfRange { axis: usize, ndim: usize },
    #[error("张量列表为空")]
    EmptyList,
}
