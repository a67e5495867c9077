//! 数据变换函数
//!
//! 提供常用的数据预处理操作，如像素缩放、one-hot 编码、划分验证集等。

use std::collections::BTreeSet;

use super::error::DataError;
use crate::tensor::Tensor;

/// 将 0-255 的原始像素字节缩放到 [0, 1)（除以256）
///
/// # 参数
/// - `bytes`: 原始像素
/// - `shape`: 目标形状，元素数须与`bytes`长度一致
pub fn scale_pixels(bytes: &[u8], shape: &[usize]) -> Result<Tensor, DataError> {
    let data = bytes.iter().map(|&b| f32::from(b) / 256.0).collect::<Vec<_>>();
    Ok(Tensor::try_new(&data, shape)?)
}

/// 将类别索引转换为 one-hot 编码，宽度为出现过的不同类别数
///
/// # 返回
/// one-hot 编码 Tensor，形状 [N, 类别数]
///
/// # 示例
/// ```ignore
/// let one_hot = vec_to_onehot(&[0, 2, 1])?;
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn vec_to_onehot(labels: &[u8]) -> Result<Tensor, DataError> {
    let num_classes = labels.iter().collect::<BTreeSet<_>>().len();
    let n = labels.len();
    let mut data = vec![0.0; n * num_classes];
    for (i, &label) in labels.iter().enumerate() {
        let class_idx = usize::from(label);
        if class_idx >= num_classes {
            return Err(DataError::IndexOutOfBounds {
                index: class_idx,
                len: num_classes,
            });
        }
        data[i * num_classes + class_idx] = 1.0;
    }
    Ok(Tensor::try_new(&data, &[n, num_classes])?)
}

/// 从训练集末尾切出`val_size`行作为验证集
///
/// # 返回
/// `(x_train, y_train, x_val, y_val)`
pub fn get_val_set(
    x: &Tensor,
    y: &Tensor,
    val_size: usize,
) -> Result<(Tensor, Tensor, Tensor, Tensor), DataError> {
    let rows = x.rows();
    if y.rows() != rows {
        return Err(DataError::ShapeMismatch {
            expected: vec![rows],
            got: vec![y.rows()],
        });
    }
    if val_size > rows {
        return Err(DataError::IndexOutOfBounds {
            index: val_size,
            len: rows,
        });
    }
    let split = rows - val_size;
    Ok((
        x.slice_rows(0, split),
        y.slice_rows(0, split),
        x.slice_rows(split, rows),
        y.slice_rows(split, rows),
    ))
}
