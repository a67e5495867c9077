//! 分批
//!
//! 把多个输入数组与一个标签数组切成若干批：
//! - 批数为`ceil(N / batch_size)`；
//! - 各批大小至多相差1（近似均分，而非“定长 + 余数”）；
//! - 打乱时所有数组共用同一个排列，保持输入与标签逐行对应。

use rand::Rng;
use rand::seq::SliceRandom;

use super::error::DataError;
use crate::tensor::Tensor;

/// 输入批次的组织方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchLayout {
    /// `x[批次][输入]`
    #[default]
    Nested,
    /// `x[输入][批次]`
    Flat,
}

/// 分批结果
#[derive(Debug, Clone)]
pub struct Batches {
    /// 按`BatchLayout`组织的输入批次
    pub x: Vec<Vec<Tensor>>,
    pub y: Vec<Tensor>,
    pub num_batches: usize,
}

impl Batches {
    /// 第`index`批的各个输入（仅对`Nested`布局有意义）
    pub fn inputs(&self, index: usize) -> &[Tensor] {
        self.x.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}

/// 批数：`ceil(rows / batch_size)`
pub fn num_batches(rows: usize, batch_size: usize) -> Result<usize, DataError> {
    if batch_size == 0 {
        return Err(DataError::InvalidBatchSize(batch_size));
    }
    Ok(rows.div_ceil(batch_size))
}

/// 将`x`（各输入）与`y`规范化为4维后分批
///
/// # 参数
/// - `shuffle`: 是否先以同一排列打乱所有数组
/// - `layout`: 返回的输入批次按“批次优先”还是“输入优先”组织
/// - `rng`: 打乱所用的随机数生成器
pub fn make_batches<R: Rng + ?Sized>(
    x: &[Tensor],
    y: &Tensor,
    batch_size: usize,
    shuffle: bool,
    layout: BatchLayout,
    rng: &mut R,
) -> Result<Batches, DataError> {
    let y = y.atleast_4d();
    let rows = y.rows();
    let mut x = x.iter().map(Tensor::atleast_4d).collect::<Vec<_>>();
    for input in &x {
        if input.rows() != rows {
            return Err(DataError::ShapeMismatch {
                expected: vec![rows],
                got: vec![input.rows()],
            });
        }
    }
    let num_batches = num_batches(rows, batch_size)?;

    let y = if shuffle {
        let mut permutation = (0..rows).collect::<Vec<_>>();
        permutation.shuffle(rng);
        x = x.iter().map(|input| input.select_rows(&permutation)).collect();
        y.select_rows(&permutation)
    } else {
        y
    };

    let per_input = x
        .iter()
        .map(|input| input.split_rows(num_batches))
        .collect::<Vec<_>>();
    let x_batches = match layout {
        BatchLayout::Flat => per_input,
        BatchLayout::Nested => (0..num_batches)
            .map(|batch| per_input.iter().map(|chunks| chunks[batch].clone()).collect())
            .collect(),
    };

    Ok(Batches {
        x: x_batches,
        y: y.split_rows(num_batches),
        num_batches,
    })
}
