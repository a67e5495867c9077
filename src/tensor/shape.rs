/*
 * @Date         : 2026-02-03
 * @Description  : 张量的形状相关操作：重塑、4维规范化、拼接、按行选取/切分
 */

use ndarray::{concatenate, ArrayD, ArrayView, Axis, IxDyn, Slice};

use super::Tensor;
use crate::errors::TensorError;

impl Tensor {
    /// 按行优先顺序重塑为新形状，元素总数必须一致
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let new_len: usize = shape.iter().product();
        if new_len != self.size() {
            return Err(TensorError::ReshapeError {
                from: self.shape().to_vec(),
                to: shape.to_vec(),
            });
        }
        let data = ArrayD::from_shape_vec(IxDyn(shape), self.to_vec()).map_err(|_| {
            TensorError::ReshapeError {
                from: self.shape().to_vec(),
                to: shape.to_vec(),
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// 保留首维（样本维），其余维度重塑为`tail`
    pub fn reshape_tail(&self, tail: &[usize]) -> Result<Self, TensorError> {
        let mut shape = vec![self.rows()];
        shape.extend_from_slice(tail);
        self.reshape(&shape)
    }

    /// 规范化为4维：不足4维的张量在右侧补上大小为1的维度，如`[n, k]` -> `[n, k, 1, 1]`；
    /// 已是4维及以上的张量原样返回
    pub fn atleast_4d(&self) -> Self {
        let mut data = self.data.clone();
        while data.ndim() < 4 {
            let axis = data.ndim();
            data.insert_axis_inplace(Axis(axis));
        }
        Self::from_array(data)
    }

    /// 展平为`ndim`维：保留前`ndim - 1`个维度，其余维度合并为最后一维。
    /// 若`ndim`不小于当前维数，原样返回
    pub fn flatten_to(&self, ndim: usize) -> Result<Self, TensorError> {
        if ndim == 0 {
            return Err(TensorError::DimensionMismatch {
                op: "flatten",
                expected: 1,
                got: 0,
            });
        }
        if ndim >= self.dimension() {
            return Ok(self.clone());
        }
        let mut shape = self.shape()[..ndim - 1].to_vec();
        shape.push(self.shape()[ndim - 1..].iter().product());
        self.reshape(&shape)
    }

    /// 沿指定轴拼接多个张量，除该轴外其余维度须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis >= first.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                ndim: first.dimension(),
            });
        }
        for t in tensors.iter().skip(1) {
            let same_rank = t.dimension() == first.dimension();
            let compatible = same_rank
                && t.shape()
                    .iter()
                    .zip(first.shape())
                    .enumerate()
                    .all(|(i, (a, b))| i == axis || a == b);
            if !compatible {
                return Err(TensorError::ShapeMismatch {
                    expected: first.shape().to_vec(),
                    got: t.shape().to_vec(),
                });
            }
        }
        let views: Vec<ArrayView<f32, IxDyn>> = tensors.iter().map(|t| t.data.view()).collect();
        let data = concatenate(Axis(axis), &views).map_err(|_| TensorError::ShapeMismatch {
            expected: first.shape().to_vec(),
            got: tensors.last().map(|t| t.shape().to_vec()).unwrap_or_default(),
        })?;
        Ok(Self::from_array(data))
    }

    /// 沿`axis`截取`[start, start + len)`这一段
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                ndim: self.dimension(),
            });
        }
        if start + len > self.shape()[axis] {
            let mut expected = self.shape().to_vec();
            expected[axis] = start + len;
            return Err(TensorError::ShapeMismatch {
                expected,
                got: self.shape().to_vec(),
            });
        }
        let view = self.data.slice_axis(
            Axis(axis),
            Slice::from(start as isize..(start + len) as isize),
        );
        Ok(Self::from_array(view.to_owned()))
    }

    /// 样本（行）数：即首维大小，标量视为1行
    pub fn rows(&self) -> usize {
        self.shape().first().copied().unwrap_or(1)
    }

    /// 按给定行索引（可重复、可乱序）选取出新的张量
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        if self.dimension() == 0 {
            return self.clone();
        }
        Self::from_array(self.data.select(Axis(0), indices))
    }

    /// 取出第`index`行，保留首维（形状为`[1, ...]`）
    pub fn row(&self, index: usize) -> Self {
        self.slice_rows(index, index + 1)
    }

    /// 取出`[start, end)`范围内的行
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        if self.dimension() == 0 {
            return self.clone();
        }
        let view = self
            .data
            .slice_axis(Axis(0), Slice::from(start as isize..end as isize));
        Self::from_array(view.to_owned())
    }

    /// 沿首维切成`num_chunks`块，各块大小至多相差1（前`rows % num_chunks`块多1行），
    /// 语义同`numpy.array_split`
    pub fn split_rows(&self, num_chunks: usize) -> Vec<Self> {
        if num_chunks == 0 {
            return Vec::new();
        }
        let rows = self.rows();
        let base = rows / num_chunks;
        let extra = rows % num_chunks;
        let mut chunks = Vec::with_capacity(num_chunks);
        let mut start = 0;
        for i in 0..num_chunks {
            let len = base + usize::from(i < extra);
            chunks.push(self.slice_rows(start, start + len));
            start += len;
        }
        chunks
    }
}
