/*
 * @Date         : 2026-02-03
 * @Description  : 张量的归约与矩阵运算：求和/均值（整体或沿轴）、广播梯度的反向归约、矩阵乘、
 *                 沿轴1的softmax、逐行argmax
 */

use ndarray::{Axis, Ix2};

use super::Tensor;
use crate::errors::TensorError;

impl Tensor {
    /// 所有元素求和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值（空张量返回0）
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            return 0.0;
        }
        self.sum() / self.size() as f32
    }

    fn check_axis(&self, axis: usize) -> Result<(), TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                ndim: self.dimension(),
            });
        }
        Ok(())
    }

    /// 沿指定轴求和，并保留该轴（大小变为1）
    pub fn sum_axis_keep(&self, axis: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let data = self.data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
        Ok(Self::from_array(data))
    }

    /// 沿指定轴求均值，并保留该轴（大小变为1）
    pub fn mean_axis_keep(&self, axis: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let len = self.shape()[axis].max(1) as f32;
        Ok(self.sum_axis_keep(axis)? / len)
    }

    /// 将（广播后得到的）张量求和归约回`shape`：多出的前导维度直接求和，
    /// 目标为1而当前不为1的维度沿该轴求和并保留
    pub fn sum_to_shape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let mut data = self.data.clone();
        while data.ndim() > shape.len() {
            data = data.sum_axis(Axis(0));
        }
        if data.ndim() != shape.len() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.to_vec(),
                got: self.shape().to_vec(),
            });
        }
        for (axis, &dim) in shape.iter().enumerate() {
            if dim == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        if data.shape() != shape {
            return Err(TensorError::ShapeMismatch {
                expected: shape.to_vec(),
                got: self.shape().to_vec(),
            });
        }
        Ok(Self::from_array(data))
    }

    fn as_matrix(&self, op: &'static str) -> Result<ndarray::ArrayView2<'_, f32>, TensorError> {
        self.data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| TensorError::DimensionMismatch {
                op,
                expected: 2,
                got: self.dimension(),
            })
    }

    /// 2维矩阵乘法：`[m, k] @ [k, n] -> [m, n]`
    pub fn matmul(&self, other: &Self) -> Result<Self, TensorError> {
        let a = self.as_matrix("matmul")?;
        let b = other.as_matrix("matmul")?;
        if a.ncols() != b.nrows() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![a.ncols(), b.ncols()],
                got: other.shape().to_vec(),
            });
        }
        Ok(Self::from_array(a.dot(&b).into_dyn()))
    }

    /// 2维矩阵转置
    pub fn transpose(&self) -> Result<Self, TensorError> {
        let a = self.as_matrix("transpose")?;
        Ok(Self::from_array(a.t().to_owned().into_dyn()))
    }

    /// 沿轴1（特征/类别维）做数值稳定的softmax，其余轴各自独立
    pub fn softmax_axis1(&self) -> Result<Self, TensorError> {
        self.check_axis(1)?;
        let mut data = self.data.clone();
        for mut lane in data.lanes_mut(Axis(1)) {
            let max = lane.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            lane.mapv_inplace(|v| (v - max).exp());
            let sum = lane.sum();
            lane.mapv_inplace(|v| v / sum);
        }
        Ok(Self::from_array(data))
    }

    /// 将张量视作`[rows, rest]`，返回每行最大元素的下标
    pub fn argmax_rows(&self) -> Vec<usize> {
        let rows = self.rows().max(1);
        let width = self.size() / rows;
        if width == 0 {
            return vec![0; rows];
        }
        self.to_vec()
            .chunks(width)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
                        if v > best {
                            (i, v)
                        } else {
                            (best_i, best)
                        }
                    })
                    .0
            })
            .collect()
    }
}
