/*
 * @Date         : 2026-02-03
 * @Description  : 张量的逐元素四则运算。
 *                 1. 张量与纯数：对每个元素运算，形状不变；
 *                 2. 张量与张量：支持 NumPy 风格的广播（broadcasting），形状无法广播时`try_*`返回错误，
 *                    而运算符版本直接panic。
 */

use std::ops::{Add, Div, Mul, Neg, Sub};

use ndarray::{IxDyn, Zip};

use crate::errors::TensorError;
use crate::tensor::Tensor;

impl Tensor {
    /// 计算两个形状按 NumPy 规则广播后的形状（从尾部维度开始对齐）
    pub fn broadcast_shape(left: &[usize], right: &[usize]) -> Result<Vec<usize>, TensorError> {
        let ndim = left.len().max(right.len());
        let mut shape = Vec::with_capacity(ndim);
        for i in 0..ndim {
            let l = (i + left.len()).checked_sub(ndim).map_or(1, |j| left[j]);
            let r = (i + right.len()).checked_sub(ndim).map_or(1, |j| right[j]);
            let dim = match (l, r) {
                (a, b) if a == b => a,
                (1, b) => b,
                (a, 1) => a,
                _ => {
                    return Err(TensorError::BroadcastError {
                        left: left.to_vec(),
                        right: right.to_vec(),
                    })
                }
            };
            shape.push(dim);
        }
        Ok(shape)
    }

    /// 将本张量广播到指定形状
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let view = self
            .data
            .broadcast(IxDyn(shape))
            .ok_or_else(|| TensorError::BroadcastError {
                left: self.shape().to_vec(),
                right: shape.to_vec(),
            })?;
        Ok(Self::from_array(view.to_owned()))
    }

    /// 广播后逐元素合并两个张量
    pub fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Result<Self, TensorError> {
        let shape = Self::broadcast_shape(self.shape(), other.shape())?;
        let err = || TensorError::BroadcastError {
            left: self.shape().to_vec(),
            right: other.shape().to_vec(),
        };
        let left = self.data.broadcast(IxDyn(&shape)).ok_or_else(err)?;
        let right = other.data.broadcast(IxDyn(&shape)).ok_or_else(err)?;
        let data = Zip::from(&left).and(&right).map_collect(|&a, &b| f(a, b));
        Ok(Self::from_array(data))
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn try_div(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a / b)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $try_method:ident, $op:tt) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量与张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                self.$try_method(rhs).unwrap_or_else(|e| panic!("{e}"))
            }
        }
        impl $trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                (&self).$method(&rhs)
            }
        }
        impl $trait<&Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                (&self).$method(rhs)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量与张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓张量与纯数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f32) -> Tensor {
                self.map(|a| a $op rhs)
            }
        }
        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f32) -> Tensor {
                self.map(|a| a $op rhs)
            }
        }
        impl $trait<&Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                rhs.map(|b| self $op b)
            }
        }
        impl $trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, rhs: Tensor) -> Tensor {
                rhs.map(|b| self $op b)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑张量与纯数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}

impl_binary_op!(Add, add, try_add, +);
impl_binary_op!(Sub, sub, try_sub, -);
impl_binary_op!(Mul, mul, try_mul, *);
impl_binary_op!(Div, div, try_div, /);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|a| -a)
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|a| -a)
    }
}
