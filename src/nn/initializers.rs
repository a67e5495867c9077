/*
 * @Date         : 2026-02-05
 * @Description  : 参数初始化方式。层内以`Init`枚举保存（可序列化），
 *                 同时提供同名的自由函数，可直接作为做梦模式的输入初始化器传入。
 */

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// 参数初始化策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// [min, max]上的均匀分布
    Uniform { min: f32, max: f32 },
    /// Glorot/Xavier 均匀分布：`U(-s, s)`，`s = sqrt(6 / (fan_in + fan_out))`
    GlorotUniform,
}

impl Init {
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(shape, *v),
            Self::Zeros => zeros(shape),
            Self::Ones => ones(shape),
            Self::Normal { mean, std } => Tensor::normal(*mean, *std, shape),
            Self::Uniform { min, max } => Tensor::uniform(*min, *max, shape),
            Self::GlorotUniform => glorot_uniform(shape),
        }
    }
}

pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape)
}

pub fn ones(shape: &[usize]) -> Tensor {
    Tensor::ones(shape)
}

/// 正态分布 N(0, 0.05²)
pub fn normal(shape: &[usize]) -> Tensor {
    Tensor::normal(0.0, 0.05, shape)
}

/// [-0.05, 0.05]上的均匀分布
pub fn uniform(shape: &[usize]) -> Tensor {
    Tensor::uniform(-0.05, 0.05, shape)
}

/// `fan_in`取首维，`fan_out`取其余维度之积
pub fn glorot_uniform(shape: &[usize]) -> Tensor {
    let fan_in = shape.first().copied().unwrap_or(1);
    let fan_out = shape.iter().skip(1).product::<usize>().max(1);
    let scale = (6.0 / (fan_in + fan_out) as f32).sqrt();
    Tensor::uniform(-scale, scale, shape)
}
