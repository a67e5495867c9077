/*
 * @Date         : 2026-02-04
 * @Description  : 共享变量仓库：集中持有所有“可变数组”（参数、层状态、优化器累积量、做梦输入），
 *                 以稳定的`SharedId`寻址。计算图中的共享节点只记录id，求值时才读取当前值，
 *                 因此原地写入新值后，已编译的函数无需重建即可看到新值。
 */

use serde::{Deserialize, Serialize};

use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 共享变量的稳定id（注册后永不改变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SharedId(pub(crate) usize);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedStore {
    values: Vec<Tensor>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个新的共享变量并返回其id
    pub fn register(&mut self, value: Tensor) -> SharedId {
        self.values.push(value);
        SharedId(self.values.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, id: SharedId) -> Result<&Tensor, GraphError> {
        self.values.get(id.0).ok_or(GraphError::SharedNotFound(id))
    }

    /// 原地写入新值：形状必须与注册时一致
    pub fn set_value(&mut self, id: SharedId, value: &Tensor) -> Result<(), GraphError> {
        let slot = self
            .values
            .get_mut(id.0)
            .ok_or(GraphError::SharedNotFound(id))?;
        slot.assign(value).map_err(|_| GraphError::ShapeMismatch {
            expected: slot.shape().to_vec(),
            got: value.shape().to_vec(),
            message: format!("共享变量{id:?}的形状在注册后不可改变"),
        })
    }
}
