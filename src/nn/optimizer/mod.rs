/*
 * @Date         : 2026-02-06
 * @Description  : 优化器模块：声明式的参数更新规则
 *
 * 核心特性：
 * - 优化器不直接改写参数，而是为每个参数（及其累积量）返回`(目标, 新值表达式)`形式的`Update`；
 * - 带记忆的优化器须先`build`分配累积量（存放在 Model 的`SharedStore`中），否则`get_updates`报错；
 * - 超参数按名字读写，`build`时登记为仓库中的标量共享变量，更新规则通过共享节点读取它们；
 *   修改后经`sync_hyperparameters`写回仓库即对已编译的函数生效，无需重新编译。
 */

mod rmsprop;
mod sgd;

pub use rmsprop::RMSprop;
pub use sgd::SGD;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::nn::{Graph, ModelError, NodeId, SharedId, SharedStore, Update};
use crate::tensor::Tensor;

/// 优化器 trait
///
/// # 使用示例
/// ```ignore
/// let mut optimizer: Optimizer = RMSprop::new(0.001, 0.99, 1e-8).into();
/// optimizer.build(&mut store, &param_ids)?;
/// let updates = optimizer.get_updates(&mut graph, &param_nodes, loss)?;
/// let step = Function::new(&graph, &inputs, &[loss], &updates)?;
/// ```
#[enum_dispatch]
pub trait TraitOptimizer {
    /// 为给定参数分配（或清零已有的）累积量，并登记（或改写已登记的）超参数
    fn build(&mut self, store: &mut SharedStore, params: &[SharedId]) -> Result<(), ModelError>;

    /// 返回更新列表：带记忆时每个参数对应“累积量、参数”两条，否则一条，顺序与`params`一致
    fn get_updates(
        &self,
        graph: &mut Graph,
        params: &[NodeId],
        loss: NodeId,
    ) -> Result<Vec<Update>, ModelError>;

    /// 累积量清零
    fn reset(&mut self, store: &mut SharedStore) -> Result<(), ModelError>;

    fn hyperparameter(&self, name: &str) -> Result<f32, ModelError>;

    /// 只改优化器自身持有的值，写回仓库见`sync_hyperparameters`
    fn set_hyperparameter(&mut self, name: &str, value: f32) -> Result<(), ModelError>;

    /// 把当前超参数写入仓库中已登记的槽位；尚未`build`时什么也不做
    fn sync_hyperparameters(&self, store: &mut SharedStore) -> Result<(), ModelError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}

#[enum_dispatch(TraitOptimizer)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Optimizer {
    SGD,
    RMSprop,
}

/// 为`loss`对每个参数的梯度建节点
pub(crate) fn gradients(
    graph: &mut Graph,
    params: &[NodeId],
    loss: NodeId,
) -> Result<Vec<NodeId>, ModelError> {
    params
        .iter()
        .map(|param| graph.new_grad_node(loss, *param).map_err(ModelError::from))
        .collect()
}

/// 登记超参数槽位；已有且仍为标量的槽位原地改写，不再重复注册
pub(crate) fn store_hyperparameters(
    store: &mut SharedStore,
    slots: &mut Option<Vec<SharedId>>,
    values: &[f32],
) -> Result<(), ModelError> {
    if let Some(ids) = slots {
        let reusable = ids.len() == values.len()
            && ids
                .iter()
                .all(|id| store.get(*id).is_ok_and(|value| value.is_scalar()));
        if reusable {
            return write_hyperparameters(store, Some(ids.as_slice()), values);
        }
    }
    *slots = Some(
        values
            .iter()
            .map(|value| store.register(Tensor::scalar(*value)))
            .collect(),
    );
    Ok(())
}

pub(crate) fn write_hyperparameters(
    store: &mut SharedStore,
    slots: Option<&[SharedId]>,
    values: &[f32],
) -> Result<(), ModelError> {
    for (id, value) in slots.into_iter().flatten().zip(values) {
        let shape = store.get(*id)?.shape().to_vec();
        store.set_value(*id, &Tensor::scalar(*value).reshape(&shape)?)?;
    }
    Ok(())
}

/// 超参数节点：已登记时为共享节点，否则退化为常量
pub(crate) fn hyperparameter_nodes(
    graph: &mut Graph,
    slots: Option<&[SharedId]>,
    values: &[f32],
) -> Vec<NodeId> {
    match slots {
        Some(ids) => ids.iter().map(|id| graph.new_shared_node(*id)).collect(),
        None => values
            .iter()
            .map(|value| graph.new_scalar_node(*value))
            .collect(),
    }
}

#[cfg(test)]
mod tests;
