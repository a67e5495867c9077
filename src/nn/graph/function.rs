/*
 * @Date         : 2026-02-04
 * @Description  : 编译后的函数：给定占位输入、输出节点与更新列表。
 *                 每次调用先基于同一份共享变量快照算出全部输出与全部新值，
 *                 再统一原地写回共享仓库（因此更新之间互不可见）。
 */

use std::collections::HashSet;

use super::eval::Evaluation;
use super::{Graph, GraphError, NodeId, Update};
use crate::nn::{SharedId, SharedStore};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct Function {
    /// 各实参对应的输入槽位
    slots: Vec<usize>,
    outputs: Vec<NodeId>,
    updates: Vec<(SharedId, NodeId)>,
}

impl Function {
    pub fn new(
        graph: &Graph,
        inputs: &[NodeId],
        outputs: &[NodeId],
        updates: &[Update],
    ) -> Result<Self, GraphError> {
        let slots = inputs
            .iter()
            .map(|input| graph.input_slot(*input))
            .collect::<Result<Vec<_>, _>>()?;
        for output in outputs {
            graph.op(*output)?;
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(updates.len());
        for update in updates {
            let shared = graph.shared_of(update.target)?;
            graph.op(update.value)?;
            if !seen.insert(shared) {
                return Err(GraphError::InvalidOperation(format!(
                    "共享变量{shared:?}在同一函数中被更新了多次"
                )));
            }
            resolved.push((shared, update.value));
        }

        Ok(Self {
            slots,
            outputs: outputs.to_vec(),
            updates: resolved,
        })
    }

    pub fn outputs_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }

    /// 求值并执行全部更新，返回各输出的值
    pub fn call(
        &self,
        graph: &Graph,
        store: &mut SharedStore,
        args: &[&Tensor],
    ) -> Result<Vec<Tensor>, GraphError> {
        let (outputs, new_values) = self.evaluate(graph, store, args)?;
        // 先整体校验形状，避免只写入了一部分
        for (shared, value) in &new_values {
            let current = store.get(*shared)?;
            if current.shape() != value.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: current.shape().to_vec(),
                    got: value.shape().to_vec(),
                    message: format!("更新共享变量{shared:?}"),
                });
            }
        }
        for (shared, value) in &new_values {
            store.set_value(*shared, value)?;
        }
        Ok(outputs)
    }

    /// 只求值、不更新（函数本身不得带有更新）
    pub fn call_pure(
        &self,
        graph: &Graph,
        store: &SharedStore,
        args: &[&Tensor],
    ) -> Result<Vec<Tensor>, GraphError> {
        if self.has_updates() {
            return Err(GraphError::InvalidOperation(
                "带有更新的函数须通过`call`调用".to_string(),
            ));
        }
        Ok(self.evaluate(graph, store, args)?.0)
    }

    fn evaluate(
        &self,
        graph: &Graph,
        store: &SharedStore,
        args: &[&Tensor],
    ) -> Result<(Vec<Tensor>, Vec<(SharedId, Tensor)>), GraphError> {
        if args.len() != self.slots.len() {
            return Err(GraphError::InvalidOperation(format!(
                "函数需要{}个输入，实际提供了{}个",
                self.slots.len(),
                args.len()
            )));
        }
        let mut inputs = vec![None; graph.inputs_count()];
        for (slot, arg) in self.slots.iter().zip(args) {
            inputs[*slot] = Some(*arg);
        }

        let mut targets = self.outputs.clone();
        targets.extend(self.updates.iter().map(|(_, value)| *value));
        let mut evaluation = Evaluation::new(graph, store, inputs);
        evaluation.run(&targets)?;

        let outputs = self
            .outputs
            .iter()
            .map(|id| evaluation.value(*id).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let new_values = self
            .updates
            .iter()
            .map(|(shared, value)| Ok((*shared, evaluation.value(*value)?.clone())))
            .collect::<Result<Vec<_>, GraphError>>()?;
        Ok((outputs, new_values))
    }
}
