/*
 * @Date         : 2026-02-04
 * @Description  : 符号计算图：先用`new_*_node`搭出表达式（只记录运算与依赖），
 *                 再编译成`Function`反复求值。共享节点只保存`SharedId`，
 *                 真正的数值在求值时从`SharedStore`读取。
 */

mod backward;
mod error;
mod eval;
mod function;
mod node;
mod node_builders;

use std::collections::HashMap;

pub use error::GraphError;
pub use function::Function;
pub use node::{NodeId, Update};
pub(crate) use node::Op;

use crate::nn::SharedId;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Op>,
    /// 同一共享变量在图中只对应一个节点，保证对其求导时梯度能汇总到一处
    shared_nodes: HashMap<SharedId, NodeId>,
    num_inputs: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// 已创建的占位输入数量
    pub fn inputs_count(&self) -> usize {
        self.num_inputs
    }

    pub(crate) fn op(&self, id: NodeId) -> Result<&Op, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    /// 若`id`是共享节点，返回其对应的共享变量
    pub fn shared_of(&self, id: NodeId) -> Result<SharedId, GraphError> {
        match self.op(id)? {
            Op::Shared(shared) => Ok(*shared),
            op => Err(GraphError::InvalidOperation(format!(
                "节点{id:?}是{}节点，而非共享节点",
                op.name()
            ))),
        }
    }

    /// 若`id`是占位输入，返回其槽位
    pub(crate) fn input_slot(&self, id: NodeId) -> Result<usize, GraphError> {
        match self.op(id)? {
            Op::Input { slot } => Ok(*slot),
            op => Err(GraphError::InvalidOperation(format!(
                "节点{id:?}是{}节点，而非占位输入",
                op.name()
            ))),
        }
    }

    fn push(&mut self, op: Op) -> Result<NodeId, GraphError> {
        for parent in op.parents() {
            self.op(parent)?;
        }
        self.nodes.push(op);
        Ok(NodeId(self.nodes.len() - 1))
    }

    /// 求出`targets`及其所有祖先节点，结果按节点id索引
    pub(crate) fn ancestors(&self, targets: &[NodeId]) -> Result<Vec<bool>, GraphError> {
        let mut needed = vec![false; self.nodes.len()];
        let mut stack = targets.to_vec();
        while let Some(id) = stack.pop() {
            let op = self.op(id)?;
            if needed[id.0] {
                continue;
            }
            needed[id.0] = true;
            stack.extend(op.parents());
        }
        Ok(needed)
    }
}
