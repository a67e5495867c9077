/*
 * @Date         : 2026-02-04
 * @Description  : 前向求值：针对一次调用（一份输入 + 一份共享变量快照），
 *                 只计算目标节点的祖先，并按id（即拓扑）顺序依次求值。
 *                 遇到梯度节点时，对同一cost只做一次反向传播并缓存结果。
 */

use std::collections::HashMap;

use super::{Graph, GraphError, NodeId, Op};
use crate::nn::SharedStore;
use crate::tensor::Tensor;

pub(crate) struct Evaluation<'a> {
    pub(super) graph: &'a Graph,
    store: &'a SharedStore,
    inputs: Vec<Option<&'a Tensor>>,
    values: Vec<Option<Tensor>>,
    /// dropout节点本次调用采样得到的（已缩放的）掩码
    pub(super) masks: HashMap<NodeId, Tensor>,
    /// cost -> (节点 -> 梯度)
    grads: HashMap<NodeId, HashMap<NodeId, Tensor>>,
}

impl<'a> Evaluation<'a> {
    pub(crate) fn new(
        graph: &'a Graph,
        store: &'a SharedStore,
        inputs: Vec<Option<&'a Tensor>>,
    ) -> Self {
        Self {
            graph,
            store,
            inputs,
            values: vec![None; graph.nodes_count()],
            masks: HashMap::new(),
            grads: HashMap::new(),
        }
    }

    /// 计算`targets`（及其祖先）的值
    pub(crate) fn run(&mut self, targets: &[NodeId]) -> Result<(), GraphError> {
        let needed = self.graph.ancestors(targets)?;
        for (index, need) in needed.into_iter().enumerate() {
            if need && self.values[index].is_none() {
                let value = self.forward_node(NodeId(index))?;
                self.values[index] = Some(value);
            }
        }
        Ok(())
    }

    pub(crate) fn value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        self.values
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::ComputationError(format!("节点{id:?}尚未求值")))
    }

    fn forward_node(&mut self, id: NodeId) -> Result<Tensor, GraphError> {
        let graph = self.graph;
        let value = match graph.op(id)? {
            Op::Input { slot } => self
                .inputs
                .get(*slot)
                .copied()
                .flatten()
                .cloned()
                .ok_or_else(|| {
                    GraphError::ComputationError(format!("占位输入（槽位{slot}）未提供数据"))
                })?,
            Op::Shared(shared) => self.store.get(*shared)?.clone(),
            Op::Constant(value) => value.clone(),

            Op::Add(a, b) => self.value(*a)?.try_add(self.value(*b)?)?,
            Op::Sub(a, b) => self.value(*a)?.try_sub(self.value(*b)?)?,
            Op::Mul(a, b) => self.value(*a)?.try_mul(self.value(*b)?)?,
            Op::Div(a, b) => self.value(*a)?.try_div(self.value(*b)?)?,
            Op::Neg(x) => -self.value(*x)?,
            Op::Exp(x) => self.value(*x)?.map(f32::exp),
            Op::Log(x) => self.value(*x)?.map(f32::ln),
            Op::Sqrt(x) => self.value(*x)?.map(f32::sqrt),
            Op::Square(x) => self.value(*x)?.map(|v| v * v),
            Op::Tanh(x) => self.value(*x)?.map(f32::tanh),
            Op::Sigmoid(x) => self.value(*x)?.map(|v| 1.0 / (1.0 + (-v).exp())),
            Op::Relu(x) => self.value(*x)?.map(|v| v.max(0.0)),
            Op::Clip { x, min, max } => self.value(*x)?.map(|v| v.clamp(*min, *max)),

            Op::MatMul(a, b) => self.value(*a)?.matmul(self.value(*b)?)?,
            Op::ReshapeTail { x, tail } => self.value(*x)?.reshape_tail(tail)?,
            Op::Flatten { x, ndim } => self.value(*x)?.flatten_to(*ndim)?,
            Op::Concat { inputs, axis } => {
                let values = inputs
                    .iter()
                    .map(|input| self.value(*input))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::concat(&values, *axis)?
            }

            Op::Sum(x) => Tensor::scalar(self.value(*x)?.sum()),
            Op::Mean(x) => Tensor::scalar(self.value(*x)?.mean()),
            Op::SumAxis { x, axis } => self.value(*x)?.sum_axis_keep(*axis)?,
            Op::MeanAxis { x, axis } => self.value(*x)?.mean_axis_keep(*axis)?,

            Op::Softmax(x) => self.value(*x)?.softmax_axis1()?,
            Op::Dropout { x, rate } => {
                let input = self.value(*x)?;
                let keep = 1.0 - rate;
                let mask = Tensor::uniform(0.0, 1.0, input.shape())
                    .map(|u| if u < keep { 1.0 / keep } else { 0.0 });
                let output = input.try_mul(&mask)?;
                self.masks.insert(id, mask);
                output
            }

            Op::CategoricalAccuracy { pred, target } => {
                let pred = self.value(*pred)?;
                let target = self.value(*target)?;
                if pred.rows() != target.rows() {
                    return Err(GraphError::ShapeMismatch {
                        expected: pred.shape().to_vec(),
                        got: target.shape().to_vec(),
                        message: "分类准确率的预测与目标样本数不一致".to_string(),
                    });
                }
                let hits = pred
                    .argmax_rows()
                    .iter()
                    .zip(target.argmax_rows())
                    .filter(|(p, t)| **p == *t)
                    .count();
                Tensor::scalar(hits as f32 / pred.rows().max(1) as f32)
            }
            Op::BinaryAccuracy {
                pred,
                target,
                threshold,
            } => {
                let pred = self.value(*pred)?;
                let target = self.value(*target)?;
                let hits = pred.zip_with(target, |p, t| {
                    f32::from(u8::from((p > *threshold) == (t > 0.5)))
                })?;
                Tensor::scalar(hits.mean())
            }
            Op::Grad { cost, wrt } => {
                if !self.grads.contains_key(cost) {
                    let grads = self.backward(*cost)?;
                    self.grads.insert(*cost, grads);
                }
                match self.grads.get(cost).and_then(|grads| grads.get(wrt)) {
                    Some(grad) => grad.clone(),
                    // `wrt`与`cost`无关：梯度恒为0
                    None => Tensor::zeros(self.value(*wrt)?.shape()),
                }
            }
        };
        Ok(value)
    }
}
