/*
 * @Date         : 2026-02-04
 * @Description  : VJP 反向传播：从标量cost出发，按id逆序把上游梯度分发给各父节点。
 *                 广播产生的梯度会经`sum_to_shape`归约回父节点原形状。
 */

use std::collections::HashMap;

use super::eval::Evaluation;
use super::{GraphError, NodeId, Op};
use crate::tensor::Tensor;

impl<'a> Evaluation<'a> {
    /// 计算标量`cost`对其所有祖先节点的梯度（调用前`cost`须已求值）
    pub(crate) fn backward(&self, cost: NodeId) -> Result<HashMap<NodeId, Tensor>, GraphError> {
        let cost_value = self.value(cost)?;
        if !cost_value.is_scalar() {
            return Err(GraphError::InvalidOperation(format!(
                "只能对标量求梯度，cost的形状为{:?}",
                cost_value.shape()
            )));
        }

        let mut adjoints: Vec<Option<Tensor>> = vec![None; cost.0 + 1];
        adjoints[cost.0] = Some(Tensor::ones(cost_value.shape()));
        let mut grads = HashMap::new();

        for index in (0..=cost.0).rev() {
            let Some(grad) = adjoints[index].take() else {
                continue;
            };
            let id = NodeId(index);
            for (parent, parent_grad) in self.vjp(id, &grad)? {
                let slot = &mut adjoints[parent.0];
                *slot = Some(match slot.take() {
                    Some(acc) => acc.try_add(&parent_grad)?,
                    None => parent_grad,
                });
            }
            grads.insert(id, grad);
        }
        Ok(grads)
    }

    /// 节点`id`收到上游梯度`grad`后，返回应分发给各父节点的梯度
    fn vjp(&self, id: NodeId, grad: &Tensor) -> Result<Vec<(NodeId, Tensor)>, GraphError> {
        let op = self.graph.op(id)?;
        let to_parent = |parent: NodeId, g: Tensor| -> Result<(NodeId, Tensor), GraphError> {
            let shape = self.value(parent)?.shape().to_vec();
            Ok((parent, g.sum_to_shape(&shape)?))
        };

        let grads = match op {
            Op::Input { .. } | Op::Shared(_) | Op::Constant(_) => vec![],

            Op::Add(a, b) => vec![to_parent(*a, grad.clone())?, to_parent(*b, grad.clone())?],
            Op::Sub(a, b) => vec![to_parent(*a, grad.clone())?, to_parent(*b, -grad)?],
            Op::Mul(a, b) => {
                let (va, vb) = (self.value(*a)?, self.value(*b)?);
                vec![
                    to_parent(*a, grad.try_mul(vb)?)?,
                    to_parent(*b, grad.try_mul(va)?)?,
                ]
            }
            Op::Div(a, b) => {
                let vb = self.value(*b)?;
                let output = self.value(id)?;
                let grad_a = grad.try_div(vb)?;
                let grad_b = -grad.try_mul(output)?.try_div(vb)?;
                vec![to_parent(*a, grad_a)?, to_parent(*b, grad_b)?]
            }
            Op::Neg(x) => vec![(*x, -grad)],
            Op::Exp(x) => vec![(*x, grad.try_mul(self.value(id)?)?)],
            Op::Log(x) => vec![(*x, grad.try_div(self.value(*x)?)?)],
            Op::Sqrt(x) => {
                let output = self.value(id)?;
                vec![(*x, grad.zip_with(output, |g, s| g * 0.5 / s)?)]
            }
            Op::Square(x) => vec![(*x, grad.zip_with(self.value(*x)?, |g, v| 2.0 * g * v)?)],
            Op::Tanh(x) => {
                let output = self.value(id)?;
                vec![(*x, grad.zip_with(output, |g, t| g * (1.0 - t * t))?)]
            }
            Op::Sigmoid(x) => {
                let output = self.value(id)?;
                vec![(*x, grad.zip_with(output, |g, s| g * s * (1.0 - s))?)]
            }
            Op::Relu(x) => {
                let input = self.value(*x)?;
                vec![(*x, grad.zip_with(input, |g, v| if v > 0.0 { g } else { 0.0 })?)]
            }
            Op::Clip { x, min, max } => {
                let input = self.value(*x)?;
                let passed = |g: f32, v: f32| if v >= *min && v <= *max { g } else { 0.0 };
                vec![(*x, grad.zip_with(input, passed)?)]
            }

            Op::MatMul(a, b) => {
                let (va, vb) = (self.value(*a)?, self.value(*b)?);
                vec![
                    (*a, grad.matmul(&vb.transpose()?)?),
                    (*b, va.transpose()?.matmul(grad)?),
                ]
            }
            Op::ReshapeTail { x, .. } | Op::Flatten { x, .. } => {
                vec![(*x, grad.reshape(self.value(*x)?.shape())?)]
            }
            Op::Concat { inputs, axis } => {
                let mut start = 0;
                let mut grads = Vec::with_capacity(inputs.len());
                for input in inputs {
                    let len = self.value(*input)?.shape()[*axis];
                    grads.push((*input, grad.narrow(*axis, start, len)?));
                    start += len;
                }
                grads
            }

            Op::Sum(x) => {
                let shape = self.value(*x)?.shape().to_vec();
                vec![(*x, Tensor::full(&shape, scalar_of(grad)?))]
            }
            Op::Mean(x) => {
                let input = self.value(*x)?;
                let size = input.size().max(1) as f32;
                vec![(*x, Tensor::full(input.shape(), scalar_of(grad)? / size))]
            }
            Op::SumAxis { x, .. } => {
                let shape = self.value(*x)?.shape().to_vec();
                vec![(*x, grad.broadcast_to(&shape)?)]
            }
            Op::MeanAxis { x, axis } => {
                let shape = self.value(*x)?.shape().to_vec();
                let len = shape[*axis].max(1) as f32;
                vec![(*x, grad.broadcast_to(&shape)? / len)]
            }

            Op::Softmax(x) => {
                let output = self.value(id)?;
                let weighted = grad.try_mul(output)?;
                let dot = weighted.sum_axis_keep(1)?;
                vec![(*x, weighted.try_sub(&output.try_mul(&dot)?)?)]
            }
            Op::Dropout { x, .. } => {
                let mask = self.masks.get(&id).ok_or_else(|| {
                    GraphError::ComputationError(format!("Dropout节点{id:?}缺少本次前向的掩码"))
                })?;
                vec![(*x, grad.try_mul(mask)?)]
            }

            Op::CategoricalAccuracy { .. } | Op::BinaryAccuracy { .. } | Op::Grad { .. } => {
                return Err(GraphError::InvalidOperation(format!(
                    "{}节点不可求导",
                    op.name()
                )))
            }
        };
        Ok(grads)
    }
}

fn scalar_of(grad: &Tensor) -> Result<f32, GraphError> {
    grad.number().ok_or_else(|| {
        GraphError::ComputationError(format!("期望标量梯度，实际形状为{:?}", grad.shape()))
    })
}
