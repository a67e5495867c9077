/*
 * @Date         : 2026-02-04
 * @Description  : 计算图的节点构建方法。叶子节点的创建不会失败；
 *                 其余节点只校验父节点是否存在，形状在求值时才检查。
 */

use super::{Graph, GraphError, NodeId, Op};
use crate::nn::SharedId;
use crate::tensor::Tensor;

impl Graph {
    // ========== 叶子 ==========

    /// 新建一个占位输入，槽位按创建顺序递增
    pub fn new_input_node(&mut self) -> NodeId {
        let slot = self.num_inputs;
        self.num_inputs += 1;
        self.nodes.push(Op::Input { slot });
        NodeId(self.nodes.len() - 1)
    }

    /// 获取（或首次创建）共享变量对应的节点
    pub fn new_shared_node(&mut self, shared: SharedId) -> NodeId {
        if let Some(id) = self.shared_nodes.get(&shared) {
            return *id;
        }
        self.nodes.push(Op::Shared(shared));
        let id = NodeId(self.nodes.len() - 1);
        self.shared_nodes.insert(shared, id);
        id
    }

    pub fn new_constant_node(&mut self, value: Tensor) -> NodeId {
        self.nodes.push(Op::Constant(value));
        NodeId(self.nodes.len() - 1)
    }

    pub fn new_scalar_node(&mut self, value: f32) -> NodeId {
        self.new_constant_node(Tensor::scalar(value))
    }

    // ========== 逐元素 ==========

    pub fn new_add_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Add(a, b))
    }

    pub fn new_subtract_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Sub(a, b))
    }

    pub fn new_multiply_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Mul(a, b))
    }

    pub fn new_divide_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Div(a, b))
    }

    pub fn new_negate_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Neg(x))
    }

    pub fn new_exp_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Exp(x))
    }

    pub fn new_ln_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Log(x))
    }

    pub fn new_sqrt_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Sqrt(x))
    }

    pub fn new_square_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Square(x))
    }

    pub fn new_tanh_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Tanh(x))
    }

    pub fn new_sigmoid_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Sigmoid(x))
    }

    pub fn new_relu_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Relu(x))
    }

    pub fn new_clip_node(&mut self, x: NodeId, min: f32, max: f32) -> Result<NodeId, GraphError> {
        if min > max {
            return Err(GraphError::InvalidOperation(format!(
                "Clip的下界{min}大于上界{max}"
            )));
        }
        self.push(Op::Clip { x, min, max })
    }

    // ========== 形状/矩阵 ==========

    pub fn new_mat_mul_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::MatMul(a, b))
    }

    /// 保留首维，其余维度重塑为`tail`
    pub fn new_reshape_node(&mut self, x: NodeId, tail: &[usize]) -> Result<NodeId, GraphError> {
        self.push(Op::ReshapeTail {
            x,
            tail: tail.to_vec(),
        })
    }

    pub fn new_flatten_node(&mut self, x: NodeId, ndim: usize) -> Result<NodeId, GraphError> {
        if ndim == 0 {
            return Err(GraphError::InvalidOperation(
                "Flatten的目标维数至少为1".to_string(),
            ));
        }
        self.push(Op::Flatten { x, ndim })
    }

    pub fn new_concat_node(&mut self, inputs: &[NodeId], axis: usize) -> Result<NodeId, GraphError> {
        if inputs.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Concat至少需要一个输入".to_string(),
            ));
        }
        self.push(Op::Concat {
            inputs: inputs.to_vec(),
            axis,
        })
    }

    // ========== 归约 ==========

    pub fn new_sum_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Sum(x))
    }

    pub fn new_mean_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Mean(x))
    }

    /// 沿轴求和（保留该轴）
    pub fn new_sum_axis_node(&mut self, x: NodeId, axis: usize) -> Result<NodeId, GraphError> {
        self.push(Op::SumAxis { x, axis })
    }

    /// 沿轴求均值（保留该轴）
    pub fn new_mean_axis_node(&mut self, x: NodeId, axis: usize) -> Result<NodeId, GraphError> {
        self.push(Op::MeanAxis { x, axis })
    }

    // ========== 其他 ==========

    /// 沿轴1做softmax
    pub fn new_softmax_node(&mut self, x: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Softmax(x))
    }

    pub fn new_dropout_node(&mut self, x: NodeId, rate: f32) -> Result<NodeId, GraphError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout的丢弃率须在[0, 1)内，实际为{rate}"
            )));
        }
        self.push(Op::Dropout { x, rate })
    }

    /// 逐行比较预测与目标的argmax，结果为命中比例（标量）
    pub fn new_categorical_accuracy_node(
        &mut self,
        pred: NodeId,
        target: NodeId,
    ) -> Result<NodeId, GraphError> {
        self.push(Op::CategoricalAccuracy { pred, target })
    }

    /// 预测按`threshold`二值化后与目标逐元素比较，结果为命中比例（标量）
    pub fn new_binary_accuracy_node(
        &mut self,
        pred: NodeId,
        target: NodeId,
        threshold: f32,
    ) -> Result<NodeId, GraphError> {
        self.push(Op::BinaryAccuracy {
            pred,
            target,
            threshold,
        })
    }

    /// 标量`cost`对`wrt`的梯度节点，其形状与`wrt`一致
    pub fn new_grad_node(&mut self, cost: NodeId, wrt: NodeId) -> Result<NodeId, GraphError> {
        self.push(Op::Grad { cost, wrt })
    }
}
