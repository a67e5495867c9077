/*
 * @Date         : 2026-02-07
 * @Description  : Model 编译：在同一张计算图上构建训练/推理两份前向表达式，
 *                 并由此编译出五个函数（训练损失、测试损失、测试准确率、预测、更新一步）
 */

use std::collections::VecDeque;

use log::{debug, info};

use super::Model;
use crate::nn::{
    Function, Graph, ModelError, NodeId, TraitAccuracy, TraitLoss, TraitOptimizer,
};
use crate::tensor::Tensor;

#[derive(Debug)]
pub(super) struct Compiled {
    pub(super) graph: Graph,
    pub(super) num_data_inputs: usize,
    pub(super) train_loss: Function,
    pub(super) test_loss: Function,
    pub(super) test_acc: Function,
    /// 输出推理模式下的网络输出（尚未按标签维数展平）
    pub(super) predict: Function,
    /// 输出训练损失，同时执行全部参数/累积量/层状态的更新
    pub(super) update_step: Function,
}

impl Model {
    /// 编译模型
    ///
    /// # 参数
    /// - `x`: 各数据输入的样本（只用到其个数与形状）
    /// - `y`: 标签样本，其维数决定预测结果的维数，其形状决定输出层宽度
    /// - `initialize_params`: 是否从头初始化参数（参数尚不存在时总会初始化）
    pub fn compile(
        &mut self,
        x: &[Tensor],
        y: &Tensor,
        initialize_params: bool,
    ) -> Result<(), ModelError> {
        info!("Compiling model...");
        if self.num_output_dims.is_none() {
            self.num_output_dims = Some(y.dimension());
        }
        let y = y.atleast_4d();

        let tree = self.tree.as_mut().ok_or(ModelError::TreeNotSet)?;
        let expected = tree.get_num_data_inputs();
        if x.len() != expected {
            return Err(ModelError::DataInputCount {
                expected,
                got: x.len(),
            });
        }
        tree.set_final_output_shape(y.shape());
        self.label_shape = Some(y.shape().to_vec());

        if initialize_params || self.params.is_none() {
            self.initialize_params()?;
        }

        let params = self.params_ref()?.trainable();
        self.optimizer.build(&mut self.store, &params)?;
        self.compiled = Some(self.build_functions()?);
        Ok(())
    }

    /// 基于当前的树、参数与优化器状态搭建计算图并编译全部函数
    pub(super) fn build_functions(&self) -> Result<Compiled, ModelError> {
        let tree = self.tree_ref()?;
        let params = self.params_ref()?;

        let mut graph = Graph::new();
        let num_data_inputs = tree.get_num_data_inputs();
        let data_inputs = (0..num_data_inputs)
            .map(|_| graph.new_input_node())
            .collect::<Vec<NodeId>>();
        let y = graph.new_input_node();

        let mut queue = data_inputs.iter().copied().collect::<VecDeque<_>>();
        let (y_hat, layer_updates) =
            tree.get_output(&mut graph, &params.branches, &mut queue, false)?;
        let mut queue = data_inputs.iter().copied().collect::<VecDeque<_>>();
        let (y_hat_test, _) = tree.get_output(&mut graph, &params.branches, &mut queue, true)?;

        let param_nodes = params
            .trainable()
            .into_iter()
            .map(|id| graph.new_shared_node(id))
            .collect::<Vec<_>>();
        let train_loss = self
            .loss
            .get_train_loss(&mut graph, y_hat, y, &param_nodes)?;
        let test_loss = self.loss.get_loss(&mut graph, y_hat_test, y)?;
        let test_acc = self.accuracy.get_accuracy(&mut graph, y_hat_test, y)?;

        let mut updates = self
            .optimizer
            .get_updates(&mut graph, &param_nodes, train_loss)?;
        updates.extend(layer_updates);

        let mut all_inputs = data_inputs.clone();
        all_inputs.push(y);

        debug!(
            "计算图共{}个节点，{}个可训练参数，{}条更新",
            graph.nodes_count(),
            param_nodes.len(),
            updates.len()
        );

        Ok(Compiled {
            train_loss: Function::new(&graph, &all_inputs, &[train_loss], &[])?,
            test_loss: Function::new(&graph, &all_inputs, &[test_loss], &[])?,
            test_acc: Function::new(&graph, &all_inputs, &[test_acc], &[])?,
            predict: Function::new(&graph, &data_inputs, &[y_hat_test], &[])?,
            update_step: Function::new(&graph, &all_inputs, &[train_loss], &updates)?,
            num_data_inputs,
            graph,
        })
    }

    /// 检查调用时提供的数据输入个数
    pub(super) fn check_data_inputs(&self, got: usize) -> Result<(), ModelError> {
        let expected = self.compiled_ref()?.num_data_inputs;
        if got != expected {
            return Err(ModelError::DataInputCount { expected, got });
        }
        Ok(())
    }
}
