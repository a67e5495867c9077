/*
 * @Date         : 2026-02-08
 * @Description  : 做梦模式：固定网络参数，转而优化输入。
 *
 * 数据输入分为两类：
 * - 固定输入：每行取该行的真实值；
 * - 自由输入（调用时传`None`）：每行都从初始化器给出的值出发，
 *   以“推理模式下网络输出均值”的相反数为目标，用做梦优化器迭代固定次数，结果即为该行的预测。
 *
 * 所有输入都以共享变量的形式进入单独的一张计算图，与主编译互不影响。
 */

use std::collections::VecDeque;

use log::{debug, info};

use super::{Model, scalar_output};
use crate::data::DataError;
use crate::nn::{
    DreamConfig, Function, Graph, ModelError, NodeId, SharedId, TraitAccuracy, TraitOptimizer,
};
use crate::tensor::Tensor;

#[derive(Debug)]
pub(super) struct DreamCompiled {
    graph: Graph,
    /// 无输入；输出网络输出均值，并执行自由输入及其累积量的更新
    update: Function,
    /// 无输入；输出推理模式下的网络输出
    forward: Function,
    /// 输入`(y_pred, y)`，输出准确率
    accuracy: Function,
    free_indices: Vec<usize>,
    /// 每个自由输入的4维形状（首维为1）
    free_shapes: Vec<Vec<usize>>,
    /// 每个数据输入对应的共享变量，顺序同网络树中数据输入的声明顺序
    inputs: Vec<SharedId>,
}

/// 做梦的结果
#[derive(Debug, Clone, PartialEq)]
pub struct DreamPrediction {
    /// 每个自由输入逐行优化后的值，形状为`[行数, ...]`
    pub inputs: Vec<Tensor>,
    /// 每行优化结束时的网络输出，已按标签维数展平
    pub outputs: Tensor,
}

impl Model {
    /// 做梦预测
    ///
    /// # 参数
    /// - `x`: 每个数据输入一项，`None`表示自由输入，至少要有一个固定输入
    /// - `shapes`: 每个自由输入单行的形状（不含首维）
    /// - `initializer`: 自由输入的初始化器，如`initializers::zeros`
    pub fn predict_dream(
        &mut self,
        x: &[Option<Tensor>],
        shapes: &[Vec<usize>],
        config: &DreamConfig,
        initializer: impl Fn(&[usize]) -> Tensor,
    ) -> Result<DreamPrediction, ModelError> {
        if self.compiled.is_none() {
            return Err(ModelError::NotCompiled);
        }
        let expected = self.tree_ref()?.get_num_data_inputs();
        if x.len() != expected {
            return Err(ModelError::DataInputCount {
                expected,
                got: x.len(),
            });
        }

        let free_indices = x
            .iter()
            .enumerate()
            .filter_map(|(i, input)| input.is_none().then_some(i))
            .collect::<Vec<_>>();
        if free_indices.len() != shapes.len() {
            return Err(ModelError::DreamShapeCount {
                free: free_indices.len(),
                shapes: shapes.len(),
            });
        }
        let free_shapes = shapes
            .iter()
            .map(|shape| {
                let mut row = vec![1];
                row.extend_from_slice(shape);
                Tensor::zeros(&row).atleast_4d().shape().to_vec()
            })
            .collect::<Vec<_>>();
        let fixed = x
            .iter()
            .map(|input| input.as_ref().map(Tensor::atleast_4d))
            .collect::<Vec<_>>();
        let num_rows = fixed
            .iter()
            .flatten()
            .last()
            .map(Tensor::rows)
            .ok_or(ModelError::NoFixedDreamInput)?;
        for input in fixed.iter().flatten() {
            if input.rows() != num_rows {
                return Err(DataError::ShapeMismatch {
                    expected: vec![num_rows],
                    got: vec![input.rows()],
                }
                .into());
            }
        }

        match &self.dream {
            Some(dream) => {
                if dream.free_indices != free_indices || dream.free_shapes != free_shapes {
                    return Err(ModelError::DreamLayoutChanged {
                        compiled: dream.free_indices.clone(),
                        got: free_indices,
                    });
                }
            }
            None => self.compile_dream(&fixed, &free_indices, &free_shapes, &initializer)?,
        }

        self.dream_optimizer.sync_hyperparameters(&mut self.store)?;
        let dream = self.dream.as_ref().ok_or(ModelError::NotCompiled)?;
        let mut dreamed = vec![Vec::with_capacity(num_rows); dream.free_indices.len()];
        let mut outputs = Vec::with_capacity(num_rows);
        for row in 0..num_rows {
            let mut free = dream.free_shapes.iter();
            for (input, shared) in fixed.iter().zip(&dream.inputs) {
                let value = match input {
                    Some(data) => data.row(row),
                    None => {
                        let shape = free.next().ok_or(ModelError::NoFixedDreamInput)?;
                        initializer(shape).reshape(shape)?
                    }
                };
                self.store.set_value(*shared, &value)?;
            }
            self.dream_optimizer.reset(&mut self.store)?;

            let mut reward = 0.0;
            for _ in 0..config.max_dream_length {
                let output = dream.update.call(&dream.graph, &mut self.store, &[])?;
                reward = scalar_output(&output)?;
            }
            if config.progress_every > 0 && (row + 1) % config.progress_every == 0 {
                println!("{}/{}: {}", row + 1, num_rows, reward);
            }

            for (slot, index) in dreamed.iter_mut().zip(&dream.free_indices) {
                slot.push(self.store.get(dream.inputs[*index])?.clone());
            }
            let output = dream.forward.call_pure(&dream.graph, &self.store, &[])?;
            outputs.extend(output);
        }

        let inputs = dreamed
            .iter()
            .map(|rows| Tensor::concat(&rows.iter().collect::<Vec<_>>(), 0))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = Tensor::concat(&outputs.iter().collect::<Vec<_>>(), 0)?;
        Ok(DreamPrediction {
            inputs,
            outputs: self.flatten_prediction(&outputs)?,
        })
    }

    /// 以标签形状作为唯一自由输入的形状做梦，返回做梦结果相对`y`的准确率（百分数）及做梦结果
    pub fn get_dream_accuracy(
        &mut self,
        x: &[Option<Tensor>],
        y: &Tensor,
        config: &DreamConfig,
        initializer: impl Fn(&[usize]) -> Tensor,
    ) -> Result<(f32, DreamPrediction), ModelError> {
        let y = y.atleast_4d();
        let shape = y.shape()[1..].to_vec();
        let prediction = self.predict_dream(x, &[shape], config, initializer)?;

        let dream = self.dream.as_ref().ok_or(ModelError::NotCompiled)?;
        let y_pred = prediction.inputs.first().ok_or(ModelError::DreamShapeCount {
            free: prediction.inputs.len(),
            shapes: 1,
        })?;
        let output = dream
            .accuracy
            .call_pure(&dream.graph, &self.store, &[y_pred, &y])?;
        Ok((scalar_output(&output)? * 100.0, prediction))
    }

    /// 编译做梦模式：所有数据输入注册为共享变量，自由输入即为做梦优化器的“参数”
    fn compile_dream(
        &mut self,
        fixed: &[Option<Tensor>],
        free_indices: &[usize],
        free_shapes: &[Vec<usize>],
        initializer: &impl Fn(&[usize]) -> Tensor,
    ) -> Result<(), ModelError> {
        info!("Compiling dream mode...");
        let mut free = free_shapes.iter();
        let mut inputs = Vec::with_capacity(fixed.len());
        for input in fixed {
            let value = match input {
                Some(data) => data.row(0),
                None => {
                    let shape = free.next().ok_or(ModelError::NoFixedDreamInput)?;
                    initializer(shape).reshape(shape)?
                }
            };
            inputs.push(self.store.register(value));
        }
        let free_ids = free_indices.iter().map(|i| inputs[*i]).collect::<Vec<_>>();

        let tree = self.tree.as_ref().ok_or(ModelError::TreeNotSet)?;
        let params = self.params.as_ref().ok_or(ModelError::ParamsNotInitialized)?;
        let mut graph = Graph::new();
        let input_nodes = inputs
            .iter()
            .map(|id| graph.new_shared_node(*id))
            .collect::<Vec<NodeId>>();
        let mut queue = input_nodes.iter().copied().collect::<VecDeque<_>>();
        let (y_hat, layer_updates) =
            tree.get_output(&mut graph, &params.branches, &mut queue, true)?;

        let reward = graph.new_mean_node(y_hat)?;
        let objective = graph.new_negate_node(reward)?;
        let free_nodes = free_indices
            .iter()
            .map(|i| input_nodes[*i])
            .collect::<Vec<_>>();
        self.dream_optimizer.build(&mut self.store, &free_ids)?;
        let mut updates = self
            .dream_optimizer
            .get_updates(&mut graph, &free_nodes, objective)?;
        updates.extend(layer_updates);

        let y_pred = graph.new_input_node();
        let y = graph.new_input_node();
        let accuracy = self.accuracy.get_accuracy(&mut graph, y_pred, y)?;

        debug!(
            "做梦计算图共{}个节点，{}个自由输入",
            graph.nodes_count(),
            free_ids.len()
        );
        self.dream = Some(DreamCompiled {
            update: Function::new(&graph, &[], &[reward], &updates)?,
            forward: Function::new(&graph, &[], &[y_hat], &[])?,
            accuracy: Function::new(&graph, &[y_pred, y], &[accuracy], &[])?,
            free_indices: free_indices.to_vec(),
            free_shapes: free_shapes.to_vec(),
            inputs,
            graph,
        });
        Ok(())
    }
}
