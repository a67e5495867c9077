/*
 * @Date         : 2026-02-06
 * @Description  : 分支（Branch）：由若干输入与一串层组成，输入既可以是数据占位，也可以是嵌套的分支，
 *                 整个网络就是以根分支为根的一棵树。
 *
 * 遍历约定（所有递归方法一致）：
 * - 参数按先序排列：本分支自身的各层在前，随后依次是各嵌套分支（同样先序展开）；
 * - 数据输入按声明顺序深度优先编号，`get_output`从同一个队列中依次取用。
 */

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::nn::layer::{features_of, Layer, LayerBinding, TraitLayer};
use crate::nn::params::{BranchInit, BranchParams, InitSet, LayerInit};
use crate::nn::{Graph, ModelError, NodeId, Update};
use crate::tensor::Tensor;

/// 多输入时的合并方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeMode {
    /// 各输入展平为`[n, features]`后沿特征维拼接
    #[default]
    FlatAppend,
}

impl FromStr for MergeMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat_append" => Ok(Self::FlatAppend),
            other => Err(ModelError::UnsupportedMergeMode(other.to_string())),
        }
    }
}

/// 数据输入：只记录（规范化为4维后的）样本形状，数据本身在调用时按批传入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInput {
    shape: Vec<usize>,
}

impl DataInput {
    pub fn new(shape: &[usize]) -> Self {
        let mut shape = shape.to_vec();
        while shape.len() < 4 {
            shape.push(1);
        }
        Self { shape }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Input {
    Data(DataInput),
    Branch(Box<Branch>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    inputs: Vec<Input>,
    layers: Vec<Layer>,
    merge_mode: MergeMode,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓构建↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn add_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }

    /// 以样本数据声明一个数据输入（只取其形状）
    pub fn add_input(&mut self, sample: &Tensor) {
        self.add_input_shape(sample.shape());
    }

    pub fn add_input_shape(&mut self, shape: &[usize]) {
        self.inputs.push(Input::Data(DataInput::new(shape)));
    }

    pub fn add_branch(&mut self, branch: Self) {
        self.inputs.push(Input::Branch(Box::new(branch)));
    }

    pub fn set_merge_mode(&mut self, mode: &str) -> Result<(), ModelError> {
        self.merge_mode = mode.parse()?;
        Ok(())
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑构建↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub const fn merge_mode(&self) -> MergeMode {
        self.merge_mode
    }

    /// 本分支连同所有嵌套分支的总数
    pub fn num_branches(&self) -> usize {
        1 + self
            .inputs
            .iter()
            .map(|input| match input {
                Input::Data(_) => 0,
                Input::Branch(branch) => branch.num_branches(),
            })
            .sum::<usize>()
    }

    /// 整棵子树中数据输入的总数
    pub fn get_num_data_inputs(&self) -> usize {
        self.inputs
            .iter()
            .map(|input| match input {
                Input::Data(_) => 1,
                Input::Branch(branch) => branch.get_num_data_inputs(),
            })
            .sum()
    }

    /// 所有数据输入的形状，顺序同占位输入
    pub fn data_input_shapes(&self) -> Vec<Vec<usize>> {
        let mut shapes = Vec::new();
        self.collect_data_shapes(&mut shapes);
        shapes
    }

    fn collect_data_shapes(&self, shapes: &mut Vec<Vec<usize>>) {
        for input in &self.inputs {
            match input {
                Input::Data(data) => shapes.push(data.shape.clone()),
                Input::Branch(branch) => branch.collect_data_shapes(shapes),
            }
        }
    }

    /// 合并后（进入第一层前）的形状：单输入直接沿用，多输入为`[1, Σ特征数, 1, 1]`
    fn get_input_dim(&self) -> Result<Vec<usize>, ModelError> {
        match self.inputs.as_slice() {
            [] => Err(ModelError::EmptyBranch),
            [single] => match single {
                Input::Data(data) => Ok(data.shape.clone()),
                Input::Branch(branch) => branch.get_output_dim(),
            },
            inputs => match self.merge_mode {
                MergeMode::FlatAppend => {
                    let mut width = 0;
                    for input in inputs {
                        width += match input {
                            Input::Data(data) => features_of(&data.shape),
                            Input::Branch(branch) => features_of(&branch.get_output_dim()?),
                        };
                    }
                    Ok(vec![1, width, 1, 1])
                }
            },
        }
    }

    /// 依次套用各层的形状规则，得到本分支的输出形状
    pub fn get_output_dim(&self) -> Result<Vec<usize>, ModelError> {
        let mut dim = self.get_input_dim()?;
        for layer in &self.layers {
            dim = layer.get_output_dim(&dim)?;
        }
        Ok(dim)
    }

    /// 生成整棵子树的参数（及层状态）初始值，先序排列
    pub fn get_init_params(&self) -> Result<InitSet, ModelError> {
        let mut init = Vec::with_capacity(self.num_branches());
        self.collect_init_params(&mut init)?;
        Ok(init)
    }

    fn collect_init_params(&self, init: &mut InitSet) -> Result<(), ModelError> {
        let mut dim = self.get_input_dim()?;
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            layers.push(LayerInit {
                params: layer.get_init_params(&dim)?,
                state: layer.get_init_state(&dim)?,
            });
            dim = layer.get_output_dim(&dim)?;
        }
        init.push(BranchInit { layers });
        for input in &self.inputs {
            if let Input::Branch(branch) = input {
                branch.collect_init_params(init)?;
            }
        }
        Ok(())
    }

    /// 构建本分支的输出表达式
    ///
    /// - `params`：从本分支开始的先序参数切片（本分支在`params[0]`）；
    /// - `data`：数据占位队列，按声明顺序取用。
    ///
    /// 返回输出节点，以及整棵子树按遍历顺序收集到的副作用更新
    pub fn get_output(
        &self,
        graph: &mut Graph,
        params: &[BranchParams],
        data: &mut VecDeque<NodeId>,
        is_test: bool,
    ) -> Result<(NodeId, Vec<Update>), ModelError> {
        let (own, mut rest) = params.split_first().ok_or_else(|| {
            ModelError::ParamStructureMismatch("参数集合的分支数少于网络树".to_string())
        })?;
        if own.layers.len() != self.layers.len() {
            return Err(ModelError::ParamStructureMismatch(format!(
                "分支有{}层，但参数集合中记录了{}层",
                self.layers.len(),
                own.layers.len()
            )));
        }

        let mut updates = Vec::new();
        let mut input_nodes = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let node = match input {
                Input::Data(_) => data.pop_front().ok_or(ModelError::DataInputCount {
                    expected: self.get_num_data_inputs(),
                    got: input_nodes.len(),
                })?,
                Input::Branch(branch) => {
                    let (node, branch_updates) = branch.get_output(graph, rest, data, is_test)?;
                    rest = rest.get(branch.num_branches()..).unwrap_or_default();
                    updates.extend(branch_updates);
                    node
                }
            };
            input_nodes.push(node);
        }

        let mut current = match input_nodes.as_slice() {
            [] => return Err(ModelError::EmptyBranch),
            [single] => *single,
            nodes => match self.merge_mode {
                MergeMode::FlatAppend => {
                    let flattened = nodes
                        .iter()
                        .map(|node| graph.new_flatten_node(*node, 2))
                        .collect::<Result<Vec<_>, _>>()?;
                    let merged = graph.new_concat_node(&flattened, 1)?;
                    let width = self.get_input_dim()?[1];
                    graph.new_reshape_node(merged, &[width, 1, 1])?
                }
            },
        };

        for (layer, layer_params) in self.layers.iter().zip(&own.layers) {
            let params = layer_params
                .params
                .iter()
                .flatten()
                .map(|id| graph.new_shared_node(*id))
                .collect::<Vec<_>>();
            let state = layer_params
                .state
                .iter()
                .flatten()
                .map(|id| graph.new_shared_node(*id))
                .collect::<Vec<_>>();
            let binding = LayerBinding {
                params: &params,
                state: &state,
            };
            let output = layer.get_output(graph, current, &binding, is_test)?;
            updates.extend(output.updates);
            current = output.output;
        }
        Ok((current, updates))
    }

    /// 从后往前找到第一个输出形状依赖标签的层，令其输出匹配`shape`；没有则什么也不做
    pub fn set_final_output_shape(&mut self, shape: &[usize]) {
        if let Some(layer) = self.layers.iter_mut().rev().find(|layer| layer.mods_io_dim()) {
            layer.set_final_output_shape(shape);
        }
    }
}
