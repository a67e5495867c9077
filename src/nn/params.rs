/*
 * @Date         : 2026-02-05
 * @Description  : 参数集合：与网络树同构的嵌套结构（分支 -> 层 -> 数组），
 *                 叶子是共享仓库中的`SharedId`。嵌套结构与各数组形状在首次初始化后即固定。
 */

use serde::{Deserialize, Serialize};

use crate::nn::{GraphError, SharedId, SharedStore};
use crate::tensor::Tensor;

/// 单层的初始值：可训练参数与不可训练状态（如BatchNorm的滑动均值/方差）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerInit {
    pub params: Option<Vec<Tensor>>,
    pub state: Option<Vec<Tensor>>,
}

/// 单个分支的初始值，按层排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchInit {
    pub layers: Vec<LayerInit>,
}

/// 整棵树的初始值：按先序（分支自身在其嵌套分支之前）排列
pub type InitSet = Vec<BranchInit>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerParams {
    /// 无参数的层为`None`
    pub params: Option<Vec<SharedId>>,
    pub state: Option<Vec<SharedId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchParams {
    pub layers: Vec<LayerParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSet {
    pub branches: Vec<BranchParams>,
}

impl ParamSet {
    /// 把初始值逐一注册进共享仓库
    pub fn register(store: &mut SharedStore, init: InitSet) -> Self {
        let register_all =
            |store: &mut SharedStore, values: Option<Vec<Tensor>>| -> Option<Vec<SharedId>> {
                values.map(|values| values.into_iter().map(|v| store.register(v)).collect())
            };
        let branches = init
            .into_iter()
            .map(|branch| BranchParams {
                layers: branch
                    .layers
                    .into_iter()
                    .map(|layer| LayerParams {
                        params: register_all(store, layer.params),
                        state: register_all(store, layer.state),
                    })
                    .collect(),
            })
            .collect();
        Self { branches }
    }

    /// 所有可训练参数，按“分支 -> 层 -> 数组”的深度优先顺序展平
    pub fn trainable(&self) -> Vec<SharedId> {
        self.branches
            .iter()
            .flat_map(|branch| branch.layers.iter())
            .flat_map(|layer| layer.params.iter().flatten().copied())
            .collect()
    }

    /// 所有不可训练的层状态，顺序同`trainable`
    pub fn states(&self) -> Vec<SharedId> {
        self.branches
            .iter()
            .flat_map(|branch| branch.layers.iter())
            .flat_map(|layer| layer.state.iter().flatten().copied())
            .collect()
    }

    /// 检查另一份初始值是否与本集合同构（层级结构与每个数组的形状都一致）
    pub(crate) fn matches(&self, store: &SharedStore, init: &InitSet) -> Result<bool, GraphError> {
        if self.branches.len() != init.len() {
            return Ok(false);
        }
        for (branch, branch_init) in self.branches.iter().zip(init) {
            if branch.layers.len() != branch_init.layers.len() {
                return Ok(false);
            }
            for (layer, layer_init) in branch.layers.iter().zip(&branch_init.layers) {
                if !same_group(store, &layer.params, &layer_init.params)?
                    || !same_group(store, &layer.state, &layer_init.state)?
                {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// 按同构的初始值原地覆写
    pub(crate) fn assign(&self, store: &mut SharedStore, init: &InitSet) -> Result<(), GraphError> {
        for (branch, branch_init) in self.branches.iter().zip(init) {
            for (layer, layer_init) in branch.layers.iter().zip(&branch_init.layers) {
                for (ids, values) in [
                    (&layer.params, &layer_init.params),
                    (&layer.state, &layer_init.state),
                ] {
                    if let (Some(ids), Some(values)) = (ids, values) {
                        for (id, value) in ids.iter().zip(values) {
                            store.set_value(*id, value)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// 以当前值导出一份同构的初始值（用于只保存参数）
    pub(crate) fn snapshot(&self, store: &SharedStore) -> Result<InitSet, GraphError> {
        let read = |ids: &Option<Vec<SharedId>>| -> Result<Option<Vec<Tensor>>, GraphError> {
            ids.as_ref()
                .map(|ids| ids.iter().map(|id| store.get(*id).cloned()).collect())
                .transpose()
        };
        self.branches
            .iter()
            .map(|branch| {
                let layers = branch
                    .layers
                    .iter()
                    .map(|layer| {
                        Ok(LayerInit {
                            params: read(&layer.params)?,
                            state: read(&layer.state)?,
                        })
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?;
                Ok(BranchInit { layers })
            })
            .collect()
    }
}

fn same_group(
    store: &SharedStore,
    ids: &Option<Vec<SharedId>>,
    values: &Option<Vec<Tensor>>,
) -> Result<bool, GraphError> {
    match (ids, values) {
        (None, None) => Ok(true),
        (Some(ids), Some(values)) if ids.len() == values.len() => {
            for (id, value) in ids.iter().zip(values) {
                if store.get(*id)?.shape() != value.shape() {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
