/*
 * @Date         : 2026-02-06
 * @Description  : RMSprop 优化器实现
 */

use serde::{Deserialize, Serialize};

use super::{
    TraitOptimizer, gradients, hyperparameter_nodes, store_hyperparameters, write_hyperparameters,
};
use crate::nn::{Graph, ModelError, NodeId, SharedId, SharedStore, Update};
use crate::tensor::Tensor;

/// RMSprop 优化器
///
/// ```text
/// acc = momentum * acc + (1 - momentum) * g²
/// θ   = θ - lr * g / sqrt(acc + eps)
/// ```
///
/// 累积量与参数一一对应、形状相同，由`build`在共享仓库中分配。
/// 三个超参数同样登记在仓库里（顺序为lr、momentum、epsilon）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RMSprop {
    lr: f32,
    momentum: f32,
    epsilon: f32,
    accumulators: Option<Vec<SharedId>>,
    hyper_slots: Option<Vec<SharedId>>,
}

impl RMSprop {
    pub const fn new(lr: f32, momentum: f32, epsilon: f32) -> Self {
        Self {
            lr,
            momentum,
            epsilon,
            accumulators: None,
            hyper_slots: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.accumulators.is_some()
    }

    pub fn accumulators(&self) -> Option<&[SharedId]> {
        self.accumulators.as_deref()
    }

    fn hyperparameter_values(&self) -> [f32; 3] {
        [self.lr, self.momentum, self.epsilon]
    }

    /// 已有累积量能否原样复用（数量与形状都与参数一致）
    fn can_reuse(&self, store: &SharedStore, params: &[SharedId]) -> Result<bool, ModelError> {
        let Some(accumulators) = &self.accumulators else {
            return Ok(false);
        };
        if accumulators.len() != params.len() {
            return Ok(false);
        }
        for (acc, param) in accumulators.iter().zip(params) {
            if store.get(*acc)?.shape() != store.get(*param)?.shape() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Default for RMSprop {
    fn default() -> Self {
        Self::new(0.001, 0.99, 1e-8)
    }
}

impl TraitOptimizer for RMSprop {
    fn build(&mut self, store: &mut SharedStore, params: &[SharedId]) -> Result<(), ModelError> {
        let values = self.hyperparameter_values();
        store_hyperparameters(store, &mut self.hyper_slots, &values)?;
        if self.can_reuse(store, params)? {
            return self.reset(store);
        }
        let accumulators = params
            .iter()
            .map(|param| {
                let shape = store.get(*param)?.shape().to_vec();
                Ok(store.register(Tensor::zeros(&shape)))
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        self.accumulators = Some(accumulators);
        Ok(())
    }

    fn get_updates(
        &self,
        graph: &mut Graph,
        params: &[NodeId],
        loss: NodeId,
    ) -> Result<Vec<Update>, ModelError> {
        let accumulators = self
            .accumulators
            .as_ref()
            .ok_or(ModelError::OptimizerNotBuilt)?;
        if accumulators.len() != params.len() {
            return Err(ModelError::ParamStructureMismatch(format!(
                "RMSprop持有{}个累积量，但收到{}个参数",
                accumulators.len(),
                params.len()
            )));
        }

        let grads = gradients(graph, params, loss)?;
        let hyper = hyperparameter_nodes(
            graph,
            self.hyper_slots.as_deref(),
            &self.hyperparameter_values(),
        );
        let (lr, momentum, epsilon) = (hyper[0], hyper[1], hyper[2]);
        let one = graph.new_scalar_node(1.0);
        let one_minus_momentum = graph.new_subtract_node(one, momentum)?;

        let mut updates = Vec::with_capacity(params.len() * 2);
        for ((param, grad), acc) in params.iter().zip(grads).zip(accumulators) {
            let acc = graph.new_shared_node(*acc);
            // acc_new = momentum * acc + (1 - momentum) * g²
            let decayed = graph.new_multiply_node(momentum, acc)?;
            let grad_sq = graph.new_square_node(grad)?;
            let fresh = graph.new_multiply_node(one_minus_momentum, grad_sq)?;
            let new_acc = graph.new_add_node(decayed, fresh)?;
            // θ_new = θ - lr * g / sqrt(acc_new + eps)
            let shifted = graph.new_add_node(new_acc, epsilon)?;
            let denom = graph.new_sqrt_node(shifted)?;
            let scaled = graph.new_divide_node(grad, denom)?;
            let step = graph.new_multiply_node(lr, scaled)?;
            let new_param = graph.new_subtract_node(*param, step)?;

            updates.push(Update::new(acc, new_acc));
            updates.push(Update::new(*param, new_param));
        }
        Ok(updates)
    }

    fn reset(&mut self, store: &mut SharedStore) -> Result<(), ModelError> {
        for acc in self.accumulators.iter().flatten() {
            let shape = store.get(*acc)?.shape().to_vec();
            store.set_value(*acc, &Tensor::zeros(&shape))?;
        }
        Ok(())
    }

    fn hyperparameter(&self, name: &str) -> Result<f32, ModelError> {
        match name {
            "lr" | "learning_rate" => Ok(self.lr),
            "momentum" | "rho" => Ok(self.momentum),
            "eps" | "epsilon" => Ok(self.epsilon),
            _ => Err(ModelError::UnknownHyperparameter(name.to_string())),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, value: f32) -> Result<(), ModelError> {
        let slot = match name {
            "lr" | "learning_rate" => &mut self.lr,
            "momentum" | "rho" => &mut self.momentum,
            "eps" | "epsilon" => &mut self.epsilon,
            _ => return Err(ModelError::UnknownHyperparameter(name.to_string())),
        };
        *slot = value;
        Ok(())
    }

    fn sync_hyperparameters(&self, store: &mut SharedStore) -> Result<(), ModelError> {
        write_hyperparameters(
            store,
            self.hyper_slots.as_deref(),
            &self.hyperparameter_values(),
        )
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }
}
