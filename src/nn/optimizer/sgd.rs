/*
 * @Date         : 2026-02-06
 * @Description  : 梯度下降优化器实现
 */

use serde::{Deserialize, Serialize};

use super::{
    TraitOptimizer, gradients, hyperparameter_nodes, store_hyperparameters, write_hyperparameters,
};
use crate::nn::{Graph, ModelError, NodeId, SharedId, SharedStore, Update};

/// SGD (随机梯度下降) 优化器
///
/// θ = θ - α * ∇θ
///
/// 未`build`时学习率以常量进入计算图，之后的修改须重新编译才能生效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SGD {
    lr: f32,
    hyper_slots: Option<Vec<SharedId>>,
}

impl SGD {
    pub const fn new(lr: f32) -> Self {
        Self {
            lr,
            hyper_slots: None,
        }
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl TraitOptimizer for SGD {
    fn build(&mut self, store: &mut SharedStore, _params: &[SharedId]) -> Result<(), ModelError> {
        store_hyperparameters(store, &mut self.hyper_slots, &[self.lr])
    }

    fn get_updates(
        &self,
        graph: &mut Graph,
        params: &[NodeId],
        loss: NodeId,
    ) -> Result<Vec<Update>, ModelError> {
        let grads = gradients(graph, params, loss)?;
        let lr = hyperparameter_nodes(graph, self.hyper_slots.as_deref(), &[self.lr])[0];
        let mut updates = Vec::with_capacity(params.len());
        for (param, grad) in params.iter().zip(grads) {
            let step = graph.new_multiply_node(lr, grad)?;
            let new_param = graph.new_subtract_node(*param, step)?;
            updates.push(Update::new(*param, new_param));
        }
        Ok(updates)
    }

    fn reset(&mut self, _store: &mut SharedStore) -> Result<(), ModelError> {
        Ok(())
    }

    fn hyperparameter(&self, name: &str) -> Result<f32, ModelError> {
        match name {
            "lr" | "learning_rate" => Ok(self.lr),
            _ => Err(ModelError::UnknownHyperparameter(name.to_string())),
        }
    }

    fn set_hyperparameter(&mut self, name: &str, value: f32) -> Result<(), ModelError> {
        match name {
            "lr" | "learning_rate" => {
                self.lr = value;
                Ok(())
            }
            _ => Err(ModelError::UnknownHyperparameter(name.to_string())),
        }
    }

    fn sync_hyperparameters(&self, store: &mut SharedStore) -> Result<(), ModelError> {
        write_hyperparameters(store, self.hyper_slots.as_deref(), &[self.lr])
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }
}
