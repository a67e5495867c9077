
use crate::nn::{Function, Graph, NodeId, SharedId, SharedStore, TraitOptimizer, Update};
use crate::tensor::Tensor;

/// `loss = sum(x * w)`：对`w`的梯度即为输入`x`
pub(super) struct LinearProblem {
    pub store: SharedStore,
    pub graph: Graph,
    pub w_id: SharedId,
    pub x: NodeId,
    pub w: NodeId,
    pub loss: NodeId,
}

impl LinearProblem {
    pub fn new(w: Tensor) -> Self {
        let mut store = SharedStore::new();
        let w_id = store.register(w);
        let mut graph = Graph::new();
        let x = graph.new_input_node();
        let w = graph.new_shared_node(w_id);
        let xw = graph.new_multiply_node(x, w).unwrap();
        let loss = graph.new_sum_node(xw).unwrap();
        Self {
            store,
            graph,
            w_id,
            x,
            w,
            loss,
        }
    }

    /// 用给定优化器构建更新并以`x`执行一步，返回更新列表
    pub fn step(&mut self, optimizer: &mut impl TraitOptimizer, x: &Tensor) -> Vec<Update> {
        optimizer.build(&mut self.store, &[self.w_id]).unwrap();
        let updates = optimizer
            .get_updates(&mut self.graph, &[self.w], self.loss)
            .unwrap();
        let f = Function::new(&self.graph, &[self.x], &[self.loss], &updates).unwrap();
        f.call(&self.graph, &mut self.store, &[x]).unwrap();
        updates
    }

    pub fn w_value(&self) -> Tensor {
        self.store.get(self.w_id).unwrap().clone()
    }
}
