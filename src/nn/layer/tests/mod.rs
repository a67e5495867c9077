mod activation;
mod fully_connected;

use crate::nn::{Function, Graph, Layer, LayerBinding, SharedStore, TraitLayer};
use crate::tensor::Tensor;

/// 单独求一层的输出：参数与状态取初始值，执行该层产生的全部副作用更新。
/// 返回（输出，更新条数，执行更新后的状态）
pub(super) fn run_layer(layer: &Layer, x: &Tensor, is_test: bool) -> (Tensor, usize, Vec<Tensor>) {
    let mut store = SharedStore::new();
    let params = layer
        .get_init_params(x.shape())
        .unwrap()
        .unwrap_or_default()
        .into_iter()
        .map(|p| store.register(p))
        .collect::<Vec<_>>();
    let state = layer
        .get_init_state(x.shape())
        .unwrap()
        .unwrap_or_default()
        .into_iter()
        .map(|s| store.register(s))
        .collect::<Vec<_>>();

    let mut graph = Graph::new();
    let input = graph.new_input_node();
    let param_nodes = params
        .iter()
        .map(|id| graph.new_shared_node(*id))
        .collect::<Vec<_>>();
    let state_nodes = state
        .iter()
        .map(|id| graph.new_shared_node(*id))
        .collect::<Vec<_>>();
    let binding = LayerBinding {
        params: &param_nodes,
        state: &state_nodes,
    };
    let output = layer.get_output(&mut graph, input, &binding, is_test).unwrap();

    let f = Function::new(&graph, &[input], &[output.output], &output.updates).unwrap();
    let value = f.call(&graph, &mut store, &[x]).unwrap().remove(0);
    let state_values = state
        .iter()
        .map(|id| store.get(*id).unwrap().clone())
        .collect();
    (value, output.updates.len(), state_values)
}
