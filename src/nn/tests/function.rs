use crate::nn::{Function, Graph, SharedStore, Update};
use crate::tensor::Tensor;

#[test]
fn test_updates_are_simultaneous() {
    // a <- b 与 b <- a 基于同一份快照求值，结果是交换
    let mut store = SharedStore::new();
    let a_id = store.register(Tensor::scalar(1.0));
    let b_id = store.register(Tensor::scalar(2.0));
    let mut graph = Graph::new();
    let a = graph.new_shared_node(a_id);
    let b = graph.new_shared_node(b_id);
    let sum = graph.new_add_node(a, b).unwrap();

    let f = Function::new(&graph, &[], &[sum], &[Update::new(a, b), Update::new(b, a)]).unwrap();
    let outputs = f.call(&graph, &mut store, &[]).unwrap();
    // 输出基于更新前的值
    assert_eq!(outputs[0].number(), Some(3.0));
    assert_eq!(store.get(a_id).unwrap().number(), Some(2.0));
    assert_eq!(store.get(b_id).unwrap().number(), Some(1.0));
}

#[test]
fn test_compiled_function_sees_new_values() {
    let mut store = SharedStore::new();
    let w_id = store.register(Tensor::new(&[1.0, 2.0], &[2]));
    let mut graph = Graph::new();
    let w = graph.new_shared_node(w_id);
    let total = graph.new_sum_node(w).unwrap();
    let f = Function::new(&graph, &[], &[total], &[]).unwrap();

    assert_eq!(f.call_pure(&graph, &store, &[]).unwrap()[0].number(), Some(3.0));
    store
        .set_value(w_id, &Tensor::new(&[10.0, 20.0], &[2]))
        .unwrap();
    assert_eq!(f.call_pure(&graph, &store, &[]).unwrap()[0].number(), Some(30.0));
}

#[test]
fn test_update_shape_is_checked_before_writing() {
    let mut store = SharedStore::new();
    let a_id = store.register(Tensor::ones(&[2]));
    let b_id = store.register(Tensor::ones(&[3]));
    let mut graph = Graph::new();
    let a = graph.new_shared_node(a_id);
    let b = graph.new_shared_node(b_id);
    let doubled = graph.new_add_node(a, a).unwrap();

    // a 的更新合法，b 的更新形状不对：整个调用失败且 a 不被写入
    let f = Function::new(
        &graph,
        &[],
        &[],
        &[Update::new(a, doubled), Update::new(b, doubled)],
    )
    .unwrap();
    assert!(f.call(&graph, &mut store, &[]).is_err());
    assert_eq!(store.get(a_id).unwrap(), &Tensor::ones(&[2]));
}

#[test]
fn test_invalid_function_declarations() {
    let mut store = SharedStore::new();
    let w_id = store.register(Tensor::ones(&[2]));
    let mut graph = Graph::new();
    let x = graph.new_input_node();
    let w = graph.new_shared_node(w_id);

    // 输入必须是占位节点
    assert!(Function::new(&graph, &[w], &[w], &[]).is_err());
    // 更新目标必须是共享节点
    assert!(Function::new(&graph, &[x], &[], &[Update::new(x, w)]).is_err());
    // 同一目标不能更新两次
    assert!(Function::new(&graph, &[], &[], &[Update::new(w, w), Update::new(w, w)]).is_err());
}

#[test]
fn test_call_pure_rejects_updates() {
    let mut store = SharedStore::new();
    let w_id = store.register(Tensor::ones(&[2]));
    let mut graph = Graph::new();
    let w = graph.new_shared_node(w_id);
    let f = Function::new(&graph, &[], &[w], &[Update::new(w, w)]).unwrap();
    assert!(f.has_updates());
    assert!(f.call_pure(&graph, &store, &[]).is_err());
    assert!(f.call(&graph, &mut store, &[]).is_ok());
}

#[test]
fn test_store_rejects_shape_change() {
    let mut store = SharedStore::new();
    let id = store.register(Tensor::zeros(&[2, 2]));
    assert!(store.set_value(id, &Tensor::zeros(&[4])).is_err());
    assert_eq!(store.len(), 1);
}
