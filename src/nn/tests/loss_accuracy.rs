use approx::assert_abs_diff_eq;

use crate::nn::{
    Accuracy, Binary, Crossentropy, Function, Graph, Loss, MeanSquaredError, SharedStore,
    TraitAccuracy, TraitLoss,
};
use crate::tensor::Tensor;

fn eval_loss(loss: &Loss, y_hat: &Tensor, y: &Tensor) -> f32 {
    let mut graph = Graph::new();
    let p = graph.new_input_node();
    let t = graph.new_input_node();
    let node = loss.get_loss(&mut graph, p, t).unwrap();
    let f = Function::new(&graph, &[p, t], &[node], &[]).unwrap();
    f.call_pure(&graph, &SharedStore::new(), &[y_hat, y]).unwrap()[0]
        .number()
        .unwrap()
}

#[test]
fn test_crossentropy() {
    let y_hat = Tensor::new(&[0.5, 0.5, 0.9, 0.1], &[2, 2, 1, 1]);
    let y = Tensor::new(&[1.0, 0.0, 1.0, 0.0], &[2, 2, 1, 1]);
    let expected = -(0.5_f32.ln() + 0.9_f32.ln()) / 2.0;
    assert_abs_diff_eq!(eval_loss(&Loss::default(), &y_hat, &y), expected, epsilon = 1e-6);
}

#[test]
fn test_crossentropy_is_clipped() {
    // 预测为0时不会得到无穷大
    let y_hat = Tensor::new(&[0.0, 1.0], &[1, 2]);
    let y = Tensor::new(&[1.0, 0.0], &[1, 2]);
    let loss = eval_loss(&Crossentropy::new(0.0).into(), &y_hat, &y);
    assert!(loss.is_finite());
    assert_abs_diff_eq!(loss, -(1e-7_f32.ln()), epsilon = 1e-3);
}

#[test]
fn test_mean_squared_error() {
    let y_hat = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[4]);
    let y = Tensor::new(&[1.0, 0.0, 3.0, 2.0], &[4]);
    assert_abs_diff_eq!(
        eval_loss(&MeanSquaredError::default().into(), &y_hat, &y),
        2.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_l2_penalty_in_train_loss() {
    let mut store = SharedStore::new();
    let w_id = store.register(Tensor::new(&[1.0, 2.0], &[2]));
    let mut graph = Graph::new();
    let p = graph.new_input_node();
    let t = graph.new_input_node();
    let w = graph.new_shared_node(w_id);
    let loss: Loss = MeanSquaredError::new(0.1).into();
    let train = loss.get_train_loss(&mut graph, p, t, &[w]).unwrap();
    let test = loss.get_loss(&mut graph, p, t).unwrap();

    let f = Function::new(&graph, &[p, t], &[train, test], &[]).unwrap();
    let y_hat = Tensor::zeros(&[2]);
    let y = Tensor::ones(&[2]);
    let out = f.call_pure(&graph, &store, &[&y_hat, &y]).unwrap();
    // 1 + 0.1 * (1 + 4)
    assert_abs_diff_eq!(out[0].number().unwrap(), 1.5, epsilon = 1e-6);
    assert_abs_diff_eq!(out[1].number().unwrap(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_accuracies() {
    let mut graph = Graph::new();
    let p = graph.new_input_node();
    let t = graph.new_input_node();
    let categorical = Accuracy::default().get_accuracy(&mut graph, p, t).unwrap();
    let binary = Accuracy::from(Binary::default())
        .get_accuracy(&mut graph, p, t)
        .unwrap();
    let f = Function::new(&graph, &[p, t], &[categorical, binary], &[]).unwrap();

    let y_hat = Tensor::new(&[0.8, 0.2, 0.3, 0.7], &[2, 2, 1, 1]);
    let y = Tensor::new(&[1.0, 0.0, 1.0, 0.0], &[2, 2, 1, 1]);
    let out = f.call_pure(&graph, &SharedStore::new(), &[&y_hat, &y]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(out[1].number().unwrap(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_binary_accuracy_threshold() {
    let mut graph = Graph::new();
    let p = graph.new_input_node();
    let t = graph.new_input_node();
    let strict = Accuracy::from(Binary { threshold: 0.75 })
        .get_accuracy(&mut graph, p, t)
        .unwrap();
    let f = Function::new(&graph, &[p, t], &[strict], &[]).unwrap();

    // 阈值0.75下只有0.8判为正类，标签以0.5为界
    let y_hat = Tensor::new(&[0.8, 0.6, 0.1, 0.9], &[4, 1]);
    let y = Tensor::new(&[0.9, 0.0, 0.2, 1.0], &[4, 1]);
    let out = f.call_pure(&graph, &SharedStore::new(), &[&y_hat, &y]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 1.0, epsilon = 1e-6);

    let y = Tensor::new(&[0.0, 1.0, 0.0, 0.0], &[4, 1]);
    let out = f.call_pure(&graph, &SharedStore::new(), &[&y_hat, &y]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 0.25, epsilon = 1e-6);
}
