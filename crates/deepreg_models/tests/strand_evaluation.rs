//! Integration tests for strand evaluation in inference and training mode.
//!
//! Training mode is the autodiff backend: dropout is active and batch
//! normalization uses batch statistics.

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::tensor::Distribution;
use burn_autodiff::Autodiff;

use deepreg_core::backend::NdArray;
use deepreg_core::StrandClassifier;
use deepreg_models::{default_registry, ConvNet, ConvNetConfig, KimNetConfig, LayerMut, VisitLayers};

type InferBackend = NdArray;
type TrainBackend = Autodiff<NdArray>;

fn max_row_sum_error<B: Backend>(log_probs: Tensor<B, 2>) -> f32 {
    let [batch, _] = log_probs.dims();
    let sums = log_probs.exp().sum_dim(1);
    let ones = Tensor::<B, 2>::ones([batch, 1], &sums.device());
    (sums - ones).abs().max().into_scalar().elem()
}

#[test]
fn test_kimnet_scenario() {
    let device = Default::default();
    let model = KimNetConfig::new(20, 3, 5).init::<InferBackend>(&device);

    let x = Tensor::<InferBackend, 3>::random([4, 20, 3], Distribution::Normal(0.0, 1.0), &device);
    let out = model.forward(x, None);

    assert_eq!(out.dims(), [4, 5]);
    assert!(max_row_sum_error(out) < 1e-5);
}

#[test]
fn test_convnet_scenario() {
    let device = Default::default();
    let model = ConvNetConfig::new(3, 5).init::<InferBackend>(&device).unwrap();

    let x = Tensor::<InferBackend, 3>::random([4, 3, 128], Distribution::Normal(0.0, 1.0), &device);
    let out = model.forward(x, None);

    assert_eq!(out.dims(), [4, 5]);
    assert!(max_row_sum_error(out) < 1e-5);
}

#[test]
fn test_kimnet_training_mode_distribution() {
    let device = Default::default();
    let model = KimNetConfig::default().init::<TrainBackend>(&device);

    let fwd = Tensor::<TrainBackend, 3>::random([8, 20, 3], Distribution::Normal(0.0, 1.0), &device);
    let rev = fwd.clone().flip([1]);
    let out = model.forward(fwd, Some(rev));

    assert_eq!(out.dims(), [8, 5]);
    assert!(max_row_sum_error(out) < 1e-5);
}

#[test]
fn test_kimnet_dropout_only_in_training_mode() {
    let device = Default::default();
    let model = KimNetConfig::default().init::<TrainBackend>(&device);
    let x = Tensor::<TrainBackend, 3>::random([8, 20, 3], Distribution::Normal(0.0, 1.0), &device);

    let first = model.forward(x.clone(), None);
    let second = model.forward(x.clone(), None);
    let train_diff: f32 = (first - second).abs().max().into_scalar().elem();
    assert!(train_diff > 1e-4, "dropout left training passes identical");

    let model = model.valid();
    let x = x.inner();
    let first = model.forward(x.clone(), None);
    let second = model.forward(x, None);
    let eval_diff: f32 = (first - second).abs().max().into_scalar().elem();
    assert_eq!(eval_diff, 0.0);
}

#[test]
fn test_convnet_training_mode_distribution() {
    let device = Default::default();
    let model = ConvNetConfig::new(3, 4)
        .with_leaky_relu(true)
        .init::<TrainBackend>(&device)
        .unwrap();

    let fwd = Tensor::<TrainBackend, 3>::random([6, 3, 100], Distribution::Normal(0.0, 1.0), &device);
    let rev = fwd.clone().flip([2]);
    let out = model.forward(fwd, Some(rev));

    assert_eq!(out.dims(), [6, 4]);
    assert!(max_row_sum_error(out) < 1e-5);
}

#[test]
fn test_initialized_parameters_receive_gradients() {
    let device = Default::default();
    let mut model: ConvNet<TrainBackend> = ConvNetConfig::default().init(&device).unwrap();

    let x = Tensor::<TrainBackend, 3>::random([4, 3, 64], Distribution::Normal(0.0, 1.0), &device);
    let loss = model.forward(x.clone(), Some(x)).narrow(1, 0, 1).mean().neg();
    let grads = loss.backward();

    let mut conv_grads = Vec::new();
    model.visit_layers(&mut |layer: LayerMut<'_, TrainBackend>| {
        if let LayerMut::Conv1d(conv) = layer {
            conv_grads.push(conv.weight.grad(&grads).is_some());
            conv_grads.push(conv.bias.as_ref().and_then(|b| b.grad(&grads)).is_some());
        }
    });

    assert_eq!(conv_grads.len(), 10);
    assert!(conv_grads.iter().all(|has_grad| *has_grad));
}

#[test]
fn test_registry_models_agree_on_identical_strands() {
    let device = Default::default();
    let registry = default_registry::<InferBackend>();

    for (name, shape) in [("KimNet", [3, 20, 3]), ("ConvNet", [3, 3, 64])] {
        let model = registry.create(name, &serde_json::json!({}), &device).unwrap();
        let x = Tensor::<InferBackend, 3>::random(shape, Distribution::Normal(0.0, 1.0), &device);

        let single = model.forward(x.clone(), None);
        let both = model.try_forward(x.clone(), Some(x)).unwrap();
        let diff: f32 = (single - both).abs().max().into_scalar().elem();
        assert!(diff < 1e-5, "{} disagrees on identical strands", name);
    }
}
