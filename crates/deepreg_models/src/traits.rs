//! [`StrandClassifier`] implementations for the model zoo.

use burn::prelude::*;
use deepreg_core::StrandClassifier;

use crate::{ConvNet, KimNet};

impl<B: Backend> StrandClassifier<B> for KimNet<B> {
    fn forward(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Tensor<B, 2> {
        KimNet::forward(self, forward, reverse)
    }

    fn n_classes(&self) -> usize {
        KimNet::n_classes(self)
    }

    fn name(&self) -> &str {
        "KimNet"
    }
}

impl<B: Backend> StrandClassifier<B> for ConvNet<B> {
    fn forward(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Tensor<B, 2> {
        ConvNet::forward(self, forward, reverse)
    }

    fn n_classes(&self) -> usize {
        ConvNet::n_classes(self)
    }

    fn name(&self) -> &str {
        "ConvNet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConvNetConfig, KimNetConfig};
    use burn_ndarray::NdArray;
    use deepreg_core::CoreError;

    type TestBackend = NdArray;

    #[test]
    fn test_try_forward_rejects_mismatch() {
        let device = Default::default();
        let model: Box<dyn StrandClassifier<TestBackend>> =
            Box::new(ConvNetConfig::default().init::<TestBackend>(&device).unwrap());

        let fwd = Tensor::<TestBackend, 3>::zeros([2, 3, 64], &device);
        let rev = Tensor::<TestBackend, 3>::zeros([2, 3, 60], &device);
        assert!(matches!(model.try_forward(fwd, Some(rev)), Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_forward_probs_through_trait() {
        let device = Default::default();
        let model: Box<dyn StrandClassifier<TestBackend>> =
            Box::new(KimNetConfig::default().init::<TestBackend>(&device));

        let x = Tensor::<TestBackend, 3>::ones([3, 20, 3], &device);
        let probs = model.forward_probs(x.clone(), Some(x));

        assert_eq!(probs.dims(), [3, model.n_classes()]);
        let min: f32 = probs.min().into_scalar().elem();
        assert!(min >= 0.0);
        assert_eq!(model.name(), "KimNet");
    }
}
