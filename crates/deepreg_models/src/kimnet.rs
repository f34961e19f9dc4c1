//! KimNet: multilayer perceptron over flattened histone-mark windows.
//!
//! Based on EP-DNN, "Chromatin-state based enhancer prediction with deep
//! neural networks" by Kim et al. (2016). The network is a fixed
//! input-600-500-400-output MLP with softplus activations.

use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{softmax, softplus};
use deepreg_core::average_strands;
use serde::{Deserialize, Serialize};

use crate::init::{init_weights, LayerKind, LayerMut, VisitLayers};

/// Hidden layer widths.
pub const KIMNET_HIDDEN_SIZES: [usize; 3] = [600, 500, 400];

/// Dropout rate before the output layer.
pub const KIMNET_DROPOUT: f64 = 0.5;

/// Configuration for the KimNet model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KimNetConfig {
    /// Number of bins per window.
    pub bins: usize,
    /// Number of histone marks per bin.
    pub marks: usize,
    /// Number of output classes.
    pub n_classes: usize,
}

impl Default for KimNetConfig {
    fn default() -> Self {
        Self {
            bins: 20,
            marks: 3,
            n_classes: 5,
        }
    }
}

impl KimNetConfig {
    /// Create a new config with specified dimensions.
    pub fn new(bins: usize, marks: usize, n_classes: usize) -> Self {
        Self {
            bins,
            marks,
            n_classes,
        }
    }

    /// Set the number of bins.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the number of histone marks.
    #[must_use]
    pub fn with_marks(mut self, marks: usize) -> Self {
        self.marks = marks;
        self
    }

    /// Set the number of output classes.
    #[must_use]
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Flattened input width, `bins * marks`.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.bins * self.marks
    }

    /// Initialize the model with Kaiming weights and zero biases.
    pub fn init<B: Backend>(&self, device: &B::Device) -> KimNet<B> {
        let mut model = KimNet::new(self.clone(), device);
        model.visit_layers(&mut init_weights);
        tracing::debug!(config = ?self, "initialized KimNet");
        model
    }
}

/// KimNet: MLP classifier for histone-mark signal windows.
///
/// # Architecture
///
/// ```text
/// Input (B, bins, marks) -> flatten -> (B, bins * marks)
///       |
///       +---> Linear(600) -> Softplus
///       +---> Linear(500) -> Softplus
///       +---> Linear(400) -> Softplus -> Dropout(0.5)
///       +---> Linear(n_classes) -> Softmax
///       |
///       +---> [mean with reverse strand] -> ln -> Output (B, n_classes)
/// ```
///
/// # Example
///
/// ```rust,ignore
/// use deepreg_models::{KimNet, KimNetConfig};
///
/// let model = KimNetConfig::new(20, 3, 5).init::<NdArray>(&device);
///
/// let x = Tensor::random([4, 20, 3], Distribution::Normal(0.0, 1.0), &device);
/// let log_probs = model.forward(x, None);
/// // log_probs shape: [4, 5]
/// ```
#[derive(Module, Debug)]
pub struct KimNet<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    dropout: Dropout,
    head: Linear<B>,
    #[module(skip)]
    in_features: usize,
    #[module(skip)]
    n_classes: usize,
}

impl<B: Backend> KimNet<B> {
    /// Create a new KimNet model with the framework's default initialization.
    pub fn new(config: KimNetConfig, device: &B::Device) -> Self {
        let in_features = config.in_features();
        let [h1, h2, h3] = KIMNET_HIDDEN_SIZES;

        Self {
            fc1: LinearConfig::new(in_features, h1).init(device),
            fc2: LinearConfig::new(h1, h2).init(device),
            fc3: LinearConfig::new(h2, h3).init(device),
            dropout: DropoutConfig::new(KIMNET_DROPOUT).init(),
            head: LinearConfig::new(h3, config.n_classes).init(device),
            in_features,
            n_classes: config.n_classes,
        }
    }

    /// Number of output classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Forward pass.
    ///
    /// # Arguments
    ///
    /// * `forward` - Forward strand windows, any shape with `bins * marks`
    ///   elements per sample, e.g. (batch, bins, marks) or (batch, bins * marks)
    /// * `reverse` - Optional reverse strand windows with the same shape
    ///
    /// # Returns
    ///
    /// Log-probabilities of shape (batch, n_classes)
    ///
    /// # Panics
    ///
    /// Panics if the strands differ in shape or the element count is not a
    /// multiple of `bins * marks`.
    pub fn forward<const D: usize>(&self, forward: Tensor<B, D>, reverse: Option<Tensor<B, D>>) -> Tensor<B, 2> {
        let probs = match reverse {
            Some(reverse) => {
                assert_eq!(
                    forward.dims(),
                    reverse.dims(),
                    "reverse strand must have the forward strand's shape"
                );
                average_strands(self.strand_probs(forward), self.strand_probs(reverse))
            }
            None => self.strand_probs(forward),
        };
        probs.log()
    }

    /// Class probabilities for a single strand.
    pub fn strand_probs<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, 2> {
        let numel = x.shape().num_elements();
        assert!(
            numel % self.in_features == 0,
            "input with {} elements cannot be flattened to rows of {} features",
            numel,
            self.in_features
        );
        let out = x.reshape([numel / self.in_features, self.in_features]);

        let out = softplus(self.fc1.forward(out), 1.0);
        let out = softplus(self.fc2.forward(out), 1.0);
        let out = softplus(self.fc3.forward(out), 1.0);
        let out = self.dropout.forward(out);

        softmax(self.head.forward(out), 1)
    }
}

impl<B: Backend> VisitLayers<B> for KimNet<B> {
    fn visit_layers<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(LayerMut<'_, B>),
    {
        visitor(LayerMut::Linear(&mut self.fc1));
        visitor(LayerMut::Parameterless(LayerKind::Activation));
        visitor(LayerMut::Linear(&mut self.fc2));
        visitor(LayerMut::Parameterless(LayerKind::Activation));
        visitor(LayerMut::Linear(&mut self.fc3));
        visitor(LayerMut::Parameterless(LayerKind::Activation));
        visitor(LayerMut::Parameterless(LayerKind::Dropout));
        visitor(LayerMut::Linear(&mut self.head));
    }
}
