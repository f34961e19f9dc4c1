//! ConvNet: 1-D convolutional classifier for histone-mark signal windows.
//!
//! Four convolutional stages with batch normalization, two of which halve
//! the sequence with max pooling, followed by a global average pooling head
//! and a 1x1 convolution producing class scores.

use burn::nn::{
    conv::{Conv1d, Conv1dConfig},
    pool::{AdaptiveAvgPool1d, AdaptiveAvgPool1dConfig, MaxPool1d, MaxPool1dConfig},
    BatchNorm, BatchNormConfig, PaddingConfig1d,
};
use burn::prelude::*;
use burn::tensor::activation::{leaky_relu, relu, softmax};
use deepreg_core::{average_strands, CoreError, Result, SignalShape};
use serde::{Deserialize, Serialize};

use crate::init::{init_weights, LayerKind, LayerMut, VisitLayers};

/// Negative slope of the leaky rectifier.
const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Configuration for the ConvNet model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvNetConfig {
    /// Number of histone marks (input channels).
    pub marks: usize,
    /// Number of output classes, at least 2.
    pub n_classes: usize,
    /// Use LeakyReLU instead of ReLU.
    pub use_leaky_relu: bool,
}

impl Default for ConvNetConfig {
    fn default() -> Self {
        Self {
            marks: 3,
            n_classes: 5,
            use_leaky_relu: false,
        }
    }
}

impl ConvNetConfig {
    /// Create a new config with specified dimensions.
    pub fn new(marks: usize, n_classes: usize) -> Self {
        Self {
            marks,
            n_classes,
            ..Default::default()
        }
    }

    /// Enable or disable LeakyReLU activations.
    #[must_use]
    pub fn with_leaky_relu(mut self, use_leaky_relu: bool) -> Self {
        self.use_leaky_relu = use_leaky_relu;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidClassCount`] when `n_classes < 2`.
    pub fn validate(&self) -> Result<()> {
        if self.n_classes < 2 {
            return Err(CoreError::InvalidClassCount { got: self.n_classes });
        }
        Ok(())
    }

    /// Initialize the model with Kaiming weights and zero biases.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidClassCount`] when `n_classes < 2`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ConvNet<B>> {
        let mut model = ConvNet::new(self.clone(), device)?;
        model.visit_layers(&mut init_weights);
        tracing::debug!(config = ?self, "initialized ConvNet");
        Ok(model)
    }
}

/// Conv1d -> BatchNorm -> activation, optionally followed by a halving max pool.
#[derive(Module, Debug)]
pub struct ConvStage<B: Backend> {
    conv: Conv1d<B>,
    bn: BatchNorm<B, 1>,
    pool: Option<MaxPool1d>,
    #[module(skip)]
    use_leaky_relu: bool,
}

impl<B: Backend> ConvStage<B> {
    /// Create a new stage with `kernel_size / 2` padding on both sides.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        halve: bool,
        use_leaky_relu: bool,
        device: &B::Device,
    ) -> Self {
        let conv = Conv1dConfig::new(in_channels, out_channels, kernel_size)
            .with_padding(PaddingConfig1d::Explicit(kernel_size / 2))
            .init(device);
        let bn = BatchNormConfig::new(out_channels).init(device);
        let pool = halve.then(|| MaxPool1dConfig::new(2).with_stride(2).init());

        Self {
            conv,
            bn,
            pool,
            use_leaky_relu,
        }
    }

    /// Forward pass through the stage.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let out = self.bn.forward(self.conv.forward(x));
        let out = if self.use_leaky_relu {
            leaky_relu(out, LEAKY_RELU_SLOPE)
        } else {
            relu(out)
        };
        match &self.pool {
            Some(pool) => pool.forward(out),
            None => out,
        }
    }

    fn visit_layers<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(LayerMut<'_, B>),
    {
        visitor(LayerMut::Conv1d(&mut self.conv));
        visitor(LayerMut::BatchNorm(&mut self.bn));
        visitor(LayerMut::Parameterless(LayerKind::Activation));
        if self.pool.is_some() {
            visitor(LayerMut::Parameterless(LayerKind::Pool));
        }
    }
}

/// ConvNet: convolutional classifier for histone-mark signal windows.
///
/// Architecture:
/// - Conv1d(marks, 32, kernel=7) -> BatchNorm -> act
/// - Conv1d(32, 32, kernel=3) -> BatchNorm -> act -> MaxPool(2)
/// - Conv1d(32, 64, kernel=3) -> BatchNorm -> act
/// - Conv1d(64, 64, kernel=3) -> BatchNorm -> act -> MaxPool(2)
/// - Global Average Pooling -> Conv1d(64, n_classes, kernel=1) -> Softmax
///
/// where `act` is ReLU or LeakyReLU.
///
/// # Example
///
/// ```rust,ignore
/// use deepreg_models::{ConvNet, ConvNetConfig};
///
/// let model = ConvNetConfig::new(3, 5).init::<NdArray>(&device)?;
///
/// let x = Tensor::random([4, 3, 128], Distribution::Normal(0.0, 1.0), &device);
/// let log_probs = model.forward(x, None);
/// // log_probs shape: [4, 5]
/// ```
#[derive(Module, Debug)]
pub struct ConvNet<B: Backend> {
    stage1: ConvStage<B>,
    stage2: ConvStage<B>,
    stage3: ConvStage<B>,
    stage4: ConvStage<B>,
    gap: AdaptiveAvgPool1d,
    classifier: Conv1d<B>,
    #[module(skip)]
    marks: usize,
    #[module(skip)]
    n_classes: usize,
}

impl<B: Backend> ConvNet<B> {
    /// Create a new ConvNet model with the framework's default initialization.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidClassCount`] when `n_classes < 2`.
    pub fn new(config: ConvNetConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;
        let leaky = config.use_leaky_relu;

        Ok(Self {
            stage1: ConvStage::new(config.marks, 32, 7, false, leaky, device),
            stage2: ConvStage::new(32, 32, 3, true, leaky, device),
            stage3: ConvStage::new(32, 64, 3, false, leaky, device),
            stage4: ConvStage::new(64, 64, 3, true, leaky, device),
            gap: AdaptiveAvgPool1dConfig::new(1).init(),
            classifier: Conv1dConfig::new(64, config.n_classes, 1).init(device),
            marks: config.marks,
            n_classes: config.n_classes,
        })
    }

    /// Number of output classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Forward pass.
    ///
    /// # Arguments
    ///
    /// * `forward` - Forward strand windows of shape (batch, marks, seq_len)
    /// * `reverse` - Optional reverse strand windows with the same shape
    ///
    /// # Returns
    ///
    /// Log-probabilities of shape (batch, n_classes)
    ///
    /// # Panics
    ///
    /// Panics if the strands differ in shape or the channel count does not
    /// match the configured number of marks.
    pub fn forward(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Tensor<B, 2> {
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
        // Only the trailing length dimension is dropped, so a batch of one
        // keeps its batch axis.
        probs.log().squeeze::<2>(2)
    }

    /// Class probabilities for a single strand, shape (batch, n_classes, 1).
    pub fn strand_probs(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let shape = SignalShape::from(x.dims());
        assert_eq!(
            shape.marks(),
            self.marks,
            "expected {} histone marks, got input {}",
            self.marks,
            shape
        );

        let out = self.stage1.forward(x);
        let out = self.stage2.forward(out);
        let out = self.stage3.forward(out);
        let out = self.stage4.forward(out);

        let out = self.gap.forward(out);
        softmax(self.classifier.forward(out), 1)
    }
}

impl<B: Backend> VisitLayers<B> for ConvNet<B> {
    fn visit_layers<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(LayerMut<'_, B>),
    {
        self.stage1.visit_layers(visitor);
        self.stage2.visit_layers(visitor);
        self.stage3.visit_layers(visitor);
        self.stage4.visit_layers(visitor);
        visitor(LayerMut::Parameterless(LayerKind::Pool));
        visitor(LayerMut::Conv1d(&mut self.classifier));
    }
}
