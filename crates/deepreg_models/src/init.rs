//! Weight initialization by layer kind.
//!
//! Models expose their layers through [`VisitLayers`] as tagged
//! [`LayerMut`] borrows. [`init_weights`] is the per-layer visitor applied at
//! construction: convolutions get Kaiming uniform weights, linear layers get
//! Kaiming normal weights, and both get zero biases. Every other layer keeps
//! its framework-default parameters.
//!
//! # Example
//!
//! ```rust,ignore
//! use deepreg_models::init::{init_weights, VisitLayers};
//!
//! let mut model = ConvNet::<NdArray>::new(ConvNetConfig::default(), &device)?;
//! model.visit_layers(&mut init_weights);
//! ```

use burn::module::Param;
use burn::nn::{conv::Conv1d, BatchNorm, Initializer, Linear};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// Gain for rectifier activations, `sqrt(2)`.
const RELU_GAIN: f64 = std::f64::consts::SQRT_2;

/// Category of a layer inside a classifier pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// 1-D convolution.
    Conv1d,
    /// Fully-connected layer.
    Linear,
    /// Batch normalization.
    BatchNorm,
    /// Max or adaptive average pooling.
    Pool,
    /// Parameterless nonlinearity.
    Activation,
    /// Dropout regularizer.
    Dropout,
}

/// Initialization strategy for a layer's weight tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitScheme {
    /// He/Kaiming uniform, fan-in mode, rectifier gain.
    KaimingUniform,
    /// He/Kaiming normal, fan-in mode, rectifier gain.
    KaimingNormal,
}

impl InitScheme {
    /// Strategy used for a given layer kind, `None` for layers left at
    /// their default initialization.
    #[must_use]
    pub const fn for_kind(kind: LayerKind) -> Option<Self> {
        match kind {
            LayerKind::Conv1d => Some(Self::KaimingUniform),
            LayerKind::Linear => Some(Self::KaimingNormal),
            LayerKind::BatchNorm | LayerKind::Pool | LayerKind::Activation | LayerKind::Dropout => None,
        }
    }

    /// Burn initializer implementing this scheme.
    #[must_use]
    pub fn initializer(&self) -> Initializer {
        match self {
            Self::KaimingUniform => Initializer::KaimingUniform {
                gain: RELU_GAIN,
                fan_out_only: false,
            },
            Self::KaimingNormal => Initializer::KaimingNormal {
                gain: RELU_GAIN,
                fan_out_only: false,
            },
        }
    }
}

/// Mutable borrow of one layer, tagged by kind.
#[derive(Debug)]
pub enum LayerMut<'a, B: Backend> {
    /// 1-D convolution.
    Conv1d(&'a mut Conv1d<B>),
    /// Fully-connected layer.
    Linear(&'a mut Linear<B>),
    /// Batch normalization.
    BatchNorm(&'a mut BatchNorm<B, 1>),
    /// A layer without learnable parameters.
    Parameterless(LayerKind),
}

impl<B: Backend> LayerMut<'_, B> {
    /// Kind of the borrowed layer.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Conv1d(_) => LayerKind::Conv1d,
            Self::Linear(_) => LayerKind::Linear,
            Self::BatchNorm(_) => LayerKind::BatchNorm,
            Self::Parameterless(kind) => *kind,
        }
    }
}

/// Models whose layers can be visited one at a time, in pipeline order.
pub trait VisitLayers<B: Backend> {
    /// Call `visitor` once for every constituent layer.
    fn visit_layers<F>(&mut self, visitor: &mut F)
    where
        F: FnMut(LayerMut<'_, B>);
}

/// Re-initialize a single layer in place according to its kind.
///
/// Parameter ids are kept, so records and optimizer state still line up.
pub fn init_weights<B: Backend>(layer: LayerMut<'_, B>) {
    let kind = layer.kind();
    let Some(scheme) = InitScheme::for_kind(kind) else {
        return;
    };
    tracing::trace!(?kind, ?scheme, "initializing layer");

    match layer {
        LayerMut::Conv1d(conv) => {
            // Weight layout: [out_channels, in_channels / groups, kernel_size]
            let [out_channels, in_per_group, kernel_size] = conv.weight.dims();
            let fan_in = in_per_group * kernel_size;
            let fan_out = out_channels * kernel_size;
            conv.weight = reinit(&conv.weight, scheme.initializer(), Some(fan_in), Some(fan_out));
            conv.bias = conv.bias.as_ref().map(zeroed);
        }
        LayerMut::Linear(linear) => {
            // Weight layout: [d_input, d_output]
            let [d_input, d_output] = linear.weight.dims();
            linear.weight = reinit(&linear.weight, scheme.initializer(), Some(d_input), Some(d_output));
            linear.bias = linear.bias.as_ref().map(zeroed);
        }
        LayerMut::BatchNorm(_) | LayerMut::Parameterless(_) => {}
    }
}

fn reinit<B: Backend, const D: usize>(
    param: &Param<Tensor<B, D>>,
    initializer: Initializer,
    fan_in: Option<usize>,
    fan_out: Option<usize>,
) -> Param<Tensor<B, D>> {
    let device = param.device();
    let value: Param<Tensor<B, D>> = initializer.init_with(param.shape(), fan_in, fan_out, &device);
    Param::initialized(param.id, value.val())
}

fn zeroed<B: Backend, const D: usize>(param: &Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
    reinit(param, Initializer::Zeros, None, None)
}
