//! # deepreg_models
//!
//! Histone-mark signal classifiers for deepreg-rs.
//!
//! ## Models
//! - [`KimNet`] - EP-DNN multilayer perceptron (input-600-500-400-output)
//! - [`ConvNet`] - Four-stage 1-D convolutional network with a pooled head
//!
//! Both models return natural-log class probabilities and optionally
//! average the forward strand with its reverse complement through the same
//! parameters. `Config::init` applies [`init::init_weights`] to every layer:
//! Kaiming uniform for convolutions, Kaiming normal for linear layers, and
//! zero biases.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deepreg_models::{ConvNetConfig, KimNetConfig};
//!
//! let kimnet = KimNetConfig::new(20, 3, 5).init::<NdArray>(&device);
//! let convnet = ConvNetConfig::new(3, 5).init::<NdArray>(&device)?;
//!
//! let log_probs = convnet.forward(forward_strand, Some(reverse_strand));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convnet;
pub mod init;
pub mod kimnet;
pub mod registry;
pub mod traits;

pub use convnet::{ConvNet, ConvNetConfig, ConvStage};
pub use init::{init_weights, InitScheme, LayerKind, LayerMut, VisitLayers};
pub use kimnet::{KimNet, KimNetConfig, KIMNET_DROPOUT, KIMNET_HIDDEN_SIZES};
pub use registry::{default_registry, ClassifierRegistry, RegistryError};
