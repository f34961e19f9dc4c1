//! Error types for deepreg_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors raised by classifier construction and evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The classifier head needs at least two classes.
    #[error("class count must be at least 2, got {got}")]
    InvalidClassCount {
        /// Configured number of classes.
        got: usize,
    },

    /// Forward and reverse strand tensors differ in shape.
    #[error("Shape mismatch: forward strand {forward:?}, reverse strand {reverse:?}")]
    ShapeMismatch {
        /// Forward strand dimensions.
        forward: Vec<usize>,
        /// Reverse strand dimensions.
        reverse: Vec<usize>,
    },
}
