//! # deepreg_core
//!
//! Core types and traits for deepreg-rs histone-mark classifiers.
//!
//! This crate provides:
//! - [`SignalShape`] for signal window shape metadata
//! - [`StrandClassifier`] for models evaluated on forward and reverse strands
//! - Strand helpers ([`check_strands`], [`average_strands`])
//! - Error types and common utilities
//!
//! ## Shape Convention
//!
//! Signal windows follow the convention `(B, M, L)`:
//! - `B`: Batch size (number of genomic windows)
//! - `M`: Histone marks (channels)
//! - `L`: Window length in bins
//!
//! ## Example
//!
//! ```rust
//! use deepreg_core::{check_strands, SignalShape};
//!
//! let shape = SignalShape::from([4, 3, 128]);
//! assert_eq!(shape.marks(), 3);
//! assert!(check_strands(&[4, 3, 128], &[4, 3, 64]).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod model_trait;
mod shape;
mod strand;

pub use error::{CoreError, Result};
pub use model_trait::StrandClassifier;
pub use shape::SignalShape;
pub use strand::{average_strands, check_strands};

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
