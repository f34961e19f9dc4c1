//! Classifier registry for dynamic model creation.
//!
//! The registry creates classifiers by name from JSON configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use deepreg_models::registry::default_registry;
//! use serde_json::json;
//!
//! let registry = default_registry::<NdArray>();
//! let config = json!({
//!     "marks": 3,
//!     "n_classes": 5,
//!     "use_leaky_relu": true
//! });
//! let model = registry.create("ConvNet", &config, &device)?;
//! ```

use std::collections::HashMap;

use burn::tensor::backend::Backend;
use deepreg_core::{CoreError, StrandClassifier};
use serde_json::Value;
use thiserror::Error;

use crate::{ConvNetConfig, KimNetConfig};

/// Error type for classifier registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Model not found in registry.
    #[error("Model '{0}' not found in registry")]
    ModelNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model creation failed.
    #[error("Failed to create model: {0}")]
    CreationFailed(#[from] CoreError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

type Constructor<B> =
    Box<dyn Fn(&Value, &<B as Backend>::Device) -> Result<Box<dyn StrandClassifier<B>>> + Send + Sync>;

/// Named classifier constructors, built by [`default_registry`].
pub struct ClassifierRegistry<B: Backend> {
    models: HashMap<&'static str, Constructor<B>>,
}

impl<B: Backend> ClassifierRegistry<B> {
    fn register<F>(&mut self, name: &'static str, constructor: F)
    where
        F: Fn(&Value, &<B as Backend>::Device) -> Result<Box<dyn StrandClassifier<B>>>
            + Send
            + Sync
            + 'static,
    {
        self.models.insert(name, Box::new(constructor));
    }

    /// Create a model by name.
    ///
    /// # Arguments
    ///
    /// * `name` - The registered name of the model
    /// * `config` - JSON configuration for the model
    /// * `device` - The device to create the model on
    pub fn create(
        &self,
        name: &str,
        config: &Value,
        device: &<B as Backend>::Device,
    ) -> Result<Box<dyn StrandClassifier<B>>> {
        let constructor = self
            .models
            .get(name)
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?;
        let model = constructor(config, device)?;
        tracing::debug!(model = name, n_classes = model.n_classes(), "created classifier");
        Ok(model)
    }

    /// Registered model names, sorted.
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.models.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

// Missing keys fall back to the defaults; present keys must have the right type.

fn get_usize_or(config: &Value, key: &str, default: usize) -> Result<usize> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| RegistryError::InvalidConfig(format!("'{}' must be a non-negative integer", key))),
    }
}

fn get_bool_or(config: &Value, key: &str, default: bool) -> Result<bool> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| RegistryError::InvalidConfig(format!("'{}' must be a boolean", key))),
    }
}

/// Create a registry with both classifiers pre-registered.
///
/// # Available Models
///
/// - `KimNet` - keys `bins` (20), `marks` (3), `n_classes` (5)
/// - `ConvNet` - keys `marks` (3), `n_classes` (5), `use_leaky_relu` (false)
pub fn default_registry<B: Backend>() -> ClassifierRegistry<B> {
    let mut registry = ClassifierRegistry {
        models: HashMap::new(),
    };

    registry.register("KimNet", |config, device| {
        let defaults = KimNetConfig::default();
        let model_config = KimNetConfig::new(
            get_usize_or(config, "bins", defaults.bins)?,
            get_usize_or(config, "marks", defaults.marks)?,
            get_usize_or(config, "n_classes", defaults.n_classes)?,
        );

        Ok(Box::new(model_config.init::<B>(device)) as Box<dyn StrandClassifier<B>>)
    });

    registry.register("ConvNet", |config, device| {
        let defaults = ConvNetConfig::default();
        let model_config = ConvNetConfig::new(
            get_usize_or(config, "marks", defaults.marks)?,
            get_usize_or(config, "n_classes", defaults.n_classes)?,
        )
        .with_leaky_relu(get_bool_or(config, "use_leaky_relu", defaults.use_leaky_relu)?);

        Ok(Box::new(model_config.init::<B>(device)?) as Box<dyn StrandClassifier<B>>)
    });

    registry
}
