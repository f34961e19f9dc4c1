//! Classifier trait shared by the histone-mark models.

use burn::prelude::*;

use crate::error::Result;
use crate::strand::check_strands;

/// Trait for classifiers evaluated on one or both DNA strands.
///
/// Implementations run the reverse strand, when given, through the same
/// parameters as the forward strand and average the two distributions.
/// The trait is object safe so models can be handed out as
/// `Box<dyn StrandClassifier<B>>`.
pub trait StrandClassifier<B: Backend> {
    /// Forward pass returning log-probabilities.
    ///
    /// # Arguments
    ///
    /// * `forward` - Forward strand signal windows
    /// * `reverse` - Optional reverse-complement windows, same shape as `forward`
    ///
    /// # Returns
    ///
    /// Log-probability tensor of shape (batch, n_classes)
    ///
    /// # Panics
    ///
    /// Panics when the strands differ in shape or the windows do not fit the
    /// configured model dimensions.
    fn forward(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Tensor<B, 2>;

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Like [`forward`](Self::forward), but reports a strand shape mismatch
    /// as an error instead of panicking.
    fn try_forward(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Result<Tensor<B, 2>> {
        if let Some(reverse) = &reverse {
            check_strands(&forward.dims(), &reverse.dims())?;
        }
        Ok(self.forward(forward, reverse))
    }

    /// Forward pass returning probabilities.
    fn forward_probs(&self, forward: Tensor<B, 3>, reverse: Option<Tensor<B, 3>>) -> Tensor<B, 2> {
        self.forward(forward, reverse).exp()
    }
}
