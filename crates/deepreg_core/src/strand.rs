//! Forward/reverse strand combination.
//!
//! A signal window can be evaluated on both DNA strands: the caller supplies
//! the reverse-complement window already aligned to the forward one, and the
//! classifiers average the two class distributions.

use burn::prelude::*;

use crate::error::{CoreError, Result};

/// Check that a reverse strand tensor has exactly the forward strand's shape.
///
/// # Errors
///
/// Returns [`CoreError::ShapeMismatch`] when the dimensions differ.
pub fn check_strands(forward: &[usize], reverse: &[usize]) -> Result<()> {
    if forward == reverse {
        Ok(())
    } else {
        Err(CoreError::ShapeMismatch {
            forward: forward.to_vec(),
            reverse: reverse.to_vec(),
        })
    }
}

/// Elementwise mean of the forward and reverse strand distributions.
///
/// Both inputs must already be probabilities; the mean of two distributions
/// is again a distribution.
pub fn average_strands<B: Backend, const D: usize>(
    forward: Tensor<B, D>,
    reverse: Tensor<B, D>,
) -> Tensor<B, D> {
    forward.add(reverse).div_scalar(2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_check_strands() {
        assert!(check_strands(&[4, 3, 128], &[4, 3, 128]).is_ok());

        match check_strands(&[4, 3, 128], &[4, 3, 64]) {
            Err(CoreError::ShapeMismatch { forward, reverse }) => {
                assert_eq!(forward, vec![4, 3, 128]);
                assert_eq!(reverse, vec![4, 3, 64]);
            }
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_average_identical_strands() {
        let device = Default::default();
        let probs = Tensor::<TestBackend, 2>::from_floats([[0.2, 0.3, 0.5], [0.9, 0.05, 0.05]], &device);

        let averaged = average_strands(probs.clone(), probs.clone());
        let diff: f32 = (averaged - probs).abs().max().into_scalar().elem();
        assert!(diff < 1e-7);
    }

    #[test]
    fn test_average_keeps_distribution() {
        let device = Default::default();
        let forward = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0], [0.25, 0.75]], &device);
        let reverse = Tensor::<TestBackend, 2>::from_floats([[0.0, 1.0], [0.75, 0.25]], &device);

        let averaged = average_strands(forward, reverse);
        let expected = Tensor::<TestBackend, 2>::from_floats([[0.5, 0.5], [0.5, 0.5]], &device);
        let diff: f32 = (averaged.clone() - expected).abs().max().into_scalar().elem();
        assert!(diff < 1e-7);

        let sums = averaged.sum_dim(1);
        let diff: f32 = (sums - Tensor::<TestBackend, 2>::ones([2, 1], &device)).abs().max().into_scalar().elem();
        assert!(diff < 1e-6);
    }
}
