//! Signal window shape metadata.

use serde::{Deserialize, Serialize};

/// Shape of a batch of histone-mark signal windows, `(B, M, L)`:
/// batch size, histone marks (channels) and window length in bins.
///
/// # Example
///
/// ```rust
/// use deepreg_core::SignalShape;
///
/// let shape = SignalShape::from([4, 3, 128]);
/// assert_eq!(shape.marks(), 3);
/// assert_eq!(shape.to_string(), "(B=4, M=3, L=128)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalShape {
    batch: usize,
    marks: usize,
    len: usize,
}

impl SignalShape {
    /// Number of histone marks.
    #[must_use]
    pub const fn marks(&self) -> usize {
        self.marks
    }
}

impl std::fmt::Display for SignalShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(B={}, M={}, L={})", self.batch, self.marks, self.len)
    }
}

impl From<[usize; 3]> for SignalShape {
    fn from([batch, marks, len]: [usize; 3]) -> Self {
        Self { batch, marks, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_tensor_dims() {
        let shape = SignalShape::from([4, 3, 128]);
        assert_eq!(shape.marks(), 3);
        assert_eq!(shape.to_string(), "(B=4, M=3, L=128)");
    }

    #[test]
    fn test_shape_serialization() {
        let shape = SignalShape::from([4, 3, 128]);
        let json = serde_json::to_string(&shape).unwrap();
        let restored: SignalShape = serde_json::from_str(&json).unwrap();
        assert_eq!(shape, restored);
    }
}
