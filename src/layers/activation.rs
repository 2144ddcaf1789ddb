//! Leaky rectifier layer.

use crate::utils::leaky_relu_inplace;

/// In-place leaky rectifier with a per-layer leak coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyReluLayer {
    alpha: f32,
}

impl LeakyReluLayer {
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    /// Slope applied to non-positive inputs.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Apply to the first `count` values of `data`.
    pub fn forward(&self, data: &mut [f32], count: usize) {
        leaky_relu_inplace(&mut data[..count], self.alpha);
    }
}
