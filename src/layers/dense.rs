//! Dense (fully connected) layer implementation
//!
//! Performs `y = W·[x; 1]` where `W` is a row-major
//! `output_size × (input_size + 1)` matrix whose last column holds the biases.
//! The caller appends the constant 1.0 to the input vector; this layer never
//! inserts it.

use crate::utils::sgemv;

/// Dense (fully connected) layer.
///
/// # Example
///
/// ```
/// use cnn_inference::layers::DenseLayer;
///
/// let layer = DenseLayer::new(72, 128);
/// assert_eq!(layer.weight_count(), 128 * 73);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
}

impl DenseLayer {
    /// # Arguments
    ///
    /// * `input_size` - Number of input features, bias excluded
    /// * `output_size` - Number of output features
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
        }
    }

    /// Get the input size of the layer (bias excluded).
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the output size of the layer.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Length of the weight matrix: `output_size × (input_size + 1)`.
    pub fn weight_count(&self) -> usize {
        self.output_size * (self.input_size + 1)
    }

    /// Matrix-vector multiply over a bias-augmented input.
    ///
    /// `input` must hold `input_size + 1` values, the last being 1.0.
    /// Returns the number of outputs written.
    pub fn forward(&self, weights: &[f32], input: &[f32], output: &mut [f32]) -> usize {
        debug_assert_eq!(
            input.get(self.input_size).copied(),
            Some(1.0),
            "dense input is missing its bias element"
        );
        sgemv(self.output_size, self.input_size + 1, weights, input, output);
        self.output_size
    }
}
