//! 2D convolution layer executed as patch extraction followed by one GEMM.
//!
//! The layer holds only its shape parameters; the weights are a read-only view
//! into the shared parameter blob, laid out as a row-major
//! `filters × (kernel_size² · in_channels + 1)` matrix whose last column is the
//! bias.

use crate::layers::im2col::{im2col, PatchGeometry};
use crate::utils::sgemm;

/// 2D convolution with square kernels and symmetric zero-padding.
///
/// # Example
///
/// ```
/// use cnn_inference::layers::Conv2DLayer;
///
/// // 6 filters, 5x5 kernel, no padding
/// let layer = Conv2DLayer::new(6, 5, 0);
/// assert_eq!(layer.output_dims(16, 16), (12, 12));
/// assert_eq!(layer.weight_count(1), 6 * 26);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2DLayer {
    filters: usize,
    kernel_size: usize,
    padding: usize,
    stride: usize,
}

impl Conv2DLayer {
    /// Create a stride-1 convolution.
    ///
    /// # Arguments
    ///
    /// * `filters` - Number of output feature maps
    /// * `kernel_size` - Size of square kernel (e.g., 3 for 3×3)
    /// * `padding` - Zero-padding applied on every side
    pub fn new(filters: usize, kernel_size: usize, padding: usize) -> Self {
        Self {
            filters,
            kernel_size,
            padding,
            stride: 1,
        }
    }

    /// Same layer with a different stride.
    pub fn with_stride(self, stride: usize) -> Self {
        Self { stride, ..self }
    }

    /// Get the number of output channels (filters).
    pub fn filters(&self) -> usize {
        self.filters
    }

    /// Get the kernel size.
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Get the padding amount.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Get the stride.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Patch geometry for a `in_channels × height × width` input.
    pub fn geometry(&self, in_channels: usize, height: usize, width: usize) -> PatchGeometry {
        PatchGeometry {
            channels: in_channels,
            height,
            width,
            kernel_size: self.kernel_size,
            padding: self.padding,
            stride: self.stride,
        }
    }

    /// Output `(height, width)`: `(in + 2*padding - kernel_size) / stride + 1`.
    pub fn output_dims(&self, height: usize, width: usize) -> (usize, usize) {
        let g = self.geometry(1, height, width);
        (g.output_height(), g.output_width())
    }

    /// Length of the weight matrix, bias column included.
    pub fn weight_count(&self, in_channels: usize) -> usize {
        self.filters * (self.kernel_size * self.kernel_size * in_channels + 1)
    }

    /// Convolve one `in_channels × height × width` map.
    ///
    /// `patches` is caller-owned scratch of at least `geometry(..).len()` floats.
    /// Writes `filters × out_h × out_w` values to `output` and returns that count.
    #[allow(clippy::too_many_arguments)]
    pub fn forward(
        &self,
        input: &[f32],
        in_channels: usize,
        height: usize,
        width: usize,
        weights: &[f32],
        patches: &mut [f32],
        output: &mut [f32],
    ) -> usize {
        let geometry = self.geometry(in_channels, height, width);
        im2col(input, patches, &geometry);
        dense_convolution(weights, patches, self.filters, &geometry, output)
    }
}

/// Convolution as a single matrix multiply over an extracted patch matrix.
///
/// `weights` is `filters × geometry.rows()`, `patches` is
/// `geometry.rows() × geometry.columns()` as produced by
/// [`im2col`](crate::layers::im2col::im2col). The bias is applied by the
/// patch matrix's trailing row of ones.
///
/// Returns the number of output values (`filters × geometry.columns()`).
pub fn dense_convolution(
    weights: &[f32],
    patches: &[f32],
    filters: usize,
    geometry: &PatchGeometry,
    output: &mut [f32],
) -> usize {
    let m = filters;
    let n = geometry.columns();
    let k = geometry.rows();
    sgemm(m, n, k, weights, patches, output);
    m * n
}
