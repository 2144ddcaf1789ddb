//! Patch extraction (im2col) for GEMM-based convolution.
//!
//! Unrolls every receptive field of a channel-major feature map into a column
//! of a matrix, so that a whole convolution layer becomes one matrix multiply.
//! A final row of constant 1.0 is appended so that the weight matrix's trailing
//! bias column is applied by the same multiply.

/// Geometry of one patch extraction.
///
/// The input map is `channels × height × width`; kernels are square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGeometry {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub kernel_size: usize,
    pub padding: usize,
    pub stride: usize,
}

impl PatchGeometry {
    /// Output height: `(height + 2*padding - kernel_size) / stride + 1`.
    ///
    /// Returns 0 when the kernel does not fit inside the padded input.
    pub fn output_height(&self) -> usize {
        output_extent(self.height, self.kernel_size, self.padding, self.stride)
    }

    /// Output width: `(width + 2*padding - kernel_size) / stride + 1`.
    pub fn output_width(&self) -> usize {
        output_extent(self.width, self.kernel_size, self.padding, self.stride)
    }

    /// Number of columns: one per output spatial position.
    pub fn columns(&self) -> usize {
        self.output_height() * self.output_width()
    }

    /// Number of rows, including the trailing bias row.
    pub fn rows(&self) -> usize {
        self.channels * self.kernel_size * self.kernel_size + 1
    }

    /// Total floats written by [`im2col`].
    pub fn len(&self) -> usize {
        self.rows() * self.columns()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn output_extent(input: usize, kernel_size: usize, padding: usize, stride: usize) -> usize {
    let padded = input + 2 * padding;
    if stride == 0 || kernel_size == 0 || kernel_size > padded {
        return 0;
    }
    (padded - kernel_size) / stride + 1
}

/// Rearrange `input` into the patch matrix described by `geometry`.
///
/// Row `c*K² + kh*K + kw` holds tap `(kh, kw)` of channel `c` for every output
/// position, column `oh*out_w + ow`. Taps that land in the padding read 0.0.
/// The last row is all 1.0.
///
/// Returns the number of floats written (`geometry.len()`).
///
/// # Panics
///
/// Panics if `input` is shorter than the map or `output` shorter than
/// `geometry.len()`.
pub fn im2col(input: &[f32], output: &mut [f32], geometry: &PatchGeometry) -> usize {
    let PatchGeometry {
        channels,
        height,
        width,
        kernel_size,
        padding,
        stride,
    } = *geometry;
    let out_h = geometry.output_height();
    let out_w = geometry.output_width();
    let cols = out_h * out_w;
    let total = geometry.len();

    assert!(
        input.len() >= channels * height * width,
        "im2col: input holds {} values, map needs {}",
        input.len(),
        channels * height * width
    );
    assert!(
        output.len() >= total,
        "im2col: output holds {} values, patch matrix needs {}",
        output.len(),
        total
    );

    let kk = kernel_size * kernel_size;
    let (taps, bias_row) = output[..total].split_at_mut(total - cols);

    for c in 0..channels {
        let plane = &input[c * height * width..(c + 1) * height * width];
        for kh in 0..kernel_size {
            for kw in 0..kernel_size {
                let row = c * kk + kh * kernel_size + kw;
                let dst = &mut taps[row * cols..(row + 1) * cols];

                for oh in 0..out_h {
                    // Padded coordinates; subtract `padding` only when in range.
                    let ih = (oh * stride + kh).checked_sub(padding).filter(|&ih| ih < height);
                    let dst_row = &mut dst[oh * out_w..(oh + 1) * out_w];

                    let Some(ih) = ih else {
                        dst_row.fill(0.0);
                        continue;
                    };

                    let src_row = &plane[ih * width..(ih + 1) * width];
                    for (ow, value) in dst_row.iter_mut().enumerate() {
                        *value = match (ow * stride + kw).checked_sub(padding) {
                            Some(iw) if iw < width => src_row[iw],
                            _ => 0.0,
                        };
                    }
                }
            }
        }
    }

    bias_row.fill(1.0);
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(channels: usize, size: usize, kernel_size: usize, padding: usize) -> PatchGeometry {
        PatchGeometry {
            channels,
            height: size,
            width: size,
            kernel_size,
            padding,
            stride: 1,
        }
    }

    #[test]
    fn test_geometry_reference_layers() {
        // First convolution: 1x16x16, 5x5, no padding -> 12x12, 26 rows.
        let g = geometry(1, 16, 5, 0);
        assert_eq!(g.output_height(), 12);
        assert_eq!(g.rows(), 26);
        assert_eq!(g.len(), 3744);

        // Second convolution: 6x6x6, 3x3, padding 1 -> 6x6, 55 rows.
        let g = geometry(6, 6, 3, 1);
        assert_eq!(g.output_width(), 6);
        assert_eq!(g.len(), 55 * 36);
    }

    #[test]
    fn test_kernel_larger_than_input_is_empty() {
        let g = geometry(1, 2, 5, 0);
        assert_eq!(g.columns(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn test_single_pixel_padded_patch() {
        let g = geometry(1, 1, 3, 1);
        let mut out = vec![f32::NAN; g.len()];

        let written = im2col(&[7.0], &mut out, &g);

        assert_eq!(written, 10);
        let expected = [0.0, 0.0, 0.0, 0.0, 7.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_stride_two() {
        let g = PatchGeometry {
            channels: 1,
            height: 4,
            width: 4,
            kernel_size: 2,
            padding: 0,
            stride: 2,
        };
        let input: Vec<f32> = (1..=16).map(|v| v as f32).collect();
        let mut out = vec![0.0; g.len()];

        im2col(&input, &mut out, &g);

        assert_eq!(g.columns(), 4);
        // Top-left tap of each 2x2 window.
        assert_eq!(&out[0..4], &[1.0, 3.0, 9.0, 11.0]);
        // Bottom-right tap of each window.
        assert_eq!(&out[12..16], &[6.0, 8.0, 14.0, 16.0]);
        assert_eq!(&out[16..20], &[1.0; 4]);
    }
}
