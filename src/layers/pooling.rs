//! Max pooling with window size equal to stride.
//!
//! Edge policy: for an output column at or past `in_w / window` only the
//! window's first column is considered, and likewise for rows. Under the usual
//! `out = in / window` sizing this never triggers; it matters when a caller asks
//! for a ceil-sized output, where the partial edge window is reduced to its
//! leading taps instead of being zero-padded or clamped.

/// Max pooling layer; `window` is used as both kernel size and stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPool2DLayer {
    window: usize,
}

impl MaxPool2DLayer {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Output `(height, width)` with integer division; trailing rows and
    /// columns that do not fill a window are dropped.
    pub fn output_dims(&self, height: usize, width: usize) -> (usize, usize) {
        if self.window == 0 {
            return (0, 0);
        }
        (height / self.window, width / self.window)
    }

    /// Pool one `channels × height × width` map into `output`.
    ///
    /// Returns the number of values written.
    pub fn forward(
        &self,
        input: &[f32],
        channels: usize,
        height: usize,
        width: usize,
        output: &mut [f32],
    ) -> usize {
        let (out_h, out_w) = self.output_dims(height, width);
        max_pool(
            input,
            output,
            PoolGeometry {
                channels,
                height,
                width,
                out_height: out_h,
                out_width: out_w,
                window: self.window,
            },
        )
    }
}

/// Input and requested output extents for [`max_pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolGeometry {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub window: usize,
}

/// Max-pool `input` into `output` with explicit output extents.
///
/// Each window starts from its top-left tap and is replaced only by strictly
/// greater values, so the first maximum wins. Output extents may be at most
/// `ceil(in / window)` per axis.
///
/// # Panics
///
/// Panics if the output extents exceed `ceil(in / window)`, or the buffers are
/// too short.
pub fn max_pool(input: &[f32], output: &mut [f32], geometry: PoolGeometry) -> usize {
    let PoolGeometry {
        channels,
        height,
        width,
        out_height,
        out_width,
        window,
    } = geometry;
    let total = channels * out_height * out_width;
    if total == 0 {
        return 0;
    }

    assert!(window > 0, "max_pool: window must be positive");
    assert!(
        out_height <= height.div_ceil(window) && out_width <= width.div_ceil(window),
        "max_pool: {}x{} output does not fit a {}x{} input with window {}",
        out_height,
        out_width,
        height,
        width,
        window
    );
    assert!(input.len() >= channels * height * width, "max_pool: input too short");
    assert!(output.len() >= total, "max_pool: output too short");

    // Rows/columns at or past these indices only use the window's first tap.
    let full_rows = height / window;
    let full_cols = width / window;

    let mut written = 0;
    for c in 0..channels {
        let plane = &input[c * height * width..(c + 1) * height * width];
        for oh in 0..out_height {
            for ow in 0..out_width {
                let origin = oh * window * width + ow * window;
                let mut best = plane[origin];
                for m in 0..window {
                    if oh >= full_rows && m > 0 {
                        continue;
                    }
                    for n in 0..window {
                        if ow >= full_cols && n > 0 {
                            continue;
                        }
                        let value = plane[origin + m * width + n];
                        if value > best {
                            best = value;
                        }
                    }
                }
                output[written] = best;
                written += 1;
            }
        }
    }
    written
}
