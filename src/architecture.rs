//! Network topology and its construction-time memory layout
//!
//! A [`LayerGraph`] is built once from an ordered list of [`Layer`] descriptors
//! and an input shape. Construction validates every layer against the shape
//! flowing into it and precomputes, per layer:
//!
//! - the input and output [`FeatureShape`],
//! - the range of the layer's weight matrix inside the parameter blob,
//! - where the layer reads its input and writes its output in the per-worker
//!   scratch buffer.
//!
//! Layer outputs are stacked in scratch in execution order. Activations run in
//! place. A fully connected layer's output starts one float past the end of its
//! input, leaving room for the bias constant 1.0.
//!
//! After construction the graph is immutable and shared read-only by all
//! workers.

use std::ops::Range;

use tracing::{debug, info};

use crate::error::{InferenceError, Result};
use crate::layers::{Conv2DLayer, DenseLayer, FeatureShape, LeakyReluLayer, MaxPool2DLayer};

/// Height of the images the reference topology classifies.
pub const IMAGE_HEIGHT: usize = 16;
/// Width of the images the reference topology classifies.
pub const IMAGE_WIDTH: usize = 16;
/// Pixels per image.
pub const IMAGE_SIZE: usize = IMAGE_HEIGHT * IMAGE_WIDTH;
/// Classes predicted by the reference topology.
pub const NUM_CLASSES: usize = 10;
/// Leak coefficient of every activation in the reference topology.
pub const LEAK_ALPHA: f32 = 0.1;

/// One layer of the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer {
    Convolution(Conv2DLayer),
    MaxPool(MaxPool2DLayer),
    Activation(LeakyReluLayer),
    FullyConnected(DenseLayer),
}

impl Layer {
    /// Short lowercase name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Convolution(_) => "convolution",
            Layer::MaxPool(_) => "maxpool",
            Layer::Activation(_) => "activation",
            Layer::FullyConnected(_) => "fully_connected",
        }
    }
}

/// The nine-layer classifier over 1×16×16 images.
///
/// conv(6, 5×5) → leaky → pool 2 → conv(8, 3×3, pad 1) → leaky → pool 2 →
/// fc(72→128) → leaky → fc(128→10)
pub fn reference_topology() -> Vec<Layer> {
    vec![
        Layer::Convolution(Conv2DLayer::new(6, 5, 0)),
        Layer::Activation(LeakyReluLayer::new(LEAK_ALPHA)),
        Layer::MaxPool(MaxPool2DLayer::new(2)),
        Layer::Convolution(Conv2DLayer::new(8, 3, 1)),
        Layer::Activation(LeakyReluLayer::new(LEAK_ALPHA)),
        Layer::MaxPool(MaxPool2DLayer::new(2)),
        Layer::FullyConnected(DenseLayer::new(72, 128)),
        Layer::Activation(LeakyReluLayer::new(LEAK_ALPHA)),
        Layer::FullyConnected(DenseLayer::new(128, NUM_CLASSES)),
    ]
}

/// Where a layer's input lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The worker's normalized image buffer.
    Image,
    /// The worker's scratch buffer, starting at this offset.
    Scratch(usize),
}

/// A layer together with its resolved shapes, weights and buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlan {
    pub layer: Layer,
    pub input: FeatureShape,
    pub output: FeatureShape,
    /// Weight matrix inside the parameter blob; empty for parameter-free layers.
    pub params: Range<usize>,
    pub source: Slot,
    /// Scratch offset of the output, or `None` for layers that run in place.
    pub target: Option<usize>,
}

/// Validated, immutable sequence of layers with its memory layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGraph {
    input: FeatureShape,
    plans: Vec<LayerPlan>,
    parameter_count: usize,
    scratch_len: usize,
    patch_len: usize,
}

fn topology_error(index: usize, layer: &Layer, message: impl std::fmt::Display) -> InferenceError {
    InferenceError::Topology(format!("layer {} ({}): {}", index, layer.kind(), message))
}

impl LayerGraph {
    /// Build the layout for `layers` applied to an `input`-shaped image.
    ///
    /// # Errors
    ///
    /// [`InferenceError::Topology`] if the list is empty, a spatial layer follows
    /// a flat one, a kernel or window does not fit the map it is applied to, a
    /// layer has a zero-sized parameter, or a fully connected layer's
    /// `input_size` disagrees with the preceding output.
    pub fn new(input: FeatureShape, layers: Vec<Layer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(InferenceError::Topology("no layers".to_string()));
        }
        if input.is_empty() {
            return Err(InferenceError::Topology(format!("empty input shape {}", input)));
        }

        let mut plans = Vec::with_capacity(layers.len());
        let mut shape = input;
        let mut source = Slot::Image;
        let mut scratch_end = 0usize;
        let mut param_end = 0usize;
        let mut patch_len = 0usize;

        for (index, layer) in layers.into_iter().enumerate() {
            let params_start = param_end;
            let (output, target) = match layer {
                Layer::Convolution(conv) => {
                    let FeatureShape::Spatial {
                        channels,
                        height,
                        width,
                    } = shape
                    else {
                        return Err(topology_error(index, &layer, format!("needs a spatial input, got {}", shape)));
                    };
                    if conv.filters() == 0 || conv.kernel_size() == 0 || conv.stride() == 0 {
                        return Err(topology_error(index, &layer, "filters, kernel size and stride must be positive"));
                    }
                    let geometry = conv.geometry(channels, height, width);
                    if geometry.columns() == 0 {
                        return Err(topology_error(
                            index,
                            &layer,
                            format!(
                                "{}x{} kernel with padding {} does not fit {}",
                                conv.kernel_size(),
                                conv.kernel_size(),
                                conv.padding(),
                                shape
                            ),
                        ));
                    }
                    patch_len = patch_len.max(geometry.len());
                    param_end += conv.weight_count(channels);
                    let output = FeatureShape::spatial(
                        conv.filters(),
                        geometry.output_height(),
                        geometry.output_width(),
                    );
                    (output, Some(scratch_end))
                }
                Layer::MaxPool(pool) => {
                    let FeatureShape::Spatial {
                        channels,
                        height,
                        width,
                    } = shape
                    else {
                        return Err(topology_error(index, &layer, format!("needs a spatial input, got {}", shape)));
                    };
                    let (out_h, out_w) = pool.output_dims(height, width);
                    if out_h == 0 || out_w == 0 {
                        return Err(topology_error(
                            index,
                            &layer,
                            format!("window {} leaves nothing of {}", pool.window(), shape),
                        ));
                    }
                    (FeatureShape::spatial(channels, out_h, out_w), Some(scratch_end))
                }
                Layer::Activation(_) => (shape, None),
                Layer::FullyConnected(dense) => {
                    if dense.input_size() != shape.len() {
                        return Err(topology_error(
                            index,
                            &layer,
                            format!("expects {} inputs but receives {}", dense.input_size(), shape.len()),
                        ));
                    }
                    if dense.output_size() == 0 {
                        return Err(topology_error(index, &layer, "output size must be positive"));
                    }
                    param_end += dense.weight_count();
                    // The image buffer carries its own bias slot; scratch
                    // regions get one reserved right after them.
                    if let Slot::Scratch(offset) = source {
                        debug_assert_eq!(offset + shape.len(), scratch_end);
                        scratch_end += 1;
                    }
                    (FeatureShape::Flat(dense.output_size()), Some(scratch_end))
                }
            };

            let plan = LayerPlan {
                layer,
                input: shape,
                output,
                params: params_start..param_end,
                source,
                target,
            };
            debug!(
                index,
                kind = layer.kind(),
                input = %plan.input,
                output = %plan.output,
                params = ?plan.params,
                source = ?plan.source,
                target = ?plan.target,
                "planned layer"
            );

            if let Some(offset) = target {
                scratch_end = offset + output.len();
                source = Slot::Scratch(offset);
            }
            shape = output;
            plans.push(plan);
        }

        info!(
            layers = plans.len(),
            parameters = param_end,
            scratch = scratch_end,
            patches = patch_len,
            output = %shape,
            "built layer graph"
        );

        Ok(Self {
            input,
            plans,
            parameter_count: param_end,
            scratch_len: scratch_end,
            patch_len,
        })
    }

    /// The reference topology over 1×16×16 images.
    pub fn reference() -> Result<Self> {
        Self::new(
            FeatureShape::spatial(1, IMAGE_HEIGHT, IMAGE_WIDTH),
            reference_topology(),
        )
    }

    pub fn input_shape(&self) -> FeatureShape {
        self.input
    }

    /// Shape of the final layer's output (the logits).
    pub fn output_shape(&self) -> FeatureShape {
        self.plans
            .last()
            .map(|plan| plan.output)
            .unwrap_or(self.input)
    }

    pub fn plans(&self) -> &[LayerPlan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Pixels per input image.
    pub fn image_len(&self) -> usize {
        self.input.len()
    }

    /// Exact length the parameter blob must have.
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Scratch floats one worker needs for a full forward pass.
    pub fn scratch_len(&self) -> usize {
        self.scratch_len
    }

    /// Patch-matrix floats needed by the largest convolution.
    pub fn patch_len(&self) -> usize {
        self.patch_len
    }
}
