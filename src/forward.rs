//! Single-image forward pass over a [`LayerGraph`].
//!
//! All memory touched during a pass lives in a [`Workspace`] owned by one
//! worker. Buffers are sized once from the graph and reused for every image;
//! every layer overwrites its output region, so nothing is cleared between
//! images.

use crate::architecture::{Layer, LayerGraph, Slot};
use crate::model::Network;
use crate::utils::argmax;

/// Private buffers of one worker.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Normalized image followed by the bias constant 1.0.
    image: Vec<f32>,
    scratch: Vec<f32>,
    patches: Vec<f32>,
}

impl Workspace {
    /// Allocate buffers for one forward pass over `graph`.
    pub fn new(graph: &LayerGraph) -> Self {
        let mut image = vec![0.0f32; graph.image_len() + 1];
        image[graph.image_len()] = 1.0;
        Self {
            image,
            scratch: vec![0.0f32; graph.scratch_len()],
            patches: vec![0.0f32; graph.patch_len()],
        }
    }

    /// Normalize raw `[0, 255]` intensities into the image buffer.
    ///
    /// # Panics
    ///
    /// Panics if `raw` does not hold exactly one image.
    pub fn load_image(&mut self, raw: &[f32]) {
        let image_len = self.image.len() - 1;
        assert_eq!(raw.len(), image_len, "image has {} pixels, workspace expects {}", raw.len(), image_len);
        for (dst, &src) in self.image[..image_len].iter_mut().zip(raw) {
            *dst = src / 255.0;
        }
        self.image[image_len] = 1.0;
    }

    /// Copy already-normalized pixels into the image buffer.
    pub fn set_normalized_image(&mut self, pixels: &[f32]) {
        let image_len = self.image.len() - 1;
        assert_eq!(pixels.len(), image_len, "image has {} pixels, workspace expects {}", pixels.len(), image_len);
        self.image[..image_len].copy_from_slice(pixels);
        self.image[image_len] = 1.0;
    }

    /// Current image buffer, bias slot included.
    pub fn image(&self) -> &[f32] {
        &self.image
    }
}

/// Borrow a layer's input region and its scratch output region at once.
///
/// Outputs are always placed after the inputs they read, so a scratch input can
/// be split off below `target`.
fn split_regions<'a>(
    image: &'a [f32],
    scratch: &'a mut [f32],
    source: Slot,
    input_len: usize,
    target: usize,
    output_len: usize,
) -> (&'a [f32], &'a mut [f32]) {
    match source {
        Slot::Image => (&image[..input_len], &mut scratch[target..target + output_len]),
        Slot::Scratch(offset) => {
            let (head, tail) = scratch.split_at_mut(target);
            (&head[offset..offset + input_len], &mut tail[..output_len])
        }
    }
}

/// Run every layer of `network` over the image loaded in `workspace`.
///
/// Returns the final layer's output (the logits), borrowed from the workspace.
pub fn forward<'w>(network: &Network, workspace: &'w mut Workspace) -> &'w [f32] {
    let Workspace {
        image,
        scratch,
        patches,
    } = workspace;

    let mut current = Slot::Image;
    let mut current_len = network.graph().image_len();

    for plan in network.graph().plans() {
        let weights = network.weights(plan);
        let input_len = plan.input.len();
        let output_len = plan.output.len();

        match (plan.layer, plan.target) {
            (Layer::Activation(activation), _) => {
                match plan.source {
                    Slot::Image => activation.forward(image, input_len),
                    Slot::Scratch(offset) => activation.forward(&mut scratch[offset..], input_len),
                }
                continue;
            }
            (Layer::Convolution(conv), Some(target)) => {
                let (channels, height, width) = plan.input.dims();
                let (input, output) =
                    split_regions(image, scratch, plan.source, input_len, target, output_len);
                conv.forward(input, channels, height, width, weights, patches, output);
                current = Slot::Scratch(target);
            }
            (Layer::MaxPool(pool), Some(target)) => {
                let (channels, height, width) = plan.input.dims();
                let (input, output) =
                    split_regions(image, scratch, plan.source, input_len, target, output_len);
                pool.forward(input, channels, height, width, output);
                current = Slot::Scratch(target);
            }
            (Layer::FullyConnected(dense), Some(target)) => {
                match plan.source {
                    Slot::Image => image[input_len] = 1.0,
                    Slot::Scratch(offset) => scratch[offset + input_len] = 1.0,
                }
                let (input, output) =
                    split_regions(image, scratch, plan.source, input_len + 1, target, output_len);
                dense.forward(weights, input, output);
                current = Slot::Scratch(target);
            }
            (_, None) => unreachable!("LayerGraph places every non-activation output in scratch"),
        }
        current_len = output_len;
    }

    match current {
        Slot::Image => &image[..current_len],
        Slot::Scratch(offset) => &scratch[offset..offset + current_len],
    }
}

/// Predicted class of the image loaded in `workspace`.
///
/// Ties resolve to the lowest class index.
pub fn predict(network: &Network, workspace: &mut Workspace) -> usize {
    argmax(forward(network, workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::LayerGraph;
    use crate::layers::{Conv2DLayer, DenseLayer, FeatureShape, LeakyReluLayer, MaxPool2DLayer};
    use crate::model::ParameterStore;

    #[test]
    fn test_workspace_sizes() {
        let graph = LayerGraph::reference().unwrap();
        let ws = Workspace::new(&graph);

        assert_eq!(ws.image().len(), 257);
        assert_eq!(ws.image()[256], 1.0);
        assert_eq!(ws.scratch.len(), 1580);
        assert_eq!(ws.patches.len(), 3744);
    }

    #[test]
    fn test_load_image_normalizes() {
        let graph = LayerGraph::new(
            FeatureShape::spatial(1, 1, 2),
            vec![Layer::FullyConnected(DenseLayer::new(2, 1))],
        )
        .unwrap();
        let mut ws = Workspace::new(&graph);

        ws.load_image(&[255.0, 51.0]);

        assert_eq!(ws.image(), &[1.0, 0.2, 1.0]);
    }

    #[test]
    fn test_dense_only_network() {
        // 2 pixels -> fc(2->2) with bias column
        let graph = LayerGraph::new(
            FeatureShape::spatial(1, 1, 2),
            vec![Layer::FullyConnected(DenseLayer::new(2, 2))],
        )
        .unwrap();
        let params = ParameterStore::new(vec![1.0, 0.0, 0.5, 0.0, -1.0, 0.25]);
        let network = Network::new(graph, params).unwrap();
        let mut ws = Workspace::new(network.graph());
        ws.set_normalized_image(&[2.0, 3.0]);

        let logits = forward(&network, &mut ws).to_vec();

        assert_eq!(logits, vec![2.5, -2.75]);
        assert_eq!(predict(&network, &mut ws), 0);
    }

    #[test]
    fn test_activation_after_dense_runs_in_place() {
        let graph = LayerGraph::new(
            FeatureShape::Flat(1),
            vec![
                Layer::FullyConnected(DenseLayer::new(1, 2)),
                Layer::Activation(LeakyReluLayer::new(0.5)),
            ],
        )
        .unwrap();
        // outputs: [x - 1, -x]
        let params = ParameterStore::new(vec![1.0, -1.0, -1.0, 0.0]);
        let network = Network::new(graph, params).unwrap();
        let mut ws = Workspace::new(network.graph());
        ws.set_normalized_image(&[4.0]);

        assert_eq!(forward(&network, &mut ws), &[3.0, -2.0]);
    }

    #[test]
    fn test_conv_pool_dense_chain() {
        // 1x2x2 -> conv 1x1 (weight 2, bias 0) -> pool 2 -> fc(1->1, w=1, b=1)
        let graph = LayerGraph::new(
            FeatureShape::spatial(1, 2, 2),
            vec![
                Layer::Convolution(Conv2DLayer::new(1, 1, 0)),
                Layer::MaxPool(MaxPool2DLayer::new(2)),
                Layer::FullyConnected(DenseLayer::new(1, 1)),
            ],
        )
        .unwrap();
        let params = ParameterStore::new(vec![2.0, 0.0, 1.0, 1.0]);
        let network = Network::new(graph, params).unwrap();
        let mut ws = Workspace::new(network.graph());
        ws.set_normalized_image(&[0.1, 0.4, 0.3, 0.2]);

        let logits = forward(&network, &mut ws);

        assert_eq!(logits.len(), 1);
        assert!((logits[0] - 1.8).abs() < 1e-6);
    }
}
