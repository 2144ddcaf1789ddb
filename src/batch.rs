//! Batch execution over a fixed-size worker pool.
//!
//! The batch is split into one contiguous block of images per worker. Each
//! block allocates a single [`Workspace`], normalizes its images one at a time
//! and writes every prediction to that image's own slot in the output. Blocks
//! never overlap, so no locking is involved; the network itself is shared
//! read-only.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::info;

use crate::error::{InferenceError, Result};
use crate::forward::{predict, Workspace};
use crate::model::Network;

/// Predictions for a batch and the wall-clock time the pass took.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Class index per image, in input order.
    pub predictions: Vec<usize>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Runs batches on a dedicated pool of `threads` workers.
pub struct BatchScheduler {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl BatchScheduler {
    /// Start a pool of `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("cnn-worker-{index}"))
            .build()?;
        Ok(Self { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Classify every image in `raw_images`.
    ///
    /// `raw_images` holds the images back to back, each
    /// `network.graph().image_len()` raw intensities in `[0, 255]`.
    ///
    /// # Errors
    ///
    /// [`InferenceError::InputSize`] if the buffer is not a whole number of
    /// images. Nothing is computed in that case.
    pub fn run(&self, network: &Network, raw_images: &[f32]) -> Result<Vec<usize>> {
        let image_len = network.graph().image_len();
        if raw_images.len() % image_len != 0 {
            return Err(InferenceError::InputSize {
                image_len,
                found: raw_images.len(),
            });
        }

        let count = raw_images.len() / image_len;
        let mut predictions = vec![0usize; count];
        if count == 0 {
            return Ok(predictions);
        }

        let per_worker = count.div_ceil(self.threads);
        info!(images = count, threads = self.threads, per_worker, "starting batch");

        self.pool.install(|| {
            predictions
                .par_chunks_mut(per_worker)
                .zip(raw_images.par_chunks(per_worker * image_len))
                .for_each(|(slots, images)| {
                    let mut workspace = Workspace::new(network.graph());
                    for (slot, raw) in slots.iter_mut().zip(images.chunks_exact(image_len)) {
                        workspace.load_image(raw);
                        *slot = predict(network, &mut workspace);
                    }
                });
        });

        Ok(predictions)
    }

    /// [`run`](Self::run), timed.
    pub fn run_timed(&self, network: &Network, raw_images: &[f32]) -> Result<BatchReport> {
        let start = Instant::now();
        let predictions = self.run(network, raw_images)?;
        let elapsed = start.elapsed();
        info!(images = predictions.len(), elapsed_ms = elapsed.as_secs_f64() * 1000.0, "finished batch");
        Ok(BatchReport {
            predictions,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{Layer, LayerGraph};
    use crate::layers::{DenseLayer, FeatureShape};
    use crate::model::ParameterStore;

    // Two pixels, two classes: class 1 iff the second pixel is brighter.
    fn compare_network() -> Network {
        let graph = LayerGraph::new(
            FeatureShape::spatial(1, 1, 2),
            vec![Layer::FullyConnected(DenseLayer::new(2, 2))],
        )
        .unwrap();
        Network::new(graph, ParameterStore::new(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0])).unwrap()
    }

    #[test]
    fn test_predictions_land_in_input_order() {
        let network = compare_network();
        let images = [
            200.0, 10.0, //
            10.0, 200.0, //
            10.0, 200.0, //
            255.0, 0.0, //
            0.0, 1.0,
        ];

        for threads in [1, 2, 3, 8] {
            let scheduler = BatchScheduler::new(threads).unwrap();
            let predictions = scheduler.run(&network, &images).unwrap();
            assert_eq!(predictions, vec![0, 1, 1, 0, 1], "threads = {}", threads);
        }
    }

    #[test]
    fn test_ragged_batch_rejected() {
        let network = compare_network();
        let scheduler = BatchScheduler::new(1).unwrap();

        let err = scheduler.run(&network, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, InferenceError::InputSize { image_len: 2, found: 3 }));
    }

    #[test]
    fn test_empty_batch() {
        let network = compare_network();
        let scheduler = BatchScheduler::new(2).unwrap();

        let report = scheduler.run_timed(&network, &[]).unwrap();
        assert!(report.predictions.is_empty());
    }

    #[test]
    fn test_zero_threads_clamped() {
        assert_eq!(BatchScheduler::new(0).unwrap().threads(), 1);
    }
}
