//! CNN inference engine
//!
//! Forward inference of a small fixed-topology convolutional classifier over a
//! batch of single-channel images, one predicted class per image.
//!
//! # Modules
//!
//! - `layers`: Layer kernels (im2col + GEMM convolution, max pooling, leaky ReLU, dense)
//! - `architecture`: Layer descriptors, the reference topology, and the precomputed layout
//! - `model`: Parameter blob and the network binding it to a layout
//! - `forward`: Per-worker workspace and the single-image forward pass
//! - `batch`: Worker pool that classifies a whole batch
//! - `loader`: Whitespace-separated numeric text files
//! - `config`: Run configuration and thread-count policy
//! - `error`: Error type shared by every fallible operation
//! - `telemetry`: Tracing subscriber for binaries
//! - `utils`: GEMM/GEMV kernels, activations, deterministic RNG
//!
//! # Example
//!
//! ```no_run
//! use cnn_inference::{BatchScheduler, Network};
//! use cnn_inference::architecture::IMAGE_SIZE;
//! use cnn_inference::loader::load_array;
//!
//! let network = Network::load_reference("model.txt")?;
//! let images = load_array("input.txt", 1000 * IMAGE_SIZE)?;
//! let report = BatchScheduler::new(4)?.run_timed(&network, &images)?;
//! println!("{:.2} ms, first class {}", report.elapsed_ms(), report.predictions[0]);
//! # Ok::<(), cnn_inference::InferenceError>(())
//! ```

pub mod architecture;
pub mod batch;
pub mod config;
pub mod error;
pub mod forward;
pub mod layers;
pub mod loader;
pub mod model;
pub mod telemetry;
pub mod utils;

pub use architecture::{Layer, LayerGraph, LayerPlan, Slot};
pub use batch::{BatchReport, BatchScheduler};
pub use error::{InferenceError, Result};
pub use forward::{forward, predict, Workspace};
pub use model::{Network, ParameterStore};
