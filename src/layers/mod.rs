//! Layer kernels for the inference engine
//!
//! Each layer type holds only its shape parameters. Weights are borrowed from the
//! shared parameter blob and scratch memory from the calling worker, so every
//! layer is freely shareable across threads.

pub mod activation;
pub mod conv2d;
pub mod dense;
pub mod im2col;
pub mod pooling;
mod shape;

pub use activation::LeakyReluLayer;
pub use conv2d::{dense_convolution, Conv2DLayer};
pub use dense::DenseLayer;
pub use im2col::{im2col, PatchGeometry};
pub use pooling::{max_pool, MaxPool2DLayer, PoolGeometry};
pub use shape::FeatureShape;
