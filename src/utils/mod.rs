//! Shared numeric utilities
//!
//! Matrix kernels, activations, and a reproducible RNG for synthetic data.

pub mod activations;
pub mod gemm;
pub mod rng;

pub use activations::{argmax, leaky_relu_inplace};
pub use gemm::{sgemm, sgemv};
pub use rng::SimpleRng;
