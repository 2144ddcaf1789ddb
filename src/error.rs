//! Error types for model loading, graph construction and batch execution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur before or while running a batch.
///
/// Every variant is reported before any batch work begins; a batch never
/// produces partial predictions.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// A model or input file could not be opened or read.
    #[error("Could not read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A token in a numeric text file is not a floating-point value.
    #[error("{path}: token {position} ('{token}') is not a number")]
    InvalidNumber {
        /// The file being parsed.
        path: PathBuf,
        /// Zero-based index of the offending token.
        position: usize,
        /// The offending token.
        token: String,
    },

    /// A numeric text file ended before the required count was read.
    #[error("{path}: expected {expected} values, found {found}")]
    TooFewValues {
        /// The file being parsed.
        path: PathBuf,
        /// Values required by the caller.
        expected: usize,
        /// Values actually present.
        found: usize,
    },

    /// The parameter blob does not match the layout derived from the topology.
    #[error("Parameter blob holds {found} values but the topology needs {expected}")]
    ParameterCount {
        /// Values required by the layer layout.
        expected: usize,
        /// Values supplied.
        found: usize,
    },

    /// A batch buffer whose length is not a whole number of images.
    #[error("Batch of {found} values is not a multiple of the image size {image_len}")]
    InputSize {
        /// Pixels per image.
        image_len: usize,
        /// Length of the supplied buffer.
        found: usize,
    },

    /// The layer sequence is not a valid network for the given input shape.
    #[error("Invalid topology: {0}")]
    Topology(String),

    /// Run configuration failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Run configuration is not valid JSON.
    #[error("Could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be started.
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
