//! Run configuration
//!
//! Settings that shape a run without changing the network: how many images
//! the input file holds, how many workers may be used, and whether predictions
//! are printed. The topology itself is fixed in code.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{InferenceError, Result};

/// Images in the default input file.
pub const DEFAULT_IMAGE_COUNT: usize = 1000;
/// Default upper bound on worker threads.
pub const DEFAULT_MAX_THREADS: usize = 4;

/// Configuration for a batch run, parsed from JSON.
///
/// Every field is optional in the file.
///
/// # Example
///
/// ```json
/// {
///   "image_count": 1000,
///   "max_threads": 4,
///   "show_results": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of images to read from the input file.
    pub image_count: usize,

    /// Worker threads never exceed this; an explicit thread argument must be
    /// strictly below it.
    pub max_threads: usize,

    /// Print every prediction after the timing line.
    pub show_results: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_count: DEFAULT_IMAGE_COUNT,
            max_threads: DEFAULT_MAX_THREADS,
            show_results: false,
        }
    }
}

impl RunConfig {
    /// Worker count for a run.
    ///
    /// `requested` is the raw thread argument, if any. It is honoured only when
    /// it parses as an integer `t` with `0 < t < max_threads`. Otherwise (or when
    /// absent) the default is used: the number of available processors, capped
    /// at `max_threads`.
    pub fn resolve_threads(&self, requested: Option<&str>) -> usize {
        let default = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(self.max_threads)
            .max(1);

        let Some(raw) = requested else {
            return default;
        };

        match raw.trim().parse::<usize>() {
            Ok(threads) if threads > 0 && threads < self.max_threads => threads,
            _ => {
                warn!(
                    requested = raw,
                    max_threads = self.max_threads,
                    fallback = default,
                    "ignoring out-of-range thread count"
                );
                default
            }
        }
    }
}

/// Loads a run configuration from a JSON file.
///
/// # Returns
///
/// `Ok(RunConfig)` on success, or an error if the file cannot be read, the JSON
/// is invalid, or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use cnn_inference::config::load_config;
///
/// let cfg = load_config("config/run.json").unwrap();
/// assert!(cfg.max_threads >= 1);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RunConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| InferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RunConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RunConfig) -> Result<()> {
    if config.image_count == 0 {
        return Err(InferenceError::Config(
            "image_count must be positive".to_string(),
        ));
    }

    if config.max_threads == 0 {
        return Err(InferenceError::Config(
            "max_threads must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.image_count, 1000);
        assert_eq!(config.max_threads, 4);
        assert!(!config.show_results);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{ "show_results": true }"#).unwrap();
        assert!(config.show_results);
        assert_eq!(config.image_count, DEFAULT_IMAGE_COUNT);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<RunConfig>(r#"{ "threads": 2 }"#).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_images() {
        let config = RunConfig {
            image_count: 0,
            ..RunConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_resolve_threads_accepts_in_range() {
        let config = RunConfig::default();
        assert_eq!(config.resolve_threads(Some("2")), 2);
        assert_eq!(config.resolve_threads(Some("3")), 3);
    }

    #[test]
    fn test_resolve_threads_rejects_out_of_range() {
        let config = RunConfig::default();
        let default = config.resolve_threads(None);

        assert!((1..=4).contains(&default));
        assert_eq!(config.resolve_threads(Some("0")), default);
        assert_eq!(config.resolve_threads(Some("4")), default);
        assert_eq!(config.resolve_threads(Some("-1")), default);
        assert_eq!(config.resolve_threads(Some("many")), default);
    }
}
