//! Trained parameters and the network they belong to.

use std::path::Path;

use crate::architecture::{LayerGraph, LayerPlan};
use crate::error::{InferenceError, Result};
use crate::loader::load_array;

/// Immutable flat blob of trained weights.
///
/// Sub-ranges are interpreted as per-layer weight matrices at offsets computed
/// by [`LayerGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    values: Vec<f32>,
}

impl ParameterStore {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Load exactly `count` values from a whitespace-separated text file.
    pub fn load(path: impl AsRef<Path>, count: usize) -> Result<Self> {
        load_array(path, count).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// A layer graph bound to a parameter blob of exactly the right length.
///
/// `Network` is read-only and `Sync`; one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct Network {
    graph: LayerGraph,
    params: ParameterStore,
}

impl Network {
    /// # Errors
    ///
    /// [`InferenceError::ParameterCount`] if `params` does not hold exactly
    /// `graph.parameter_count()` values.
    pub fn new(graph: LayerGraph, params: ParameterStore) -> Result<Self> {
        if params.len() != graph.parameter_count() {
            return Err(InferenceError::ParameterCount {
                expected: graph.parameter_count(),
                found: params.len(),
            });
        }
        Ok(Self { graph, params })
    }

    /// Reference topology with weights read from the model file at `path`.
    pub fn load_reference(path: impl AsRef<Path>) -> Result<Self> {
        let graph = LayerGraph::reference()?;
        let params = ParameterStore::load(path, graph.parameter_count())?;
        Self::new(graph, params)
    }

    pub fn graph(&self) -> &LayerGraph {
        &self.graph
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Weight matrix of `plan`, empty for parameter-free layers.
    pub fn weights(&self, plan: &LayerPlan) -> &[f32] {
        &self.params.as_slice()[plan.params.clone()]
    }
}
