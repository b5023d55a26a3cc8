//! Training parameters
//!
//! Parameters are immutable input to the engine. Every build entry point
//! calls [`ForestParams::validate`] before touching the dataset.

use crate::errors::{ForestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest node that can be split: quantile sampling needs at least two gaps.
pub const MIN_SPLIT_SIZE: usize = 3;

/// Deepest supported tree. The arena holds `2^(levels + 1) - 1` slots.
pub const MAX_TREE_LEVELS: usize = 24;

/// How a single tree is grown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainMethod {
    /// Recursive descent, one node at a time
    #[default]
    DepthFirst,
    /// Level-synchronous growth over a frontier of open nodes
    BreadthFirst,
    /// Breadth-first for the upper half of the tree, depth-first below
    Hybrid,
}

impl FromStr for TrainMethod {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "DFS" => Ok(Self::DepthFirst),
            "BFS" => Ok(Self::BreadthFirst),
            "Hybrid" => Ok(Self::Hybrid),
            other => Err(ForestError::InvalidParameters(format!(
                "unknown training method: {other:?} (expected DFS, BFS or Hybrid)"
            ))),
        }
    }
}

impl fmt::Display for TrainMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DepthFirst => "DFS",
            Self::BreadthFirst => "BFS",
            Self::Hybrid => "Hybrid",
        };
        f.write_str(name)
    }
}

/// Forest training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub num_trees: usize,
    /// Maximum depth; the root is level 0
    pub max_levels: usize,
    pub num_candidate_features: usize,
    pub num_candidate_thresholds: usize,
    /// Splits scoring below this become leaves
    pub min_gain: f64,
    /// Nodes smaller than `max(3, min_dataset_size)` become leaves
    pub min_dataset_size: usize,
    /// Worker count: 0 = rayon's current thread count, 1 = sequential
    pub num_threads: usize,
    pub train_method: TrainMethod,
    /// Fixed seed for every RNG stream; `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            num_trees: 1,
            max_levels: 10,
            num_candidate_features: 10,
            num_candidate_thresholds: 10,
            min_gain: 0.0,
            min_dataset_size: MIN_SPLIT_SIZE,
            num_threads: 1,
            train_method: TrainMethod::DepthFirst,
            seed: None,
        }
    }
}

impl ForestParams {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(ForestError::InvalidParameters(
                "num_trees must be at least 1".to_string(),
            ));
        }

        if self.max_levels > MAX_TREE_LEVELS {
            return Err(ForestError::InvalidParameters(format!(
                "max_levels {} exceeds the supported maximum of {}",
                self.max_levels, MAX_TREE_LEVELS
            )));
        }

        if self.num_candidate_features == 0 {
            return Err(ForestError::InvalidParameters(
                "num_candidate_features must be at least 1".to_string(),
            ));
        }

        if self.num_candidate_thresholds == 0 {
            return Err(ForestError::InvalidParameters(
                "num_candidate_thresholds must be at least 1".to_string(),
            ));
        }

        if !self.min_gain.is_finite() || self.min_gain < 0.0 {
            return Err(ForestError::InvalidParameters(format!(
                "min_gain must be a finite non-negative number, got {}",
                self.min_gain
            )));
        }

        Ok(())
    }

    /// Smallest index size that may still be split
    pub fn min_node_size(&self) -> usize {
        self.min_dataset_size.max(MIN_SPLIT_SIZE)
    }
}
