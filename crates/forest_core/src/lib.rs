//! Arbor Forest Core - decision forest construction and inference
//!
//! Trains ensembles of binary decision trees over arbitrary point data. The
//! engine is generic over three roles bound at compile time: a randomized
//! feature response, per-node statistics, and an optional leaf payload.
//!
//! Modules:
//! - `dataset`: Dataset trait and index views over dataset rows
//! - `contracts`: Capability traits implemented by features, statistics and payloads
//! - `node` / `tree`: Decision nodes in an implicit complete-binary-tree arena
//! - `forest`: Tree ensembles, inference and the forest stream format
//! - `builder`: Depth-first, breadth-first and hybrid tree growth
//! - `forest_builder`: Shuffling, per-tree chunking and forest training
//! - `randomizer` / `parallelism`: Per-unit RNG streams and the worker pool
//! - `params`: Training parameters and validation
//! - `codec`: Little-endian binary field helpers

pub mod builder;
pub mod codec;
pub mod contracts;
pub mod dataset;
pub mod errors;
pub mod forest;
pub mod forest_builder;
pub mod node;
pub mod parallelism;
pub mod params;
pub mod randomizer;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use builder::{information_gain, partition, select_thresholds, TreeBuilder};
pub use codec::BinaryCodec;
pub use contracts::{FeatureResponse, LeafPayload, Mergeable, NodeStatistics, StatisticsAggregator};
pub use dataset::{Dataset, DatasetIndex};
pub use errors::{ForestError, Result};
pub use forest::{write_forest_from_tree_streams, Forest};
pub use forest_builder::{partition_indices, partition_sizes, ForestBuild, ForestBuilder, TreeFailure};
pub use node::{goes_left, DecisionNode, NodeKind};
pub use parallelism::{run_with_threads, Parallelism};
pub use params::{ForestParams, TrainMethod, MAX_TREE_LEVELS, MIN_SPLIT_SIZE};
pub use randomizer::Randomizer;
pub use tree::DecisionTree;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
