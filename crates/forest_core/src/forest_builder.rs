//! Forest construction
//!
//! The dataset is shuffled once and cut into one disjoint, near-equal chunk
//! per tree. Trees are built one after another; each tree's candidate
//! search runs on the shared worker pool.

use crate::builder::TreeBuilder;
use crate::contracts::{FeatureResponse, LeafPayload, StatisticsAggregator};
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::{ForestError, Result};
use crate::forest::Forest;
use crate::parallelism::run_with_threads;
use crate::params::ForestParams;
use crate::randomizer::Randomizer;
use rand::seq::SliceRandom;
use tracing::{info, warn};

/// Chunk sizes for `n` points over `trees` trees: `n / trees` each, and one
/// extra for each of the first `n % trees` trees.
pub fn partition_sizes(n: usize, trees: usize) -> Vec<usize> {
    if trees == 0 {
        return Vec::new();
    }
    let base = n / trees;
    let extra = n % trees;
    (0..trees).map(|i| base + usize::from(i < extra)).collect()
}

/// Cut `indices` into contiguous chunks of [`partition_sizes`]
pub fn partition_indices(indices: &[usize], trees: usize) -> Vec<Vec<usize>> {
    let mut rest = indices;
    partition_sizes(indices.len(), trees)
        .into_iter()
        .map(|size| {
            let (chunk, tail) = rest.split_at(size);
            rest = tail;
            chunk.to_vec()
        })
        .collect()
}

/// A tree that failed to build
#[derive(Debug)]
pub struct TreeFailure {
    pub tree: usize,
    pub error: ForestError,
}

/// Outcome of a forest build
///
/// Trees that built successfully are kept even when others failed.
#[derive(Debug)]
pub struct ForestBuild<F, S, L = ()> {
    pub forest: Forest<F, S, L>,
    pub failures: Vec<TreeFailure>,
}

impl<F, S, L> ForestBuild<F, S, L> {
    /// True only if every tree built
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The forest if every tree built, otherwise the first failure
    pub fn into_forest(self) -> Result<Forest<F, S, L>> {
        match self.failures.into_iter().next() {
            None => Ok(self.forest),
            Some(failure) => Err(failure.error),
        }
    }
}

/// Builds forests with fixed parameters
#[derive(Debug, Clone)]
pub struct ForestBuilder<F, S, L = ()> {
    params: ForestParams,
    tree_builder: TreeBuilder<F, S, L>,
}

impl<F, S, L> ForestBuilder<F, S, L> {
    pub fn new(params: ForestParams) -> Self {
        Self {
            tree_builder: TreeBuilder::new(params.clone()),
            params,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Train a forest over the whole dataset.
    ///
    /// Fails without building anything if the parameters are invalid or the
    /// dataset has fewer points than trees.
    pub fn build<D>(&self, dataset: &D) -> Result<ForestBuild<F, S, L>>
    where
        D: Dataset + Sync + ?Sized,
        F: FeatureResponse<D::Point>,
        S: StatisticsAggregator<D>,
        L: LeafPayload,
    {
        self.params.validate()?;

        let num_trees = self.params.num_trees;
        if num_trees > dataset.len() {
            return Err(ForestError::InsufficientData {
                required: num_trees,
                available: dataset.len(),
            });
        }

        info!(
            "Training forest: {} trees over {} points ({} threads, method {})",
            num_trees,
            dataset.len(),
            self.params.num_threads,
            self.params.train_method
        );

        let mut randomizer = Randomizer::for_params(&self.params);
        let mut shuffled: Vec<usize> = (0..dataset.len()).collect();
        shuffled.shuffle(randomizer.primary());

        let mut chunks = Vec::with_capacity(num_trees);
        for chunk in partition_indices(&shuffled, num_trees) {
            chunks.push(DatasetIndex::new(dataset, chunk)?);
        }

        let build = run_with_threads(self.params.num_threads, |parallelism| {
            let mut build = ForestBuild {
                forest: Forest::new(),
                failures: Vec::new(),
            };
            for (tree, index) in chunks.iter().enumerate() {
                match self.tree_builder.build_with(index, &mut randomizer, parallelism) {
                    Ok(built) => build.forest.add_tree(built),
                    Err(error) => {
                        warn!("Tree {} failed to build: {}", tree, error);
                        build.failures.push(TreeFailure { tree, error });
                    }
                }
            }
            build
        })?;

        info!(
            "Forest trained: {} of {} trees built",
            build.forest.len(),
            num_trees
        );
        Ok(build)
    }
}
