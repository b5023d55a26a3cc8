//! Single-tree construction
//!
//! [`TreeBuilder`] grows one [`DecisionTree`] from a [`DatasetIndex`] using
//! the configured [`TrainMethod`]:
//! - depth-first: one node at a time, candidate search on the worker pool
//! - breadth-first: one level at a time, two dataset passes per level
//! - hybrid: breadth-first for the upper `(max_levels + 1) / 2` levels, then
//!   depth-first below every node still open

pub mod breadth_first;
pub mod depth_first;
pub mod objective;
pub mod partition;
pub mod threshold;

pub use objective::information_gain;
pub use partition::{partition, partition_counts};
pub use threshold::select_thresholds;

use crate::contracts::{FeatureResponse, LeafPayload, StatisticsAggregator};
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::Result;
use crate::parallelism::{run_with_threads, Parallelism};
use crate::params::{ForestParams, TrainMethod};
use crate::randomizer::Randomizer;
use crate::tree::DecisionTree;
use std::marker::PhantomData;
use tracing::info;

/// Builds decision trees with fixed parameters
#[derive(Debug, Clone)]
pub struct TreeBuilder<F, S, L = ()> {
    params: ForestParams,
    _marker: PhantomData<fn() -> (F, S, L)>,
}

impl<F, S, L> TreeBuilder<F, S, L> {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Validate parameters, then grow a tree over `index` on a fresh worker
    /// pool and randomizer.
    pub fn build<D>(&self, index: &DatasetIndex<'_, D>) -> Result<DecisionTree<F, S, L>>
    where
        D: Dataset + Sync + ?Sized,
        F: FeatureResponse<D::Point>,
        S: StatisticsAggregator<D>,
        L: LeafPayload,
    {
        self.params.validate()?;
        let mut randomizer = Randomizer::for_params(&self.params);
        run_with_threads(self.params.num_threads, |parallelism| {
            self.build_with(index, &mut randomizer, parallelism)
        })?
    }

    /// Grow a tree with caller-supplied RNG streams and parallelism
    pub(crate) fn build_with<D>(
        &self,
        index: &DatasetIndex<'_, D>,
        randomizer: &mut Randomizer,
        parallelism: Parallelism,
    ) -> Result<DecisionTree<F, S, L>>
    where
        D: Dataset + Sync + ?Sized,
        F: FeatureResponse<D::Point>,
        S: StatisticsAggregator<D>,
        L: LeafPayload,
    {
        let params = &self.params;
        info!(
            "Building tree: {} points, {} levels, method {}",
            index.len(),
            params.max_levels,
            params.train_method
        );

        let mut tree = DecisionTree::new(params.max_levels)?;
        match params.train_method {
            TrainMethod::DepthFirst => {
                depth_first::grow(&mut tree, index.clone(), 0, 0, params, randomizer, parallelism)?;
            }
            TrainMethod::BreadthFirst => {
                breadth_first::grow_levels(&mut tree, index, params, None, randomizer.primary())?;
            }
            TrainMethod::Hybrid => {
                let switch_depth = (params.max_levels + 1) / 2;
                let open = breadth_first::grow_levels(
                    &mut tree,
                    index,
                    params,
                    Some(switch_depth),
                    randomizer.primary(),
                )?;
                let groups = breadth_first::split_by_frontier(&tree, index, &open)?;
                for (slot, group) in open.into_iter().zip(groups) {
                    depth_first::grow(
                        &mut tree,
                        group,
                        slot,
                        switch_depth,
                        params,
                        randomizer,
                        parallelism,
                    )?;
                }
            }
        }

        info!(
            "Tree built: {} splits, {} leaves",
            tree.split_count(),
            tree.leaf_count()
        );
        Ok(tree)
    }
}
