//! Capability traits the engine is generic over
//!
//! A forest is parameterized by three roles:
//! - `F`: [`FeatureResponse`], the randomized weak learner producing a scalar per point
//! - `S`: [`StatisticsAggregator`], sufficient statistics kept at every node
//! - `L`: [`LeafPayload`], optional extra data stored at leaves
//!
//! Concrete types are bound at compile time, so the engine never needs to
//! recover them at run time.

use crate::codec::BinaryCodec;
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::Result;
use rand::Rng;

/// Combine two values of the same concrete kind.
///
/// Merging must be associative and commutative: forest inference merges
/// per-tree results in no particular order.
pub trait Mergeable {
    fn merge(&mut self, other: &Self) -> Result<()>;
}

/// Scalar function of a data point used to route it at a split node
pub trait FeatureResponse<P: ?Sized>: BinaryCodec + Clone + Default + Send + Sync {
    /// Draw a randomized instance (performs feature sampling)
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Evaluate the response for one point
    fn response(&self, point: &P) -> f64;
}

/// Dataset-independent view of node statistics, enough for inference and scoring
pub trait NodeStatistics: Mergeable + BinaryCodec + Clone + Default + Send + Sync {
    /// Whether the statistics hold data (aggregated, accumulated or merged)
    fn is_aggregated(&self) -> bool;

    /// Impurity (entropy) consumed by the objective function
    fn impurity(&self) -> f64;

    /// Number of data points summarized
    fn count(&self) -> usize;
}

/// Statistics that can be computed from a dataset
pub trait StatisticsAggregator<D: Dataset + ?Sized>: NodeStatistics {
    /// Replace the current contents with statistics over `index`
    fn aggregate(&mut self, index: &DatasetIndex<'_, D>) -> Result<()>;

    /// Add a single data point to the current contents
    fn accumulate(&mut self, dataset: &D, absolute_index: usize) -> Result<()>;

    fn from_index(index: &DatasetIndex<'_, D>) -> Result<Self> {
        let mut stats = Self::default();
        stats.aggregate(index)?;
        Ok(stats)
    }
}

/// Arbitrary data carried by leaves and merged across trees at inference time
pub trait LeafPayload: Mergeable + BinaryCodec + Clone + Default + Send + Sync {}

impl Mergeable for () {
    fn merge(&mut self, _other: &Self) -> Result<()> {
        Ok(())
    }
}

impl LeafPayload for () {}
