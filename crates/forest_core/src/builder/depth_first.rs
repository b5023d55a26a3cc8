//! Depth-first tree growth
//!
//! Nodes are finalized one at a time from an explicit work stack of
//! `(index, slot, depth)` items, so configured depth never grows the native
//! call stack. The candidate search at each node fans out over the worker
//! pool; recursion into children stays sequential.

use super::objective::information_gain;
use super::partition::partition;
use super::threshold::select_thresholds;
use crate::contracts::{FeatureResponse, LeafPayload, StatisticsAggregator};
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::{ForestError, Result};
use crate::parallelism::Parallelism;
use crate::params::ForestParams;
use crate::randomizer::Randomizer;
use crate::tree::{left_child, right_child, DecisionTree};
use rand::Rng;
use tracing::debug;

/// Best split found for one candidate feature response
#[derive(Debug, Clone)]
pub(crate) struct Candidate<F> {
    pub response: F,
    pub threshold: f64,
    pub score: f64,
}

/// Pick the winner among per-slot results; the first of equal scores wins.
pub(crate) fn reduce_candidates<F>(
    slots: Vec<Result<Option<Candidate<F>>>>,
) -> Result<Option<Candidate<F>>> {
    let mut best: Option<Candidate<F>> = None;
    for slot in slots {
        if let Some(candidate) = slot? {
            if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
    }

    if let Some(candidate) = &best {
        if candidate.score.is_nan() || candidate.score < 0.0 {
            return Err(ForestError::InternalInconsistency(format!(
                "best split score {} after a full candidate sweep",
                candidate.score
            )));
        }
    }
    Ok(best)
}

/// Evaluate one randomized feature response over `index`.
///
/// Returns the threshold with the highest positive gain, or `None` when no
/// threshold improves on zero.
fn evaluate_candidate<D, F, S, R>(
    index: &DatasetIndex<'_, D>,
    parent: &S,
    params: &ForestParams,
    rng: &mut R,
) -> Result<Option<Candidate<F>>>
where
    D: Dataset + ?Sized,
    F: FeatureResponse<D::Point>,
    S: StatisticsAggregator<D>,
    R: Rng + ?Sized,
{
    let response = F::sample(rng);
    let responses: Vec<f64> = index.points().map(|p| response.response(p)).collect();
    let thresholds = select_thresholds(&responses, params.num_candidate_thresholds, rng);

    let mut best_threshold = None;
    let mut best_score = 0.0;
    for threshold in thresholds {
        let (left, right) = partition(index, &responses, threshold)?;
        let score = information_gain(
            parent,
            &S::from_index(&left)?,
            &S::from_index(&right)?,
            params.min_node_size(),
        )?;
        if score > best_score {
            best_score = score;
            best_threshold = Some(threshold);
        }
    }

    Ok(best_threshold.map(|threshold| Candidate {
        response,
        threshold,
        score: best_score,
    }))
}

/// Grow the subtree rooted at `slot` from `index`
pub(crate) fn grow<'a, D, F, S, L>(
    tree: &mut DecisionTree<F, S, L>,
    index: DatasetIndex<'a, D>,
    slot: usize,
    depth: usize,
    params: &ForestParams,
    randomizer: &mut Randomizer,
    parallelism: Parallelism,
) -> Result<()>
where
    D: Dataset + Sync + ?Sized,
    F: FeatureResponse<D::Point>,
    S: StatisticsAggregator<D>,
    L: LeafPayload,
{
    let min_size = params.min_node_size();
    let mut stack = vec![(index, slot, depth)];

    while let Some((index, slot, depth)) = stack.pop() {
        let stats = S::from_index(&index)?;

        if index.len() < min_size || depth >= params.max_levels {
            debug!("Leaf at slot {} (depth {}, {} points)", slot, depth, index.len());
            tree.node_mut(slot)?.make_leaf(stats, Some(L::default()))?;
            continue;
        }

        let mut slots: Vec<Result<Option<Candidate<F>>>> =
            (0..params.num_candidate_features).map(|_| Ok(None)).collect();
        parallelism.fill_slots(&mut slots, randomizer.streams_mut(), |_, rng| {
            evaluate_candidate::<D, F, S, _>(&index, &stats, params, rng)
        })?;

        let best = match reduce_candidates(slots)? {
            Some(best) if best.score >= params.min_gain => best,
            _ => {
                debug!(
                    "Leaf at slot {} (depth {}, {} points): no useful split",
                    slot,
                    depth,
                    index.len()
                );
                tree.node_mut(slot)?.make_leaf(stats, Some(L::default()))?;
                continue;
            }
        };

        let responses: Vec<f64> = index.points().map(|p| best.response.response(p)).collect();
        let (left, right) = partition(&index, &responses, best.threshold)?;
        debug!(
            "Split at slot {} (depth {}): threshold {:.6}, gain {:.6}, {} / {} points",
            slot,
            depth,
            best.threshold,
            best.score,
            left.len(),
            right.len()
        );
        tree.node_mut(slot)?
            .make_split(stats, best.response, best.threshold)?;

        // A winning split has positive gain, and gain is zero whenever a
        // child is below `min_size`, so neither side can be empty here.
        debug_assert!(left.len() >= min_size && right.len() >= min_size);

        // Right is pushed first so the left subtree is finalized first
        stack.push((right, right_child(slot), depth + 1));
        stack.push((left, left_child(slot), depth + 1));
    }

    Ok(())
}
