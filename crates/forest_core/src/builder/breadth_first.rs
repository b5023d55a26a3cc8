//! Level-synchronous tree growth
//!
//! All open nodes of one level (the frontier) are decided together. Each
//! level makes two passes over the training index: the first accumulates
//! parent statistics and candidate responses per frontier node, the second
//! accumulates left/right statistics per (node, feature, threshold). Only
//! the frontier's statistics are held in memory.

use super::depth_first::{reduce_candidates, Candidate};
use super::objective::information_gain;
use super::threshold::select_thresholds;
use crate::contracts::{FeatureResponse, LeafPayload, StatisticsAggregator};
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::{ForestError, Result};
use crate::node::goes_left;
use crate::params::ForestParams;
use crate::tree::{left_child, right_child, DecisionTree};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Per frontier node working state for one level
struct FrontierNode<F, S> {
    slot: usize,
    parent: S,
    features: Vec<F>,
    responses: Vec<Vec<f64>>,
    thresholds: Vec<Vec<f64>>,
    /// `[feature][threshold] -> (left, right)`
    children: Vec<Vec<(S, S)>>,
}

/// Position of the frontier node `point` currently reaches, or `None` if it
/// already ended in a leaf.
fn frontier_position<F, S, L, P: ?Sized>(
    tree: &DecisionTree<F, S, L>,
    positions: &HashMap<usize, usize>,
    point: &P,
) -> Result<Option<usize>>
where
    F: FeatureResponse<P>,
{
    let slot = tree.route_to_frontier(point)?;
    match positions.get(&slot) {
        Some(&pos) => Ok(Some(pos)),
        None if tree.node(slot).is_some_and(|n| n.is_leaf()) => Ok(None),
        None => Err(ForestError::InternalInconsistency(format!(
            "point routed to open slot {slot} outside the frontier"
        ))),
    }
}

/// Grow `tree` level by level from the root.
///
/// Stops after finalizing level `max_levels`, or early at `stop_depth`; the
/// returned slots are the frontier left open (always empty without a stop
/// depth).
pub(crate) fn grow_levels<D, F, S, L, R>(
    tree: &mut DecisionTree<F, S, L>,
    index: &DatasetIndex<'_, D>,
    params: &ForestParams,
    stop_depth: Option<usize>,
    rng: &mut R,
) -> Result<Vec<usize>>
where
    D: Dataset + ?Sized,
    F: FeatureResponse<D::Point>,
    S: StatisticsAggregator<D>,
    L: LeafPayload,
    R: Rng + ?Sized,
{
    let dataset = index.dataset();
    let min_size = params.min_node_size();
    let empty = S::from_index(&index.subset(Vec::new())?)?;

    let mut frontier = vec![0usize];
    let mut depth = 0usize;

    while !frontier.is_empty() {
        if stop_depth == Some(depth) {
            return Ok(frontier);
        }

        let last_level = depth >= params.max_levels;
        let feature_count = if last_level { 0 } else { params.num_candidate_features };

        let positions: HashMap<usize, usize> =
            frontier.iter().enumerate().map(|(pos, &slot)| (slot, pos)).collect();
        let mut nodes: Vec<FrontierNode<F, S>> = frontier
            .iter()
            .map(|&slot| FrontierNode {
                slot,
                parent: empty.clone(),
                features: (0..feature_count).map(|_| F::sample(rng)).collect(),
                responses: vec![Vec::new(); feature_count],
                thresholds: Vec::new(),
                children: Vec::new(),
            })
            .collect();

        // Pass 1: parent statistics and candidate responses
        for (absolute, point) in index.iter() {
            let Some(pos) = frontier_position(tree, &positions, point)? else {
                continue;
            };
            let node = &mut nodes[pos];
            node.parent.accumulate(dataset, absolute)?;
            for (feature, responses) in node.features.iter().zip(node.responses.iter_mut()) {
                responses.push(feature.response(point));
            }
        }

        for node in nodes.iter_mut() {
            if node.parent.count() < min_size {
                node.features.clear();
            }
            node.thresholds = node
                .responses
                .iter()
                .take(node.features.len())
                .map(|r| select_thresholds(r, params.num_candidate_thresholds, rng))
                .collect();
            node.children = node
                .thresholds
                .iter()
                .map(|t| vec![(empty.clone(), empty.clone()); t.len()])
                .collect();
            node.responses = Vec::new();
        }

        // Pass 2: left/right statistics per feature and threshold
        for (absolute, point) in index.iter() {
            let Some(pos) = frontier_position(tree, &positions, point)? else {
                continue;
            };
            let node = &mut nodes[pos];
            for ((feature, thresholds), children) in node
                .features
                .iter()
                .zip(&node.thresholds)
                .zip(node.children.iter_mut())
            {
                let response = feature.response(point);
                for (&threshold, (left, right)) in thresholds.iter().zip(children.iter_mut()) {
                    if goes_left(response, threshold) {
                        left.accumulate(dataset, absolute)?;
                    } else {
                        right.accumulate(dataset, absolute)?;
                    }
                }
            }
        }

        let mut next_frontier = Vec::new();
        for node in nodes {
            let FrontierNode {
                slot,
                parent,
                features,
                thresholds,
                children,
                ..
            } = node;

            let mut candidates = Vec::with_capacity(features.len());
            for ((response, thresholds), children) in features.into_iter().zip(thresholds).zip(children) {
                let mut best: Option<(f64, f64)> = None;
                for (threshold, (left, right)) in thresholds.into_iter().zip(children) {
                    let score = information_gain(&parent, &left, &right, min_size)?;
                    if score > best.map_or(0.0, |(_, s)| s) {
                        best = Some((threshold, score));
                    }
                }
                candidates.push(Ok(best.map(|(threshold, score)| Candidate {
                    response,
                    threshold,
                    score,
                })));
            }

            match reduce_candidates(candidates)? {
                Some(best) if best.score >= params.min_gain => {
                    debug!(
                        "Split at slot {} (depth {}): threshold {:.6}, gain {:.6}",
                        slot, depth, best.threshold, best.score
                    );
                    tree.node_mut(slot)?
                        .make_split(parent, best.response, best.threshold)?;
                    next_frontier.push(left_child(slot));
                    next_frontier.push(right_child(slot));
                }
                _ => {
                    debug!(
                        "Leaf at slot {} (depth {}, {} points)",
                        slot,
                        depth,
                        parent.count()
                    );
                    tree.node_mut(slot)?.make_leaf(parent, Some(L::default()))?;
                }
            }
        }

        frontier = next_frontier;
        depth += 1;
    }

    Ok(frontier)
}

/// Training index restricted to the points that reach each open slot
pub(crate) fn split_by_frontier<'a, D, F, S, L>(
    tree: &DecisionTree<F, S, L>,
    index: &DatasetIndex<'a, D>,
    frontier: &[usize],
) -> Result<Vec<DatasetIndex<'a, D>>>
where
    D: Dataset + ?Sized,
    F: FeatureResponse<D::Point>,
{
    let positions: HashMap<usize, usize> =
        frontier.iter().enumerate().map(|(pos, &slot)| (slot, pos)).collect();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); frontier.len()];

    for (absolute, point) in index.iter() {
        if let Some(pos) = frontier_position(tree, &positions, point)? {
            groups[pos].push(absolute);
        }
    }

    groups.into_iter().map(|g| index.subset(g)).collect()
}
