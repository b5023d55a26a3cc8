//! Splitting a dataset index by a threshold

use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::{ForestError, Result};
use crate::node::goes_left;

/// Split `index` into `(left, right)` children.
///
/// `responses[i]` is the response of the point at position `i` of `index`.
/// Positions with `response > threshold` go left, the rest right, preserving
/// their relative order.
pub fn partition<'a, D: Dataset + ?Sized>(
    index: &DatasetIndex<'a, D>,
    responses: &[f64],
    threshold: f64,
) -> Result<(DatasetIndex<'a, D>, DatasetIndex<'a, D>)> {
    if responses.len() != index.len() {
        return Err(ForestError::InternalInconsistency(format!(
            "{} responses for an index of size {}",
            responses.len(),
            index.len()
        )));
    }

    let (left, right): (Vec<(usize, f64)>, Vec<(usize, f64)>) = index
        .indices()
        .iter()
        .copied()
        .zip(responses.iter().copied())
        .partition(|&(_, response)| goes_left(response, threshold));

    Ok((
        index.subset(left.into_iter().map(|(i, _)| i).collect())?,
        index.subset(right.into_iter().map(|(i, _)| i).collect())?,
    ))
}

/// Sizes `(left, right)` a partition would produce, without building it
pub fn partition_counts(responses: &[f64], threshold: f64) -> (usize, usize) {
    let left = responses
        .iter()
        .filter(|&&r| goes_left(r, threshold))
        .count();
    (left, responses.len() - left)
}
