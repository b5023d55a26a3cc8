//! Split scoring

use crate::contracts::NodeStatistics;
use crate::errors::{ForestError, Result};

/// Information gain of splitting `parent` into `left` and `right`.
///
/// Splits leaving fewer than `min_size` points on either side score `0`.
pub fn information_gain<S: NodeStatistics>(
    parent: &S,
    left: &S,
    right: &S,
    min_size: usize,
) -> Result<f64> {
    let n = parent.count();
    if n < min_size {
        return Err(ForestError::InternalInconsistency(format!(
            "scoring a node of {n} points, below the minimum of {min_size}"
        )));
    }

    let (n_left, n_right) = (left.count(), right.count());
    if n_left < min_size || n_right < min_size {
        return Ok(0.0);
    }

    let weighted = (n_left as f64 * left.impurity() + n_right as f64 * right.impurity()) / n as f64;
    Ok(parent.impurity() - weighted)
}
