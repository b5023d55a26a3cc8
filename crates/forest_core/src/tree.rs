//! Decision tree stored as an implicit complete binary tree
//!
//! Nodes live in a fixed arena of `2^(max_levels + 1) - 1` slots. The root is
//! slot 0 and the children of slot `i` are `2i + 1` (left, taken when
//! `response > threshold`) and `2i + 2` (right). The arena always has room for
//! a fully balanced tree, which wastes slots on unbalanced trees but gives
//! O(1) child addressing and a flat serialization order.
//!
//! # Binary layout
//!
//! ```text
//! [max_levels: i32][node_count: i32][node 0]...[node node_count-1]
//! ```

use crate::codec::{read_len, write_len, BinaryCodec};
use crate::contracts::{FeatureResponse, Mergeable};
use crate::errors::{ForestError, Result};
use crate::node::{goes_left, DecisionNode, NodeKind};
use crate::params::MAX_TREE_LEVELS;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Number of slots needed for a tree with `max_levels` levels below the root,
/// saturating at `usize::MAX`
pub fn node_capacity(max_levels: usize) -> usize {
    u32::try_from(max_levels.saturating_add(1))
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .map_or(usize::MAX, |slots| slots - 1)
}

#[inline]
pub fn left_child(slot: usize) -> usize {
    2 * slot + 1
}

#[inline]
pub fn right_child(slot: usize) -> usize {
    2 * slot + 2
}

/// A single decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree<F, S, L = ()> {
    max_levels: usize,
    nodes: Vec<DecisionNode<F, S, L>>,
}

impl<F, S, L> DecisionTree<F, S, L> {
    /// Allocate a tree with every slot invalid.
    ///
    /// Fails with `InvalidParameters` above [`MAX_TREE_LEVELS`].
    pub fn new(max_levels: usize) -> Result<Self> {
        if max_levels > MAX_TREE_LEVELS {
            return Err(ForestError::InvalidParameters(format!(
                "max_levels {max_levels} exceeds the supported maximum of {MAX_TREE_LEVELS}"
            )));
        }
        let nodes = (0..node_capacity(max_levels))
            .map(|_| DecisionNode::Invalid)
            .collect();
        Ok(Self { max_levels, nodes })
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[DecisionNode<F, S, L>] {
        &self.nodes
    }

    pub fn node(&self, slot: usize) -> Option<&DecisionNode<F, S, L>> {
        self.nodes.get(slot)
    }

    pub fn node_mut(&mut self, slot: usize) -> Result<&mut DecisionNode<F, S, L>> {
        let size = self.nodes.len();
        self.nodes
            .get_mut(slot)
            .ok_or(ForestError::IndexOutOfRange { index: slot, size })
    }

    /// A tree is valid when it has nodes and its root is finalized
    pub fn is_valid(&self) -> bool {
        self.nodes.first().is_some_and(|root| !root.is_invalid())
    }

    pub fn split_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_split()).count()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Follow split nodes from the root and return the first slot that is
    /// not a split (a leaf, or an invalid slot still awaiting a decision).
    pub fn route_to_frontier<P: ?Sized>(&self, point: &P) -> Result<usize>
    where
        F: FeatureResponse<P>,
    {
        let mut slot = 0usize;
        loop {
            match self.nodes.get(slot) {
                Some(DecisionNode::Split {
                    response,
                    threshold,
                    ..
                }) => {
                    slot = if goes_left(response.response(point), *threshold) {
                        left_child(slot)
                    } else {
                        right_child(slot)
                    };
                }
                Some(_) => return Ok(slot),
                None => {
                    return Err(ForestError::InvalidTree(format!(
                        "split routes to slot {slot} outside of {} nodes",
                        self.nodes.len()
                    )))
                }
            }
        }
    }

    /// Slot of the leaf reached by `point`
    pub fn leaf_slot<P: ?Sized>(&self, point: &P) -> Result<usize>
    where
        F: FeatureResponse<P>,
    {
        let slot = self.route_to_frontier(point)?;
        match self.nodes[slot].kind() {
            NodeKind::Leaf => Ok(slot),
            kind => Err(ForestError::InvalidTree(format!(
                "traversal ended at slot {slot} of kind {kind:?}"
            ))),
        }
    }

    /// Route `point` to a leaf and return a copy of its statistics.
    ///
    /// When an accumulator is supplied the leaf's payload (if any) is merged
    /// into it.
    pub fn test<P: ?Sized>(&self, point: &P, payload: Option<&mut L>) -> Result<S>
    where
        F: FeatureResponse<P>,
        S: Clone,
        L: Mergeable,
    {
        let slot = self.leaf_slot(point)?;
        match &self.nodes[slot] {
            DecisionNode::Leaf {
                stats,
                payload: leaf_payload,
            } => {
                if let (Some(acc), Some(data)) = (payload, leaf_payload) {
                    acc.merge(data)?;
                }
                Ok(stats.clone())
            }
            _ => Err(ForestError::InvalidTree(format!("slot {slot} is not a leaf"))),
        }
    }
}

impl<F, S, L> DecisionTree<F, S, L>
where
    F: BinaryCodec + Default,
    S: BinaryCodec + Default,
    L: BinaryCodec + Default,
{
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_len(writer, self.max_levels)?;
        write_len(writer, self.nodes.len())?;
        for node in &self.nodes {
            node.encode(writer)?;
        }
        Ok(())
    }

    /// Read a tree; the node records read are driven by the declared count.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let max_levels = read_len(reader).map_err(ForestError::from_stream)?;
        let node_count = read_len(reader).map_err(ForestError::from_stream)?;

        if max_levels > MAX_TREE_LEVELS {
            return Err(ForestError::InvalidFormat(format!(
                "tree declares {max_levels} levels, more than {MAX_TREE_LEVELS}"
            )));
        }
        if node_count != node_capacity(max_levels) {
            tracing::warn!(
                "Tree declares {} nodes but {} levels imply {}",
                node_count,
                max_levels,
                node_capacity(max_levels)
            );
        }

        let nodes = (0..node_count)
            .map(|_| DecisionNode::decode(reader))
            .collect::<io::Result<Vec<_>>>()
            .map_err(ForestError::from_stream)?;

        Ok(Self { max_levels, nodes })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Axis, ClassHistogram, LabeledPoint, Tally};

    type Tree = DecisionTree<Axis, ClassHistogram, Tally>;

    fn point(x: f64, y: f64) -> LabeledPoint {
        LabeledPoint { coords: [x, y], label: 0 }
    }

    /// Root splits on x > 0; its left child splits on y > 0.5.
    fn handmade_tree() -> Tree {
        let mut tree = Tree::new(2).unwrap();
        tree.node_mut(0)
            .unwrap()
            .make_split(ClassHistogram::from_counts(vec![4, 4]), Axis(0), 0.0)
            .unwrap();
        tree.node_mut(1)
            .unwrap()
            .make_split(ClassHistogram::from_counts(vec![0, 4]), Axis(1), 0.5)
            .unwrap();
        tree.node_mut(2)
            .unwrap()
            .make_leaf(ClassHistogram::from_counts(vec![4, 0]), Some(Tally(1)))
            .unwrap();
        tree.node_mut(3)
            .unwrap()
            .make_leaf(ClassHistogram::from_counts(vec![0, 3]), Some(Tally(10)))
            .unwrap();
        tree.node_mut(4)
            .unwrap()
            .make_leaf(ClassHistogram::from_counts(vec![0, 1]), None)
            .unwrap();
        tree
    }

    #[test]
    fn test_capacity_and_children() {
        assert_eq!(node_capacity(0), 1);
        assert_eq!(node_capacity(2), 7);
        assert_eq!(node_capacity(10), 2047);
        assert_eq!(left_child(0), 1);
        assert_eq!(right_child(0), 2);
        assert_eq!(left_child(3), 7);
        assert_eq!(right_child(3), 8);

        let tree = Tree::new(3).unwrap();
        assert_eq!(tree.node_count(), 15);
        assert!(!tree.is_valid());
    }

    #[test]
    fn test_oversized_tree_rejected() {
        assert_eq!(node_capacity(63), usize::MAX);
        assert_eq!(node_capacity(usize::MAX), usize::MAX);
        assert_eq!(node_capacity(MAX_TREE_LEVELS), (1 << 25) - 1);

        for max_levels in [MAX_TREE_LEVELS + 1, 63, 64] {
            assert!(matches!(
                Tree::new(max_levels),
                Err(ForestError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_traversal() {
        let tree = handmade_tree();
        assert!(tree.is_valid());
        assert_eq!(tree.split_count(), 2);
        assert_eq!(tree.leaf_count(), 3);

        assert_eq!(tree.leaf_slot(&point(1.0, 0.9)).unwrap(), 3);
        assert_eq!(tree.leaf_slot(&point(1.0, 0.1)).unwrap(), 4);
        assert_eq!(tree.leaf_slot(&point(-1.0, 0.9)).unwrap(), 2);
        // Equal to the threshold goes right
        assert_eq!(tree.leaf_slot(&point(0.0, 0.9)).unwrap(), 2);

        let stats = tree.test(&point(1.0, 0.9), None).unwrap();
        assert_eq!(stats.counts(), &[0, 3]);
    }

    #[test]
    fn test_payload_accumulation() {
        let tree = handmade_tree();
        let mut acc = Tally::default();

        tree.test(&point(1.0, 0.9), Some(&mut acc)).unwrap();
        tree.test(&point(-1.0, 0.0), Some(&mut acc)).unwrap();
        // Leaf without payload leaves the accumulator untouched
        tree.test(&point(1.0, 0.0), Some(&mut acc)).unwrap();

        assert_eq!(acc, Tally(11));
    }

    #[test]
    fn test_invalid_tree_cannot_test() {
        let tree = Tree::new(1).unwrap();
        let err = tree.test(&point(0.0, 0.0), None).unwrap_err();
        assert!(matches!(err, ForestError::InvalidTree(_)));
    }

    #[test]
    fn test_frontier_routing_stops_at_open_slots() {
        let mut tree = Tree::new(2).unwrap();
        tree.node_mut(0)
            .unwrap()
            .make_split(ClassHistogram::default(), Axis(0), 0.0)
            .unwrap();

        assert_eq!(tree.route_to_frontier(&point(1.0, 0.0)).unwrap(), 1);
        assert_eq!(tree.route_to_frontier(&point(-1.0, 0.0)).unwrap(), 2);
    }

    #[test]
    fn test_tree_stream_round_trip() {
        let tree = handmade_tree();
        let mut buf = Vec::new();
        tree.write_to(&mut buf).unwrap();

        let loaded = Tree::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.max_levels(), 2);
        assert_eq!(loaded.node_count(), 7);
        for (a, b) in tree.nodes().iter().zip(loaded.nodes()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.threshold().to_bits(), b.threshold().to_bits());
            assert_eq!(a.statistics(), b.statistics());
            assert_eq!(a.payload(), b.payload());
        }

        let mut again = Vec::new();
        loaded.write_to(&mut again).unwrap();
        assert_eq!(buf, again);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("model.tree");

        let tree = handmade_tree();
        tree.save(&path).unwrap();
        let loaded = Tree::load(&path).unwrap();

        assert_eq!(
            loaded.test(&point(1.0, 0.1), None).unwrap().counts(),
            &[0, 1]
        );
    }

    #[test]
    fn test_truncated_tree_rejected() {
        let tree = handmade_tree();
        let mut buf = Vec::new();
        tree.write_to(&mut buf).unwrap();
        buf.truncate(buf.len() - 3);

        assert!(matches!(
            Tree::read_from(&mut buf.as_slice()),
            Err(ForestError::Io(_))
        ));
    }

    #[test]
    fn test_unknown_node_tag_is_format_error() {
        let mut buf = Vec::new();
        crate::codec::write_i32(&mut buf, 0).unwrap();
        crate::codec::write_i32(&mut buf, 1).unwrap();
        crate::codec::write_i32(&mut buf, 9).unwrap();

        assert!(matches!(
            Tree::read_from(&mut buf.as_slice()),
            Err(ForestError::InvalidFormat(_))
        ));
    }
}
