//! Decision forest: an ordered ensemble of trees
//!
//! # Binary layout
//!
//! ```text
//! [tree_count: i32][tree 0]...[tree tree_count-1]
//! ```
//!
//! A forest stream is the count followed by independently serialized tree
//! streams, so trees saved on their own can be combined without re-parsing
//! (see [`write_forest_from_tree_streams`]).

use crate::codec::{read_len, write_len, BinaryCodec};
use crate::contracts::{FeatureResponse, Mergeable};
use crate::errors::{ForestError, Result};
use crate::tree::DecisionTree;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Forest<F, S, L = ()> {
    trees: Vec<DecisionTree<F, S, L>>,
}

impl<F, S, L> Default for Forest<F, S, L> {
    fn default() -> Self {
        Self { trees: Vec::new() }
    }
}

impl<F, S, L> Forest<F, S, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tree(&mut self, tree: DecisionTree<F, S, L>) {
        self.trees.push(tree);
    }

    pub fn trees(&self) -> &[DecisionTree<F, S, L>] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Test `point` against every tree, merging each tree's leaf statistics
    /// into `stats` and, when requested, each leaf payload into `payload`.
    pub fn test<P: ?Sized>(
        &self,
        point: &P,
        stats: &mut S,
        mut payload: Option<&mut L>,
    ) -> Result<()>
    where
        F: FeatureResponse<P>,
        S: Clone + Mergeable,
        L: Mergeable,
    {
        for tree in &self.trees {
            let leaf_stats = tree.test(point, payload.as_deref_mut())?;
            stats.merge(&leaf_stats)?;
        }
        Ok(())
    }
}

impl<F, S, L> FromIterator<DecisionTree<F, S, L>> for Forest<F, S, L> {
    fn from_iter<I: IntoIterator<Item = DecisionTree<F, S, L>>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().collect(),
        }
    }
}

impl<F, S, L> Forest<F, S, L>
where
    F: BinaryCodec + Default,
    S: BinaryCodec + Default,
    L: BinaryCodec + Default,
{
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_len(writer, self.trees.len())?;
        for tree in &self.trees {
            tree.write_to(writer)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let count = read_len(reader).map_err(ForestError::from_stream)?;
        let trees = (0..count)
            .map(|_| DecisionTree::read_from(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { trees })
    }

    /// Serialized forest bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
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

/// Write a forest stream from already serialized tree streams.
///
/// Each tree stream is copied byte for byte after the tree count; nothing is
/// decoded. Returns the number of trees written.
pub fn write_forest_from_tree_streams<W: Write, R: Read>(
    writer: &mut W,
    trees: &mut [R],
) -> Result<usize> {
    write_len(writer, trees.len())?;
    for tree in trees.iter_mut() {
        io::copy(tree, writer)?;
    }
    Ok(trees.len())
}
