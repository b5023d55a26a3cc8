//! Datasets and dataset indices
//!
//! A [`Dataset`] is owned outside the engine and stays immutable while a
//! forest trains. A [`DatasetIndex`] is an ordered view over a subset of its
//! rows: training narrows one index into left/right child indices at every
//! split without ever copying points.

use crate::errors::{ForestError, Result};

/// Random-access collection of data points
pub trait Dataset {
    type Point;

    /// Number of data points
    fn len(&self) -> usize;

    /// Data point at an absolute index
    fn get(&self, index: usize) -> Option<&Self::Point>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P> Dataset for [P] {
    type Point = P;

    fn len(&self) -> usize {
        <[P]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&P> {
        <[P]>::get(self, index)
    }
}

impl<P> Dataset for Vec<P> {
    type Point = P;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&P> {
        self.as_slice().get(index)
    }
}

/// Ordered view over absolute row indices of a dataset
///
/// Duplicate indices are allowed. Every stored index is below
/// `dataset.len()`.
#[derive(Debug)]
pub struct DatasetIndex<'a, D: ?Sized> {
    dataset: &'a D,
    indices: Vec<usize>,
}

impl<D: ?Sized> Clone for DatasetIndex<'_, D> {
    fn clone(&self) -> Self {
        Self {
            dataset: self.dataset,
            indices: self.indices.clone(),
        }
    }
}

impl<'a, D: Dataset + ?Sized> DatasetIndex<'a, D> {
    /// Create an index over explicit absolute indices
    pub fn new(dataset: &'a D, indices: Vec<usize>) -> Result<Self> {
        let size = dataset.len();
        if indices.len() > size {
            tracing::warn!(
                "Index size ({}) exceeds dataset size ({})",
                indices.len(),
                size
            );
        }

        if let Some(&index) = indices.iter().find(|&&i| i >= size) {
            return Err(ForestError::IndexOutOfRange { index, size });
        }

        Ok(Self { dataset, indices })
    }

    /// Index covering every row of the dataset in order
    pub fn whole(dataset: &'a D) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Child index over the same dataset
    pub fn subset(&self, indices: Vec<usize>) -> Result<Self> {
        Self::new(self.dataset, indices)
    }

    pub fn dataset(&self) -> &'a D {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Data point at position `i` of this index
    pub fn point_at(&self, i: usize) -> Option<&'a D::Point> {
        let absolute = *self.indices.get(i)?;
        self.dataset.get(absolute)
    }

    /// Raw dataset index at position `i` of this index
    pub fn absolute_index_at(&self, i: usize) -> Option<usize> {
        self.indices.get(i).copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate `(absolute_index, point)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a D::Point)> + '_ {
        let dataset = self.dataset;
        self.indices
            .iter()
            .filter_map(move |&i| dataset.get(i).map(|point| (i, point)))
    }

    /// Iterate points in index order
    pub fn points(&self) -> impl Iterator<Item = &'a D::Point> + '_ {
        self.iter().map(|(_, point)| point)
    }
}
