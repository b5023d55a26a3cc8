//! Class histogram statistics for classification
//!
//! Binary layout: `[aggregated: i32][num_classes: i32][count: i32][bin: i32]...`

use crate::points::LabeledPointSet;
use arbor_forest_core::codec::{read_i32, read_len, write_i32, write_len};
use arbor_forest_core::{
    BinaryCodec, Dataset, DatasetIndex, ForestError, Mergeable, NodeStatistics, Result,
    StatisticsAggregator,
};
use std::io::{self, Read, Write};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistogramStats {
    bins: Vec<usize>,
    count: usize,
    aggregated: bool,
}

impl HistogramStats {
    /// Empty histogram over `num_classes` classes
    pub fn with_classes(num_classes: usize) -> Self {
        Self {
            bins: vec![0; num_classes],
            count: 0,
            aggregated: true,
        }
    }

    pub fn from_bins(bins: Vec<usize>) -> Self {
        let count = bins.iter().sum();
        Self {
            bins,
            count,
            aggregated: true,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    pub fn probability(&self, class: usize) -> f64 {
        match self.bins.get(class) {
            Some(&n) if self.count > 0 => n as f64 / self.count as f64,
            _ => 0.0,
        }
    }

    /// Most frequent class; the lowest label wins ties
    pub fn winner(&self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let mut best = 0;
        for (class, &n) in self.bins.iter().enumerate() {
            if n > self.bins[best] {
                best = class;
            }
        }
        Some(best)
    }

    fn add(&mut self, dataset: &LabeledPointSet, absolute_index: usize) -> Result<()> {
        let point = dataset.get(absolute_index).ok_or(ForestError::IndexOutOfRange {
            index: absolute_index,
            size: dataset.len(),
        })?;
        let label = point.label.ok_or_else(|| {
            ForestError::Statistics(format!("point {absolute_index} has no class label"))
        })?;
        let bin = self.bins.get_mut(label).ok_or_else(|| {
            ForestError::Statistics(format!(
                "label {label} of point {absolute_index} exceeds {} classes",
                dataset.num_classes()
            ))
        })?;
        *bin += 1;
        self.count += 1;
        Ok(())
    }
}

impl Mergeable for HistogramStats {
    /// Unaggregated operands act as the identity; aggregated operands must
    /// agree on the class count.
    fn merge(&mut self, other: &Self) -> Result<()> {
        if !other.aggregated {
            return Ok(());
        }
        if !self.aggregated {
            *self = other.clone();
            return Ok(());
        }
        if self.bins.len() != other.bins.len() {
            return Err(ForestError::IncompatibleStatistics(format!(
                "cannot merge histograms of {} and {} classes",
                self.bins.len(),
                other.bins.len()
            )));
        }

        for (mine, theirs) in self.bins.iter_mut().zip(&other.bins) {
            *mine += theirs;
        }
        self.count += other.count;
        Ok(())
    }
}

impl NodeStatistics for HistogramStats {
    fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Base-2 Shannon entropy of the class distribution
    fn impurity(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let total = self.count as f64;
        self.bins
            .iter()
            .filter(|&&n| n > 0)
            .map(|&n| {
                let p = n as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    fn count(&self) -> usize {
        self.count
    }
}

impl StatisticsAggregator<LabeledPointSet> for HistogramStats {
    fn aggregate(&mut self, index: &DatasetIndex<'_, LabeledPointSet>) -> Result<()> {
        let mut fresh = Self::with_classes(index.dataset().num_classes());
        for &absolute in index.indices() {
            fresh.add(index.dataset(), absolute)?;
        }
        *self = fresh;
        Ok(())
    }

    fn accumulate(&mut self, dataset: &LabeledPointSet, absolute_index: usize) -> Result<()> {
        if !self.aggregated {
            *self = Self::with_classes(dataset.num_classes());
        }
        self.add(dataset, absolute_index)
    }
}

impl BinaryCodec for HistogramStats {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_i32(writer, i32::from(self.aggregated))?;
        write_len(writer, self.bins.len())?;
        write_len(writer, self.count)?;
        for &n in &self.bins {
            write_len(writer, n)?;
        }
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let aggregated = read_i32(reader)? != 0;
        let num_classes = read_len(reader)?;
        let count = read_len(reader)?;
        let bins = (0..num_classes)
            .map(|_| read_len(reader))
            .collect::<io::Result<Vec<_>>>()?;

        if bins.iter().sum::<usize>() != count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("histogram bins do not sum to its count of {count}"),
            ));
        }
        Ok(Self {
            bins,
            count,
            aggregated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::Point2D;

    fn labeled(labels: &[Option<usize>]) -> LabeledPointSet {
        LabeledPointSet::from_points(
            labels
                .iter()
                .enumerate()
                .map(|(i, &label)| Point2D { x: i as f64, y: 0.0, label })
                .collect(),
        )
    }

    #[test]
    fn test_aggregate_over_index() {
        let data = labeled(&[Some(0), Some(1), Some(1), Some(2), Some(1)]);
        let index = DatasetIndex::new(&data, vec![1, 2, 3]).unwrap();
        let stats = HistogramStats::from_index(&index).unwrap();

        assert!(stats.is_aggregated());
        assert_eq!(stats.bins(), &[0, 2, 1]);
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.winner(), Some(1));
        assert!((stats.probability(1) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(HistogramStats::from_bins(vec![5, 0]).impurity(), 0.0);
        assert!((HistogramStats::from_bins(vec![4, 4]).impurity() - 1.0).abs() < 1e-12);
        assert!((HistogramStats::from_bins(vec![1, 1, 1, 1]).impurity() - 2.0).abs() < 1e-12);
        assert_eq!(HistogramStats::default().impurity(), 0.0);
    }

    #[test]
    fn test_unlabeled_point_rejected() {
        let data = labeled(&[Some(0), None]);
        let index = DatasetIndex::whole(&data);
        assert!(matches!(
            HistogramStats::from_index(&index),
            Err(ForestError::Statistics(_))
        ));
    }

    #[test]
    fn test_merge_policy() {
        let mut acc = HistogramStats::default();
        acc.merge(&HistogramStats::from_bins(vec![3, 1])).unwrap();
        acc.merge(&HistogramStats::default()).unwrap();
        acc.merge(&HistogramStats::from_bins(vec![2, 2])).unwrap();
        assert_eq!(acc.bins(), &[5, 3]);

        let err = acc.merge(&HistogramStats::from_bins(vec![1, 1, 1])).unwrap_err();
        assert!(matches!(err, ForestError::IncompatibleStatistics(_)));
    }

    #[test]
    fn test_accumulate_matches_aggregate() {
        let data = labeled(&[Some(1), Some(0), Some(1), Some(1)]);
        let mut incremental = HistogramStats::default();
        for i in 0..data.len() {
            incremental.accumulate(&data, i).unwrap();
        }
        let whole = HistogramStats::from_index(&DatasetIndex::whole(&data)).unwrap();
        assert_eq!(incremental, whole);
    }

    #[test]
    fn test_winner_ties_and_empty() {
        assert_eq!(HistogramStats::from_bins(vec![2, 2, 1]).winner(), Some(0));
        assert_eq!(HistogramStats::with_classes(3).winner(), None);
    }

    #[test]
    fn test_inconsistent_stream_rejected() {
        let mut buf = Vec::new();
        write_i32(&mut buf, 1).unwrap();
        write_len(&mut buf, 2).unwrap();
        write_len(&mut buf, 9).unwrap();
        write_len(&mut buf, 1).unwrap();
        write_len(&mut buf, 1).unwrap();
        assert!(HistogramStats::decode(&mut buf.as_slice()).is_err());
    }
}
