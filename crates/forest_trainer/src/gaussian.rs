//! Gaussian statistics over a scalar regression target
//!
//! Keeps count, sum and sum of squares, so merging is exact and the merged
//! mean is the count-weighted mean of its parts.
//!
//! Binary layout: `[aggregated: i32][count: i32][sum: f64][sum_sq: f64]`

use crate::points::RegressionPointSet;
use arbor_forest_core::codec::{read_f64, read_i32, read_len, write_f64, write_i32, write_len};
use arbor_forest_core::{
    BinaryCodec, Dataset, DatasetIndex, ForestError, Mergeable, NodeStatistics, Result,
    StatisticsAggregator,
};
use std::io::{self, Read, Write};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GaussianStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
    aggregated: bool,
}

impl GaussianStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            sum: values.iter().sum(),
            sum_sq: values.iter().map(|v| v * v).sum(),
            aggregated: true,
        }
    }

    /// Mean target value, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Sample variance (n - 1 denominator), 0 below two points
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        ((self.sum_sq - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    fn add(&mut self, dataset: &RegressionPointSet, absolute_index: usize) -> Result<()> {
        let point = dataset.get(absolute_index).ok_or(ForestError::IndexOutOfRange {
            index: absolute_index,
            size: dataset.len(),
        })?;
        let value = point
            .value
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                ForestError::Statistics(format!("point {absolute_index} has no finite target value"))
            })?;
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.aggregated = true;
        Ok(())
    }
}

impl Mergeable for GaussianStats {
    fn merge(&mut self, other: &Self) -> Result<()> {
        if !other.aggregated {
            return Ok(());
        }
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.aggregated = true;
        Ok(())
    }
}

impl NodeStatistics for GaussianStats {
    fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Differential entropy up to constants: log2 of the variance, floored
    /// at machine epsilon so pure nodes stay finite
    fn impurity(&self) -> f64 {
        self.variance().max(f64::EPSILON).log2()
    }

    fn count(&self) -> usize {
        self.count
    }
}

impl StatisticsAggregator<RegressionPointSet> for GaussianStats {
    fn aggregate(&mut self, index: &DatasetIndex<'_, RegressionPointSet>) -> Result<()> {
        let mut fresh = Self {
            aggregated: true,
            ..Self::default()
        };
        for &absolute in index.indices() {
            fresh.add(index.dataset(), absolute)?;
        }
        *self = fresh;
        Ok(())
    }

    fn accumulate(&mut self, dataset: &RegressionPointSet, absolute_index: usize) -> Result<()> {
        self.add(dataset, absolute_index)
    }
}

impl BinaryCodec for GaussianStats {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_i32(writer, i32::from(self.aggregated))?;
        write_len(writer, self.count)?;
        write_f64(writer, self.sum)?;
        write_f64(writer, self.sum_sq)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            aggregated: read_i32(reader)? != 0,
            count: read_len(reader)?,
            sum: read_f64(reader)?,
            sum_sq: read_f64(reader)?,
        })
    }
}
