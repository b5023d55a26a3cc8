//! Minimal collaborators for engine unit tests

use crate::codec::{read_i32, read_len, write_i32, write_len, BinaryCodec};
use crate::contracts::{FeatureResponse, LeafPayload, Mergeable, NodeStatistics, StatisticsAggregator};
use crate::dataset::{Dataset, DatasetIndex};
use crate::errors::{ForestError, Result};
use rand::Rng;
use std::io::{self, Read, Write};

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledPoint {
    pub coords: [f64; 2],
    pub label: usize,
}

#[derive(Clone, Debug)]
pub struct LabeledPoints {
    pub points: Vec<LabeledPoint>,
    pub num_classes: usize,
}

impl Dataset for LabeledPoints {
    type Point = LabeledPoint;

    fn len(&self) -> usize {
        self.points.len()
    }

    fn get(&self, index: usize) -> Option<&LabeledPoint> {
        self.points.get(index)
    }
}

/// Two classes separated along x: class 0 at x < 0, class 1 at x > 0.
/// The y coordinate is noise shared by both classes.
pub fn two_blobs(per_class: usize) -> LabeledPoints {
    let mut points = Vec::with_capacity(per_class * 2);
    for i in 0..per_class {
        let y = i as f64 * 0.37 % 1.0;
        points.push(LabeledPoint { coords: [-1.0 - i as f64 * 0.1, y], label: 0 });
        points.push(LabeledPoint { coords: [1.0 + i as f64 * 0.1, y], label: 1 });
    }
    LabeledPoints { points, num_classes: 2 }
}

/// Axis-aligned response over a 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Axis(pub usize);

impl FeatureResponse<LabeledPoint> for Axis {
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Axis(rng.gen_range(0..2))
    }

    fn response(&self, point: &LabeledPoint) -> f64 {
        point.coords[self.0]
    }
}

impl BinaryCodec for Axis {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_len(writer, self.0)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Axis(read_len(reader)?))
    }
}

/// Class-count histogram with base-2 entropy
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassHistogram {
    counts: Vec<usize>,
    total: usize,
    aggregated: bool,
}

impl ClassHistogram {
    pub fn from_counts(counts: Vec<usize>) -> Self {
        let total = counts.iter().sum();
        Self { counts, total, aggregated: true }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }
}

impl Mergeable for ClassHistogram {
    fn merge(&mut self, other: &Self) -> Result<()> {
        if !other.aggregated {
            return Ok(());
        }
        if !self.aggregated {
            *self = other.clone();
            return Ok(());
        }
        if self.counts.len() != other.counts.len() {
            return Err(ForestError::IncompatibleStatistics(format!(
                "{} classes vs {} classes",
                self.counts.len(),
                other.counts.len()
            )));
        }
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
        self.total += other.total;
        Ok(())
    }
}

impl NodeStatistics for ClassHistogram {
    fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    fn impurity(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / self.total as f64;
                -p * p.log2()
            })
            .sum()
    }

    fn count(&self) -> usize {
        self.total
    }
}

impl StatisticsAggregator<LabeledPoints> for ClassHistogram {
    fn aggregate(&mut self, index: &DatasetIndex<'_, LabeledPoints>) -> Result<()> {
        *self = Self::from_counts(vec![0; index.dataset().num_classes]);
        for point in index.points() {
            self.counts[point.label] += 1;
            self.total += 1;
        }
        Ok(())
    }

    fn accumulate(&mut self, dataset: &LabeledPoints, absolute_index: usize) -> Result<()> {
        if !self.aggregated {
            *self = Self::from_counts(vec![0; dataset.num_classes]);
        }
        let point = dataset.get(absolute_index).ok_or(ForestError::IndexOutOfRange {
            index: absolute_index,
            size: dataset.len(),
        })?;
        self.counts[point.label] += 1;
        self.total += 1;
        Ok(())
    }
}

impl BinaryCodec for ClassHistogram {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_i32(writer, i32::from(self.aggregated))?;
        write_len(writer, self.counts.len())?;
        for &count in &self.counts {
            write_len(writer, count)?;
        }
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let aggregated = read_i32(reader)? != 0;
        let len = read_len(reader)?;
        let counts = (0..len).map(|_| read_len(reader)).collect::<io::Result<Vec<_>>>()?;
        let total = counts.iter().sum();
        Ok(Self { counts, total, aggregated })
    }
}

/// Payload counting how many leaves were merged into it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally(pub usize);

impl Mergeable for Tally {
    fn merge(&mut self, other: &Self) -> Result<()> {
        self.0 += other.0;
        Ok(())
    }
}

impl BinaryCodec for Tally {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_len(writer, self.0)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Tally(read_len(reader)?))
    }
}

impl LeafPayload for Tally {}
