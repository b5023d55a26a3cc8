//! 2D point sets loaded from whitespace-separated text files
//!
//! Classification files hold `x y [label]` per line, regression files
//! `x y [value]`. Blank lines and lines starting with `#` are skipped.
//! Labels are class indices starting at 0.

use crate::errors::TrainerError;
use arbor_forest_core::Dataset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Points with planar coordinates
pub trait Planar {
    /// Coordinate along `axis` (0 = x, 1 = y)
    fn coord(&self, axis: usize) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
    pub label: Option<usize>,
}

impl Planar for Point2D {
    fn coord(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionPoint {
    pub x: f64,
    pub y: f64,
    pub value: Option<f64>,
}

impl Planar for RegressionPoint {
    fn coord(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }
}

/// Split text into rows of 2 or 3 columns, with 1-based line numbers
fn rows(content: &str) -> Result<Vec<(usize, Vec<&str>)>, TrainerError> {
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != 2 && cols.len() != 3 {
            return Err(TrainerError::Dataset(format!(
                "line {}: expected 2 or 3 columns, got {}",
                line_idx + 1,
                cols.len()
            )));
        }
        rows.push((line_idx + 1, cols));
    }
    Ok(rows)
}

fn parse_f64(text: &str, line: usize, what: &str) -> Result<f64, TrainerError> {
    text.parse::<f64>()
        .map_err(|_| TrainerError::Dataset(format!("line {line}: invalid {what} {text:?}")))
}

fn read_file(path: &Path) -> Result<String, TrainerError> {
    std::fs::read_to_string(path)
        .map_err(|e| TrainerError::Dataset(format!("unable to read {}: {e}", path.display())))
}

/// Labeled 2D points for classification
#[derive(Clone, Debug, Default)]
pub struct LabeledPointSet {
    points: Vec<Point2D>,
    num_classes: usize,
}

impl LabeledPointSet {
    /// Class count is one past the largest label present
    pub fn from_points(points: Vec<Point2D>) -> Self {
        let num_classes = points
            .iter()
            .filter_map(|p| p.label)
            .max()
            .map_or(0, |max| max + 1);
        Self {
            points,
            num_classes,
        }
    }

    pub fn parse(content: &str) -> Result<Self, TrainerError> {
        let mut points = Vec::new();
        for (line, cols) in rows(content)? {
            let label = match cols.get(2) {
                Some(text) => Some(text.parse::<usize>().map_err(|_| {
                    TrainerError::Dataset(format!("line {line}: invalid class label {text:?}"))
                })?),
                None => None,
            };
            points.push(Point2D {
                x: parse_f64(cols[0], line, "x coordinate")?,
                y: parse_f64(cols[1], line, "y coordinate")?,
                label,
            });
        }
        Ok(Self::from_points(points))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let set = Self::parse(&read_file(path.as_ref())?)?;
        info!(
            "Read {} points with {} classes from {}",
            set.len(),
            set.num_classes,
            path.as_ref().display()
        );
        Ok(set)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }
}

impl Dataset for LabeledPointSet {
    type Point = Point2D;

    fn len(&self) -> usize {
        self.points.len()
    }

    fn get(&self, index: usize) -> Option<&Point2D> {
        self.points.get(index)
    }
}

/// 2D points with a scalar target for regression
#[derive(Clone, Debug, Default)]
pub struct RegressionPointSet {
    points: Vec<RegressionPoint>,
}

impl RegressionPointSet {
    pub fn from_points(points: Vec<RegressionPoint>) -> Self {
        Self { points }
    }

    pub fn parse(content: &str) -> Result<Self, TrainerError> {
        let mut points = Vec::new();
        for (line, cols) in rows(content)? {
            let value = cols
                .get(2)
                .map(|text| parse_f64(text, line, "target value"))
                .transpose()?;
            points.push(RegressionPoint {
                x: parse_f64(cols[0], line, "x coordinate")?,
                y: parse_f64(cols[1], line, "y coordinate")?,
                value,
            });
        }
        Ok(Self { points })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let set = Self::parse(&read_file(path.as_ref())?)?;
        info!(
            "Read {} regression points from {}",
            set.len(),
            path.as_ref().display()
        );
        Ok(set)
    }

    pub fn points(&self) -> &[RegressionPoint] {
        &self.points
    }
}

impl Dataset for RegressionPointSet {
    type Point = RegressionPoint;

    fn len(&self) -> usize {
        self.points.len()
    }

    fn get(&self, index: usize) -> Option<&RegressionPoint> {
        self.points.get(index)
    }
}
