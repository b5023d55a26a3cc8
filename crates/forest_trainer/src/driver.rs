//! Train and test drivers for the 2D classification and regression models
//!
//! Training writes the model bytes plus a sibling `.hash` file holding the
//! hex BLAKE3 digest of those bytes. With a single configured tree the model
//! is a standalone `<output>.tree`; combine such files with
//! [`merge_tree_files`].

use crate::errors::TrainerError;
use crate::features::AxisAligned2D;
use crate::gaussian::GaussianStats;
use crate::histogram::HistogramStats;
use crate::points::{LabeledPointSet, RegressionPointSet};
use anyhow::{Context, Result};
use arbor_forest_core::{
    write_forest_from_tree_streams, Dataset, DatasetIndex, Forest, ForestBuilder, ForestParams,
    StatisticsAggregator, TreeBuilder,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub type ClassificationForest = Forest<AxisAligned2D, HistogramStats>;
pub type RegressionForest = Forest<AxisAligned2D, GaussianStats>;

/// What a training run produced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub model_path: PathBuf,
    pub hash_path: PathBuf,
    pub hash: String,
    pub trees_built: usize,
    pub failed_trees: Vec<usize>,
    pub params: ForestParams,
}

impl TrainReport {
    pub fn is_success(&self) -> bool {
        self.failed_trees.is_empty()
    }
}

/// `path` with `suffix` appended to its file name
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write model bytes and their `.hash` file; returns the hex digest
fn write_model(path: &Path, bytes: &[u8]) -> Result<(PathBuf, String)> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write model to {}", path.display()))?;

    let hash_hex = hex::encode(blake3::hash(bytes).as_bytes());
    let hash_path = with_suffix(path, ".hash");
    std::fs::write(&hash_path, &hash_hex)
        .with_context(|| format!("Failed to write hash to {}", hash_path.display()))?;

    Ok((hash_path, hash_hex))
}

fn train<D, S>(params: &ForestParams, data: &D, output: &Path) -> Result<TrainReport>
where
    D: Dataset + Sync,
    D::Point: crate::points::Planar,
    S: StatisticsAggregator<D>,
{
    if data.is_empty() {
        return Err(TrainerError::Dataset("training set is empty".to_string()).into());
    }

    let (model_path, bytes, trees_built, failed_trees) = if params.num_trees == 1 {
        let tree = TreeBuilder::<AxisAligned2D, S>::new(params.clone())
            .build(&DatasetIndex::whole(data))
            .map_err(|e| TrainerError::Training(e.to_string()))?;
        info!(
            "Tree trained: {} splits, {} leaves",
            tree.split_count(),
            tree.leaf_count()
        );

        let mut bytes = Vec::new();
        tree.write_to(&mut bytes)?;
        (with_suffix(output, ".tree"), bytes, 1, Vec::new())
    } else {
        let build = ForestBuilder::<AxisAligned2D, S>::new(params.clone())
            .build(data)
            .map_err(|e| TrainerError::Training(e.to_string()))?;
        let failed: Vec<usize> = build.failures.iter().map(|f| f.tree).collect();
        for failure in &build.failures {
            warn!("Tree {} was not trained: {}", failure.tree, failure.error);
        }
        (
            output.to_path_buf(),
            build.forest.to_bytes()?,
            build.forest.len(),
            failed,
        )
    };

    let (hash_path, hash) = write_model(&model_path, &bytes)?;
    info!("Model written to {} ({})", model_path.display(), hash);

    Ok(TrainReport {
        model_path,
        hash_path,
        hash,
        trees_built,
        failed_trees,
        params: params.clone(),
    })
}

pub fn train_classifier(
    params: &ForestParams,
    data: &LabeledPointSet,
    output: &Path,
) -> Result<TrainReport> {
    if data.num_classes() == 0 {
        return Err(TrainerError::Dataset("training set has no class labels".to_string()).into());
    }
    train::<_, HistogramStats>(params, data, output)
}

pub fn train_regressor(
    params: &ForestParams,
    data: &RegressionPointSet,
    output: &Path,
) -> Result<TrainReport> {
    train::<_, GaussianStats>(params, data, output)
}

/// Write the report as pretty JSON
pub fn write_summary(report: &TrainReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}

pub fn load_classifier(path: &Path) -> Result<ClassificationForest> {
    ClassificationForest::load(path)
        .with_context(|| format!("Failed to load forest from {}", path.display()))
}

pub fn load_regressor(path: &Path) -> Result<RegressionForest> {
    RegressionForest::load(path)
        .with_context(|| format!("Failed to load forest from {}", path.display()))
}

/// Fraction of labeled points whose merged histogram picks their label
pub fn classification_accuracy(forest: &ClassificationForest, data: &LabeledPointSet) -> Result<f64> {
    let mut total = 0usize;
    let mut correct = 0usize;

    for point in data.points() {
        let Some(label) = point.label else {
            continue;
        };
        let mut stats = HistogramStats::default();
        forest.test(point, &mut stats, None)?;
        total += 1;
        if stats.winner() == Some(label) {
            correct += 1;
        }
    }

    if total == 0 {
        return Err(TrainerError::Dataset("test set has no labeled points".to_string()).into());
    }
    Ok(correct as f64 / total as f64)
}

/// Root mean squared error of the merged mean over points with targets
pub fn regression_rmse(forest: &RegressionForest, data: &RegressionPointSet) -> Result<f64> {
    let mut total = 0usize;
    let mut squared = 0.0;

    for point in data.points() {
        let Some(value) = point.value else {
            continue;
        };
        let mut stats = GaussianStats::default();
        forest.test(point, &mut stats, None)?;
        let diff = value - stats.mean();
        squared += diff * diff;
        total += 1;
    }

    if total == 0 {
        return Err(TrainerError::Dataset("test set has no target values".to_string()).into());
    }
    Ok((squared / total as f64).sqrt())
}

/// Combine standalone tree files into one forest file without decoding them
pub fn merge_tree_files(trees: &[PathBuf], output: &Path) -> Result<usize> {
    if trees.is_empty() {
        return Err(TrainerError::Config("no tree files to merge".to_string()).into());
    }

    let mut readers = trees
        .iter()
        .map(|path| {
            File::open(path)
                .map(BufReader::new)
                .with_context(|| format!("Failed to open tree file {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut writer = BufWriter::new(
        File::create(output)
            .with_context(|| format!("Failed to create forest file {}", output.display()))?,
    );
    let count = write_forest_from_tree_streams(&mut writer, &mut readers)?;
    writer.flush()?;

    info!("Merged {} trees into {}", count, output.display());
    Ok(count)
}
