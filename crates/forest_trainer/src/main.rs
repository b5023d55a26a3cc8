//! Arbor decision forest CLI
//!
//! Trains and tests 2D classification and regression forests, and merges
//! standalone tree files into forests.

use anyhow::{bail, Context, Result};
use arbor_forest_trainer::driver::{self, TrainReport};
use arbor_forest_trainer::{load_params, LabeledPointSet, RegressionPointSet};
use arbor_forest_core::ForestParams;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decision forest trainer for 2D point data", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classification with class histograms (`x y label` files)
    #[command(subcommand)]
    Classify(Mode),

    /// Regression with Gaussian statistics (`x y value` files)
    #[command(subcommand)]
    Regress(Mode),

    /// Combine standalone `.tree` files into one forest file
    MergeTrees {
        /// Tree files, in forest order
        #[arg(required = true)]
        trees: Vec<PathBuf>,

        /// Output forest path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Train a forest from a parameter file and a data file
    Train(TrainArgs),

    /// Evaluate a trained forest against a data file
    Test {
        /// Forest file
        #[arg(short, long)]
        model: PathBuf,

        /// Data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Parameter file (`key: value` lines)
    #[arg(short, long)]
    config: PathBuf,

    /// Output forest path (`<output>.tree` when training one tree)
    #[arg(short, long)]
    output: PathBuf,

    /// Training data file
    #[arg(short, long)]
    data: PathBuf,

    /// Override the configured worker thread count
    #[arg(long)]
    threads: Option<usize>,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON training summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl TrainArgs {
    fn params(&self) -> Result<ForestParams> {
        let mut params = load_params(&self.config)
            .with_context(|| format!("Invalid parameter file {}", self.config.display()))?;
        if let Some(threads) = self.threads {
            params.num_threads = threads;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        Ok(params)
    }
}

fn log_params(params: &ForestParams) {
    info!("Training configuration:");
    info!("  Trees: {}", params.num_trees);
    info!("  Method: {}", params.train_method);
    info!("  Max levels: {}", params.max_levels);
    info!("  Candidate features: {}", params.num_candidate_features);
    info!("  Candidate thresholds: {}", params.num_candidate_thresholds);
    info!("  Min gain: {}", params.min_gain);
    info!("  Threads: {}", params.num_threads);
    match params.seed {
        Some(seed) => info!("  Seed: {}", seed),
        None => info!("  Seed: system entropy"),
    }
}

fn finish_training(report: &TrainReport, summary: Option<&PathBuf>) -> Result<()> {
    info!("  Model: {}", report.model_path.display());
    info!("  Hash: {} ({})", report.hash_path.display(), report.hash);

    if let Some(path) = summary {
        driver::write_summary(report, path)?;
        info!("  Summary: {}", path.display());
    }

    if !report.is_success() {
        bail!(
            "{} of {} trees failed to train: {:?}",
            report.failed_trees.len(),
            report.params.num_trees,
            report.failed_trees
        );
    }
    if report.params.num_trees == 1 {
        info!("Merge standalone trees with `arbor merge-trees`");
    }
    Ok(())
}

fn classify(mode: Mode) -> Result<()> {
    match mode {
        Mode::Train(args) => {
            let params = args.params()?;
            log_params(&params);
            let data = LabeledPointSet::from_file(&args.data)?;
            let report = driver::train_classifier(&params, &data, &args.output)?;
            finish_training(&report, args.summary.as_ref())
        }
        Mode::Test { model, data } => {
            let forest = driver::load_classifier(&model)?;
            let data = LabeledPointSet::from_file(&data)?;
            info!("Testing {} trees on {} points", forest.len(), data.points().len());
            let accuracy = driver::classification_accuracy(&forest, &data)?;
            info!("Accuracy: {:.2}%", accuracy * 100.0);
            Ok(())
        }
    }
}

fn regress(mode: Mode) -> Result<()> {
    match mode {
        Mode::Train(args) => {
            let params = args.params()?;
            log_params(&params);
            let data = RegressionPointSet::from_file(&args.data)?;
            let report = driver::train_regressor(&params, &data, &args.output)?;
            finish_training(&report, args.summary.as_ref())
        }
        Mode::Test { model, data } => {
            let forest = driver::load_regressor(&model)?;
            let data = RegressionPointSet::from_file(&data)?;
            info!("Testing {} trees on {} points", forest.len(), data.points().len());
            let rmse = driver::regression_rmse(&forest, &data)?;
            info!("RMS error: {:.6}", rmse);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Arbor decision forest trainer v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Classify(mode) => classify(mode),
        Command::Regress(mode) => regress(mode),
        Command::MergeTrees { trees, output } => {
            let count = driver::merge_tree_files(&trees, &output)?;
            info!("Wrote forest of {} trees to {}", count, output.display());
            Ok(())
        }
    }
}
