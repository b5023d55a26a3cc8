//! Arbor Forest Trainer - 2D classification and regression forests
//!
//! Binds the forest engine to concrete collaborators: whitespace-separated
//! 2D point files, an axis-aligned feature response, class histogram and
//! Gaussian statistics, and `key: value` parameter files.

pub mod config;
pub mod driver;
pub mod errors;
pub mod features;
pub mod gaussian;
pub mod histogram;
pub mod points;

pub use config::{load_params, parse_params};
pub use driver::{
    classification_accuracy, merge_tree_files, regression_rmse, train_classifier,
    train_regressor, ClassificationForest, RegressionForest, TrainReport,
};
pub use errors::TrainerError;
pub use features::AxisAligned2D;
pub use gaussian::GaussianStats;
pub use histogram::HistogramStats;
pub use points::{LabeledPointSet, Planar, Point2D, RegressionPoint, RegressionPointSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
