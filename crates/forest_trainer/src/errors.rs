use arbor_forest_core::ForestError;
use thiserror::Error;

/// Errors returned by the forest trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Forest(#[from] ForestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
