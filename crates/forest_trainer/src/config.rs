//! Training parameter files
//!
//! Line-oriented `key: value` text. Blank lines and lines starting with `#`
//! are skipped. Example:
//!
//! ```text
//! # Forest parameters
//! NumTrees: 8
//! TrainMethod: DFS
//! MaxTreeLevels: 10
//! NumCandidateFeats: 10
//! NumCandidateThresh: 25
//! MinGain: 0.01
//! MinDataSetSize: 5
//! NumThreads: 4
//! Seed: 42
//! ```
//!
//! The first five keys are required. A file missing any of them, or holding
//! a value that does not parse, is rejected as a whole.

use crate::errors::TrainerError;
use arbor_forest_core::{ForestParams, TrainMethod};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

const REQUIRED_KEYS: [&str; 5] = [
    "NumTrees",
    "TrainMethod",
    "MaxTreeLevels",
    "NumCandidateFeats",
    "NumCandidateThresh",
];

fn parse_value<T: FromStr>(key: &str, value: &str, line: usize) -> Result<T, TrainerError>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        TrainerError::Config(format!("line {line}: invalid value {value:?} for {key}: {e}"))
    })
}

/// Parse parameter text into validated [`ForestParams`]
pub fn parse_params(text: &str) -> Result<ForestParams, TrainerError> {
    let mut params = ForestParams::default();
    let mut seen = Vec::new();

    for (line_idx, raw) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            warn!("Line {}: expected `key: value`, ignoring {:?}", line_no, line);
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "NumTrees" => params.num_trees = parse_value(key, value, line_no)?,
            "TrainMethod" => {
                params.train_method = value
                    .parse::<TrainMethod>()
                    .map_err(|e| TrainerError::Config(format!("line {line_no}: {e}")))?
            }
            "MaxTreeLevels" => params.max_levels = parse_value(key, value, line_no)?,
            "NumCandidateFeats" => params.num_candidate_features = parse_value(key, value, line_no)?,
            "NumCandidateThresh" => {
                params.num_candidate_thresholds = parse_value(key, value, line_no)?
            }
            "MinGain" => params.min_gain = parse_value(key, value, line_no)?,
            "MinDataSetSize" => params.min_dataset_size = parse_value(key, value, line_no)?,
            "NumThreads" => params.num_threads = parse_value(key, value, line_no)?,
            "Seed" => params.seed = Some(parse_value(key, value, line_no)?),
            other => {
                warn!("Line {}: unknown parameter {:?} ignored", line_no, other);
                continue;
            }
        }
        seen.push(key.to_string());
    }

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !seen.iter().any(|s| s == key))
        .collect();
    if !missing.is_empty() {
        return Err(TrainerError::Config(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }

    params.validate()?;
    Ok(params)
}

/// Read and parse a parameter file
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<ForestParams, TrainerError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        TrainerError::Config(format!("unable to read {}: {e}", path.display()))
    })?;
    parse_params(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_forest_core::ForestError;

    const EXAMPLE: &str = "\
# Forest parameters
NumTrees: 8
TrainMethod: DFS
MaxTreeLevels: 10
NumCandidateFeats: 10
NumCandidateThresh: 25
MinGain: 0.01
MinDataSetSize: 5
NumThreads: 4
Seed: 42
";

    #[test]
    fn test_documented_example() {
        let params = parse_params(EXAMPLE).unwrap();
        assert_eq!(params.num_trees, 8);
        assert_eq!(params.train_method, TrainMethod::DepthFirst);
        assert_eq!(params.max_levels, 10);
        assert_eq!(params.num_candidate_features, 10);
        assert_eq!(params.num_candidate_thresholds, 25);
        assert_eq!(params.min_gain, 0.01);
        assert_eq!(params.min_dataset_size, 5);
        assert_eq!(params.num_threads, 4);
        assert_eq!(params.seed, Some(42));
    }

    #[test]
    fn test_missing_required_key() {
        let text = EXAMPLE.replace("NumCandidateThresh: 25\n", "");
        let err = parse_params(&text).unwrap_err();
        match err {
            TrainerError::Config(msg) => assert!(msg.contains("NumCandidateThresh")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            parse_params(&EXAMPLE.replace("NumTrees: 8", "NumTrees: many")),
            Err(TrainerError::Config(_))
        ));
        assert!(matches!(
            parse_params(&EXAMPLE.replace("TrainMethod: DFS", "TrainMethod: Greedy")),
            Err(TrainerError::Config(_))
        ));
        assert!(matches!(
            parse_params(&EXAMPLE.replace("NumTrees: 8", "NumTrees: 0")),
            Err(TrainerError::Forest(ForestError::InvalidParameters(_)))
        ));
    }

    #[test]
    fn test_optional_keys_and_noise() {
        let text = "\
NumTrees:1
TrainMethod:   Hybrid

   # indented comment
MaxTreeLevels: 3
Colour: blue
not a parameter line
NumCandidateFeats: 2
NumCandidateThresh: 4
";
        let params = parse_params(text).unwrap();
        assert_eq!(params.train_method, TrainMethod::Hybrid);
        assert_eq!(params.max_levels, 3);
        assert_eq!(params.seed, None);
        assert_eq!(params.min_dataset_size, ForestParams::default().min_dataset_size);
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            load_params(dir.path().join("missing.param")),
            Err(TrainerError::Config(_))
        ));
    }
}
