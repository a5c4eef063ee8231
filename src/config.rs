//! Run configuration.
//!
//! A [`BoostConfig`] is usually read from a JSON file:
//! ```json
//! {
//!     "rounds": 200,
//!     "threads": 8,
//!     "weights_path": "/tmp/weights.bin",
//!     "print_every": 20
//! }
//! ```
//! Missing fields take their default value.

use serde::{Serialize, Deserialize};

use crate::common::{checkers, constants};
use crate::error::{BoostError, Result};
use crate::weak_learner::FeatureSearch;

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;


/// Parameters of an MP-Boost run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Number of boosting rounds.
    pub rounds: usize,

    /// Number of feature-search workers.
    /// Defaults to the available parallelism.
    pub threads: usize,

    /// Where the weight distribution lives during the run.
    pub weights_path: PathBuf,

    /// Print a log row every `print_every` rounds.
    /// `0` disables the rows.
    pub print_every: usize,
}


impl Default for BoostConfig {
    fn default() -> Self {
        let threads = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            rounds: constants::DEFAULT_ROUNDS,
            threads,
            weights_path: PathBuf::from("mpboost-weights.bin"),
            print_every: constants::DEFAULT_PRINT_EVERY,
        }
    }
}


impl BoostConfig {
    /// Parse and validate a configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }


    /// Read, parse, and validate a configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }


    /// Write `self` as pretty-printed JSON.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }


    /// Rejects zero rounds, zero threads, and an empty weights path.
    pub fn validate(&self) -> Result<()> {
        checkers::n_rounds(self.rounds)?;
        checkers::n_threads(self.threads)?;
        if self.weights_path.as_os_str().is_empty() {
            return Err(BoostError::InvalidArgument(
                "the weights path is empty".to_string()
            ));
        }
        Ok(())
    }


    /// The weak learner described by `self`.
    pub fn weak_learner(&self) -> Result<FeatureSearch> {
        FeatureSearch::new(self.threads)
    }
}
