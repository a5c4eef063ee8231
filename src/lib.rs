#![warn(missing_docs)]

//!
//! A crate that provides MP-Boost,
//! a multi-label boosting algorithm for text categorization.
//!
//! Each round of MP-Boost picks, for every category,
//! the single-feature decision stump with minimal loss `Z`
//! with respect to a weight distribution over
//! `(category, document)` pairs.
//!
//! - The weight distribution lives in a memory-mapped file
//!     ([`WeightMatrixStore`]), so that large collections do not need
//!     to fit in the heap.
//! - The stump search ([`FeatureSearch`]) splits the features among
//!     a pool of worker threads and merges their findings
//!     deterministically.
//! - The boosting loop ([`MPBoost`]) appends the stumps of each round
//!     to a [`CombinedClassifier`] and rewrites the distribution.
//!
//! ```no_run
//! use mpboost::prelude::*;
//!
//! # fn main() -> mpboost::Result<()> {
//! let mut builder = InvertedIndexBuilder::new(2);
//! builder.add_document(vec![0, 3], vec![0])?;
//! builder.add_document(vec![1, 3], vec![1])?;
//! let index = builder.build();
//!
//! let config = BoostConfig::from_json_file("mpboost.json")?;
//! let mut booster = MPBoost::from_config(&index, &config);
//! let weak_learner = config.weak_learner()?;
//! let f = booster.run(&weak_learner)?;
//! f.save("model.json")?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod error;
pub mod config;
pub mod index;
pub mod weight_matrix;
pub mod hypothesis;
pub mod weak_learner;
pub mod booster;
pub mod research;
pub mod prelude;


pub use error::{BoostError, Result};
pub use config::BoostConfig;

pub use index::{Index, InvertedIndex, InvertedIndexBuilder};
pub use weight_matrix::{OpenMode, Shape, WeightMatrixStore};

pub use hypothesis::{Classifier, CombinedClassifier, WeakHypothesis};

pub use weak_learner::{
    WeakLearner,
    FeatureSearch,
    CancellationToken,
};

pub use booster::{
    Booster,
    MPBoost,
    DistributionUpdate,
    ExponentialUpdate,
    run_round,
};
