//! This directory provides some features for research.
//! Measure the followings of boosting algorithm per iteration
//! - Running time
//! - Objective value (mean loss `Z` of the round)
//! - Training loss

/// Runs a boosting algorithm with logging.
pub mod logger;

/// Defines loss functions.
pub mod loss_functions;

pub use logger::{Logger, CurrentHypothesis};
pub use loss_functions::{hamming_loss, zero_one_loss};
