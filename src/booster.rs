//! Provides the `Booster` trait, the MP-Boost round orchestrator,
//! and the distribution update applied between two rounds.

/// Provides `Booster` trait.
pub mod core;

/// Rewrites the weight distribution after a round.
pub mod distribution;

/// The MP-Boost round loop.
pub mod mpboost;

pub use self::core::Booster;
pub use self::distribution::{DistributionUpdate, ExponentialUpdate};
pub use self::mpboost::{MPBoost, run_round};
