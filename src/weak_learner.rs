//! The files in `weak_learner/` directory defines
//! `WeakLearner` trait and the MP-Boost weak learner:
//! the per-category weight aggregation and the parallel feature search.

/// Provides WeakLearner trait.
pub mod core;

/// Per-category positive / negative weight mass.
pub mod aggregation;

/// Cooperative cancellation of a search.
pub mod cancel;

/// Per-worker search results and their merge.
pub mod partial;

/// The multi-threaded decision-stump search.
pub mod feature_search;

pub use self::core::WeakLearner;
pub use self::aggregation::CategoryWeightTotals;
pub use self::cancel::CancellationToken;
pub use self::partial::{BestSplit, PartialSearchResult};
pub use self::feature_search::FeatureSearch;
