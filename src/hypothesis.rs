//! Hypotheses produced by boosting:
//! the per-category decision stump of one round,
//! and the combination of every round.

pub(crate) mod hypothesis_traits;
pub(crate) mod weak_hypothesis;
pub(crate) mod combined;

pub use hypothesis_traits::Classifier;
pub use weak_hypothesis::WeakHypothesis;
pub use combined::CombinedClassifier;
