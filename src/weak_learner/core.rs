//! Provides `WeakLearner` trait.

use crate::error::Result;
use crate::index::Index;
use crate::weight_matrix::WeightMatrixStore;

/// An interface for weak learners.
///
/// A weak learner receives the document index and the current weight
/// distribution, and returns a hypothesis with small weighted loss.
///
/// # Required Methods
/// - [`WeakLearner::name`]
/// - [`WeakLearner::produce`]
/// - [`WeakLearner::info`] ... optional.
pub trait WeakLearner {
    /// The hypothesis type produced by one call of `produce`.
    type Hypothesis;

    /// Returns the name of the weak learner.
    fn name(&self) -> &str;

    /// Returns the information of the weak learner as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }

    /// Produces a hypothesis for the distribution stored in `weights`.
    fn produce<I>(&self, index: &I, weights: &WeightMatrixStore)
        -> Result<Self::Hypothesis>
        where I: Index + Sync + ?Sized;
}
