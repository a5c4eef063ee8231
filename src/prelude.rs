//! Exports the boosting algorithm, the weak learner, and the traits.
//!
pub use crate::booster::{
    // Booster trait
    Booster,

    MPBoost,
    DistributionUpdate,
    ExponentialUpdate,
    run_round,
};


pub use crate::weak_learner::{
    // Weak Learner trait
    WeakLearner,

    FeatureSearch,
    CategoryWeightTotals,
    CancellationToken,
    BestSplit,
};


pub use crate::hypothesis::{
    Classifier,
    CombinedClassifier,
    WeakHypothesis,
};


pub use crate::index::{
    Index,
    InvertedIndex,
    InvertedIndexBuilder,
};


pub use crate::weight_matrix::{
    WeightMatrixStore,
    OpenMode,
    Shape,
};


pub use crate::config::BoostConfig;
pub use crate::error::{BoostError, Result};


pub use crate::research::{
    Logger,
    CurrentHypothesis,
    hamming_loss,
};
