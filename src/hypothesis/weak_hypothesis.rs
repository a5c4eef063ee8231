use serde::{Serialize, Deserialize};

use crate::index::Index;

/// The decision stump chosen for one category in one boosting round.
///
/// If a document contains the pivot feature the stump outputs
/// `score_present`, otherwise `score_absent`.
/// A stump without pivot (no feature ever touched the category)
/// outputs `score_absent`, which is `0` for [`WeakHypothesis::none`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeakHypothesis {
    pivot: Option<usize>,
    score_present: f64,
    score_absent: f64,
}

impl WeakHypothesis {
    /// Construct a stump on `pivot`.
    pub fn new(pivot: usize, score_present: f64, score_absent: f64) -> Self {
        Self { pivot: Some(pivot), score_present, score_absent }
    }

    /// The "no pivot found" stump. Both scores are `0`.
    pub fn none() -> Self {
        Self { pivot: None, score_present: 0f64, score_absent: 0f64 }
    }

    /// The pivot feature, `None` if no pivot was found.
    #[inline(always)]
    pub fn pivot(&self) -> Option<usize> {
        self.pivot
    }

    /// Output for documents containing the pivot.
    #[inline(always)]
    pub fn score_present(&self) -> f64 {
        self.score_present
    }

    /// Output for documents without the pivot.
    #[inline(always)]
    pub fn score_absent(&self) -> f64 {
        self.score_absent
    }

    /// Output of the stump given whether the pivot is present.
    #[inline(always)]
    pub fn score_given(&self, present: bool) -> f64 {
        if present && self.pivot.is_some() {
            self.score_present
        } else {
            self.score_absent
        }
    }

    /// Output of the stump on `document`.
    #[inline(always)]
    pub fn score<I>(&self, index: &I, document: usize) -> f64
        where I: Index + ?Sized,
    {
        match self.pivot {
            Some(f) => self.score_given(index.has_feature(document, f)),
            None => self.score_absent,
        }
    }
}

impl Default for WeakHypothesis {
    fn default() -> Self {
        Self::none()
    }
}
