use crate::hypothesis::WeakHypothesis;

/// The best stump found so far for one category, with its loss `Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestSplit {
    /// The stump.
    pub hypothesis: WeakHypothesis,
    /// `Z = 2 (sqrt(w_b1_x0 w_bneg1_x0) + sqrt(w_b1_x1 w_bneg1_x1))`.
    /// `+inf` if no pivot was found.
    pub loss: f64,
}

impl BestSplit {
    /// The "no pivot found" split.
    pub fn none() -> Self {
        Self { hypothesis: WeakHypothesis::none(), loss: f64::INFINITY }
    }

    /// Returns `true` if `self` should replace `other`:
    /// a strictly smaller loss wins, and equal losses go to
    /// the lower pivot feature id.
    #[inline(always)]
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.loss < other.loss {
            return true;
        }
        if self.loss != other.loss {
            return false;
        }
        match (self.hypothesis.pivot(), other.hypothesis.pivot()) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

impl Default for BestSplit {
    fn default() -> Self {
        Self::none()
    }
}

/// The splits found by one search worker on its share of the features.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialSearchResult {
    best: Vec<BestSplit>,
}

impl PartialSearchResult {
    /// No split found yet for any of the `n_categories` categories.
    pub fn new(n_categories: usize) -> Self {
        Self { best: vec![BestSplit::none(); n_categories] }
    }

    /// The best loss recorded for `category`.
    #[inline(always)]
    pub fn loss(&self, category: usize) -> f64 {
        self.best[category].loss
    }

    /// Replace the split of `category`.
    #[inline(always)]
    pub fn record(&mut self, category: usize, split: BestSplit) {
        self.best[category] = split;
    }

    /// The recorded splits, one per category.
    pub fn splits(&self) -> &[BestSplit] {
        &self.best[..]
    }

    /// Per-category arg-min over the partial results of every worker.
    /// The outcome does not depend on the order of `partials`.
    pub fn merge<T>(partials: T, n_categories: usize) -> Vec<BestSplit>
        where T: IntoIterator<Item = PartialSearchResult>,
    {
        let mut best = vec![BestSplit::none(); n_categories];
        for partial in partials {
            assert_eq!(partial.best.len(), n_categories);
            best.iter_mut()
                .zip(partial.best)
                .for_each(|(b, candidate)| {
                    if candidate.is_better_than(b) {
                        *b = candidate;
                    }
                });
        }
        best
    }
}
