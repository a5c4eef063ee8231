use crate::common::{checkers, helpers};
use crate::error::Result;
use crate::index::Index;
use crate::weight_matrix::WeightMatrixStore;

/// Weight mass of every category, split by label.
///
/// `positive(c)` is the mass of the documents assigned to `c`,
/// `negative(c)` the mass of the others.
/// `negative(c)` is obtained by subtracting `positive(c)` from the total
/// mass of `c`; a negative result caused by round-off is clamped to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeightTotals {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl CategoryWeightTotals {
    /// One single-threaded pass over `weights`.
    ///
    /// Time complexity: `O(C * D + P)`,
    /// where `P` is the number of (document, category) assignments.
    ///
    /// Panics if a weight read is negative.
    pub fn compute<I>(weights: &WeightMatrixStore, index: &I) -> Result<Self>
        where I: Index + ?Sized,
    {
        checkers::covers(weights.shape(), index)?;
        let n_categories = index.categories_count();
        let n_documents  = index.documents_count();

        let positive = index.documents_by_category()
            .into_iter()
            .enumerate()
            .map(|(c, documents)| {
                documents.into_iter()
                    .map(|d| {
                        let w = weights.weight(c, d);
                        checkers::weight(w, c, d);
                        w
                    })
                    .sum::<f64>()
            })
            .collect::<Vec<_>>();

        let negative = (0..n_categories).map(|c| {
                let total = (0..n_documents)
                    .map(|d| {
                        let w = weights.weight(c, d);
                        checkers::weight(w, c, d);
                        w
                    })
                    .sum::<f64>();
                helpers::clamped_difference(total, positive[c])
            })
            .collect::<Vec<_>>();

        Ok(Self { positive, negative })
    }

    /// Construct totals from known masses.
    /// Negative masses are clamped to zero.
    pub fn from_parts(positive: Vec<f64>, negative: Vec<f64>) -> Self {
        assert_eq!(positive.len(), negative.len());
        let negative = negative.into_iter()
            .map(|n| n.max(0f64))
            .collect();
        Self { positive, negative }
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.positive.len()
    }

    /// Returns `true` if there is no category.
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    /// Mass of the documents assigned to `category`.
    #[inline(always)]
    pub fn positive(&self, category: usize) -> f64 {
        self.positive[category]
    }

    /// Mass of the documents not assigned to `category`.
    #[inline(always)]
    pub fn negative(&self, category: usize) -> f64 {
        self.negative[category]
    }

    /// Total mass of `category`.
    #[inline(always)]
    pub fn total(&self, category: usize) -> f64 {
        self.positive[category] + self.negative[category]
    }
}
