use serde::{Serialize, Deserialize};

use crate::error::{BoostError, Result};
use super::Index;

/// An in-memory [`Index`] with both document-side lists
/// and feature postings.
///
/// Built by [`InvertedIndexBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    n_categories: usize,
    categories: Vec<Vec<usize>>,
    features: Vec<Vec<usize>>,
    postings: Vec<Vec<usize>>,
}

impl Index for InvertedIndex {
    #[inline(always)]
    fn categories_count(&self) -> usize {
        self.n_categories
    }

    #[inline(always)]
    fn documents_count(&self) -> usize {
        self.categories.len()
    }

    #[inline(always)]
    fn features_count(&self) -> usize {
        self.postings.len()
    }

    #[inline(always)]
    fn documents_for_feature(&self, feature: usize) -> &[usize] {
        &self.postings[feature][..]
    }

    #[inline(always)]
    fn categories_for_document(&self, document: usize) -> &[usize] {
        &self.categories[document][..]
    }

    #[inline(always)]
    fn features_for_document(&self, document: usize) -> &[usize] {
        &self.features[document][..]
    }
}

/// A struct that builds [`InvertedIndex`].
///
/// # Example
/// ```
/// use mpboost::index::{Index, InvertedIndexBuilder};
///
/// let mut builder = InvertedIndexBuilder::new(2);
/// builder.add_document(vec![0, 3], vec![1]).unwrap();
/// builder.add_document(vec![3], vec![0, 1]).unwrap();
/// let index = builder.build();
///
/// assert_eq!(index.documents_count(), 2);
/// assert_eq!(index.features_count(), 4);
/// assert_eq!(index.documents_for_feature(3), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct InvertedIndexBuilder {
    n_categories: usize,
    n_features: usize,
    categories: Vec<Vec<usize>>,
    features: Vec<Vec<usize>>,
}

impl InvertedIndexBuilder {
    /// Construct a builder for an index with `n_categories` categories.
    pub fn new(n_categories: usize) -> Self {
        Self {
            n_categories,
            n_features: 0,
            categories: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Declare at least `n_features` features,
    /// even if some of them never occur.
    pub fn features(mut self, n_features: usize) -> Self {
        self.n_features = self.n_features.max(n_features);
        self
    }

    /// Append a document and return its id.
    /// Both lists are sorted and deduplicated.
    pub fn add_document(
        &mut self,
        mut features: Vec<usize>,
        mut categories: Vec<usize>,
    ) -> Result<usize>
    {
        if let Some(&c) = categories.iter().find(|&&c| c >= self.n_categories) {
            return Err(BoostError::InvalidArgument(format!(
                "category {c} is out of range [0, {})", self.n_categories
            )));
        }
        features.sort_unstable();
        features.dedup();
        categories.sort_unstable();
        categories.dedup();

        if let Some(&f) = features.last() {
            self.n_features = self.n_features.max(f + 1);
        }

        let id = self.categories.len();
        self.features.push(features);
        self.categories.push(categories);
        Ok(id)
    }

    /// Build the feature postings and return the index.
    pub fn build(self) -> InvertedIndex {
        let mut postings = vec![Vec::new(); self.n_features];
        for (d, features) in self.features.iter().enumerate() {
            for &f in features {
                postings[f].push(d);
            }
        }
        InvertedIndex {
            n_categories: self.n_categories,
            categories: self.categories,
            features: self.features,
            postings,
        }
    }
}
