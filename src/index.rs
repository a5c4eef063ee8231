//! The document index consumed by the weak learner.
//!
//! The boosting code only needs to know, for each document,
//! which features it contains and which categories it is assigned to,
//! and for each feature, which documents contain it.

mod inverted;

pub use inverted::{InvertedIndex, InvertedIndexBuilder};

/// Read-only view of a categorised document collection.
///
/// Document, feature, and category ids are dense: `0..documents_count()`,
/// `0..features_count()`, and `0..categories_count()`.
/// Implementors must return
/// [`Index::categories_for_document`] and [`Index::features_for_document`]
/// sorted in ascending order without duplicates;
/// the feature search relies on that order.
pub trait Index {
    /// Number of categories `C`.
    fn categories_count(&self) -> usize;

    /// Number of documents `D`.
    fn documents_count(&self) -> usize;

    /// Number of features.
    fn features_count(&self) -> usize;

    /// Documents containing `feature`, in any order.
    fn documents_for_feature(&self, feature: usize) -> &[usize];

    /// Categories assigned to `document`, ascending.
    fn categories_for_document(&self, document: usize) -> &[usize];

    /// Features of `document`, ascending.
    fn features_for_document(&self, document: usize) -> &[usize];

    /// Returns `true` if `document` is assigned to `category`.
    fn has_category(&self, document: usize, category: usize) -> bool {
        self.categories_for_document(document)
            .binary_search(&category)
            .is_ok()
    }

    /// Returns `true` if `document` contains `feature`.
    fn has_feature(&self, document: usize, feature: usize) -> bool {
        self.features_for_document(document)
            .binary_search(&feature)
            .is_ok()
    }

    /// Documents assigned to each category, ascending.
    /// Computed by one pass over the documents.
    fn documents_by_category(&self) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.categories_count()];
        for d in 0..self.documents_count() {
            for &c in self.categories_for_document(d) {
                lists[c].push(d);
            }
        }
        lists
    }
}
