use crate::index::Index;

/// A trait that defines the behavor of a multi-label classifier.
/// You only need to implement `confidence` method.
pub trait Classifier {
    /// Computes the confidence that `document` belongs to `category`.
    /// A positive value votes for the category.
    fn confidence<I>(&self, index: &I, document: usize, category: usize)
        -> f64
        where I: Index + ?Sized;

    /// Predicts `+1` if `document` belongs to `category`, `-1` otherwise.
    /// A document without any evidence (confidence `0`) is negative.
    fn predict<I>(&self, index: &I, document: usize, category: usize)
        -> i64
        where I: Index + ?Sized,
    {
        let conf = self.confidence(index, document, category);
        if conf > 0.0 { 1 } else { -1 }
    }

    /// Computes the confidence of every document for `category`.
    fn confidence_all<I>(&self, index: &I, category: usize) -> Vec<f64>
        where I: Index + ?Sized,
    {
        let n_documents = index.documents_count();
        (0..n_documents).map(|d| self.confidence(index, d, category))
            .collect::<Vec<_>>()
    }

    /// Predicts the labels of every document for `category`.
    fn predict_all<I>(&self, index: &I, category: usize) -> Vec<i64>
        where I: Index + ?Sized,
    {
        let n_documents = index.documents_count();
        (0..n_documents).map(|d| self.predict(index, d, category))
            .collect::<Vec<_>>()
    }

    /// Returns the categories predicted for `document`, ascending.
    fn predict_categories<I>(&self, index: &I, document: usize)
        -> Vec<usize>
        where I: Index + ?Sized,
    {
        (0..index.categories_count())
            .filter(|&c| self.predict(index, document, c) > 0)
            .collect::<Vec<_>>()
    }
}
