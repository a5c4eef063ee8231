use crate::hypothesis::Classifier;
use crate::index::Index;

/// Zero-one loss
pub fn zero_one_loss(true_label: f64, prediction: f64) -> f64 {
    let prediction = if prediction > 0.0 { 1.0 } else { -1.0 };
    if true_label * prediction > 0.0 { 0.0 } else { 1.0 }
}


/// Fraction of `(document, category)` pairs that `f` gets wrong.
/// Returns `0` on an empty index.
pub fn hamming_loss<I, F>(index: &I, f: &F) -> f64
    where I: Index + ?Sized,
          F: Classifier,
{
    let n_categories = index.categories_count();
    let n_documents = index.documents_count();
    let n_pairs = n_categories * n_documents;
    if n_pairs == 0 {
        return 0.0;
    }

    let errors = (0..n_documents)
        .map(|d| {
            (0..n_categories)
                .map(|c| {
                    let y = if index.has_category(d, c) { 1.0 } else { -1.0 };
                    zero_one_loss(y, f.confidence(index, d, c))
                })
                .sum::<f64>()
        })
        .sum::<f64>();
    errors / n_pairs as f64
}
