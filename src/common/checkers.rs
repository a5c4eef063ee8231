//! This file defines some functions that checks some pre-conditions
//! E.g., the number of workers, the shape of the weight matrix.

use crate::error::{BoostError, Result};
use crate::index::Index;
use crate::weight_matrix::Shape;

/// Check whether the number of search workers is valid or not.
#[inline(always)]
pub(crate) fn n_threads(n_threads: usize) -> Result<()> {
    if n_threads == 0 {
        return Err(BoostError::InvalidArgument(
            "the number of search threads must be positive. got 0.".into()
        ));
    }
    Ok(())
}

/// Check whether the number of boosting rounds is valid or not.
#[inline(always)]
pub(crate) fn n_rounds(rounds: usize) -> Result<()> {
    if rounds == 0 {
        return Err(BoostError::InvalidArgument(
            "the number of boosting rounds must be positive. got 0.".into()
        ));
    }
    Ok(())
}

/// Check that the weight matrix covers every (category, document) pair
/// of `index`.
#[inline(always)]
pub(crate) fn covers<I>(shape: Shape, index: &I) -> Result<()>
    where I: Index + ?Sized,
{
    let n_categories = index.categories_count();
    let n_documents  = index.documents_count();
    if shape.dim1() < n_categories || shape.dim2() < n_documents {
        return Err(BoostError::InvalidArgument(format!(
            "weight matrix of shape {shape} does not cover \
            {n_categories} categories x {n_documents} documents"
        )));
    }
    Ok(())
}

/// Check a weight read from the distribution matrix.
/// A negative weight means that the distribution update is broken.
#[inline(always)]
pub(crate) fn weight(w: f64, category: usize, document: usize) {
    assert!(
        w >= 0f64,
        "negative weight {w} at (category {category}, document {document})"
    );
}
