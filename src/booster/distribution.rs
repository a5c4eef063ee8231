use fixedbitset::FixedBitSet;

use crate::common::constants::NEXT_SUFFIX;
use crate::common::{checkers, helpers};
use crate::error::{BoostError, Result};
use crate::hypothesis::WeakHypothesis;
use crate::index::Index;
use crate::weight_matrix::{OpenMode, Shape, WeightMatrixStore};

use std::fs;
use std::path::{Path, PathBuf};

/// Maintains the weight distribution file between two rounds.
pub trait DistributionUpdate {
    /// Writes the distribution used by the first round.
    fn initialize<I>(&self, path: &Path, index: &I) -> Result<()>
        where I: Index + ?Sized;

    /// Rewrites the distribution at `path` after a round
    /// produced `round` (one hypothesis per category).
    fn update<I>(&self, path: &Path, index: &I, round: &[WeakHypothesis])
        -> Result<()>
        where I: Index + ?Sized;
}

/// The multiplicative update of MP-Boost.
///
/// Starting from the uniform distribution `1/D` on every category,
/// each round multiplies the weight of `(c, d)` by
/// ```txt
/// exp( - y(c, d) * h_c(d) ),
/// ```
/// where `y(c, d) = +1` if `d` is assigned to `c` and `-1` otherwise,
/// then renormalizes every category to total mass `1`.
/// Categories without pivot keep their weights.
///
/// The new distribution is written next to the old one and renamed
/// over it once complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialUpdate;

impl ExponentialUpdate {
    /// Construct the update.
    pub fn new() -> Self {
        Self
    }
}

impl DistributionUpdate for ExponentialUpdate {
    fn initialize<I>(&self, path: &Path, index: &I) -> Result<()>
        where I: Index + ?Sized,
    {
        let n_documents = index.documents_count();
        let shape = Shape::distribution(index.categories_count(), n_documents)?;
        let mut store = WeightMatrixStore::open(path, OpenMode::Overwrite(shape))?;
        store.fill(1f64 / n_documents as f64)?;
        store.close()
    }

    fn update<I>(&self, path: &Path, index: &I, round: &[WeakHypothesis])
        -> Result<()>
        where I: Index + ?Sized,
    {
        let n_categories = index.categories_count();
        let n_documents  = index.documents_count();
        if round.len() != n_categories {
            return Err(BoostError::InvalidArgument(format!(
                "a round needs {n_categories} hypotheses, got {}", round.len()
            )));
        }

        let next = next_path(path);
        let mut old = WeightMatrixStore::open(path, OpenMode::ReadOnly)?;
        checkers::covers(old.shape(), index)?;
        let shape = old.shape();
        let mut new = WeightMatrixStore::open(&next, OpenMode::Overwrite(shape))?;

        copy_all(&old, &mut new)?;

        let mut positive = FixedBitSet::with_capacity(n_documents);
        let mut present  = FixedBitSet::with_capacity(n_documents);
        let mut row = vec![0f64; n_documents];
        let by_category = index.documents_by_category();

        for (c, h) in round.iter().enumerate() {
            let Some(pivot) = h.pivot() else { continue; };

            positive.clear();
            by_category[c].iter().for_each(|&d| positive.insert(d));
            present.clear();
            index.documents_for_feature(pivot)
                .iter()
                .for_each(|&d| present.insert(d));

            row.iter_mut()
                .enumerate()
                .for_each(|(d, w)| {
                    let y = if positive.contains(d) { 1f64 } else { -1f64 };
                    let score = h.score_given(present.contains(d));
                    *w = old.weight(c, d) * (- y * score).exp();
                });

            if !helpers::normalize(&mut row) {
                tracing::warn!(
                    category = c,
                    "weight mass vanished; keeping the previous distribution"
                );
                continue;
            }
            for (d, &w) in row.iter().enumerate() {
                new.set_weight(w, c, d, 0)?;
            }
        }

        new.close()?;
        old.close()?;
        fs::rename(&next, path)?;
        Ok(())
    }
}

/// `<path>.next`
fn next_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(NEXT_SUFFIX);
    PathBuf::from(name)
}

fn copy_all(from: &WeightMatrixStore, to: &mut WeightMatrixStore) -> Result<()> {
    let shape = from.shape();
    for i3 in 0..shape.dim3() {
        for i2 in 0..shape.dim2() {
            for i1 in 0..shape.dim1() {
                to.set_weight(from.get_weight(i1, i2, i3), i1, i2, i3)?;
            }
        }
    }
    Ok(())
}
