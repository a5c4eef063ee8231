use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::common::{checkers, helpers};
use crate::error::{BoostError, Result};
use crate::hypothesis::WeakHypothesis;
use crate::index::Index;
use crate::weight_matrix::WeightMatrixStore;
use super::{
    BestSplit,
    CancellationToken,
    CategoryWeightTotals,
    PartialSearchResult,
    WeakLearner,
};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// The MP-Boost weak learner.
/// For every category, [`FeatureSearch`] finds the single-feature
/// decision stump that minimizes
/// ```txt
/// Z = 2 ( sqrt(W+_0 W-_0) + sqrt(W+_1 W-_1) ),
/// ```
/// where `W+_1` (resp. `W-_1`) is the weight mass of the positive
/// (resp. negative) documents containing the feature,
/// and `W+_0`, `W-_0` the same masses for the documents without it.
/// The scores of the winning stump are
/// ```txt
/// score_present = 0.5 ln( (W+_1 + eps) / (W-_1 + eps) ),
/// score_absent  = 0.5 ln( (W+_0 + eps) / (W-_0 + eps) ).
/// ```
///
/// The feature space is split among `n_threads` workers
/// by `feature mod n_threads`.
/// Each worker scans its features in ascending order,
/// the caller blocks until every worker has reported,
/// and the partial results are merged by a per-category arg-min.
/// Equal losses go to the lower feature id,
/// so the result does not depend on the scheduling.
///
/// # Example
/// ```no_run
/// use mpboost::prelude::*;
///
/// # fn main() -> mpboost::Result<()> {
/// # let index: InvertedIndex = todo!();
/// let weights = WeightMatrixStore::open("weights.bin", OpenMode::ReadOnly)?;
/// let search = FeatureSearch::new(4)?;
/// let splits = search.produce(&index, &weights)?;
/// for (c, split) in splits.iter().enumerate() {
///     println!("category {c}: {:?} (Z = {})", split.hypothesis, split.loss);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FeatureSearch {
    n_threads: usize,
    pool: ThreadPool,
    cancel: CancellationToken,
}

impl FeatureSearch {
    /// Construct a search with `n_threads` workers.
    /// `n_threads` must be positive.
    pub fn new(n_threads: usize) -> Result<Self> {
        checkers::n_threads(n_threads)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("mpboost-search-{i}"))
            .build()?;
        let cancel = CancellationToken::new();
        Ok(Self { n_threads, pool, cancel })
    }

    /// Give up a running search once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Number of workers.
    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Finds the best stump of every category.
    ///
    /// `epsilon` is the smoothing constant of the scores,
    /// `1 / (C * D)` in MP-Boost.
    ///
    /// The first failing worker decides the error of the round;
    /// the others stop at their next feature.
    pub fn search<I>(
        &self,
        weights: &WeightMatrixStore,
        index: &I,
        totals: &CategoryWeightTotals,
        epsilon: f64,
    ) -> Result<Vec<BestSplit>>
        where I: Index + Sync + ?Sized,
    {
        checkers::covers(weights.shape(), index)?;
        let n_categories = index.categories_count();
        if totals.len() != n_categories {
            return Err(BoostError::InvalidArgument(format!(
                "weight totals cover {} categories, the index has {n_categories}",
                totals.len()
            )));
        }

        let worker = Worker {
            n_threads: self.n_threads,
            weights,
            index,
            totals,
            epsilon,
            cancel: &self.cancel,
            abort: AtomicBool::new(false),
        };

        let (tx, rx) = mpsc::channel();
        self.pool.scope(|scope| {
            for id in 0..self.n_threads {
                let tx = tx.clone();
                let worker = &worker;
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(
                        AssertUnwindSafe(|| worker.scan(id))
                    )
                    .unwrap_or_else(|payload| {
                        Err(BoostError::WorkerPanic(panic_message(payload)))
                    });
                    if outcome.is_err() {
                        worker.abort.store(true, Ordering::Release);
                    }
                    // The receiver lives until the scope has joined.
                    let _ = tx.send((id, outcome));
                });
            }
        });
        drop(tx);

        // Every worker has reported at this point.
        let mut partials = Vec::with_capacity(self.n_threads);
        for (id, outcome) in rx {
            if let Some(partial) = outcome? {
                partials.push((id, partial));
            }
        }
        if partials.len() != self.n_threads {
            return Err(BoostError::IllegalState(format!(
                "{} of {} search workers reported",
                partials.len(), self.n_threads
            )));
        }
        partials.sort_by_key(|(id, _)| *id);

        let best = PartialSearchResult::merge(
            partials.into_iter().map(|(_, p)| p), n_categories
        );
        Ok(best)
    }
}

impl WeakLearner for FeatureSearch {
    type Hypothesis = Vec<BestSplit>;

    fn name(&self) -> &str {
        "MP-Boost Feature Search"
    }

    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("# of threads", format!("{}", self.n_threads)),
        ]);
        Some(info)
    }

    /// Computes the weight totals and the smoothing constant of the
    /// current distribution, then runs [`FeatureSearch::search`].
    fn produce<I>(&self, index: &I, weights: &WeightMatrixStore)
        -> Result<Self::Hypothesis>
        where I: Index + Sync + ?Sized,
    {
        let n_categories = index.categories_count();
        let n_documents  = index.documents_count();
        if n_categories == 0 || n_documents == 0 {
            return Err(BoostError::InvalidArgument(format!(
                "cannot search an index with {n_categories} categories \
                and {n_documents} documents"
            )));
        }
        let totals = CategoryWeightTotals::compute(weights, index)?;
        let epsilon = helpers::smoothing_epsilon(n_categories, n_documents);
        self.search(weights, index, &totals, epsilon)
    }
}

/// State shared by the workers of one search.
struct Worker<'a, I: ?Sized> {
    n_threads: usize,
    weights: &'a WeightMatrixStore,
    index: &'a I,
    totals: &'a CategoryWeightTotals,
    epsilon: f64,
    cancel: &'a CancellationToken,
    abort: AtomicBool,
}

impl<I> Worker<'_, I>
    where I: Index + ?Sized,
{
    /// Scans the features `id, id + T, id + 2T, ...`.
    /// Returns `Ok(None)` if another worker failed meanwhile.
    fn scan(&self, id: usize) -> Result<Option<PartialSearchResult>> {
        let n_categories = self.index.categories_count();
        let n_features   = self.index.features_count();

        let mut partial = PartialSearchResult::new(n_categories);
        // Weight mass of the documents containing the feature,
        // positive (`b1`) and negative (`bneg1`) for each category.
        let mut w_b1_x1    = vec![0f64; n_categories];
        let mut w_bneg1_x1 = vec![0f64; n_categories];

        let mut scanned = 0usize;
        for feature in (id..n_features).step_by(self.n_threads) {
            if self.cancel.is_cancelled() {
                return Err(BoostError::Cancelled);
            }
            if self.abort.load(Ordering::Acquire) {
                return Ok(None);
            }

            let documents = self.index.documents_for_feature(feature);
            if documents.is_empty() {
                continue;
            }
            scanned += 1;

            w_b1_x1.fill(0f64);
            w_bneg1_x1.fill(0f64);
            for &d in documents {
                self.accumulate(d, &mut w_b1_x1, &mut w_bneg1_x1);
            }

            for c in 0..n_categories {
                let b1_x1    = w_b1_x1[c];
                let bneg1_x1 = w_bneg1_x1[c];
                let b1_x0    = helpers::clamped_difference(
                    self.totals.positive(c), b1_x1
                );
                let bneg1_x0 = helpers::clamped_difference(
                    self.totals.negative(c), bneg1_x1
                );

                let z = 2f64 * (
                    (b1_x0 * bneg1_x0).sqrt() + (b1_x1 * bneg1_x1).sqrt()
                );
                if z < partial.loss(c) {
                    let hypothesis = WeakHypothesis::new(
                        feature,
                        score(b1_x1, bneg1_x1, self.epsilon),
                        score(b1_x0, bneg1_x0, self.epsilon),
                    );
                    partial.record(c, BestSplit { hypothesis, loss: z });
                }
            }
        }

        tracing::debug!(worker = id, features = scanned, "search worker finished");
        Ok(Some(partial))
    }

    /// Adds the weights of `document` to the accumulators.
    /// The sorted category list of the document is swept once:
    /// the categories between two assigned ones are negative.
    #[inline(always)]
    fn accumulate(&self, document: usize, pos: &mut [f64], neg: &mut [f64]) {
        let n_categories = pos.len();
        let mut next = 0;
        for &c in self.index.categories_for_document(document) {
            for k in next..c {
                neg[k] += self.read(k, document);
            }
            pos[c] += self.read(c, document);
            next = c + 1;
        }
        for k in next..n_categories {
            neg[k] += self.read(k, document);
        }
    }

    #[inline(always)]
    fn read(&self, category: usize, document: usize) -> f64 {
        let w = self.weights.weight(category, document);
        debug_assert!(w >= 0f64, "negative weight {w} at ({category}, {document})");
        w
    }
}

/// `0.5 ln( (positive + eps) / (negative + eps) )`.
#[inline(always)]
fn score(positive: f64, negative: f64, epsilon: f64) -> f64 {
    0.5 * ((positive + epsilon) / (negative + epsilon)).ln()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
