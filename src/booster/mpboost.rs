//! Provides [`MPBoost`], the multi-label boosting loop
//! of Esuli, Fagni & Sebastiani, 2006.
use crate::{
    Booster,
    WeakLearner,
    CombinedClassifier,
    WeakHypothesis,
    Index,
    WeightMatrixStore,
    OpenMode,

    common::{checkers, helpers, constants::DEFAULT_ROUNDS},
    config::BoostConfig,
    error::{BoostError, Result},
    research::CurrentHypothesis,
    weak_learner::{BestSplit, FeatureSearch},
};
use super::distribution::{DistributionUpdate, ExponentialUpdate};

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;


/// Defines `MPBoost`.
///
/// Each round reads the weight distribution over
/// `(category, document)` pairs from a memory-mapped file,
/// asks the weak learner for one stump per category,
/// appends the stumps to the model,
/// and rewrites the distribution in place.
///
/// The distribution file is owned by the booster for the whole run:
/// it is created (or overwritten) by [`Booster::preprocess`]
/// and updated after every round.
///
/// # Example
/// ```no_run
/// use mpboost::prelude::*;
///
/// # fn main() -> mpboost::Result<()> {
/// let mut builder = InvertedIndexBuilder::new(2);
/// builder.add_document(vec![0, 3], vec![0])?;
/// builder.add_document(vec![1, 3], vec![1])?;
/// let index = builder.build();
///
/// let mut booster = MPBoost::init(&index, "weights.bin")
///     .rounds(50);
/// let weak_learner = FeatureSearch::new(4)?;
///
/// let f: CombinedClassifier = booster.run(&weak_learner)?;
/// let predictions = f.predict_categories(&index, 0);
/// println!("document 0 belongs to {predictions:?}");
/// # Ok(())
/// # }
/// ```
pub struct MPBoost<'a, I: ?Sized, U = ExponentialUpdate> {
    // Document index.
    index: &'a I,

    // Path of the weight distribution file.
    weights_path: PathBuf,

    // Number of rounds.
    rounds: usize,

    // Rewrites the distribution after each round.
    updater: U,

    // The stumps obtained so far.
    model: CombinedClassifier,

    // Per-category loss `Z` of the last round.
    losses: Vec<f64>,

    // Terminated iteration.
    terminated: usize,
}


impl<'a, I> MPBoost<'a, I, ExponentialUpdate>
    where I: Index + ?Sized,
{
    /// Initialize `MPBoost` on `index`,
    /// keeping the weight distribution at `weights_path`.
    /// Runs [`DEFAULT_ROUNDS`] rounds unless told otherwise.
    pub fn init<P: AsRef<Path>>(index: &'a I, weights_path: P) -> Self {
        Self {
            index,
            weights_path: weights_path.as_ref().to_path_buf(),
            rounds: DEFAULT_ROUNDS,
            updater: ExponentialUpdate::new(),
            model: CombinedClassifier::new(index.categories_count()),
            losses: Vec::new(),
            terminated: usize::MAX,
        }
    }


    /// Initialize `MPBoost` from the `rounds` and `weights_path`
    /// entries of `config`.
    pub fn from_config(index: &'a I, config: &BoostConfig) -> Self {
        Self::init(index, &config.weights_path)
            .rounds(config.rounds)
    }
}


impl<'a, I, U> MPBoost<'a, I, U>
    where I: Index + ?Sized,
{
    /// Set the number of rounds.
    /// Zero is rejected when the run starts.
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }


    /// Replace the distribution update.
    pub fn updater<V>(self, updater: V) -> MPBoost<'a, I, V>
        where V: DistributionUpdate,
    {
        MPBoost {
            index: self.index,
            weights_path: self.weights_path,
            rounds: self.rounds,
            updater,
            model: self.model,
            losses: self.losses,
            terminated: self.terminated,
        }
    }


    /// Path of the weight distribution file.
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }


    /// Per-category loss `Z` of the last round.
    /// Categories without pivot report `+inf`.
    pub fn losses(&self) -> &[f64] {
        &self.losses[..]
    }


    /// The iteration at which the run stopped,
    /// `None` while it has not stopped yet.
    pub fn terminated(&self) -> Option<usize> {
        (self.terminated != usize::MAX).then_some(self.terminated)
    }
}


impl<I, U> Booster<Vec<BestSplit>> for MPBoost<'_, I, U>
    where I: Index + Sync + ?Sized,
          U: DistributionUpdate,
{
    type Output = CombinedClassifier;


    fn name(&self) -> &str {
        "MP-Boost"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let n_categories = self.index.categories_count();
        let n_documents = self.index.documents_count();
        let n_features = self.index.features_count();
        let info = Vec::from([
            ("# of categories", format!("{n_categories}")),
            ("# of documents", format!("{n_documents}")),
            ("# of features", format!("{n_features}")),
            ("Max iteration", format!("{}", self.rounds)),
            ("Weights", format!("{}", self.weights_path.display())),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) -> Result<()> {
        checkers::n_rounds(self.rounds)?;
        let n_categories = self.index.categories_count();
        let n_documents = self.index.documents_count();
        if n_categories == 0 || n_documents == 0 {
            return Err(BoostError::InvalidArgument(format!(
                "cannot boost on {n_categories} categories \
                 and {n_documents} documents"
            )));
        }

        self.updater.initialize(&self.weights_path, self.index)?;
        self.model = CombinedClassifier::new(n_categories);
        self.losses = Vec::new();
        self.terminated = usize::MAX;

        tracing::debug!(
            path = %self.weights_path.display(),
            n_categories,
            n_documents,
            "initialized the weight distribution"
        );
        Ok(())
    }


    fn boost<W>(
        &mut self,
        weak_learner: &W,
        iteration: usize,
    ) -> Result<ControlFlow<usize>>
        where W: WeakLearner<Hypothesis = Vec<BestSplit>>,
    {
        if self.rounds < iteration {
            self.terminated = self.rounds;
            return Ok(ControlFlow::Break(self.rounds));
        }

        let now = Instant::now();

        let mut weights = WeightMatrixStore::open(
            &self.weights_path, OpenMode::ReadOnly
        )?;
        let splits = weak_learner.produce(self.index, &weights);
        weights.close()?;
        let splits = splits?;

        let (hypotheses, losses): (Vec<WeakHypothesis>, Vec<f64>) = splits
            .into_iter()
            .map(|split| (split.hypothesis, split.loss))
            .unzip();

        let missing = hypotheses.iter()
            .filter(|h| h.pivot().is_none())
            .count();
        if missing > 0 {
            tracing::warn!(
                round = iteration,
                categories = missing,
                "no feature touches these categories; they keep their weights"
            );
        }

        self.updater.update(&self.weights_path, self.index, &hypotheses)?;
        self.model.push_round(hypotheses)?;

        tracing::info!(
            round = iteration,
            mean_loss = helpers::finite_mean(&losses),
            elapsed_ms = now.elapsed().as_millis() as u64,
            "round finished"
        );
        self.losses = losses;

        Ok(ControlFlow::Continue(()))
    }


    fn postprocess(&mut self) -> Result<Self::Output> {
        Ok(self.model.clone())
    }
}


impl<I, U> CurrentHypothesis for MPBoost<'_, I, U>
    where I: Index + ?Sized,
{
    type Output = CombinedClassifier;

    fn current_hypothesis(&self) -> CombinedClassifier {
        self.model.clone()
    }

    fn objective_value(&self) -> f64 {
        helpers::finite_mean(&self.losses).unwrap_or(f64::INFINITY)
    }
}


/// Runs a single search over the distribution in `weights`
/// with `n_threads` workers and returns the best stump of every category.
///
/// Categories that no feature touches get
/// [`WeakHypothesis::none`].
pub fn run_round<I>(
    weights: &WeightMatrixStore,
    index: &I,
    n_threads: usize,
) -> Result<Vec<WeakHypothesis>>
    where I: Index + Sync + ?Sized,
{
    let search = FeatureSearch::new(n_threads)?;
    let splits = search.produce(index, weights)?;
    Ok(splits.into_iter().map(|split| split.hypothesis).collect())
}
