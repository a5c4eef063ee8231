use serde::{Serialize, Deserialize};

use crate::error::{BoostError, Result};
use crate::index::Index;
use super::{Classifier, WeakHypothesis};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// The model produced by `MPBoost`: one stump per category per round.
/// The confidence of a (document, category) pair is the sum of the
/// scores of the category's stumps over every round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedClassifier {
    n_categories: usize,
    rounds: Vec<Vec<WeakHypothesis>>,
}

impl CombinedClassifier {
    /// Construct an empty model for `n_categories` categories.
    pub fn new(n_categories: usize) -> Self {
        Self { n_categories, rounds: Vec::new() }
    }

    /// Append the stumps of one round, one per category.
    pub fn push_round(&mut self, round: Vec<WeakHypothesis>) -> Result<()> {
        if round.len() != self.n_categories {
            return Err(BoostError::InvalidArgument(format!(
                "a round needs {} hypotheses, got {}",
                self.n_categories, round.len()
            )));
        }
        self.rounds.push(round);
        Ok(())
    }

    /// Number of categories.
    pub fn n_categories(&self) -> usize {
        self.n_categories
    }

    /// Number of rounds.
    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// The stumps of every round.
    pub fn rounds(&self) -> &[Vec<WeakHypothesis>] {
        &self.rounds[..]
    }

    /// The stumps of `category`, in round order.
    pub fn hypotheses_for(&self, category: usize)
        -> impl Iterator<Item = &WeakHypothesis> + '_
    {
        self.rounds.iter().map(move |round| &round[category])
    }

    /// Write the model as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a model written by [`CombinedClassifier::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let model = serde_json::from_reader(reader)?;
        Ok(model)
    }
}

impl Classifier for CombinedClassifier {
    fn confidence<I>(&self, index: &I, document: usize, category: usize)
        -> f64
        where I: Index + ?Sized,
    {
        self.hypotheses_for(category)
            .map(|h| h.score(index, document))
            .sum::<f64>()
    }
}
