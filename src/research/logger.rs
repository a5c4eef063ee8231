use colored::Colorize;

use crate::{
    Booster,
    WeakLearner,
    Classifier,
    Index,
    config::BoostConfig,
    error::Result,
};
use super::loss_functions::hamming_loss;

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::time::Instant;
use std::ops::ControlFlow;

const DEFAULT_ROUND: usize = 10;
const DEFAULT_TIMELIMIT_MILLIS: u128 = u128::MAX;
const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;
const FULL_WIDTH: usize = 60;
const STAT_WIDTH: usize = (FULL_WIDTH - 4) / 2;
const HEADER: &str = "Round,ObjectiveValue,TrainLoss,Time\n";

/// Struct `Logger` provides a generic function that
/// logs objective value, training loss, and running time
/// for each step of boosting.
///
/// ```no_run
/// use mpboost::prelude::*;
///
/// # fn main() -> mpboost::Result<()> {
/// # let index: InvertedIndex = todo!();
/// let booster = MPBoost::init(&index, "weights.bin").rounds(100);
/// let weak_learner = FeatureSearch::new(4)?;
/// let mut logger = Logger::new(booster, weak_learner, &index)
///     .print_every(10);
/// let f = logger.run("log.csv")?;
/// # Ok(())
/// # }
/// ```
pub struct Logger<'a, B, W, I: ?Sized> {
    booster: B,
    weak_learner: W,
    index: &'a I,
    time_limit: u128,
    round: usize,
}

impl<'a, B, W, I: ?Sized> Logger<'a, B, W, I> {
    /// Create a new instance of `Logger`.
    pub fn new(booster: B, weak_learner: W, index: &'a I) -> Self {
        Self {
            booster,
            weak_learner,
            index,
            time_limit: DEFAULT_TIMELIMIT_MILLIS,
            round: DEFAULT_ROUND,
        }
    }

    /// Create a new instance of `Logger`
    /// that prints its status every `config.print_every` rounds.
    pub fn from_config(
        booster: B,
        weak_learner: W,
        index: &'a I,
        config: &BoostConfig,
    ) -> Self
    {
        let mut logger = Self::new(booster, weak_learner, index);
        logger.round = print_interval(config.print_every);
        logger
    }

    /// The wrapped booster.
    pub fn booster(&self) -> &B {
        &self.booster
    }
}

impl<H, B, W, I, O, S> Logger<'_, B, W, I>
    where B: Booster<H, Output=O> + CurrentHypothesis<Output=S>,
          S: Classifier,
          W: WeakLearner<Hypothesis = H>,
          I: Index + ?Sized,
{
    /// Set the time limit for boosting algorithm as milliseconds.
    /// If the boosting algorithm reaches this limit,
    /// breaks immediately.
    #[inline(always)]
    pub fn time_limit_as_millis(mut self, time_limit: u128) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Set the time limit for boosting algorithm as seconds.
    /// Saturates on overflow.
    #[inline(always)]
    pub fn time_limit_as_secs(mut self, time_limit: u64) -> Self {
        self.time_limit = (time_limit as u128).saturating_mul(1_000_u128);
        self
    }

    /// Set the interval to print the current status.
    /// By default, the method `run` prints its status every `10` rounds.
    /// If you don't want to print the log, set `0`.
    #[inline(always)]
    pub fn print_every(mut self, round: usize) -> Self {
        self.round = print_interval(round);
        self
    }

    #[inline(always)]
    fn print_log_header(&self) {
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
            "".bold().red(),
            "OBJ.".bold().blue(),
            "TRAIN".bold().green(),
            "ACC.".bold().cyan(),
        );
        println!(
            "      {:>WIDTH$}\t\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
            "ROUND".bold().red(),
            "VALUE".bold().blue(),
            "ERROR".bold().green(),
            "TIME".bold().cyan(),
        );
    }

    /// print current settings.
    #[inline(always)]
    fn print_stats(&self) {
        let limit = if self.time_limit != u128::MAX {
            time_format(self.time_limit)
        } else {
            "Nothing".into()
        };
        let header = format!(
            "{:=>FULL_WIDTH$}\n{:^FULL_WIDTH$}\n{:->FULL_WIDTH$}",
            "", "STATS".bold(), "",
        );
        println!(
            "\n{header}\n\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Booster".bold(),
            self.booster.name().bold().green(),
        );
        if let Some(info) = self.booster.info() {
            println!("{}", info_lines(info));
        }

        println!(
            "+ {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}",
            "Weak Learner".bold(),
            self.weak_learner.name().bold().green(),
        );
        if let Some(info) = self.weak_learner.info() {
            println!("{}", info_lines(info));
        }
        println!(
            "\
            + {:<STAT_WIDTH$}\t{:>STAT_WIDTH$}\n\
            {:=^FULL_WIDTH$}\n\
            ",
            "Time Limit".bold(),
            limit.bold().green(),
            "".bold(),
        );
    }

    /// Run the given boosting algorithm with logging.
    /// Note that this method is almost the same as `Booster::run`.
    /// This method measures running time per iteration
    /// and writes one CSV row per round to `filename`.
    pub fn run<P: AsRef<Path>>(&mut self, filename: P) -> Result<O> {
        let mut file = File::create(filename)?;
        file.write_all(HEADER.as_bytes())?;

        // ---------------------------------------------------------------------
        // Pre-processing
        self.booster.preprocess()?;
        self.print_stats();

        // Cumulative time
        let mut time_acc = 0;

        // ---------------------------------------------------------------------
        // Boosting step
        if self.round != usize::MAX { self.print_log_header(); }
        for iter in 1.. {
            let now = Instant::now();
            let flow = self.booster.boost(&self.weak_learner, iter)?;
            time_acc += now.elapsed().as_millis();

            if let ControlFlow::Break(last) = flow {
                if self.round != usize::MAX {
                    println!(
                        "{} {}\t\t{}\n",
                        "[FIN]".bold().bright_green(),
                        format!("{:>WIDTH$}", last).red(),
                        time_format(time_acc).bold().cyan(),
                    );
                }
                break;
            }

            let f = self.booster.current_hypothesis();
            let obj = self.booster.objective_value();
            let train = hamming_loss(self.index, &f);

            let line = format!("{iter},{obj},{train},{time_acc}\n");
            file.write_all(line.as_bytes())?;

            if time_acc > self.time_limit {
                println!(
                    "{} {}\t\t{}\t{}\t{}\n",
                    "[TLE]".bold().bright_red(),
                    format!("{:>WIDTH$}", iter).bold().red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", obj).bold().blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).bold().green(),
                    time_format(time_acc).bold().cyan(),
                );
                tracing::warn!(round = iter, "time limit reached");
                break;
            }

            if self.round != usize::MAX && iter % self.round == 0 {
                println!(
                    "{} {}\t\t{}\t{}\t{}",
                    "[LOG]".bold().magenta(),
                    format!("{:>WIDTH$}", iter).red(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", obj).blue(),
                    format!("{:>WIDTH$.PREC_WIDTH$}", train).green(),
                    time_format(time_acc).bold().cyan(),
                );
            }
        }

        self.booster.postprocess()
    }
}

/// `0` turns the rows off.
fn print_interval(round: usize) -> usize {
    if round == 0 { usize::MAX } else { round }
}

fn info_lines(info: Vec<(&str, String)>) -> String {
    info.into_iter()
        .map(|(key, val)| {
            format!(
                "    + {:<STAT_WIDTH$}\t{:>width$}",
                key,
                val.bold().yellow(),
                width = STAT_WIDTH - 8
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn time_format(millisec: u128) -> String {
    if millisec < 1_000 {
        return format!("  0.{:0>3}s", millisec);
    }
    let sec = millisec / 1_000;
    let millisec = millisec % 1_000;
    if sec < 60 {
        return format!(" {:0>2}.{:0>3}s", sec, millisec);
    }
    let min = sec / 60;
    let sec = sec % 60;
    if min < 60 {
        return format!(" {:0>2}m {:0>2}s", min, sec);
    }
    let hours = min / 60;
    let min = min % 60;
    format!(" {:0>2}h {:0>2}m", hours, min)
}

/// A booster whose intermediate model can be inspected between rounds.
pub trait CurrentHypothesis {
    /// The model type.
    type Output;

    /// The model built from the rounds so far.
    fn current_hypothesis(&self) -> Self::Output;

    /// The objective value after the last round.
    fn objective_value(&self) -> f64;
}
