//! Constants and small helpers shared by the learner and the booster.

pub mod constants;
pub(crate) mod checkers;
pub(crate) mod helpers;
