//! Numerical and layout constants.

/// Size of the weight-matrix header: three 32-bit dimensions.
pub const HEADER_SIZE: usize = 12;

/// Size of one stored weight.
pub const WEIGHT_SIZE: usize = 8;

/// Tolerance for comparing a total weight mass with its expected value.
pub const MASS_TOLERANCE: f64 = 1e-6;

/// Default number of boosting rounds.
pub const DEFAULT_ROUNDS: usize = 100;

/// Default interval (in rounds) between two log lines.
pub const DEFAULT_PRINT_EVERY: usize = 10;

/// Suffix of the scratch file written by the distribution update.
pub const NEXT_SUFFIX: &str = "next";
