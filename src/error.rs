//! Error types shared by every module of this crate.

use thiserror::Error;

/// Errors raised while storing weights, searching weak hypotheses,
/// or driving the boosting rounds.
///
/// Floating-point round-off (e.g. a slightly negative weight mass after a
/// subtraction) is never reported here; it is clamped to zero.
#[derive(Debug, Error)]
pub enum BoostError {
    /// File-system failure on a weight-matrix file or a model/config file.
    /// Also raised when a writable open would overwrite an existing file
    /// without asking for it.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The header of a weight-matrix file does not match its length.
    #[error("corrupt weight matrix: {0}")]
    CorruptStore(String),

    /// An operation was called out of lifecycle order
    /// (write after close, write on a read-only store, double open, ...).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A parameter is out of its domain
    /// (zero threads, non-positive dimensions, shape mismatch, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The round observed a cancellation request.
    #[error("the boosting round was cancelled")]
    Cancelled,

    /// A search worker panicked.
    #[error("search worker panicked: {0}")]
    WorkerPanic(String),

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON (de)serialization of a configuration or a model failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for `mpboost` operations.
pub type Result<T> = std::result::Result<T, BoostError>;
