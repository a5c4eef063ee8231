//! A dense three-dimensional matrix of `f64` persisted as a flat binary
//! file and memory-mapped for random access.
//!
//! The file layout is
//! ```txt
//! +---------+---------+---------+------------------------------------+
//! | dim1:i32| dim2:i32| dim3:i32| dim1 * dim2 * dim3 weights of f64  |
//! +---------+---------+---------+------------------------------------+
//! ```
//! Every number is little-endian, there is no padding,
//! and the weight at `(i1, i2, i3)` sits at position
//! `i1 + dim1 * (i2 + dim2 * i3)` of the body (`dim1` varies fastest).
//!
//! The boosting code uses the matrix as
//! `categories x documents x 1`.

mod registry;
mod shape;
mod store;

pub use shape::Shape;
pub use store::{OpenMode, WeightMatrixStore};
