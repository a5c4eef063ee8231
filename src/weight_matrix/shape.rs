use crate::common::constants::{HEADER_SIZE, WEIGHT_SIZE};
use crate::error::{BoostError, Result};

use std::fmt;

/// The (immutable) dimensions of a weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    dim1: usize,
    dim2: usize,
    dim3: usize,
}

impl Shape {
    /// Construct a new shape.
    /// Every dimension must be in `1..=i32::MAX`
    /// since the header stores them as 32-bit signed integers,
    /// and the whole file size must be addressable.
    pub fn new(dim1: usize, dim2: usize, dim3: usize) -> Result<Self> {
        let max = i32::MAX as usize;
        for (name, dim) in [("dim1", dim1), ("dim2", dim2), ("dim3", dim3)] {
            if dim == 0 || dim > max {
                return Err(BoostError::InvalidArgument(format!(
                    "{name} must be in [1, {max}]. got {dim}."
                )));
            }
        }
        let shape = Self { dim1, dim2, dim3 };
        if shape.checked_byte_len().is_none() {
            return Err(BoostError::InvalidArgument(format!(
                "weight matrix of shape {shape} is too large"
            )));
        }
        Ok(shape)
    }

    /// The `categories x documents x 1` shape used by the boosting code.
    pub fn distribution(n_categories: usize, n_documents: usize)
        -> Result<Self>
    {
        Self::new(n_categories, n_documents, 1)
    }

    /// First (fastest varying) dimension.
    #[inline(always)]
    pub fn dim1(&self) -> usize { self.dim1 }

    /// Second dimension.
    #[inline(always)]
    pub fn dim2(&self) -> usize { self.dim2 }

    /// Third (slowest varying) dimension.
    #[inline(always)]
    pub fn dim3(&self) -> usize { self.dim3 }

    /// Number of cells.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.dim1 * self.dim2 * self.dim3
    }

    /// Always `false`: every dimension is positive.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Size of a file holding this shape, header included.
    #[inline(always)]
    pub fn byte_len(&self) -> usize {
        HEADER_SIZE + self.len() * WEIGHT_SIZE
    }

    fn checked_byte_len(&self) -> Option<usize> {
        self.dim1.checked_mul(self.dim2)?
            .checked_mul(self.dim3)?
            .checked_mul(WEIGHT_SIZE)?
            .checked_add(HEADER_SIZE)
    }

    /// Flat position of `(i1, i2, i3)` in the body.
    /// Panics if an index is out of its dimension.
    #[inline(always)]
    pub fn offset(&self, i1: usize, i2: usize, i3: usize) -> usize {
        assert!(
            i1 < self.dim1 && i2 < self.dim2 && i3 < self.dim3,
            "index ({i1}, {i2}, {i3}) is out of bounds for shape {self}"
        );
        i1 + self.dim1 * (i2 + self.dim2 * i3)
    }

    /// Encode the header.
    pub(super) fn to_header(self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        for (k, dim) in [self.dim1, self.dim2, self.dim3].into_iter().enumerate() {
            // `new` guarantees `dim <= i32::MAX`.
            let dim = dim as i32;
            buf[4 * k..4 * (k + 1)].copy_from_slice(&dim.to_le_bytes());
        }
        buf
    }

    /// Decode and validate a header.
    pub(super) fn from_header(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(BoostError::CorruptStore(format!(
                "header needs {HEADER_SIZE} bytes, got {}", buf.len()
            )));
        }
        let mut dims = [0i32; 3];
        for (k, dim) in dims.iter_mut().enumerate() {
            let mut word = [0u8; 4];
            word.copy_from_slice(&buf[4 * k..4 * (k + 1)]);
            *dim = i32::from_le_bytes(word);
        }
        if dims.iter().any(|&d| d <= 0) {
            return Err(BoostError::CorruptStore(format!(
                "non-positive dimension in header: {dims:?}"
            )));
        }
        let [dim1, dim2, dim3] = dims.map(|d| d as usize);
        Self::new(dim1, dim2, dim3)
            .map_err(|e| BoostError::CorruptStore(e.to_string()))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} x {} x {}]", self.dim1, self.dim2, self.dim3)
    }
}
