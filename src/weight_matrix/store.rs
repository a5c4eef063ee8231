use memmap2::{Mmap, MmapMut};

use crate::common::constants::{HEADER_SIZE, WEIGHT_SIZE};
use crate::error::{BoostError, Result};
use super::registry::{self, Access};
use super::Shape;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::mem;
use std::path::{Path, PathBuf};

/// How [`WeightMatrixStore::open`] treats the file at the given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Map an existing file read-only.
    /// The shape is recovered from the header.
    /// Any number of read-only stores may map the same file at once.
    ReadOnly,
    /// Create a new zero-filled file of the given shape.
    /// Fails with an I/O error (`AlreadyExists`) if the file exists;
    /// the existing file is left untouched.
    Create(Shape),
    /// Truncate (or create) the file and recreate it with the given shape.
    /// The previous content is lost.
    Overwrite(Shape),
}

enum Mapping {
    ReadOnly(Mmap),
    Writable(MmapMut),
    Closed,
}

/// A memory-mapped weight matrix.
///
/// A store is opened either writable (by [`OpenMode::Create`] or
/// [`OpenMode::Overwrite`]) or read-only.
/// Writes must be finished by [`WeightMatrixStore::close`] before the file
/// is opened again; opening a file that this process still maps for writing
/// fails with [`BoostError::IllegalState`].
///
/// A read-only store is `Sync`, so the search workers share it by reference.
///
/// # Example
/// ```no_run
/// use mpboost::weight_matrix::{OpenMode, Shape, WeightMatrixStore};
///
/// let shape = Shape::distribution(3, 4).unwrap();
/// let mut store = WeightMatrixStore::create(shape, "weights.bin").unwrap();
/// store.set_weight(0.25, 0, 1, 0).unwrap();
/// store.close().unwrap();
///
/// let store = WeightMatrixStore::open("weights.bin", OpenMode::ReadOnly)
///     .unwrap();
/// assert_eq!(store.get_weight(0, 1, 0), 0.25);
/// ```
pub struct WeightMatrixStore {
    path: PathBuf,
    key: PathBuf,
    shape: Shape,
    mapping: Mapping,
}

impl WeightMatrixStore {
    /// Create a new zero-filled weight matrix at `path`.
    /// Same as `open(path, OpenMode::Create(shape))`.
    pub fn create<P: AsRef<Path>>(shape: Shape, path: P) -> Result<Self> {
        Self::open(path, OpenMode::Create(shape))
    }

    /// Open the weight matrix at `path` with the given `mode`.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let key = registry::key(&path)?;

        let access = match mode {
            OpenMode::ReadOnly => Access::Read,
            _ => Access::Write,
        };
        registry::acquire(&key, access)?;

        let opened = match mode {
            OpenMode::ReadOnly => Self::map_read_only(&path),
            OpenMode::Create(shape) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create_new(true)
                    .open(&path);
                Self::map_writable(file, shape)
            },
            OpenMode::Overwrite(shape) => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path);
                Self::map_writable(file, shape)
            },
        };

        match opened {
            Ok((shape, mapping)) => {
                tracing::debug!(
                    path = %path.display(), %shape, ?mode,
                    "opened weight matrix"
                );
                Ok(Self { path, key, shape, mapping })
            },
            Err(e) => {
                registry::release(&key);
                Err(e)
            },
        }
    }

    fn map_read_only(path: &Path) -> Result<(Shape, Mapping)> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < HEADER_SIZE as u64 {
            return Err(BoostError::CorruptStore(format!(
                "{} has {len} bytes, shorter than the header",
                path.display()
            )));
        }

        // SAFETY: the file is only mapped read-only here, and this process
        // refuses to open it for writing while the mapping lives.
        let mmap = unsafe { Mmap::map(&file)? };
        let shape = Shape::from_header(&mmap[..HEADER_SIZE])?;

        if shape.byte_len() as u64 != len {
            return Err(BoostError::CorruptStore(format!(
                "{} has {len} bytes, but its header {shape} requires {}",
                path.display(), shape.byte_len()
            )));
        }
        Ok((shape, Mapping::ReadOnly(mmap)))
    }

    fn map_writable(file: std::io::Result<File>, shape: Shape)
        -> Result<(Shape, Mapping)>
    {
        let mut file = file?;
        file.set_len(shape.byte_len() as u64)?;
        file.write_all(&shape.to_header())?;

        // SAFETY: this process holds the only writable mapping of the file
        // (see `registry`), and the file length was fixed above.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok((shape, Mapping::Writable(mmap)))
    }

    /// The shape of this matrix.
    #[inline(always)]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The path this store was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if this store accepts writes.
    pub fn is_writable(&self) -> bool {
        matches!(self.mapping, Mapping::Writable(_))
    }

    /// Returns `true` once [`WeightMatrixStore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        matches!(self.mapping, Mapping::Closed)
    }

    #[inline(always)]
    fn bytes(&self) -> &[u8] {
        match &self.mapping {
            Mapping::ReadOnly(m) => &m[..],
            Mapping::Writable(m) => &m[..],
            Mapping::Closed => {
                panic!("read from closed weight matrix {}", self.path.display())
            },
        }
    }

    #[inline(always)]
    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.mapping {
            Mapping::Writable(m) => Ok(&mut m[..]),
            Mapping::ReadOnly(_) => Err(BoostError::IllegalState(format!(
                "{} is opened read-only", self.path.display()
            ))),
            Mapping::Closed => Err(BoostError::IllegalState(format!(
                "{} is already closed", self.path.display()
            ))),
        }
    }

    /// Returns the weight at `(i1, i2, i3)`.
    ///
    /// Panics if an index is out of bounds or the store is closed.
    #[inline(always)]
    pub fn get_weight(&self, i1: usize, i2: usize, i3: usize) -> f64 {
        let at = HEADER_SIZE + self.shape.offset(i1, i2, i3) * WEIGHT_SIZE;
        let mut word = [0u8; WEIGHT_SIZE];
        word.copy_from_slice(&self.bytes()[at..at + WEIGHT_SIZE]);
        f64::from_le_bytes(word)
    }

    /// Shorthand for `get_weight(category, document, 0)`.
    #[inline(always)]
    pub fn weight(&self, category: usize, document: usize) -> f64 {
        self.get_weight(category, document, 0)
    }

    /// Writes `value` at `(i1, i2, i3)`.
    /// Non-negativity of distribution weights is the caller's business.
    ///
    /// Panics if an index is out of bounds.
    #[inline(always)]
    pub fn set_weight(&mut self, value: f64, i1: usize, i2: usize, i3: usize)
        -> Result<()>
    {
        let at = HEADER_SIZE + self.shape.offset(i1, i2, i3) * WEIGHT_SIZE;
        self.bytes_mut()?[at..at + WEIGHT_SIZE]
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes `value` to every cell.
    pub fn fill(&mut self, value: f64) -> Result<()> {
        let word = value.to_le_bytes();
        self.bytes_mut()?[HEADER_SIZE..]
            .chunks_exact_mut(WEIGHT_SIZE)
            .for_each(|cell| cell.copy_from_slice(&word));
        Ok(())
    }

    /// Flushes pending writes to the file.
    pub fn flush(&mut self) -> Result<()> {
        match &self.mapping {
            Mapping::Writable(m) => m.flush().map_err(BoostError::from),
            Mapping::ReadOnly(_) => Ok(()),
            Mapping::Closed => Err(BoostError::IllegalState(format!(
                "{} is already closed", self.path.display()
            ))),
        }
    }

    /// Writes the header, flushes every pending write,
    /// and releases the mapping.
    /// Any later read panics, and any later write or close fails with
    /// [`BoostError::IllegalState`].
    pub fn close(&mut self) -> Result<()> {
        let mapping = mem::replace(&mut self.mapping, Mapping::Closed);
        let flushed = match mapping {
            Mapping::Writable(mut m) => {
                m[..HEADER_SIZE].copy_from_slice(&self.shape.to_header());
                m.flush()
            },
            Mapping::ReadOnly(_) => Ok(()),
            Mapping::Closed => {
                return Err(BoostError::IllegalState(format!(
                    "{} is already closed", self.path.display()
                )));
            },
        };
        registry::release(&self.key);
        tracing::debug!(path = %self.path.display(), "closed weight matrix");
        flushed.map_err(BoostError::from)
    }
}

impl Drop for WeightMatrixStore {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!(
                path = %self.path.display(), error = %e,
                "failed to close weight matrix on drop"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn shape(c: usize, d: usize) -> Shape {
        Shape::distribution(c, d).unwrap()
    }

    #[test]
    fn test_create_is_zero_filled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.bin");
        let store = WeightMatrixStore::create(shape(2, 3), &path).unwrap();
        for c in 0..2 {
            for d in 0..3 {
                assert_eq!(store.weight(c, d), 0f64);
            }
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 12 + 6 * 8);
    }

    #[test]
    fn test_file_layout_is_bit_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.bin");
        let shape = Shape::new(2, 3, 2).unwrap();
        let mut store = WeightMatrixStore::create(shape, &path).unwrap();
        store.set_weight(1.5, 1, 2, 1).unwrap();
        store.set_weight(0.25, 0, 1, 0).unwrap();
        store.close().unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12 + 12 * 8);
        assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &3i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2i32.to_le_bytes());

        let at = |i1: usize, i2: usize, i3: usize| {
            12 + 8 * (i1 + 2 * (i2 + 3 * i3))
        };
        assert_eq!(&bytes[at(1, 2, 1)..at(1, 2, 1) + 8], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[at(0, 1, 0)..at(0, 1, 0) + 8], &0.25f64.to_le_bytes());
    }

    #[test]
    fn test_write_to_read_only_is_illegal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.bin");
        WeightMatrixStore::create(shape(1, 1), &path).unwrap()
            .close().unwrap();

        let mut store = WeightMatrixStore::open(&path, OpenMode::ReadOnly)
            .unwrap();
        assert!(matches!(
            store.set_weight(1.0, 0, 0, 0),
            Err(BoostError::IllegalState(_))
        ));
        assert!(matches!(store.fill(1.0), Err(BoostError::IllegalState(_))));
    }

    #[test]
    fn test_write_after_close_is_illegal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.bin");
        let mut store = WeightMatrixStore::create(shape(1, 2), &path).unwrap();
        store.close().unwrap();
        assert!(store.is_closed());
        assert!(matches!(
            store.set_weight(1.0, 0, 1, 0),
            Err(BoostError::IllegalState(_))
        ));
        assert!(matches!(store.close(), Err(BoostError::IllegalState(_))));
    }

    #[test]
    fn test_open_while_writing_is_illegal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busy.bin");
        let mut writer = WeightMatrixStore::create(shape(2, 2), &path).unwrap();
        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::ReadOnly),
            Err(BoostError::IllegalState(_))
        ));
        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::Overwrite(shape(1, 1))),
            Err(BoostError::IllegalState(_))
        ));
        writer.close().unwrap();
        assert!(WeightMatrixStore::open(&path, OpenMode::ReadOnly).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_open_through_link_while_writing_is_illegal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busy.bin");
        let link = dir.path().join("alias.bin");

        let mut writer = WeightMatrixStore::create(shape(2, 2), &path).unwrap();
        std::os::unix::fs::symlink(&path, &link).unwrap();
        assert!(matches!(
            WeightMatrixStore::open(&link, OpenMode::ReadOnly),
            Err(BoostError::IllegalState(_))
        ));
        writer.close().unwrap();

        let reader = WeightMatrixStore::open(&link, OpenMode::ReadOnly).unwrap();
        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::Overwrite(shape(1, 1))),
            Err(BoostError::IllegalState(_))
        ));
        drop(reader);
        let rewritten = WeightMatrixStore::open(
            &path, OpenMode::Overwrite(shape(1, 1))
        );
        assert!(rewritten.is_ok());
    }

    #[test]
    fn test_drop_releases_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.bin");
        {
            let mut store = WeightMatrixStore::create(shape(1, 1), &path)
                .unwrap();
            store.set_weight(0.5, 0, 0, 0).unwrap();
        }
        let store = WeightMatrixStore::open(&path, OpenMode::ReadOnly).unwrap();
        assert_eq!(store.weight(0, 0), 0.5);
    }

    #[test]
    fn test_fill() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fill.bin");
        let mut store = WeightMatrixStore::create(shape(3, 5), &path).unwrap();
        store.fill(0.2).unwrap();
        assert!((0..3).all(|c| (0..5).all(|d| store.weight(c, d) == 0.2)));
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.bin");
        WeightMatrixStore::create(shape(2, 2), &path).unwrap()
            .close().unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::ReadOnly),
            Err(BoostError::CorruptStore(_))
        ));

        fs::write(&path, &bytes[..7]).unwrap();
        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::ReadOnly),
            Err(BoostError::CorruptStore(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(matches!(
            WeightMatrixStore::open(&path, OpenMode::ReadOnly),
            Err(BoostError::Io(_))
        ));
    }
}
