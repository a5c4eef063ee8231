//! Book-keeping of the weight-matrix files opened by this process.
//! A file is either mapped by one writer or by any number of readers.

use crate::error::{BoostError, Result};

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
    Read,
    Write,
}

#[derive(Debug)]
enum Holders {
    Writer,
    Readers(usize),
}

fn table() -> &'static Mutex<HashMap<PathBuf, Holders>> {
    static OPEN_FILES: OnceLock<Mutex<HashMap<PathBuf, Holders>>> =
        OnceLock::new();
    OPEN_FILES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Absolute key of `path`.
/// An existing file is fully resolved, so links to it share its key.
/// Otherwise only the parent is resolved.
pub(super) fn key(path: &Path) -> Result<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Ok(resolved);
    }

    let name = path.file_name()
        .ok_or_else(|| {
            BoostError::InvalidArgument(format!(
                "{} does not name a file", path.display()
            ))
        })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent.canonicalize()
        .map_err(|e| io::Error::new(
            e.kind(),
            format!("cannot resolve {}: {e}", parent.display()),
        ))?;
    Ok(parent.join(name))
}

/// Record that `key` is opened with `access`.
pub(super) fn acquire(key: &Path, access: Access) -> Result<()> {
    let mut table = table().lock()
        .unwrap_or_else(PoisonError::into_inner);

    match table.get_mut(key) {
        None => {
            let holders = match access {
                Access::Read  => Holders::Readers(1),
                Access::Write => Holders::Writer,
            };
            table.insert(key.to_path_buf(), holders);
        },
        Some(Holders::Writer) => {
            return Err(BoostError::IllegalState(format!(
                "{} is still open for writing; close it first",
                key.display()
            )));
        },
        Some(Holders::Readers(n)) => {
            if access == Access::Write {
                return Err(BoostError::IllegalState(format!(
                    "{} is mapped by {n} reader(s); close them first",
                    key.display()
                )));
            }
            *n += 1;
        },
    }
    Ok(())
}

/// Forget one holder of `key`.
pub(super) fn release(key: &Path) {
    let mut table = table().lock()
        .unwrap_or_else(PoisonError::into_inner);

    let remove = match table.get_mut(key) {
        Some(Holders::Readers(n)) if *n > 1 => {
            *n -= 1;
            false
        },
        Some(_) => true,
        None => false,
    };
    if remove {
        table.remove(key);
    }
}
