//! Flat-file log of (city, region) pairs that could not be geocoded.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only text file with one `"{city}, {region}"` line per miss.
///
/// Lines are written in processing order without deduplication. The file is
/// only created by the first [`MissingLog::append`], so a run with no misses
/// leaves no file behind.
#[derive(Debug, Clone)]
pub struct MissingLog {
    path: PathBuf,
}

impl MissingLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the backing file if it exists.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than the file already being absent.
    pub fn reset(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "cleared missing-coordinates file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Appends one line for an unresolved pair.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or written.
    pub fn append(&self, city: &str, region: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{city}, {region}")
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
