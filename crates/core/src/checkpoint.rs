//! Last-published-title storage.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Result;

/// Remembers the title of the last published article.
pub trait CheckpointStore {
    /// The stored title, or an empty string when nothing was published yet.
    fn read(&self) -> Result<String>;

    fn write(&self, title: &str) -> Result<()>;
}

impl<T: CheckpointStore> CheckpointStore for &T {
    fn read(&self) -> Result<String> {
        (**self).read()
    }

    fn write(&self, title: &str) -> Result<()> {
        (**self).write(title)
    }
}

/// A checkpoint kept in a UTF-8 text file.
///
/// ```rust
/// use wikifeat_core::checkpoint::{CheckpointStore, FileCheckpoint};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileCheckpoint::new(dir.path().join("last_article.txt"));
/// assert_eq!(store.read().unwrap(), "");
///
/// store.write("Foo").unwrap();
/// assert_eq!(store.read().unwrap(), "Foo");
/// ```
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for FileCheckpoint {
    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, title: &str) -> Result<()> {
        fs::write(&self.path, title)?;
        tracing::debug!(path = %self.path.display(), %title, "Checkpoint written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpoint::new(dir.path().join("missing.txt"));
        assert_eq!(store.read().unwrap(), "");
    }

    #[test]
    fn test_read_trims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last.txt");
        fs::write(&path, "  Заглавие \n").unwrap();

        assert_eq!(FileCheckpoint::new(&path).read().unwrap(), "Заглавие");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpoint::new(dir.path().join("last.txt"));
        store.write("First").unwrap();
        store.write("Second").unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "Second");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpoint::new(dir.path().join("no/such/dir/last.txt"));
        assert!(matches!(store.write("x"), Err(crate::WikifeatError::Io(_))));
    }
}
