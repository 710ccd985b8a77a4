//! Access to previously uploaded files.

pub mod formats;

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use walkdir::WalkDir;

pub use formats::{FileFormat, TextLayout, parse_documents, parse_table};

/// Errors raised while reading or decoding stored files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No file exists under the requested name.
    #[error("File not found: {0}")]
    NotFound(String),
    /// Name is absolute or escapes the upload directory.
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    /// Extension is not accepted for the requested operation.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Content could not be decoded in its declared format.
    #[error("Malformed {format} content in {name}: {reason}")]
    Malformed {
        /// Offending file.
        name: String,
        /// Format the file was decoded as.
        format: FileFormat,
        /// Decoder message.
        reason: String,
    },
    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view of stored uploads.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Raw content of the file stored under `name`.
    async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Names of every stored file, relative to the store root and sorted.
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// File store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the store reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name);
        let is_plain = !name.trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(file = name, bytes = bytes.len(), "Read stored file");
                Ok(bytes)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.clone();
        let names = tokio::task::spawn_blocking(move || {
            let mut names: Vec<String> = WalkDir::new(&root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| {
                    entry
                        .path()
                        .strip_prefix(&root)
                        .ok()
                        .map(|relative| relative.to_string_lossy().replace('\\', "/"))
                })
                .collect();
            names.sort();
            names
        })
        .await
        .map_err(|err| StorageError::Io(std::io::Error::other(err)))?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_and_lists_nested_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("notas.txt"), "Paciente estable.").expect("write");
        std::fs::create_dir(dir.path().join("lotes")).expect("mkdir");
        std::fs::write(dir.path().join("lotes").join("a.csv"), "edad\n70\n").expect("write");

        let store = LocalFileStore::new(dir.path());
        assert_eq!(store.read("notas.txt").await.expect("read"), b"Paciente estable.");
        assert_eq!(
            store.list().await.expect("list"),
            vec!["lotes/a.csv".to_string(), "notas.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_files_and_traversal_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalFileStore::new(dir.path());

        assert!(matches!(
            store.read("ausente.json").await,
            Err(StorageError::NotFound(name)) if name == "ausente.json"
        ));
        for name in ["../secreto.txt", "/etc/passwd", "", "a/../../b"] {
            assert!(
                matches!(store.read(name).await, Err(StorageError::InvalidName(_))),
                "{name:?} accepted"
            );
        }
    }
}
