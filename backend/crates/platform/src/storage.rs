//! Local File Storage
//!
//! Media lives under a single root directory. Callers address files by
//! relative paths (e.g. `projects/{id}/videos/{id}/original.mp4`); every
//! path is checked to stay inside the root before it touches the disk.

use std::io;
use std::path::{Component, Path, PathBuf};

use futures_util::{Stream, StreamExt};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::crypto::{random_bytes, to_base64_url};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Path is absolute, contains `..`, or escapes the root
    #[error("Invalid storage path")]
    InvalidPath,

    /// File does not exist
    #[error("File not found")]
    NotFound,

    /// Body exceeded the byte limit
    #[error("File exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },

    /// Error while reading the request body
    #[error("Upload body error: {0}")]
    Body(String),

    /// Filesystem error
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Rooted local storage
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Lexically resolve a relative path under the root
    ///
    /// Only plain path segments are accepted; `..`, `.`, absolute paths
    /// and drive prefixes are rejected.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if relative.is_empty() || relative.contains('\0') || relative.contains('\\') {
            return Err(StorageError::InvalidPath);
        }

        let path = Path::new(relative);
        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                _ => return Err(StorageError::InvalidPath),
            }
        }

        if resolved == self.root {
            return Err(StorageError::InvalidPath);
        }
        Ok(resolved)
    }

    /// Resolve an existing file, following symlinks
    ///
    /// The canonical target must still lie inside the canonical root.
    pub async fn resolve_existing(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let lexical = self.resolve(relative)?;

        let canonical = match fs::canonicalize(&lexical).await {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let root = fs::canonicalize(&self.root).await?;

        if !canonical.starts_with(&root) {
            tracing::warn!(path = %relative, "Storage path escapes root");
            return Err(StorageError::InvalidPath);
        }

        let metadata = fs::metadata(&canonical).await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound);
        }

        Ok(canonical)
    }

    /// Stream a body into `relative`, enforcing `limit` bytes
    ///
    /// Data goes to a temporary sibling first and is renamed into place
    /// only after the whole body arrived, so readers never observe a
    /// partial file. Returns the number of bytes written.
    pub async fn write_stream<S, B, E>(
        &self,
        relative: &str,
        mut body: S,
        limit: u64,
    ) -> Result<u64, StorageError>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let target = self.resolve(relative)?;
        let parent = target.parent().ok_or(StorageError::InvalidPath)?;
        fs::create_dir_all(parent).await?;

        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(StorageError::InvalidPath)?;
        let temp = parent.join(format!(
            ".{}.{}.part",
            file_name,
            to_base64_url(&random_bytes(8))
        ));

        let result = write_to(&temp, &mut body, limit).await;
        let written = match result {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&temp).await {
                    tracing::warn!(error = %cleanup, "Failed to remove partial upload");
                }
                return Err(e);
            }
        };

        fs::rename(&temp, &target).await?;

        tracing::info!(path = %relative, bytes = written, "Stored file");
        Ok(written)
    }

    /// Remove a file; missing files are not an error
    pub async fn remove(&self, relative: &str) -> Result<(), StorageError> {
        let path = self.resolve(relative)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_to<S, B, E>(path: &Path, body: &mut S, limit: u64) -> Result<u64, StorageError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut file = fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| StorageError::Body(e.to_string()))?;
        let bytes = chunk.as_ref();

        written = written.saturating_add(bytes.len() as u64);
        if written > limit {
            return Err(StorageError::TooLarge { limit });
        }

        file.write_all(bytes).await?;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tempfile::TempDir;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<&'static [u8], io::Error>> + Unpin {
        stream::iter(parts.iter().copied().map(Ok).collect::<Vec<_>>())
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let storage = LocalStorage::new("/srv/media");

        assert!(storage.resolve("projects/p/videos/v/original.mp4").is_ok());
        for bad in [
            "",
            "/etc/passwd",
            "../secrets",
            "projects/../../etc",
            "./projects/a",
            "projects\\..\\x",
            "a\0b",
        ] {
            assert!(
                matches!(storage.resolve(bad), Err(StorageError::InvalidPath)),
                "path {bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_joins_under_root() {
        let storage = LocalStorage::new("/srv/media");
        let path = storage.resolve("projects/p/thumb.jpg").unwrap();
        assert_eq!(path, PathBuf::from("/srv/media/projects/p/thumb.jpg"));
    }

    #[tokio::test]
    async fn test_write_stream_and_resolve_existing() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let written = storage
            .write_stream("projects/p/v/original.mp4", chunks(&[b"abc", b"def"]), 1024)
            .await
            .unwrap();
        assert_eq!(written, 6);

        let path = storage
            .resolve_existing("projects/p/v/original.mp4")
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_write_stream_enforces_limit() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage
            .write_stream("big.mp4", chunks(&[b"12345", b"67890"]), 8)
            .await;
        assert!(matches!(result, Err(StorageError::TooLarge { limit: 8 })));

        // Neither the target nor the temporary file remain
        assert!(matches!(
            storage.resolve_existing("big.mp4").await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_stream_body_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let body = stream::iter(vec![
            Ok(&b"abc"[..]),
            Err(io::Error::other("connection reset")),
        ]);
        let result = storage.write_stream("cut.mp4", body, 1024).await;
        assert!(matches!(result, Err(StorageError::Body(_))));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_stream("a/thumb.jpg", chunks(&[b"jpg"]), 1024)
            .await
            .unwrap();
        storage.remove("a/thumb.jpg").await.unwrap();
        storage.remove("a/thumb.jpg").await.unwrap();
        assert!(matches!(
            storage.resolve_existing("a/thumb.jpg").await,
            Err(StorageError::NotFound)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_existing_rejects_symlink_escape() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"s").unwrap();

        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link"))
            .unwrap();

        let storage = LocalStorage::new(dir.path());
        assert!(matches!(
            storage.resolve_existing("link").await,
            Err(StorageError::InvalidPath)
        ));
    }
}
