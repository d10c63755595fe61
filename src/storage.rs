//! On-disk storage for uploaded images and attachments.
//!
//! Files are written below the configured root as `<subdir>/<uuid>.<ext>` and
//! addressed by their public path, `uploads/<subdir>/<file>`, which is what the
//! database stores and what `/uploads` serves.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Empty upload")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    /// Public path persisted in the database, e.g. `uploads/projects/3/<uuid>.png`.
    pub path: String,
    /// Original client file name, sanitized.
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and the fixed upload directories.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in ["", "language_images", "projects", "portfolios"] {
            tokio::fs::create_dir_all(self.root.join(dir)).await?;
        }
        Ok(())
    }

    pub async fn save(&self, subdir: &str, original_name: Option<&str>, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        let subdir = checked_relative(subdir)?;
        let file_name = sanitize_file_name(original_name.unwrap_or("file"));
        let stored_name = match extension(&file_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let dir = self.root.join(&subdir);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored_name), bytes).await?;

        let path = format!("{}/{}/{}", PUBLIC_PREFIX, to_slash(&subdir), stored_name);
        tracing::debug!("Stored upload {} ({} bytes)", path, bytes.len());
        Ok(StoredFile { path, file_name })
    }

    /// Delete the file behind a public path. Missing files are not an error.
    pub async fn remove(&self, public_path: &str) -> Result<(), StorageError> {
        let relative = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|p| p.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidPath(public_path.to_string()))?;
        let relative = checked_relative(relative)?;

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Upload already gone: {}", public_path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every file below `subdir`, e.g. when its owner is deleted.
    pub async fn remove_dir(&self, subdir: &str) -> Result<(), StorageError> {
        let relative = checked_relative(subdir)?;
        match tokio::fs::remove_dir_all(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn checked_relative(path: &str) -> Result<PathBuf, StorageError> {
    let candidate = Path::new(path);
    let valid = !path.is_empty() && candidate.components().all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(candidate.to_path_buf())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_client_file_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\My CV.pdf"), "My CV.pdf");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn extension_is_lowercased_and_bounded() {
        assert_eq!(extension("logo.PNG").as_deref(), Some("png"));
        assert_eq!(extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("weird.ex$t"), None);
    }

    #[test]
    fn rejects_traversal() {
        assert!(checked_relative("projects/1").is_ok());
        assert!(checked_relative("../secrets").is_err());
        assert!(checked_relative("/abs").is_err());
        assert!(checked_relative("").is_err());
    }

    #[tokio::test]
    async fn save_then_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store.save("projects/7", Some("shot.png"), b"png-bytes").await.unwrap();
        assert!(stored.path.starts_with("uploads/projects/7/"));
        assert!(stored.path.ends_with(".png"));
        assert_eq!(stored.file_name, "shot.png");

        let on_disk = dir.path().join(stored.path.trim_start_matches("uploads/"));
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png-bytes");

        store.remove(&stored.path).await.unwrap();
        assert!(!on_disk.exists());
        // second removal is a no-op
        store.remove(&stored.path).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_empty_uploads_and_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        assert!(matches!(store.save("projects/1", None, b"").await, Err(StorageError::Empty)));
        assert!(matches!(store.remove("/etc/passwd").await, Err(StorageError::InvalidPath(_))));
        assert!(matches!(store.remove("uploads/../x").await, Err(StorageError::InvalidPath(_))));
    }
}
