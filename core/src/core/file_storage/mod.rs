use crate::types::ItemId;
use std::path::{Path, PathBuf};

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ArtifactError {
        /// Copy into the artifact location failed (permissions, disk full).
        /// Partial directories are cleaned up by the caller via remove.
        #[error("write failed: {0}")]
        WriteFailed(#[source] std::io::Error),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Directory not supported")]
        IsDirectory,
    }
}

use error::ArtifactError;

/// On-disk artifact storage for one collection.
///
/// Two layouts exist: nested (`root/<id>/<fileName>`, clipboard history)
/// and flat (`root/<fileName>`, drop tray, where filename collisions are
/// acceptable and detected up front).
pub struct ArtifactStore {
    root: PathBuf,
}

fn remove_dir_if_empty(path: &Path) -> Result<bool, ArtifactError> {
    if path.exists() && path.read_dir()?.next().is_none() {
        std::fs::remove_dir(path)?;
        return Ok(true);
    }
    Ok(false)
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn nested_path(&self, id: &ItemId, file_name: &str) -> PathBuf {
        self.root.join(id.as_ref()).join(file_name)
    }

    pub fn flat_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn exists(&self, artifact: &Path) -> bool {
        artifact.is_file()
    }
}

/// Store operations.
impl ArtifactStore {
    /// Copies `source` to `root/<id>/<fileName>`, creating the per-item
    /// directory. The source is copied, never moved.
    pub fn store_nested(
        &self,
        source: &Path,
        id: &ItemId,
        file_name: &str,
    ) -> Result<PathBuf, ArtifactError> {
        if std::fs::metadata(source)?.is_dir() {
            return Err(ArtifactError::IsDirectory);
        }

        let dest = self.nested_path(id, file_name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(ArtifactError::WriteFailed)?;
        }
        std::fs::copy(source, &dest).map_err(ArtifactError::WriteFailed)?;

        Ok(dest)
    }

    /// Copies `source` to `root/<fileName>`. If the destination already
    /// exists the copy is skipped (redundant filesystem events deliver the
    /// same file more than once).
    pub fn store_flat(&self, source: &Path, file_name: &str) -> Result<PathBuf, ArtifactError> {
        if std::fs::metadata(source)?.is_dir() {
            return Err(ArtifactError::IsDirectory);
        }

        let dest = self.flat_path(file_name);
        if dest.exists() {
            return Ok(dest);
        }

        std::fs::create_dir_all(&self.root).map_err(ArtifactError::WriteFailed)?;
        std::fs::copy(source, &dest).map_err(ArtifactError::WriteFailed)?;

        Ok(dest)
    }

    /// Writes raw bytes to `root/<id>/<fileName>` (nested) or
    /// `root/<fileName>` (flat) for content that arrives without a source
    /// file, e.g. a pasteboard capture.
    pub fn write_bytes(
        &self,
        bytes: &[u8],
        id: &ItemId,
        file_name: &str,
        nested: bool,
    ) -> Result<PathBuf, ArtifactError> {
        let dest = if nested {
            self.nested_path(id, file_name)
        } else {
            self.flat_path(file_name)
        };

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(ArtifactError::WriteFailed)?;
        }
        std::fs::write(&dest, bytes).map_err(ArtifactError::WriteFailed)?;

        Ok(dest)
    }
}

/// Remove operations.
impl ArtifactStore {
    /// Deletes the artifact, then walks upward deleting now-empty ancestor
    /// directories until reaching the collection root or a non-empty
    /// directory. Idempotent: a missing artifact is not an error.
    pub fn remove(&self, artifact: &Path) -> Result<(), ArtifactError> {
        if artifact.exists() {
            std::fs::remove_file(artifact)?;
        }

        let mut dir = artifact.parent();
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            if !remove_dir_if_empty(current)? {
                break;
            }
            dir = current.parent();
        }

        Ok(())
    }
}

/// Listing operations, used by filesystem reconciliation and orphan cleanup.
impl ArtifactStore {
    /// Plain files directly under the root. `.DS_Store` and directory
    /// entries are ignored unconditionally.
    pub fn list_flat_files(&self) -> Result<Vec<PathBuf>, ArtifactError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.file_name().is_some_and(|name| name == ".DS_Store") {
                continue;
            }
            files.push(path);
        }

        Ok(files)
    }

    /// Per-item directory names directly under the root (nested layout).
    pub fn list_nested_ids(&self) -> Result<Vec<String>, ArtifactError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir()
                && let Some(name) = path.file_name()
            {
                ids.push(name.to_string_lossy().into_owned());
            }
        }

        Ok(ids)
    }

    /// Removes a whole per-item directory (nested layout orphan cleanup).
    pub fn remove_nested_dir(&self, id: &str) -> Result<(), ArtifactError> {
        let dir = self.root.join(id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
