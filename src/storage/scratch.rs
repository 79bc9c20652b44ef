use super::{StorageError, StorageResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Ephemeral directory that holds downloaded resources until packaging
///
/// All paths handed to and returned from the store are relative to its root.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    /// Creates an empty scratch directory, clearing leftovers from a previous run
    pub fn prepare(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        if root.exists() {
            tracing::debug!("Clearing existing scratch directory {}", root.display());
            fs::remove_dir_all(&root).map_err(|source| StorageError::Prepare {
                path: root.clone(),
                source,
            })?;
        }

        fs::create_dir_all(&root).map_err(|source| StorageError::Prepare {
            path: root.clone(),
            source,
        })?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a new file unless one with the same name already exists
    ///
    /// File names are content-addressed, so an existing file already holds the
    /// same bytes and writing again is skipped.
    pub fn persist(&self, relative: &Path, bytes: &[u8]) -> StorageResult<()> {
        let path = self.resolve(relative)?;
        if path.exists() {
            tracing::trace!("{} already stored, skipping write", relative.display());
            return Ok(());
        }
        write_file(&path, bytes)
    }

    /// Replaces the content of a stored file (used for rewritten documents)
    pub fn overwrite(&self, relative: &Path, bytes: &[u8]) -> StorageResult<()> {
        let path = self.resolve(relative)?;
        write_file(&path, bytes)
    }

    /// Reads a stored file back
    pub fn read(&self, relative: &Path) -> StorageResult<Vec<u8>> {
        let path = self.resolve(relative)?;
        fs::read(&path).map_err(|source| StorageError::Read { path, source })
    }

    /// Deletes the scratch directory and everything in it
    pub fn remove(self) -> StorageResult<()> {
        fs::remove_dir_all(&self.root).map_err(|source| StorageError::Remove {
            path: self.root.clone(),
            source,
        })
    }

    /// Joins a relative path onto the root, refusing anything that escapes it
    fn resolve(&self, relative: &Path) -> StorageResult<PathBuf> {
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(StorageError::OutsideRoot(relative.to_path_buf()));
        }
        Ok(self.root.join(relative))
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}
