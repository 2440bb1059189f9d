// src/history/file.rs

use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::debug;

use super::{CursorStore, StoreError};

/// Keeps each key in its own file under `dir`. Writes land in a `.tmp`
/// sibling first and are renamed into place, so a reader never sees a
/// half-written value.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                op: "creating",
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl CursorStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                op: "reading",
                path,
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.tmp"));

        fs::write(&tmp_path, value)
            .await
            .map_err(|source| StoreError::Io {
                op: "writing",
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|source| StoreError::Io {
                op: "renaming",
                path: final_path.clone(),
                source,
            })?;

        debug!(key, path = %final_path.display(), "stored value");
        Ok(())
    }
}
