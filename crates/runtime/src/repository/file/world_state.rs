//! File-based WorldStateCache implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::repository::{RepositoryError, Result, WorldStateCache};

/// File-based implementation of [`WorldStateCache`].
///
/// Each key is stored as `{key}.json` in the base directory. Writes go to a
/// temp file first and are renamed into place, so a crash mid-write leaves
/// the previous value intact.
pub struct FileWorldStateCache {
    base_dir: PathBuf,
}

impl FileWorldStateCache {
    /// Create a cache rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(RepositoryError::InvalidKey(key.to_owned()));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl WorldStateCache for FileWorldStateCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(value) => {
                tracing::debug!("Loaded cache entry '{}' from {}", key, path.display());
                Ok(Some(value))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepositoryError::Io(err)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.entry_path(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved cache entry '{}' to {}", key, path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let cache = FileWorldStateCache::new(dir.path()).unwrap();
        assert!(cache.get("world_state").await.unwrap().is_none());

        cache
            .set("world_state", r#"{"day":3}"#.to_owned())
            .await
            .unwrap();

        let reopened = FileWorldStateCache::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get("world_state").await.unwrap().as_deref(),
            Some(r#"{"day":3}"#)
        );
        assert!(!dir.path().join("world_state.json.tmp").exists());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let dir = TempDir::new().unwrap();
        let cache = FileWorldStateCache::new(dir.path()).unwrap();
        cache.set("k", "one".to_owned()).await.unwrap();
        cache.set("k", "two".to_owned()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = FileWorldStateCache::new(dir.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                cache.get(key).await,
                Err(RepositoryError::InvalidKey(_))
            ));
        }
    }
}
