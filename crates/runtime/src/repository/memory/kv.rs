//! In-memory world-state cache and explored-tile store.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use horde_core::GridCoordinate;

use crate::repository::{ExploredTileStore, RepositoryError, Result, WorldStateCache};

/// In-memory implementation of [`WorldStateCache`].
pub struct InMemoryWorldStateCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryWorldStateCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryWorldStateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorldStateCache for InMemoryWorldStateCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// In-memory implementation of [`ExploredTileStore`].
pub struct InMemoryExploredTileStore {
    tiles: RwLock<BTreeSet<GridCoordinate>>,
}

impl InMemoryExploredTileStore {
    pub fn new() -> Self {
        Self {
            tiles: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn with_tiles(tiles: impl IntoIterator<Item = GridCoordinate>) -> Self {
        Self {
            tiles: RwLock::new(tiles.into_iter().collect()),
        }
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        self.tiles
            .read()
            .map(|tiles| tiles.contains(&coordinate))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.tiles.read().map(|tiles| tiles.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryExploredTileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExploredTileStore for InMemoryExploredTileStore {
    async fn load_all(&self) -> Result<Vec<GridCoordinate>> {
        let tiles = self
            .tiles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tiles.iter().copied().collect())
    }

    async fn insert(&self, coordinate: GridCoordinate) -> Result<()> {
        let mut tiles = self
            .tiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        tiles.insert(coordinate);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut tiles = self
            .tiles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        tiles.clear();
        Ok(())
    }
}
