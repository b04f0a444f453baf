//! Exploration grid backed by the explored-tile store.
//!
//! Memory is authoritative: reads never touch the store, and tile writes are
//! background tasks whose failures are only logged. Pending writes are
//! drained before the store is cleared or the grid is dropped.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use horde_core::{DiscoveryState, GridCoordinate, GridError, GridMap, WorldRules, ZoneTag};

use crate::repository::{ExploredTileStore, HostilePresence};

/// In-memory [`GridMap`] with write-through persistence of explored tiles.
///
/// Point-of-interest placement is a pure function of the map seed, so a
/// restarted process rebuilds the same map from the seed in the world state.
pub struct ExplorationGrid {
    map: GridMap,
    map_seed: u64,
    poi_tags: Vec<ZoneTag>,
    placement_attempts: u32,
    tiles: Arc<dyn ExploredTileStore>,
    hostiles: Arc<dyn HostilePresence>,
    pending: JoinSet<()>,
}

impl ExplorationGrid {
    /// Builds the map for `map_seed` without touching the store.
    pub fn new(
        rules: &WorldRules,
        map_seed: u64,
        tiles: Arc<dyn ExploredTileStore>,
        hostiles: Arc<dyn HostilePresence>,
    ) -> Self {
        let map = generate(
            rules.grid_size,
            &rules.poi_tags,
            rules.poi_placement_attempts,
            map_seed,
        );
        Self {
            map,
            map_seed,
            poi_tags: rules.poi_tags.clone(),
            placement_attempts: rules.poi_placement_attempts,
            tiles,
            hostiles,
            pending: JoinSet::new(),
        }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn map_seed(&self) -> u64 {
        self.map_seed
    }

    pub fn center(&self) -> GridCoordinate {
        self.map.center()
    }

    pub fn tile_state(&self, x: i32, y: i32) -> Result<DiscoveryState, GridError> {
        self.map.tile_state(x, y)
    }

    pub fn location_at(&self, x: i32, y: i32) -> Result<ZoneTag, GridError> {
        self.map.location_at(x, y)
    }

    /// Rehydrates exploration history from the store.
    ///
    /// A failed load leaves the seeded neighborhood in place.
    pub async fn load(&mut self) {
        match self.tiles.load_all().await {
            Ok(tiles) => {
                let count = tiles.len();
                let rejected = self.map.restore_explored(tiles);
                for tile in &rejected {
                    warn!(
                        target: "runtime::grid",
                        coordinate = %tile,
                        size = self.map.size(),
                        "Ignoring persisted tile outside the grid"
                    );
                }
                info!(
                    target: "runtime::grid",
                    restored = count - rejected.len(),
                    "Restored exploration history"
                );
            }
            Err(error) => {
                warn!(
                    target: "runtime::grid",
                    error = %error,
                    "Failed to load explored tiles, starting from the seeded neighborhood"
                );
            }
        }
    }

    /// Marks a tile explored and returns its discovery state afterwards.
    ///
    /// The second value is true when the tile was hidden before. Newly
    /// explored tiles are written to the store in a background task.
    pub fn mark_explored(
        &mut self,
        x: i32,
        y: i32,
    ) -> Result<(DiscoveryState, bool), GridError> {
        let newly_explored = self.map.mark_explored(x, y)?;
        if newly_explored {
            self.persist_tile(GridCoordinate::new(x, y));
        }
        Ok((self.map.tile_state(x, y)?, newly_explored))
    }

    fn persist_tile(&mut self, coordinate: GridCoordinate) {
        while self.pending.try_join_next().is_some() {}
        let tiles = Arc::clone(&self.tiles);
        self.pending.spawn(async move {
            if let Err(error) = tiles.insert(coordinate).await {
                warn!(
                    target: "runtime::grid",
                    coordinate = %coordinate,
                    error = %error,
                    "Failed to persist explored tile"
                );
            }
        });
    }

    /// Waits for every tile write still in flight.
    pub async fn flush(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(error) = result {
                warn!(
                    target: "runtime::grid",
                    error = %error,
                    "Explored tile write did not complete"
                );
            }
        }
    }

    /// Wipes exploration history and re-rolls points of interest for `map_seed`.
    ///
    /// Waits for pending tile writes, clears the store and reseeds the
    /// neighborhood. Then clears hostile presence and initializes it for the
    /// new map. Collaborator failures are logged; the in-memory map is reset
    /// regardless. Returns the tags that could not be placed.
    pub async fn reset(&mut self, map_seed: u64) -> Vec<ZoneTag> {
        self.flush().await;
        if let Err(error) = self.tiles.clear().await {
            warn!(
                target: "runtime::grid",
                error = %error,
                "Failed to clear explored tiles"
            );
        }

        let mut rng = ChaCha8Rng::seed_from_u64(map_seed);
        let unplaced = self
            .map
            .reset(&self.poi_tags, self.placement_attempts, &mut rng);
        self.map_seed = map_seed;
        self.report_unplaced(&unplaced);

        if let Err(error) = self.hostiles.clear_all().await {
            warn!(
                target: "runtime::grid",
                error = %error,
                "Failed to clear hostile presence"
            );
        }
        if let Err(error) = self.hostiles.initialize_for_new_world().await {
            warn!(
                target: "runtime::grid",
                error = %error,
                "Failed to initialize hostile presence"
            );
        }

        info!(target: "runtime::grid", map_seed, "Map reset");
        unplaced
    }

    /// Re-rolls points of interest for `map_seed`, keeping exploration history.
    pub fn reseed(&mut self, map_seed: u64) {
        let explored: Vec<_> = self.map.explored().collect();
        let mut map = generate(
            self.map.size(),
            &self.poi_tags,
            self.placement_attempts,
            map_seed,
        );
        map.restore_explored(explored);
        self.map = map;
        self.map_seed = map_seed;
        debug!(target: "runtime::grid", map_seed, "Map reseeded");
    }

    fn report_unplaced(&self, unplaced: &[ZoneTag]) {
        for tag in unplaced {
            warn!(
                target: "runtime::grid",
                tag = tag.as_str(),
                attempts = self.placement_attempts,
                "Point of interest could not be placed"
            );
        }
    }
}

fn generate(size: u32, tags: &[ZoneTag], attempts: u32, map_seed: u64) -> GridMap {
    let mut rng = ChaCha8Rng::seed_from_u64(map_seed);
    let (map, unplaced) = GridMap::generate(size, tags, attempts, &mut rng);
    for tag in unplaced {
        warn!(
            target: "runtime::grid",
            tag = tag.as_str(),
            attempts,
            "Point of interest could not be placed"
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::repository::{InMemoryExploredTileStore, InMemoryHostilePresence, Result};

    use super::*;

    /// Tile store whose inserts land after a delay.
    struct SlowTiles {
        inner: Arc<InMemoryExploredTileStore>,
        delay: Duration,
    }

    #[async_trait]
    impl ExploredTileStore for SlowTiles {
        async fn load_all(&self) -> Result<Vec<GridCoordinate>> {
            self.inner.load_all().await
        }

        async fn insert(&self, coordinate: GridCoordinate) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.insert(coordinate).await
        }

        async fn clear(&self) -> Result<()> {
            self.inner.clear().await
        }
    }

    fn slow_grid(tiles: Arc<InMemoryExploredTileStore>) -> ExplorationGrid {
        let rules = WorldRules::default().with_grid_size(9);
        let slow = Arc::new(SlowTiles {
            inner: tiles,
            delay: Duration::from_millis(30),
        });
        ExplorationGrid::new(&rules, 42, slow, Arc::new(InMemoryHostilePresence::new()))
    }

    fn grid(
        tiles: Arc<InMemoryExploredTileStore>,
        hostiles: Arc<InMemoryHostilePresence>,
    ) -> ExplorationGrid {
        let rules = WorldRules::default().with_grid_size(9);
        ExplorationGrid::new(&rules, 42, tiles, hostiles)
    }

    async fn wait_for(predicate: impl Fn() -> bool) {
        for _ in 0..100 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn same_seed_places_same_points_of_interest() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let hostiles = Arc::new(InMemoryHostilePresence::new());
        let a = grid(tiles.clone(), hostiles.clone());
        let b = grid(tiles, hostiles);
        assert_eq!(
            a.map().points_of_interest().collect::<Vec<_>>(),
            b.map().points_of_interest().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn newly_explored_tiles_are_written_through() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let mut grid = grid(tiles.clone(), Arc::new(InMemoryHostilePresence::new()));

        let (state, newly) = grid.mark_explored(0, 0).unwrap();
        assert!(newly);
        assert!(state.is_revealed());
        let (_, again) = grid.mark_explored(0, 0).unwrap();
        assert!(!again);

        wait_for(|| tiles.contains(GridCoordinate::new(0, 0))).await;
        assert_eq!(tiles.len(), 1);
    }

    #[tokio::test]
    async fn out_of_bounds_is_rejected_without_persisting() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let mut grid = grid(tiles.clone(), Arc::new(InMemoryHostilePresence::new()));
        assert!(matches!(
            grid.mark_explored(9, 0),
            Err(GridError::OutOfBounds { x: 9, y: 0, size: 9 })
        ));
        tokio::task::yield_now().await;
        assert!(tiles.is_empty());
    }

    #[tokio::test]
    async fn load_restores_persisted_tiles() {
        let tiles = Arc::new(InMemoryExploredTileStore::with_tiles([
            GridCoordinate::new(0, 0),
            GridCoordinate::new(50, 50),
        ]));
        let mut grid = grid(tiles, Arc::new(InMemoryHostilePresence::new()));
        grid.load().await;
        assert!(grid.map().is_explored(GridCoordinate::new(0, 0)));
        assert!(!grid.map().contains(GridCoordinate::new(50, 50)));
    }

    #[tokio::test]
    async fn reset_clears_store_and_cascades_to_hostiles() {
        let tiles = Arc::new(InMemoryExploredTileStore::with_tiles([GridCoordinate::new(
            0, 0,
        )]));
        let hostiles = Arc::new(InMemoryHostilePresence::new());
        let mut grid = grid(tiles.clone(), hostiles.clone());
        grid.load().await;
        hostiles.grow_after_attack().await.unwrap();

        grid.reset(7).await;

        assert!(tiles.is_empty());
        assert_eq!(grid.map_seed(), 7);
        assert_eq!(grid.tile_state(0, 0).unwrap(), DiscoveryState::Hidden);
        let center = grid.center();
        assert_eq!(
            grid.tile_state(center.x, center.y).unwrap(),
            DiscoveryState::Town
        );
        assert_eq!(
            grid.tile_state(center.x + 1, center.y - 1).unwrap(),
            DiscoveryState::Explored
        );
        assert_eq!(hostiles.growth_steps(), 0);
        assert_eq!(hostiles.generation(), 1);
    }

    #[tokio::test]
    async fn reset_waits_for_in_flight_writes_before_clearing() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let mut grid = slow_grid(tiles.clone());

        grid.mark_explored(0, 0).unwrap();
        grid.mark_explored(1, 0).unwrap();
        grid.reset(7).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(tiles.is_empty());
        assert_eq!(grid.tile_state(0, 0).unwrap(), DiscoveryState::Hidden);
    }

    #[tokio::test]
    async fn flush_lands_pending_writes() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let mut grid = slow_grid(tiles.clone());

        grid.mark_explored(0, 0).unwrap();
        assert!(tiles.is_empty());
        grid.flush().await;
        assert!(tiles.contains(GridCoordinate::new(0, 0)));
    }

    #[tokio::test]
    async fn reseed_keeps_exploration_history() {
        let tiles = Arc::new(InMemoryExploredTileStore::new());
        let mut grid = grid(tiles, Arc::new(InMemoryHostilePresence::new()));
        grid.mark_explored(0, 0).unwrap();
        grid.reseed(99);
        assert_eq!(grid.map_seed(), 99);
        assert!(grid.map().is_explored(GridCoordinate::new(0, 0)));
    }
}
