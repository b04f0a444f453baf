//! Collaborator contracts the simulation core depends on.
//!
//! The runtime owns no storage technology. Everything it reads or writes goes
//! through these traits, so any relational store, key-value cache, or chat
//! notifier can be plugged in by implementing them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use horde_core::{
    Building, Condition, GridCoordinate, HordeAttackReport, Location, Player, PlayerId,
    Settlement, SettlementId, VitalStatus, Zone,
};

use super::error::Result;

/// Player records.
///
/// Status mutations must follow the status model: removing a condition never
/// resets the vital slot unless the condition is the wound held there.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>>;

    async fn alive_players(&self) -> Result<Vec<Player>>;

    async fn players_by_zone(&self, zone: Zone) -> Result<Vec<Player>>;

    /// Replaces the vital slot.
    async fn update_status(&self, id: PlayerId, status: VitalStatus) -> Result<()>;

    /// Adds a condition. Adding one already held is a no-op.
    async fn add_condition(&self, id: PlayerId, condition: Condition) -> Result<()>;

    /// Removes a condition. Removing one not held is a no-op.
    async fn remove_condition(&self, id: PlayerId, condition: Condition) -> Result<()>;

    /// Restores the player's action points to their maximum.
    async fn reset_action_points(&self, id: PlayerId) -> Result<()>;

    /// Bulk reset to alive, full action points, at home, no conditions.
    async fn reset_all_players(&self) -> Result<()>;

    async fn update_location(&self, id: PlayerId, location: Location) -> Result<()>;

    /// Deducts action points. Fails if the balance is too low.
    async fn spend_action_points(&self, id: PlayerId, cost: u32) -> Result<()>;
}

/// Settlement records.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn default_settlement(&self) -> Result<Option<Settlement>>;

    /// Increments the settlement's day counter and returns the new day.
    async fn advance_day(&self, id: SettlementId) -> Result<u32>;

    async fn update_defense_total(&self, id: SettlementId, total: u32) -> Result<()>;

    async fn buildings(&self, id: SettlementId) -> Result<Vec<Building>>;

    async fn update_population(&self, id: SettlementId, population: u32) -> Result<()>;
}

/// Key-value cache holding serialized world state across restarts.
#[async_trait]
pub trait WorldStateCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Persisted exploration history.
#[async_trait]
pub trait ExploredTileStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<GridCoordinate>>;

    /// Records a tile as explored. Inserting twice is a no-op.
    async fn insert(&self, coordinate: GridCoordinate) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Hostile presence on the map (zombie counts, contested zones).
#[async_trait]
pub trait HostilePresence: Send + Sync {
    /// Spreads hostiles after a nightly attack.
    async fn grow_after_attack(&self) -> Result<()>;

    async fn clear_all(&self) -> Result<()>;

    async fn initialize_for_new_world(&self) -> Result<()>;

    /// Drops contested-zone state that expired at or before `now`.
    /// Returns how many entries were removed.
    async fn expire_contested(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Delivers attack reports to players.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, report: &HordeAttackReport) -> Result<()>;
}
