//! Repository layer for collaborator-owned data.
//!
//! Repositories hold everything that outlives a single phase transition:
//! - Player and settlement records
//! - The serialized world state (for restart recovery)
//! - Exploration history
//!
//! Hostile presence and report delivery are collaborators too; they live here
//! because they are injected the same way.

mod error;
pub mod file;
pub mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileWorldStateCache;
pub use memory::{
    InMemoryExploredTileStore, InMemoryHostilePresence, InMemoryPlayerStore,
    InMemorySettlementStore, InMemoryWorldStateCache, RecordingNotificationSink,
};
pub use traits::{
    ExploredTileStore, HostilePresence, NotificationSink, PlayerStore, SettlementStore,
    WorldStateCache,
};

use std::sync::Arc;

/// The full set of collaborators one world runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub players: Arc<dyn PlayerStore>,
    pub settlements: Arc<dyn SettlementStore>,
    pub cache: Arc<dyn WorldStateCache>,
    pub tiles: Arc<dyn ExploredTileStore>,
    pub hostiles: Arc<dyn HostilePresence>,
    pub notifier: Arc<dyn NotificationSink>,
}
