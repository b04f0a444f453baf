//! In-memory repository implementations for testing and local runs.

mod collaborators;
mod kv;
mod players;
mod settlement;

pub use collaborators::{InMemoryHostilePresence, RecordingNotificationSink};
pub use kv::{InMemoryExploredTileStore, InMemoryWorldStateCache};
pub use players::InMemoryPlayerStore;
pub use settlement::InMemorySettlementStore;
