//! Runtime orchestration for the horde settlement simulation.
//!
//! This crate wires the pure rules of `horde-core` to collaborator stores,
//! a single-owner world worker and a time-of-day scheduler. Consumers build a
//! [`Runtime`] and interact with the world through [`WorldHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`phase`] applies the nightly and dawn transitions
//! - [`scheduler`] fires those transitions at configured times
//! - [`grid`] keeps the exploration map and its write-through persistence
//! - [`repository`] defines the collaborator contracts and their adapters
pub mod api;
pub mod config;
pub mod events;
pub mod grid;
pub mod phase;
pub mod repository;
pub mod runtime;
pub mod scheduler;

mod workers;

pub use api::{Result, RuntimeError, WorldHandle};
pub use config::RuntimeConfig;
pub use events::{EventBus, Topic, TracingNotificationSink, WorldEvent};
pub use grid::ExplorationGrid;
pub use phase::{PhaseClock, PhaseError, PhaseRunner, TransitionOutcome};
pub use repository::{
    Collaborators, ExploredTileStore, FileWorldStateCache, HostilePresence,
    InMemoryExploredTileStore, InMemoryHostilePresence, InMemoryPlayerStore,
    InMemorySettlementStore, InMemoryWorldStateCache, NotificationSink, PlayerStore,
    RecordingNotificationSink, RepositoryError, SettlementStore, WorldStateCache,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scheduler::{Trigger, TriggerKind, next_daily_fire};
pub use workers::MOVE_COST;
