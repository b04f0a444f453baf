//! Worker tasks that back the runtime orchestration.
//!
//! The world worker is the single owner of the world state; every mutation
//! reaches it as a [`Command`].

mod world;

pub use world::{Command, MOVE_COST, WorldWorker};
