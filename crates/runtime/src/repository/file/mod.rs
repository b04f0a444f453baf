//! File-based repository implementations.

mod world_state;

pub use world_state::FileWorldStateCache;
