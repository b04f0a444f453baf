//! Horde combat: turns horde size versus defense into per-player outcomes.
//!
//! Pure computation. Randomness is injected so results are reproducible.

mod report;
mod resolve;

pub use report::{HordeAttackReport, PlayerOutcome};
pub use resolve::{PopulationSnapshot, resolve_horde_attack};
