//! Settlement world record, phase, and action permission rules.

mod permission;
mod state;

pub use permission::{ActionPermission, DenialReason, check_action};
pub use state::{Building, Phase, Settlement, SettlementId, WorldState, next_horde_size};
