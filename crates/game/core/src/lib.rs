//! Pure simulation rules for a horde-besieged settlement.
//!
//! `horde-core` defines the canonical rules (statuses, the exploration grid,
//! horde combat, daily decay, action permissions) as synchronous functions over
//! plain values. It performs no I/O; the runtime crate feeds it snapshots from
//! the stores and persists what it returns. Every random decision takes an
//! injected [`rand::Rng`], so outcomes are reproducible in tests.
pub mod combat;
pub mod config;
pub mod error;
pub mod grid;
pub mod player;
pub mod status;
pub mod world;

pub use combat::{HordeAttackReport, PlayerOutcome, PopulationSnapshot, resolve_horde_attack};
pub use config::{CombatRules, HordeRules, WorldRules};
pub use error::{ConfigError, ErrorSeverity, GameError, GridError, ResolutionError, StatusError};
pub use grid::{DiscoveryState, Direction, GridCoordinate, GridMap, ZoneTag};
pub use player::{Location, Player, PlayerId, StatusChange, Zone};
pub use status::{
    Condition, DecayRule, Status, StatusCategory, StatusOp, VitalStatus, Wound, decay_plan,
    is_temporary_condition, is_vital_status, is_wound_variant,
};
pub use world::{
    ActionPermission, Building, DenialReason, Phase, Settlement, SettlementId, WorldState,
    check_action, next_horde_size,
};
