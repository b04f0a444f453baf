//! Events published by the world worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use horde_core::{DiscoveryState, GridCoordinate, HordeAttackReport, Phase, ZoneTag};

/// Something observable happened to the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    /// The world entered `phase` for `day`.
    PhaseChanged {
        day: u32,
        phase: Phase,
        next_boundary_at: DateTime<Utc>,
    },

    /// A nightly attack was resolved and applied.
    AttackResolved(HordeAttackReport),

    /// A hidden tile was explored for the first time.
    TileExplored {
        coordinate: GridCoordinate,
        state: DiscoveryState,
    },

    /// Discovery state was wiped and points of interest re-rolled.
    MapReset {
        map_seed: u64,
        unplaced: Vec<ZoneTag>,
    },

    /// Players, map and world state were reset to day one.
    WorldReset { day: u32, horde_size: u32 },

    /// Contested-zone entries expired during a periodic sweep.
    ContestedSwept { removed: usize },
}
