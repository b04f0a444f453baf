use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::HordeRules;

/// Identifier of a settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettlementId(pub u64);

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settlement#{}", self.0)
    }
}

/// Defensive structure of a settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Building {
    pub name: String,
    pub defense: u32,
}

impl Building {
    pub fn new(name: impl Into<String>, defense: u32) -> Self {
        Self {
            name: name.into(),
            defense,
        }
    }
}

/// Settlement record as the settlement store exposes it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub day: u32,
    pub defense_total: u32,
    pub population: u32,
    pub buildings: Vec<Building>,
}

impl Settlement {
    pub fn new(id: SettlementId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            day: 1,
            defense_total: 0,
            population: 0,
            buildings: Vec::new(),
        }
    }

    pub fn with_building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    /// Sum of every building's defense contribution.
    pub fn building_defense(&self) -> u32 {
        self.buildings
            .iter()
            .fold(0u32, |total, b| total.saturating_add(b.defense))
    }
}

/// The two recurring world phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// Players may act.
    #[default]
    Interactive,
    /// The horde attack is being resolved; every action is denied.
    Resolving,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Interactive => "interactive",
            Phase::Resolving => "resolving",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Singleton world record of a settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub settlement_id: SettlementId,
    pub day: u32,
    pub phase: Phase,
    pub next_boundary_at: DateTime<Utc>,
    pub horde_size: u32,
    pub last_attack_at: Option<DateTime<Utc>>,
    /// Seed the grid's points of interest are placed from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub map_seed: u64,
}

impl WorldState {
    /// A world in the interactive phase of `day`.
    pub fn new(
        settlement_id: SettlementId,
        day: u32,
        horde_size: u32,
        next_boundary_at: DateTime<Utc>,
    ) -> Self {
        Self {
            settlement_id,
            day,
            phase: Phase::Interactive,
            next_boundary_at,
            horde_size,
            last_attack_at: None,
            map_seed: 0,
        }
    }

    pub fn with_map_seed(mut self, map_seed: u64) -> Self {
        self.map_seed = map_seed;
        self
    }
}

/// Scales the horde for the next day.
///
/// `ceil(current * growth * (1 + u))` with `u` drawn from
/// `[-growth_jitter, growth_jitter]`, never below `current`.
pub fn next_horde_size<R: Rng + ?Sized>(current: u32, rules: &HordeRules, rng: &mut R) -> u32 {
    let jitter = if rules.growth_jitter > 0.0 {
        rng.gen_range(-rules.growth_jitter..=rules.growth_jitter)
    } else {
        0.0
    };
    let scaled = (f64::from(current) * rules.growth_factor * (1.0 + jitter)).ceil();
    // `as` saturates at u32::MAX.
    (scaled as u32).max(current)
}
