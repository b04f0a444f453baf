//! World rules and tunable parameters.

use crate::error::ConfigError;
use crate::grid::ZoneTag;

/// Rules that shape one settlement's world: grid dimensions, combat odds,
/// and horde growth.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldRules {
    /// Side length of the square exploration grid.
    pub grid_size: u32,
    /// Action points restored to every survivor at dawn.
    pub max_action_points: u32,
    pub combat: CombatRules,
    pub horde: HordeRules,
    /// Point-of-interest tags placed once per world generation.
    pub poi_tags: Vec<ZoneTag>,
    /// Placement attempts per point of interest before giving up on it.
    pub poi_placement_attempts: u32,
}

/// Probabilities used by the horde combat resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatRules {
    /// Chance that a single attack attempt lands.
    pub hit_chance: f64,
    /// Chance that an infected player dies before any attempt is rolled.
    pub infection_death_chance: f64,
}

/// Horde scaling parameters applied at every dawn.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HordeRules {
    pub initial_size: u32,
    pub growth_factor: f64,
    /// Relative perturbation applied to the growth, drawn from `[-jitter, jitter]`.
    pub growth_jitter: f64,
}

impl WorldRules {
    pub const DEFAULT_GRID_SIZE: u32 = 25;
    pub const DEFAULT_MAX_ACTION_POINTS: u32 = 6;
    pub const DEFAULT_POI_PLACEMENT_ATTEMPTS: u32 = 100;
    /// Largest side length whose coordinates still fit in `i32`.
    pub const MAX_GRID_SIZE: u32 = i32::MAX as u32;

    pub fn new() -> Self {
        Self {
            grid_size: Self::DEFAULT_GRID_SIZE,
            max_action_points: Self::DEFAULT_MAX_ACTION_POINTS,
            combat: CombatRules::default(),
            horde: HordeRules::default(),
            poi_tags: ZoneTag::POINTS_OF_INTEREST.to_vec(),
            poi_placement_attempts: Self::DEFAULT_POI_PLACEMENT_ATTEMPTS,
        }
    }

    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_combat(mut self, combat: CombatRules) -> Self {
        self.combat = combat;
        self
    }

    pub fn with_horde(mut self, horde: HordeRules) -> Self {
        self.horde = horde;
        self
    }

    /// Checks every parameter the rules engine would otherwise panic or
    /// misbehave on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > Self::MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        if self.max_action_points == 0 {
            return Err(ConfigError::ZeroActionPoints);
        }
        check_probability("hit_chance", self.combat.hit_chance)?;
        check_probability("infection_death_chance", self.combat.infection_death_chance)?;
        if self.horde.growth_factor.is_nan() || self.horde.growth_factor < 1.0 {
            return Err(ConfigError::InvalidGrowth(self.horde.growth_factor));
        }
        if !(0.0..1.0).contains(&self.horde.growth_jitter) {
            return Err(ConfigError::InvalidJitter(self.horde.growth_jitter));
        }
        Ok(())
    }
}

impl Default for WorldRules {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatRules {
    pub const DEFAULT_HIT_CHANCE: f64 = 0.5;
    pub const DEFAULT_INFECTION_DEATH_CHANCE: f64 = 0.5;
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            hit_chance: Self::DEFAULT_HIT_CHANCE,
            infection_death_chance: Self::DEFAULT_INFECTION_DEATH_CHANCE,
        }
    }
}

impl HordeRules {
    pub const DEFAULT_INITIAL_SIZE: u32 = 10;
    pub const DEFAULT_GROWTH_FACTOR: f64 = 1.2;
    pub const DEFAULT_GROWTH_JITTER: f64 = 0.1;
}

impl Default for HordeRules {
    fn default() -> Self {
        Self {
            initial_size: Self::DEFAULT_INITIAL_SIZE,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            growth_jitter: Self::DEFAULT_GROWTH_JITTER,
        }
    }
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}
