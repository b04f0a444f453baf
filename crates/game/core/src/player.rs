//! Survivor records and status transitions.

use std::collections::BTreeSet;
use std::fmt;

use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::grid::GridCoordinate;
use crate::status::{Condition, Status, StatusOp, VitalStatus, Wound};

/// Unique identifier of a survivor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse zone a survivor is in. Combat resolution only reads this facet.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Zone {
    #[default]
    Home,
    City,
    Waste,
}

impl Zone {
    /// Zones protected by the settlement's defenses.
    pub fn is_safe(self) -> bool {
        matches!(self, Zone::Home | Zone::City)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Where a survivor is: always a coarse zone, optionally refined to a tile.
///
/// Exploration reads `coordinate`; combat reads `zone`. Moving on the grid
/// keeps both facets in sync (see the runtime's movement handling).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub zone: Zone,
    pub coordinate: Option<GridCoordinate>,
}

impl Location {
    pub const HOME: Self = Self {
        zone: Zone::Home,
        coordinate: None,
    };

    pub fn new(zone: Zone, coordinate: Option<GridCoordinate>) -> Self {
        Self { zone, coordinate }
    }

    pub fn at(zone: Zone, coordinate: GridCoordinate) -> Self {
        Self {
            zone,
            coordinate: Some(coordinate),
        }
    }
}

/// Whether a status mutation changed anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    Applied,
    Unchanged,
}

impl StatusChange {
    fn from_bool(changed: bool) -> Self {
        if changed {
            StatusChange::Applied
        } else {
            StatusChange::Unchanged
        }
    }
}

/// A survivor of the settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub vital: VitalStatus,
    pub conditions: BTreeSet<Condition>,
    pub location: Location,
    pub action_points: u32,
    pub max_action_points: u32,
}

impl Player {
    /// Creates a healthy survivor at home with a full action-point balance.
    pub fn new(id: PlayerId, name: impl Into<String>, max_action_points: u32) -> Self {
        Self {
            id,
            name: name.into(),
            vital: VitalStatus::Healthy,
            conditions: BTreeSet::new(),
            location: Location::HOME,
            action_points: max_action_points,
            max_action_points,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_vital(mut self, vital: VitalStatus) -> Self {
        self.vital = vital;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.insert(condition);
        self
    }

    pub fn with_action_points(mut self, action_points: u32) -> Self {
        self.action_points = action_points;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.vital.is_alive()
    }

    /// True when a wound sits in the vital slot or in the condition set.
    pub fn is_wounded(&self) -> bool {
        self.vital.wound().is_some() || self.conditions.iter().any(|c| c.is_wound())
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Adds a status.
    ///
    /// Vital statuses replace the vital slot; setting the current one again is
    /// a no-op. Conditions are left untouched by vital changes.
    pub fn add_status(&mut self, status: Status) -> StatusChange {
        match status.as_vital() {
            Some(vital) => {
                let changed = self.vital != vital;
                self.vital = vital;
                StatusChange::from_bool(changed)
            }
            None => match status.as_condition() {
                Some(condition) => StatusChange::from_bool(self.conditions.insert(condition)),
                None => StatusChange::Unchanged,
            },
        }
    }

    /// Removes a status.
    ///
    /// Removing `dead` revives the player to healthy. Removing a wound clears
    /// it from both placements and resets the vital slot only if that slot
    /// held this exact wound. Removing any other condition never touches the
    /// vital slot. Removing something the player does not hold is a no-op.
    pub fn remove_status(&mut self, status: Status) -> StatusChange {
        match status {
            Status::Healthy => StatusChange::Unchanged,
            Status::Dead => {
                let changed = self.vital == VitalStatus::Dead;
                if changed {
                    self.vital = VitalStatus::Healthy;
                }
                StatusChange::from_bool(changed)
            }
            Status::Wounded(wound) => StatusChange::from_bool(self.clear_wound(wound)),
            _ => match status.as_condition() {
                Some(condition) => StatusChange::from_bool(self.conditions.remove(&condition)),
                None => StatusChange::Unchanged,
            },
        }
    }

    fn clear_wound(&mut self, wound: Wound) -> bool {
        let mut changed = self.conditions.remove(&Condition::Wounded(wound));
        if self.vital == VitalStatus::Wounded(wound) {
            self.vital = VitalStatus::Healthy;
            changed = true;
        }
        changed
    }

    /// Applies a store-level status mutation.
    pub fn apply(&mut self, op: StatusOp) {
        match op {
            StatusOp::SetVital(vital) => self.vital = vital,
            StatusOp::AddCondition(condition) => {
                self.conditions.insert(condition);
            }
            StatusOp::RemoveCondition(condition) => {
                self.remove_status(condition.into());
            }
        }
    }

    pub fn restore_action_points(&mut self) {
        self.action_points = self.max_action_points;
    }

    /// Deducts `cost` action points, returning false if the balance is too low.
    pub fn spend_action_points(&mut self, cost: u32) -> bool {
        match self.action_points.checked_sub(cost) {
            Some(remaining) => {
                self.action_points = remaining;
                true
            }
            None => false,
        }
    }
}
