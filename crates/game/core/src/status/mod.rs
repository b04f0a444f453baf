//! Status model for survivors.
//!
//! Every status value belongs to exactly one category:
//! - **Vital** statuses are mutually exclusive and live in a player's single
//!   vital slot (healthy, a specific wound, dead).
//! - **Conditions** stack freely in a player's condition set (fed, thirsty,
//!   infected, ...).
//!
//! Wounds are special: a fresh wound occupies the vital slot, but once claimed
//! it can also be carried in the condition set. Callers asking "is this player
//! hurt" must look at both places, see [`crate::Player::is_wounded`].
//!
//! The model only classifies. The transition rules are applied by
//! [`crate::Player::add_status`] and [`crate::Player::remove_status`].

mod decay;

pub use decay::{DecayRule, StatusOp, decay_plan};

use std::fmt;
use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::error::StatusError;

/// Body part hit by a horde attack.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Wound {
    Arm,
    Leg,
    Head,
    Eye,
    Hand,
    Foot,
}

impl Wound {
    pub const ALL: [Wound; 6] = [
        Wound::Arm,
        Wound::Leg,
        Wound::Head,
        Wound::Eye,
        Wound::Hand,
        Wound::Foot,
    ];

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Content of a player's vital slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VitalStatus {
    /// Uninjured baseline.
    #[default]
    Healthy,
    Wounded(Wound),
    Dead,
}

impl VitalStatus {
    pub fn is_alive(self) -> bool {
        !matches!(self, VitalStatus::Dead)
    }

    pub fn wound(self) -> Option<Wound> {
        match self {
            VitalStatus::Wounded(wound) => Some(wound),
            _ => None,
        }
    }
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Status::from(*self).fmt(f)
    }
}

/// Stackable temporary modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Condition {
    Refreshed,
    Fed,
    Thirsty,
    Dehydrated,
    Exhausted,
    Infected,
    Scavenging,
    Healed,
    /// A wound claimed out of the vital slot.
    Wounded(Wound),
}

impl Condition {
    pub fn is_wound(self) -> bool {
        matches!(self, Condition::Wounded(_))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Status::from(*self).fmt(f)
    }
}

/// Category a status value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Vital,
    Condition,
}

/// Flat tag covering every status value a collaborator may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    Healthy,
    Wounded(Wound),
    Dead,
    Refreshed,
    Fed,
    Thirsty,
    Dehydrated,
    Exhausted,
    Infected,
    Scavenging,
    Healed,
}

impl Status {
    const WOUND_PREFIX: &'static str = "wounded_";

    pub fn category(self) -> StatusCategory {
        match self {
            Status::Healthy | Status::Wounded(_) | Status::Dead => StatusCategory::Vital,
            Status::Refreshed
            | Status::Fed
            | Status::Thirsty
            | Status::Dehydrated
            | Status::Exhausted
            | Status::Infected
            | Status::Scavenging
            | Status::Healed => StatusCategory::Condition,
        }
    }

    /// Returns the vital-slot value for vital statuses.
    pub fn as_vital(self) -> Option<VitalStatus> {
        match self {
            Status::Healthy => Some(VitalStatus::Healthy),
            Status::Wounded(wound) => Some(VitalStatus::Wounded(wound)),
            Status::Dead => Some(VitalStatus::Dead),
            _ => None,
        }
    }

    /// Returns the condition-set value. Wounds map to their claimed form.
    pub fn as_condition(self) -> Option<Condition> {
        match self {
            Status::Healthy | Status::Dead => None,
            Status::Wounded(wound) => Some(Condition::Wounded(wound)),
            Status::Refreshed => Some(Condition::Refreshed),
            Status::Fed => Some(Condition::Fed),
            Status::Thirsty => Some(Condition::Thirsty),
            Status::Dehydrated => Some(Condition::Dehydrated),
            Status::Exhausted => Some(Condition::Exhausted),
            Status::Infected => Some(Condition::Infected),
            Status::Scavenging => Some(Condition::Scavenging),
            Status::Healed => Some(Condition::Healed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Dead => "dead",
            Status::Wounded(Wound::Arm) => "wounded_arm",
            Status::Wounded(Wound::Leg) => "wounded_leg",
            Status::Wounded(Wound::Head) => "wounded_head",
            Status::Wounded(Wound::Eye) => "wounded_eye",
            Status::Wounded(Wound::Hand) => "wounded_hand",
            Status::Wounded(Wound::Foot) => "wounded_foot",
            Status::Refreshed => "refreshed",
            Status::Fed => "fed",
            Status::Thirsty => "thirsty",
            Status::Dehydrated => "dehydrated",
            Status::Exhausted => "exhausted",
            Status::Infected => "infected",
            Status::Scavenging => "scavenging",
            Status::Healed => "healed",
        }
    }
}

/// True for statuses that occupy the exclusive vital slot.
pub fn is_vital_status(status: Status) -> bool {
    status.category() == StatusCategory::Vital
}

/// True for stackable conditions.
pub fn is_temporary_condition(status: Status) -> bool {
    status.category() == StatusCategory::Condition
}

pub fn is_wound_variant(status: Status) -> bool {
    matches!(status, Status::Wounded(_))
}

impl From<VitalStatus> for Status {
    fn from(vital: VitalStatus) -> Self {
        match vital {
            VitalStatus::Healthy => Status::Healthy,
            VitalStatus::Wounded(wound) => Status::Wounded(wound),
            VitalStatus::Dead => Status::Dead,
        }
    }
}

impl From<Condition> for Status {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Refreshed => Status::Refreshed,
            Condition::Fed => Status::Fed,
            Condition::Thirsty => Status::Thirsty,
            Condition::Dehydrated => Status::Dehydrated,
            Condition::Exhausted => Status::Exhausted,
            Condition::Infected => Status::Infected,
            Condition::Scavenging => Status::Scavenging,
            Condition::Healed => Status::Healed,
            Condition::Wounded(wound) => Status::Wounded(wound),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StatusError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let unknown = || StatusError::UnknownTag(tag.to_owned());

        if let Some(part) = tag.strip_prefix(Self::WOUND_PREFIX) {
            return Wound::from_str(part)
                .map(Status::Wounded)
                .map_err(|_| unknown());
        }

        let status = match tag {
            "healthy" => Status::Healthy,
            "dead" => Status::Dead,
            "refreshed" => Status::Refreshed,
            "fed" => Status::Fed,
            "thirsty" => Status::Thirsty,
            "dehydrated" => Status::Dehydrated,
            "exhausted" => Status::Exhausted,
            "infected" => Status::Infected,
            "scavenging" => Status::Scavenging,
            "healed" => Status::Healed,
            _ => return Err(unknown()),
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_status() -> Vec<Status> {
        let mut all = vec![
            Status::Healthy,
            Status::Dead,
            Status::Refreshed,
            Status::Fed,
            Status::Thirsty,
            Status::Dehydrated,
            Status::Exhausted,
            Status::Infected,
            Status::Scavenging,
            Status::Healed,
        ];
        all.extend(Wound::ALL.map(Status::Wounded));
        all
    }

    #[test]
    fn exactly_one_category_holds() {
        for status in every_status() {
            assert_ne!(
                is_vital_status(status),
                is_temporary_condition(status),
                "{status} must belong to exactly one category"
            );
        }
    }

    #[test]
    fn wounds_are_vital_and_claimable() {
        let status = Status::Wounded(Wound::Leg);
        assert!(is_vital_status(status));
        assert!(is_wound_variant(status));
        assert_eq!(status.as_vital(), Some(VitalStatus::Wounded(Wound::Leg)));
        assert_eq!(status.as_condition(), Some(Condition::Wounded(Wound::Leg)));
    }

    #[test]
    fn tags_parse_back() {
        for status in every_status() {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(
            "wounded_tail".parse::<Status>(),
            Err(StatusError::UnknownTag("wounded_tail".into()))
        );
        assert_eq!(
            "sleepy".parse::<Status>(),
            Err(StatusError::UnknownTag("sleepy".into()))
        );
    }
}
