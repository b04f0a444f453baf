//! Action permission rules.

use super::{Phase, WorldState};
use crate::player::{Player, PlayerId};

/// Why an action was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DenialReason {
    #[error("the world has not been created yet")]
    NoWorld,

    #[error("the horde attack is being resolved")]
    Resolving,

    #[error("player {0} does not exist")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is dead")]
    NotAlive(PlayerId),

    #[error("needs {required} action points, has {available}")]
    InsufficientActionPoints { available: u32, required: u32 },
}

/// Outcome of an action-permission query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionPermission {
    Allowed,
    Denied(DenialReason),
}

impl ActionPermission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ActionPermission::Allowed)
    }

    pub fn reason(&self) -> Option<&DenialReason> {
        match self {
            ActionPermission::Allowed => None,
            ActionPermission::Denied(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), DenialReason> {
        match self {
            ActionPermission::Allowed => Ok(()),
            ActionPermission::Denied(reason) => Err(reason),
        }
    }
}

/// Decides whether `player_id` may take an action costing `required` points.
///
/// Checks, in order: the world exists, the world is interactive, the player
/// exists, the player is alive, and (only for `required > 0`) the balance.
pub fn check_action(
    world: Option<&WorldState>,
    player_id: PlayerId,
    player: Option<&Player>,
    required: u32,
) -> ActionPermission {
    let Some(world) = world else {
        return ActionPermission::Denied(DenialReason::NoWorld);
    };
    if world.phase == Phase::Resolving {
        return ActionPermission::Denied(DenialReason::Resolving);
    }
    let Some(player) = player else {
        return ActionPermission::Denied(DenialReason::UnknownPlayer(player_id));
    };
    if !player.is_alive() {
        return ActionPermission::Denied(DenialReason::NotAlive(player.id));
    }
    if required > 0 && player.action_points < required {
        return ActionPermission::Denied(DenialReason::InsufficientActionPoints {
            available: player.action_points,
            required,
        });
    }
    ActionPermission::Allowed
}
