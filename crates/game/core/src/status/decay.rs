//! Post-resolution decay of temporary conditions.

use std::collections::BTreeSet;

use super::{Condition, VitalStatus};
use crate::player::Player;

/// What happens to a condition when a night ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayRule {
    Keep,
    Clear,
    Become(Condition),
}

impl Condition {
    pub fn decay_rule(self) -> DecayRule {
        match self {
            Condition::Thirsty => DecayRule::Become(Condition::Dehydrated),
            Condition::Wounded(_) => DecayRule::Become(Condition::Infected),
            Condition::Refreshed
            | Condition::Fed
            | Condition::Healed
            | Condition::Scavenging
            | Condition::Exhausted => DecayRule::Clear,
            Condition::Dehydrated | Condition::Infected => DecayRule::Keep,
        }
    }
}

/// Single status mutation, as a player store would apply it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusOp {
    SetVital(VitalStatus),
    AddCondition(Condition),
    RemoveCondition(Condition),
}

/// Computes the mutations one decay step applies to `player`.
///
/// Dead players do not decay. A wound in the vital slot is cleared back to
/// healthy and becomes an infection, the same as a claimed wound.
pub fn decay_plan(player: &Player) -> Vec<StatusOp> {
    if !player.is_alive() {
        return Vec::new();
    }

    let mut ops = Vec::new();
    let mut gained = BTreeSet::new();

    if let VitalStatus::Wounded(_) = player.vital {
        ops.push(StatusOp::SetVital(VitalStatus::Healthy));
        gained.insert(Condition::Infected);
    }

    for &condition in &player.conditions {
        match condition.decay_rule() {
            DecayRule::Keep => {}
            DecayRule::Clear => ops.push(StatusOp::RemoveCondition(condition)),
            DecayRule::Become(next) => {
                ops.push(StatusOp::RemoveCondition(condition));
                gained.insert(next);
            }
        }
    }

    ops.extend(
        gained
            .into_iter()
            .filter(|next| !player.conditions.contains(next))
            .map(StatusOp::AddCondition),
    );
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;
    use crate::status::Wound;

    fn survivor() -> Player {
        Player::new(PlayerId(1), "ada", 6)
    }

    fn decayed(mut player: Player) -> Player {
        for op in decay_plan(&player) {
            player.apply(op);
        }
        player
    }

    #[test]
    fn thirst_turns_into_dehydration() {
        let mut player = survivor();
        player.conditions.insert(Condition::Thirsty);

        let player = decayed(player);
        assert!(player.has_condition(Condition::Dehydrated));
        assert!(!player.has_condition(Condition::Thirsty));
    }

    #[test]
    fn vital_wound_becomes_infection() {
        let mut player = survivor();
        player.vital = VitalStatus::Wounded(Wound::Arm);

        let player = decayed(player);
        assert_eq!(player.vital, VitalStatus::Healthy);
        assert!(player.has_condition(Condition::Infected));
        assert!(!player.is_wounded());
    }

    #[test]
    fn claimed_wounds_collapse_into_one_infection() {
        let mut player = survivor();
        player.vital = VitalStatus::Wounded(Wound::Head);
        player.conditions.insert(Condition::Wounded(Wound::Leg));

        let plan = decay_plan(&player);
        let adds = plan
            .iter()
            .filter(|op| matches!(op, StatusOp::AddCondition(Condition::Infected)))
            .count();
        assert_eq!(adds, 1);

        let player = decayed(player);
        assert_eq!(player.conditions.len(), 1);
        assert!(player.has_condition(Condition::Infected));
    }

    #[test]
    fn meals_clear_without_touching_vitality() {
        let mut player = survivor();
        player.vital = VitalStatus::Wounded(Wound::Eye);
        player.conditions.insert(Condition::Fed);
        player.conditions.insert(Condition::Refreshed);

        let plan = decay_plan(&player);
        assert!(plan.contains(&StatusOp::RemoveCondition(Condition::Fed)));
        assert!(plan.contains(&StatusOp::RemoveCondition(Condition::Refreshed)));
    }

    #[test]
    fn infection_is_not_re_added() {
        let mut player = survivor();
        player.vital = VitalStatus::Wounded(Wound::Foot);
        player.conditions.insert(Condition::Infected);

        assert_eq!(
            decay_plan(&player),
            vec![StatusOp::SetVital(VitalStatus::Healthy)]
        );
    }

    #[test]
    fn dead_players_do_not_decay() {
        let mut player = survivor();
        player.vital = VitalStatus::Dead;
        player.conditions.insert(Condition::Thirsty);

        assert!(decay_plan(&player).is_empty());
    }
}
