//! Attack report produced once per resolution cycle.

use std::fmt;

use crate::player::{Player, PlayerId};
use crate::status::VitalStatus;

/// What one resolution cycle did to one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub attacks_received: u32,
    pub hits: u32,
    pub before: VitalStatus,
    pub after: VitalStatus,
    /// The player's infection killed them before any attack was rolled.
    pub infection_death: bool,
}

impl PlayerOutcome {
    pub(crate) fn untouched(player: &Player, attacks_received: u32) -> Self {
        Self {
            player_id: player.id,
            name: player.name.clone(),
            attacks_received,
            hits: 0,
            before: player.vital,
            after: player.vital,
            infection_death: false,
        }
    }

    pub(crate) fn caught_outside(player: &Player) -> Self {
        Self {
            after: VitalStatus::Dead,
            ..Self::untouched(player, 0)
        }
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    pub fn died(&self) -> bool {
        self.after == VitalStatus::Dead
    }
}

/// Summary of one horde attack.
///
/// Transient: built by the resolver, consumed by the scheduler and the
/// notification sink, then dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HordeAttackReport {
    pub day: u32,
    pub horde_size: u32,
    pub defense: u32,
    pub breached: bool,
    /// Attackers that got past the defenses; equals the number of attack attempts.
    pub breach_size: u32,
    /// Players caught outside the safe zones, all killed.
    pub outside_casualties: Vec<PlayerOutcome>,
    /// Players inside the safe zones that received at least one attempt.
    pub inside_outcomes: Vec<PlayerOutcome>,
}

impl HordeAttackReport {
    pub fn total_attacks(&self) -> u32 {
        self.inside_outcomes.iter().map(|o| o.attacks_received).sum()
    }

    pub fn total_hits(&self) -> u32 {
        self.inside_outcomes.iter().map(|o| o.hits).sum()
    }

    /// Every outcome whose vital status changed, outside casualties first.
    pub fn status_changes(&self) -> impl Iterator<Item = &PlayerOutcome> {
        self.outside_casualties
            .iter()
            .chain(&self.inside_outcomes)
            .filter(|o| o.changed())
    }

    pub fn death_count(&self) -> usize {
        self.outside_casualties
            .iter()
            .chain(&self.inside_outcomes)
            .filter(|o| o.died())
            .count()
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HordeAttackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Day {}: {} zombies attacked, defense held {}.",
            self.day, self.horde_size, self.defense
        )?;

        if self.breached {
            writeln!(
                f,
                "{} zombies broke through ({} attacks, {} hits).",
                self.breach_size,
                self.total_attacks(),
                self.total_hits()
            )?;
        } else {
            writeln!(f, "The defenses held.")?;
        }

        for outcome in &self.outside_casualties {
            writeln!(f, "- {} was caught outside and died.", outcome.name)?;
        }

        for outcome in &self.inside_outcomes {
            if outcome.infection_death {
                writeln!(f, "- {} succumbed to infection.", outcome.name)?;
            } else if outcome.changed() {
                writeln!(
                    f,
                    "- {}: {} attacks, {} hits, {} -> {}.",
                    outcome.name,
                    outcome.attacks_received,
                    outcome.hits,
                    outcome.before,
                    outcome.after
                )?;
            } else {
                writeln!(
                    f,
                    "- {} fended off {} attacks.",
                    outcome.name, outcome.attacks_received
                )?;
            }
        }

        write!(f, "Casualties: {}.", self.death_count())
    }
}
