//! Horde combat resolution.

use std::collections::HashSet;

use rand::Rng;

use super::{HordeAttackReport, PlayerOutcome};
use crate::config::CombatRules;
use crate::error::ResolutionError;
use crate::player::Player;
use crate::status::{Condition, VitalStatus, Wound};

/// Living players split by whether they are behind the settlement defenses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationSnapshot {
    pub outside: Vec<Player>,
    pub inside: Vec<Player>,
}

impl PopulationSnapshot {
    pub fn new(outside: Vec<Player>, inside: Vec<Player>) -> Self {
        Self { outside, inside }
    }

    /// Splits a roster by zone safety. Dead players are dropped.
    pub fn partition(players: impl IntoIterator<Item = Player>) -> Self {
        let (inside, outside) = players
            .into_iter()
            .filter(Player::is_alive)
            .partition(|p| p.location.zone.is_safe());
        Self { outside, inside }
    }

    pub fn len(&self) -> usize {
        self.outside.len() + self.inside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), ResolutionError> {
        let mut seen = HashSet::with_capacity(self.len());
        for player in self.outside.iter().chain(&self.inside) {
            if !player.is_alive() {
                return Err(ResolutionError::DeadCombatant { player: player.id });
            }
            if !seen.insert(player.id) {
                return Err(ResolutionError::DuplicateCombatant { player: player.id });
            }
        }
        Ok(())
    }
}

/// Resolves one horde attack.
///
/// 1. `breach = max(0, horde_size - defense)`.
/// 2. Every player outside is killed, no roll.
/// 3. Each of the `breach` attempts targets a uniformly drawn inside player
///    (with replacement).
/// 4. An infected target may die outright on a single roll before its attempts.
/// 5. Otherwise each attempt hits on `hit_chance`: a healthy player takes a
///    random wound, an already wounded player dies and takes no further attempts.
///
/// The function is deterministic given `rng`.
pub fn resolve_horde_attack<R: Rng + ?Sized>(
    day: u32,
    horde_size: u32,
    defense: u32,
    population: &PopulationSnapshot,
    rules: &CombatRules,
    rng: &mut R,
) -> Result<HordeAttackReport, ResolutionError> {
    check_probability("hit_chance", rules.hit_chance)?;
    check_probability("infection_death_chance", rules.infection_death_chance)?;
    population.validate()?;

    let breach_size = horde_size.saturating_sub(defense);

    let outside_casualties = population
        .outside
        .iter()
        .map(PlayerOutcome::caught_outside)
        .collect();

    let mut inside_outcomes = Vec::new();
    if breach_size > 0 && !population.inside.is_empty() {
        let targets = &population.inside;
        let mut attempts = vec![0u32; targets.len()];
        for _ in 0..breach_size {
            attempts[rng.gen_range(0..targets.len())] += 1;
        }

        for (player, &received) in targets.iter().zip(&attempts) {
            if received > 0 {
                inside_outcomes.push(resolve_player(player, received, rules, rng));
            }
        }
    }

    Ok(HordeAttackReport {
        day,
        horde_size,
        defense,
        breached: breach_size > 0,
        breach_size,
        outside_casualties,
        inside_outcomes,
    })
}

fn resolve_player<R: Rng + ?Sized>(
    player: &Player,
    attempts: u32,
    rules: &CombatRules,
    rng: &mut R,
) -> PlayerOutcome {
    let mut outcome = PlayerOutcome::untouched(player, attempts);

    if player.has_condition(Condition::Infected) && rng.gen_bool(rules.infection_death_chance) {
        outcome.after = VitalStatus::Dead;
        outcome.infection_death = true;
        return outcome;
    }

    let mut wounded = player.is_wounded();
    for _ in 0..attempts {
        if !rng.gen_bool(rules.hit_chance) {
            continue;
        }
        outcome.hits += 1;

        if wounded {
            outcome.after = VitalStatus::Dead;
            break;
        }
        let wound = Wound::ALL[rng.gen_range(0..Wound::ALL.len())];
        outcome.after = VitalStatus::Wounded(wound);
        wounded = true;
    }
    outcome
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ResolutionError> {
    crate::config::check_probability(name, value)
        .map_err(|_| ResolutionError::InvalidProbability { name, value })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::player::{Location, PlayerId, Zone};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn rules(hit_chance: f64, infection_death_chance: f64) -> CombatRules {
        CombatRules {
            hit_chance,
            infection_death_chance,
        }
    }

    fn player(id: u64, zone: Zone) -> Player {
        Player::new(PlayerId(id), format!("p{id}"), 6).with_location(Location::new(zone, None))
    }

    #[test]
    fn no_breach_still_kills_players_outside() {
        let population = PopulationSnapshot::partition(vec![
            player(1, Zone::Waste),
            player(2, Zone::City),
            player(3, Zone::Home),
        ]);

        let report =
            resolve_horde_attack(1, 10, 15, &population, &CombatRules::default(), &mut rng())
                .unwrap();

        assert!(!report.breached);
        assert_eq!(report.breach_size, 0);
        assert_eq!(report.total_attacks(), 0);
        assert!(report.inside_outcomes.is_empty());
        assert_eq!(report.outside_casualties.len(), 1);
        assert_eq!(report.outside_casualties[0].player_id, PlayerId(1));
        assert_eq!(report.outside_casualties[0].after, VitalStatus::Dead);
    }

    #[test]
    fn every_breaching_zombie_makes_one_attempt() {
        let population = PopulationSnapshot::partition((1..=4).map(|id| player(id, Zone::Home)));

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let report =
                resolve_horde_attack(3, 20, 5, &population, &CombatRules::default(), &mut rng)
                    .unwrap();
            assert_eq!(report.breach_size, 15);
            assert_eq!(report.total_attacks(), 15);
        }
    }

    #[test]
    fn certain_hits_wound_then_kill() {
        let population = PopulationSnapshot::partition(vec![player(1, Zone::Home)]);

        let report =
            resolve_horde_attack(2, 3, 1, &population, &rules(1.0, 0.0), &mut rng()).unwrap();

        let outcome = &report.inside_outcomes[0];
        assert_eq!(outcome.attacks_received, 2);
        assert_eq!(outcome.hits, 2);
        assert_eq!(outcome.before, VitalStatus::Healthy);
        assert_eq!(outcome.after, VitalStatus::Dead);
    }

    #[test]
    fn single_hit_leaves_a_wound() {
        let population = PopulationSnapshot::partition(vec![player(1, Zone::City)]);

        let report =
            resolve_horde_attack(2, 1, 0, &population, &rules(1.0, 0.0), &mut rng()).unwrap();

        let outcome = &report.inside_outcomes[0];
        assert_eq!(outcome.hits, 1);
        assert!(matches!(outcome.after, VitalStatus::Wounded(_)));
    }

    #[test]
    fn dead_players_take_no_further_hits() {
        let wounded = player(1, Zone::Home).with_vital(VitalStatus::Wounded(Wound::Arm));
        let population = PopulationSnapshot::new(vec![], vec![wounded]);

        let report =
            resolve_horde_attack(2, 5, 0, &population, &rules(1.0, 0.0), &mut rng()).unwrap();

        let outcome = &report.inside_outcomes[0];
        assert_eq!(outcome.attacks_received, 5);
        assert_eq!(outcome.hits, 1);
        assert_eq!(outcome.after, VitalStatus::Dead);
    }

    #[test]
    fn claimed_wound_counts_as_wounded() {
        let hurt = player(1, Zone::Home).with_condition(Condition::Wounded(Wound::Leg));
        let population = PopulationSnapshot::new(vec![], vec![hurt]);

        let report =
            resolve_horde_attack(2, 1, 0, &population, &rules(1.0, 0.0), &mut rng()).unwrap();
        assert_eq!(report.inside_outcomes[0].after, VitalStatus::Dead);
    }

    #[test]
    fn infection_short_circuits_attempts() {
        let infected = player(1, Zone::Home).with_condition(Condition::Infected);
        let population = PopulationSnapshot::new(vec![], vec![infected]);

        let report =
            resolve_horde_attack(4, 6, 0, &population, &rules(1.0, 1.0), &mut rng()).unwrap();

        let outcome = &report.inside_outcomes[0];
        assert!(outcome.infection_death);
        assert_eq!(outcome.attacks_received, 6);
        assert_eq!(outcome.hits, 0);
        assert_eq!(outcome.after, VitalStatus::Dead);
    }

    #[test]
    fn misses_change_nothing() {
        let population = PopulationSnapshot::partition((1..=3).map(|id| player(id, Zone::Home)));

        let report =
            resolve_horde_attack(1, 30, 0, &population, &rules(0.0, 0.0), &mut rng()).unwrap();

        assert_eq!(report.total_attacks(), 30);
        assert_eq!(report.total_hits(), 0);
        assert_eq!(report.status_changes().count(), 0);
    }

    #[test]
    fn nobody_inside_means_no_attempts() {
        let population = PopulationSnapshot::partition(vec![player(1, Zone::Waste)]);

        let report =
            resolve_horde_attack(1, 30, 0, &population, &rules(1.0, 0.0), &mut rng()).unwrap();

        assert!(report.breached);
        assert_eq!(report.total_attacks(), 0);
        assert_eq!(report.death_count(), 1);
    }

    #[test]
    fn same_seed_same_report() {
        let population = PopulationSnapshot::partition((1..=5).map(|id| player(id, Zone::Home)));
        let first =
            resolve_horde_attack(1, 40, 10, &population, &CombatRules::default(), &mut rng())
                .unwrap();
        let second =
            resolve_horde_attack(1, 40, 10, &population, &CombatRules::default(), &mut rng())
                .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dead_combatant_is_an_invariant_violation() {
        let dead = player(9, Zone::Home).with_vital(VitalStatus::Dead);
        let population = PopulationSnapshot::new(vec![], vec![dead]);

        let err = resolve_horde_attack(1, 5, 0, &population, &CombatRules::default(), &mut rng())
            .unwrap_err();
        assert_eq!(err, ResolutionError::DeadCombatant { player: PlayerId(9) });
    }

    #[test]
    fn duplicate_combatant_is_an_invariant_violation() {
        let population =
            PopulationSnapshot::new(vec![player(1, Zone::Waste)], vec![player(1, Zone::Home)]);

        let err = resolve_horde_attack(1, 5, 0, &population, &CombatRules::default(), &mut rng())
            .unwrap_err();
        assert_eq!(err, ResolutionError::DuplicateCombatant { player: PlayerId(1) });
    }

    #[test]
    fn summary_names_casualties() {
        let population = PopulationSnapshot::partition(vec![player(1, Zone::Waste)]);
        let report = resolve_horde_attack(7, 3, 9, &population, &CombatRules::default(), &mut rng())
            .unwrap();

        let summary = report.summary();
        assert!(summary.starts_with("Day 7: 3 zombies attacked"));
        assert!(summary.contains("p1 was caught outside and died."));
        assert!(summary.ends_with("Casualties: 1."));
    }
}
