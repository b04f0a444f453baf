//! Phase transitions of the settlement world.
//!
//! [`PhaseRunner`] applies the two boundary transitions to a [`WorldState`]
//! in a fixed order. It assumes exclusive access to the world state, which
//! the world worker guarantees by processing one command at a time.

use chrono::{DateTime, NaiveTime, Utc};
use rand::RngCore;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use horde_core::{
    HordeAttackReport, Phase, Player, PlayerId, PopulationSnapshot, ResolutionError, StatusOp,
    WorldRules, WorldState, decay_plan, next_horde_size, resolve_horde_attack,
};

use crate::repository::{Collaborators, RepositoryError};
use crate::scheduler::next_daily_fire;

/// A transition that could not run to completion.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// The resolver found an inconsistent population; the report totals
    /// cannot be trusted, so nothing was applied.
    #[error("attack resolution aborted: {0}")]
    Resolution(#[from] ResolutionError),

    /// A read the whole transition depends on failed.
    #[error("failed to read {what}: {source}")]
    Roster {
        what: &'static str,
        #[source]
        source: RepositoryError,
    },
}

/// What a transition request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The attack was resolved and its effects applied.
    Resolved(Box<HordeAttackReport>),
    /// A new day started.
    Advanced { day: u32, horde_size: u32 },
    /// The world was not in the phase the transition starts from.
    Skipped { current: Phase },
}

/// The two daily boundary times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    pub resolution_at: NaiveTime,
    pub dawn_at: NaiveTime,
}

impl PhaseClock {
    pub fn next_resolution(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_daily_fire(now, self.resolution_at)
    }

    pub fn next_dawn(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_daily_fire(now, self.dawn_at)
    }
}

/// Runs phase transitions against the collaborators.
pub struct PhaseRunner {
    ports: Collaborators,
    rules: WorldRules,
    clock: PhaseClock,
    cache_key: String,
}

impl PhaseRunner {
    pub fn new(
        ports: Collaborators,
        rules: WorldRules,
        clock: PhaseClock,
        cache_key: impl Into<String>,
    ) -> Self {
        Self {
            ports,
            rules,
            clock,
            cache_key: cache_key.into(),
        }
    }

    pub fn rules(&self) -> &WorldRules {
        &self.rules
    }

    pub fn clock(&self) -> PhaseClock {
        self.clock
    }

    pub fn ports(&self) -> &Collaborators {
        &self.ports
    }

    /// Loads the world state: the cached copy if there is one, otherwise a
    /// fresh interactive world for the default settlement.
    ///
    /// Returns `None` when there is neither a cached state nor a settlement.
    pub async fn load_world<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Option<WorldState>, RepositoryError> {
        match self.ports.cache.get(&self.cache_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<WorldState>(&raw) {
                Ok(world) => {
                    info!(
                        target: "runtime::phase",
                        day = world.day,
                        phase = %world.phase,
                        "Restored world state from cache"
                    );
                    return Ok(Some(world));
                }
                Err(error) => {
                    warn!(
                        target: "runtime::phase",
                        error = %error,
                        "Cached world state is unreadable, rebuilding from settlement"
                    );
                }
            },
            Ok(None) => {}
            Err(error) => {
                warn!(
                    target: "runtime::phase",
                    error = %error,
                    "World state cache unavailable, rebuilding from settlement"
                );
            }
        }

        let Some(settlement) = self.ports.settlements.default_settlement().await? else {
            debug!(target: "runtime::phase", "No settlement, world not created yet");
            return Ok(None);
        };

        let world = WorldState::new(
            settlement.id,
            settlement.day,
            self.rules.horde.initial_size,
            self.clock.next_resolution(now),
        )
        .with_map_seed(rng.next_u64());

        info!(
            target: "runtime::phase",
            settlement = %settlement.id,
            day = world.day,
            "Created world state from settlement"
        );
        self.persist(&world).await;
        Ok(Some(world))
    }

    /// Writes the world state to the cache. Failures are logged only; the
    /// in-memory copy stays authoritative.
    pub async fn persist(&self, world: &WorldState) {
        let raw = match serde_json::to_string(world) {
            Ok(raw) => raw,
            Err(error) => {
                error!(target: "runtime::phase", error = %error, "Failed to serialize world state");
                return;
            }
        };
        if let Err(error) = self.ports.cache.set(&self.cache_key, raw).await {
            warn!(
                target: "runtime::phase",
                error = %error,
                "Failed to persist world state"
            );
        }
    }

    /// `Interactive -> Resolving`: resolves the horde attack and applies it.
    ///
    /// Order: enter the resolving phase, sum building defense, resolve
    /// against the live roster, apply status changes, update the population,
    /// grow hostile presence, deliver the report.
    pub async fn begin_resolution<R: RngCore + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, PhaseError> {
        if world.phase != Phase::Interactive {
            warn!(
                target: "runtime::phase",
                phase = %world.phase,
                "Skipping resolution, world is not interactive"
            );
            return Ok(TransitionOutcome::Skipped {
                current: world.phase,
            });
        }

        world.phase = Phase::Resolving;
        world.next_boundary_at = self.clock.next_dawn(now);
        self.persist(world).await;
        info!(
            target: "runtime::phase",
            day = world.day,
            horde_size = world.horde_size,
            "Phase changed to resolving"
        );

        let defense = self.defense_total(world).await;

        let roster = self
            .ports
            .players
            .alive_players()
            .await
            .map_err(|source| PhaseError::Roster {
                what: "alive players",
                source,
            })?;
        let snapshot = PopulationSnapshot::partition(roster);
        let alive_before = snapshot.len();

        let report = resolve_horde_attack(
            world.day,
            world.horde_size,
            defense,
            &snapshot,
            &self.rules.combat,
            rng,
        )
        .inspect_err(|err| {
            error!(
                target: "runtime::phase",
                day = world.day,
                error = %err,
                "Attack resolution aborted"
            );
        })?;

        for outcome in report.status_changes() {
            if let Err(error) = self
                .ports
                .players
                .update_status(outcome.player_id, outcome.after)
                .await
            {
                warn!(
                    target: "runtime::phase",
                    player = %outcome.player_id,
                    error = %error,
                    "Failed to apply attack outcome"
                );
            }
        }

        let population = alive_before.saturating_sub(report.death_count());
        let population = u32::try_from(population).unwrap_or(u32::MAX);
        if let Err(error) = self
            .ports
            .settlements
            .update_population(world.settlement_id, population)
            .await
        {
            warn!(target: "runtime::phase", error = %error, "Failed to update population");
        }

        if let Err(error) = self.ports.hostiles.grow_after_attack().await {
            warn!(target: "runtime::phase", error = %error, "Hostile growth step failed");
        }

        world.last_attack_at = Some(now);
        self.persist(world).await;

        info!(
            target: "runtime::phase",
            day = report.day,
            breach = report.breach_size,
            deaths = report.death_count(),
            population,
            "Attack resolved"
        );

        if let Err(error) = self.ports.notifier.deliver(&report).await {
            warn!(target: "runtime::phase", error = %error, "Failed to deliver attack report");
        }

        Ok(TransitionOutcome::Resolved(Box::new(report)))
    }

    /// `Resolving -> Interactive`: starts the next day.
    ///
    /// Order: restore survivors' action points, advance the day, rescale the
    /// horde, decay every survivor's conditions once, enter the interactive
    /// phase.
    pub async fn begin_interactive<R: RngCore + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, PhaseError> {
        if world.phase != Phase::Resolving {
            warn!(
                target: "runtime::phase",
                phase = %world.phase,
                "Skipping dawn, world is not resolving"
            );
            return Ok(TransitionOutcome::Skipped {
                current: world.phase,
            });
        }

        let survivors = self
            .ports
            .players
            .alive_players()
            .await
            .map_err(|source| PhaseError::Roster {
                what: "alive players",
                source,
            })?;

        for player in &survivors {
            if let Err(error) = self.ports.players.reset_action_points(player.id).await {
                warn!(
                    target: "runtime::phase",
                    player = %player.id,
                    error = %error,
                    "Failed to restore action points"
                );
            }
        }

        world.day = world.day.saturating_add(1);
        match self.ports.settlements.advance_day(world.settlement_id).await {
            Ok(day) if day != world.day => {
                debug!(
                    target: "runtime::phase",
                    world_day = world.day,
                    settlement_day = day,
                    "Settlement day counter disagrees with world state"
                );
            }
            Ok(_) => {}
            Err(error) => {
                warn!(target: "runtime::phase", error = %error, "Failed to advance settlement day");
            }
        }

        world.horde_size = next_horde_size(world.horde_size, &self.rules.horde, rng);

        for player in &survivors {
            self.decay(player).await;
        }

        world.phase = Phase::Interactive;
        world.next_boundary_at = self.clock.next_resolution(now);
        self.persist(world).await;

        info!(
            target: "runtime::phase",
            day = world.day,
            horde_size = world.horde_size,
            survivors = survivors.len(),
            "Phase changed to interactive"
        );

        Ok(TransitionOutcome::Advanced {
            day: world.day,
            horde_size: world.horde_size,
        })
    }

    async fn defense_total(&self, world: &WorldState) -> u32 {
        match self.ports.settlements.buildings(world.settlement_id).await {
            Ok(buildings) => {
                let total = buildings
                    .iter()
                    .fold(0u32, |total, b| total.saturating_add(b.defense));
                if let Err(error) = self
                    .ports
                    .settlements
                    .update_defense_total(world.settlement_id, total)
                    .await
                {
                    warn!(
                        target: "runtime::phase",
                        error = %error,
                        "Failed to store defense total"
                    );
                }
                total
            }
            Err(error) => {
                warn!(
                    target: "runtime::phase",
                    error = %error,
                    "Failed to read buildings, settlement has no defense tonight"
                );
                0
            }
        }
    }

    /// Applies one decay step to a player. The first failing operation
    /// skips the rest of that player's step.
    async fn decay(&self, player: &Player) {
        for op in decay_plan(player) {
            if let Err(error) = self.apply(player.id, op).await {
                warn!(
                    target: "runtime::phase",
                    player = %player.id,
                    op = ?op,
                    error = %error,
                    "Status decay failed, skipping player"
                );
                return;
            }
        }
    }

    async fn apply(&self, id: PlayerId, op: StatusOp) -> Result<(), RepositoryError> {
        let players = &self.ports.players;
        match op {
            StatusOp::SetVital(vital) => players.update_status(id, vital).await,
            StatusOp::AddCondition(condition) => players.add_condition(id, condition).await,
            StatusOp::RemoveCondition(condition) => players.remove_condition(id, condition).await,
        }
    }
}
