//! World worker that owns the authoritative [`WorldState`].
//!
//! Receives commands from [`WorldHandle`](crate::api::WorldHandle) and runs
//! them one at a time, so a phase transition, a sweep and a player move can
//! never interleave their read-modify-persist steps.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use horde_core::{
    ActionPermission, DenialReason, Direction, DiscoveryState, GridCoordinate, Location,
    PlayerId, WorldState, Zone, ZoneTag, check_action,
};

use crate::api::{Result, RuntimeError};
use crate::events::{EventBus, WorldEvent};
use crate::grid::ExplorationGrid;
use crate::phase::{PhaseRunner, TransitionOutcome};

/// Action points a single grid step costs.
pub const MOVE_COST: u32 = 1;

/// Commands that can be sent to the world worker
pub enum Command {
    CanAct {
        player: PlayerId,
        required: u32,
        reply: oneshot::Sender<Result<ActionPermission>>,
    },
    WorldState {
        reply: oneshot::Sender<Result<Option<WorldState>>>,
    },
    BeginResolution {
        reply: oneshot::Sender<Result<TransitionOutcome>>,
    },
    BeginInteractive {
        reply: oneshot::Sender<Result<TransitionOutcome>>,
    },
    SweepContested {
        reply: oneshot::Sender<usize>,
    },
    TileState {
        x: i32,
        y: i32,
        reply: oneshot::Sender<Result<DiscoveryState>>,
    },
    LocationAt {
        x: i32,
        y: i32,
        reply: oneshot::Sender<Result<ZoneTag>>,
    },
    MarkExplored {
        x: i32,
        y: i32,
        reply: oneshot::Sender<Result<DiscoveryState>>,
    },
    MovePlayer {
        player: PlayerId,
        direction: Direction,
        reply: oneshot::Sender<Result<Location>>,
    },
    ResetMap {
        reply: oneshot::Sender<Result<Vec<ZoneTag>>>,
    },
    ResetWorld {
        reply: oneshot::Sender<Result<WorldState>>,
    },
    /// Stop after every command queued before this one.
    Shutdown,
}

/// Background task that processes world commands.
pub struct WorldWorker {
    world: Option<WorldState>,
    grid: ExplorationGrid,
    runner: PhaseRunner,
    rng: StdRng,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl WorldWorker {
    pub fn new(
        grid: ExplorationGrid,
        runner: PhaseRunner,
        rng: StdRng,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            world: None,
            grid,
            runner,
            rng,
            command_rx,
            event_bus,
        }
    }

    /// Loads the world state and exploration history before serving commands.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.ensure_world().await?;
        self.grid.load().await;
        match &self.world {
            Some(world) => info!(
                target: "runtime::worker",
                day = world.day,
                phase = %world.phase,
                map_seed = world.map_seed,
                "World worker ready"
            ),
            None => info!(
                target: "runtime::worker",
                "World worker ready, waiting for a settlement"
            ),
        }
        Ok(())
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if matches!(cmd, Command::Shutdown) {
                break;
            }
            self.handle_command(cmd).await;
        }
        self.grid.flush().await;
        info!(target: "runtime::worker", "World worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::CanAct {
                player,
                required,
                reply,
            } => {
                let _ = reply.send(self.can_act(player, required).await);
            }
            Command::WorldState { reply } => {
                let result = self.ensure_world().await.map(|_| self.world.clone());
                let _ = reply.send(result);
            }
            Command::BeginResolution { reply } => {
                let _ = reply.send(self.begin_resolution().await);
            }
            Command::BeginInteractive { reply } => {
                let _ = reply.send(self.begin_interactive().await);
            }
            Command::SweepContested { reply } => {
                let _ = reply.send(self.sweep_contested().await);
            }
            Command::TileState { x, y, reply } => {
                let _ = reply.send(self.grid.tile_state(x, y).map_err(RuntimeError::from));
            }
            Command::LocationAt { x, y, reply } => {
                let _ = reply.send(self.grid.location_at(x, y).map_err(RuntimeError::from));
            }
            Command::MarkExplored { x, y, reply } => {
                let _ = reply.send(self.mark_explored(x, y));
            }
            Command::MovePlayer {
                player,
                direction,
                reply,
            } => {
                let _ = reply.send(self.move_player(player, direction).await);
            }
            Command::ResetMap { reply } => {
                let _ = reply.send(Ok(self.reset_map().await));
            }
            Command::ResetWorld { reply } => {
                let _ = reply.send(self.reset_world().await);
            }
            Command::Shutdown => {}
        }
    }

    /// Loads the world if it does not exist yet. A settlement created after
    /// startup is picked up here.
    async fn ensure_world(&mut self) -> Result<bool> {
        if self.world.is_some() {
            return Ok(true);
        }
        let Some(world) = self.runner.load_world(&mut self.rng, Utc::now()).await? else {
            return Ok(false);
        };
        if world.map_seed != self.grid.map_seed() {
            self.grid.reseed(world.map_seed);
        }
        self.world = Some(world);
        Ok(true)
    }

    async fn can_act(&mut self, id: PlayerId, required: u32) -> Result<ActionPermission> {
        self.ensure_world().await?;
        let Some(world) = self.world.as_ref() else {
            return Ok(check_action(None, id, None, required));
        };
        let player = self.runner.ports().players.get_player(id).await?;
        Ok(check_action(Some(world), id, player.as_ref(), required))
    }

    async fn begin_resolution(&mut self) -> Result<TransitionOutcome> {
        if !self.ensure_world().await? {
            return Err(RuntimeError::NoWorld);
        }
        let Some(world) = self.world.as_mut() else {
            return Err(RuntimeError::NoWorld);
        };

        let before = world.phase;
        let result = self
            .runner
            .begin_resolution(world, &mut self.rng, Utc::now())
            .await;
        if world.phase != before {
            self.event_bus.publish(WorldEvent::PhaseChanged {
                day: world.day,
                phase: world.phase,
                next_boundary_at: world.next_boundary_at,
            });
        }

        let outcome = result?;
        if let TransitionOutcome::Resolved(report) = &outcome {
            self.event_bus
                .publish(WorldEvent::AttackResolved((**report).clone()));
        }
        Ok(outcome)
    }

    async fn begin_interactive(&mut self) -> Result<TransitionOutcome> {
        if !self.ensure_world().await? {
            return Err(RuntimeError::NoWorld);
        }
        let Some(world) = self.world.as_mut() else {
            return Err(RuntimeError::NoWorld);
        };

        let outcome = self
            .runner
            .begin_interactive(world, &mut self.rng, Utc::now())
            .await?;
        if let TransitionOutcome::Advanced { .. } = outcome {
            self.event_bus.publish(WorldEvent::PhaseChanged {
                day: world.day,
                phase: world.phase,
                next_boundary_at: world.next_boundary_at,
            });
        }
        Ok(outcome)
    }

    /// Expires contested-zone state. A failing collaborator is logged and
    /// counts as nothing removed.
    async fn sweep_contested(&mut self) -> usize {
        match self
            .runner
            .ports()
            .hostiles
            .expire_contested(Utc::now())
            .await
        {
            Ok(0) => 0,
            Ok(removed) => {
                debug!(target: "runtime::worker", removed, "Expired contested zones");
                self.event_bus
                    .publish(WorldEvent::ContestedSwept { removed });
                removed
            }
            Err(error) => {
                warn!(target: "runtime::worker", error = %error, "Contested-zone sweep failed");
                0
            }
        }
    }

    fn mark_explored(&mut self, x: i32, y: i32) -> Result<DiscoveryState> {
        let (state, newly_explored) = self.grid.mark_explored(x, y)?;
        if newly_explored {
            self.event_bus.publish(WorldEvent::TileExplored {
                coordinate: GridCoordinate::new(x, y),
                state,
            });
        }
        Ok(state)
    }

    async fn move_player(&mut self, id: PlayerId, direction: Direction) -> Result<Location> {
        self.ensure_world().await?;
        let players = Arc::clone(&self.runner.ports().players);
        let player = players.get_player(id).await?;
        check_action(self.world.as_ref(), id, player.as_ref(), MOVE_COST).into_result()?;
        let Some(player) = player else {
            return Err(DenialReason::UnknownPlayer(id).into());
        };

        let center = self.grid.center();
        let origin = player.location.coordinate.unwrap_or(center);
        let step = origin.step(direction);
        let target = self.grid.map().coordinate(step.x, step.y)?;
        let zone = if target == center {
            Zone::City
        } else {
            Zone::Waste
        };
        let location = Location::at(zone, target);

        // Charge only once the move is stored.
        players.update_location(id, location).await?;
        if let Err(error) = players.spend_action_points(id, MOVE_COST).await {
            if let Err(revert) = players.update_location(id, player.location).await {
                warn!(
                    target: "runtime::worker",
                    player = %id,
                    error = %revert,
                    "Failed to undo move after charging failed"
                );
            }
            return Err(error.into());
        }
        self.mark_explored(target.x, target.y)?;

        debug!(
            target: "runtime::worker",
            player = %id,
            from = %origin,
            to = %target,
            zone = zone.as_str(),
            "Player moved"
        );
        Ok(location)
    }

    async fn reset_map(&mut self) -> Vec<ZoneTag> {
        let map_seed = self.rng.next_u64();
        let unplaced = self.grid.reset(map_seed).await;
        if let Some(world) = self.world.as_mut() {
            world.map_seed = map_seed;
            self.runner.persist(world).await;
        }
        self.event_bus.publish(WorldEvent::MapReset {
            map_seed,
            unplaced: unplaced.clone(),
        });
        unplaced
    }

    async fn reset_world(&mut self) -> Result<WorldState> {
        let ports = self.runner.ports().clone();
        let settlement_id = match &self.world {
            Some(world) => world.settlement_id,
            None => {
                ports
                    .settlements
                    .default_settlement()
                    .await?
                    .ok_or(RuntimeError::NoWorld)?
                    .id
            }
        };

        ports.players.reset_all_players().await?;
        let unplaced = self.reset_map().await;

        let now = Utc::now();
        let world = WorldState::new(
            settlement_id,
            1,
            self.runner.rules().horde.initial_size,
            self.runner.clock().next_resolution(now),
        )
        .with_map_seed(self.grid.map_seed());
        self.runner.persist(&world).await;
        self.world = Some(world.clone());

        info!(
            target: "runtime::worker",
            settlement = %settlement_id,
            unplaced = unplaced.len(),
            "World reset"
        );
        self.event_bus.publish(WorldEvent::WorldReset {
            day: world.day,
            horde_size: world.horde_size,
        });
        Ok(world)
    }
}
