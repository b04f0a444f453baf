//! High-level runtime orchestrator.
//!
//! The runtime owns the world worker and the scheduler, wires up the command
//! channel and the event bus, and exposes a builder-based API for the
//! composition root.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use horde_core::WorldRules;

use crate::api::{Result, RuntimeError, WorldHandle};
use crate::config::RuntimeConfig;
use crate::events::{EventBus, Topic, TracingNotificationSink, WorldEvent};
use crate::grid::ExplorationGrid;
use crate::phase::{PhaseClock, PhaseRunner};
use crate::repository::{
    Collaborators, ExploredTileStore, HostilePresence, InMemoryExploredTileStore,
    InMemoryHostilePresence, InMemoryWorldStateCache, NotificationSink, PlayerStore,
    SettlementStore, WorldStateCache,
};
use crate::scheduler::{Scheduler, Trigger};
use crate::workers::{Command, WorldWorker};

/// Running world: the worker task plus its scheduler tasks.
///
/// [`WorldHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: WorldHandle,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: JoinHandle<()>,
    scheduler_handles: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> WorldHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<WorldEvent> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the triggers first, letting a cycle that already started finish,
    /// then stops the worker after the commands queued so far.
    pub async fn shutdown(self) -> Result<()> {
        info!(target: "runtime::scheduler", "Shutting down");
        let _ = self.shutdown_tx.send(true);
        for handle in self.scheduler_handles {
            handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        self.handle.shutdown_worker().await?;
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
///
/// The player and settlement stores are required. The other collaborators
/// default to in-memory implementations and a logging notifier.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    players: Option<Arc<dyn PlayerStore>>,
    settlements: Option<Arc<dyn SettlementStore>>,
    cache: Option<Arc<dyn WorldStateCache>>,
    tiles: Option<Arc<dyn ExploredTileStore>>,
    hostiles: Option<Arc<dyn HostilePresence>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    triggers: Option<Vec<Trigger>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            players: None,
            settlements: None,
            cache: None,
            tiles: None,
            hostiles: None,
            notifier: None,
            triggers: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(mut self, rules: WorldRules) -> Self {
        self.config.rules = rules;
        self
    }

    /// Fix the worker's random source for reproducible runs
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    pub fn players(mut self, store: Arc<dyn PlayerStore>) -> Self {
        self.players = Some(store);
        self
    }

    pub fn settlements(mut self, store: Arc<dyn SettlementStore>) -> Self {
        self.settlements = Some(store);
        self
    }

    pub fn world_state_cache(mut self, cache: Arc<dyn WorldStateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn explored_tiles(mut self, store: Arc<dyn ExploredTileStore>) -> Self {
        self.tiles = Some(store);
        self
    }

    pub fn hostile_presence(mut self, hostiles: Arc<dyn HostilePresence>) -> Self {
        self.hostiles = Some(hostiles);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the default triggers. An empty list runs no scheduler, and
    /// phases only change through [`WorldHandle`] calls.
    pub fn triggers(mut self, triggers: Vec<Trigger>) -> Self {
        self.triggers = Some(triggers);
        self
    }

    /// Build the runtime
    ///
    /// Loads the world state and exploration history, then spawns the world
    /// worker and the scheduler.
    pub async fn build(self) -> Result<Runtime> {
        self.config.validate()?;

        let ports = Collaborators {
            players: self
                .players
                .ok_or(RuntimeError::MissingCollaborator("player store"))?,
            settlements: self
                .settlements
                .ok_or(RuntimeError::MissingCollaborator("settlement store"))?,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(InMemoryWorldStateCache::new())),
            tiles: self
                .tiles
                .unwrap_or_else(|| Arc::new(InMemoryExploredTileStore::new())),
            hostiles: self
                .hostiles
                .unwrap_or_else(|| Arc::new(InMemoryHostilePresence::new())),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(TracingNotificationSink)),
        };

        let config = self.config;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = PhaseClock {
            resolution_at: config.resolution_time,
            dawn_at: config.dawn_time,
        };

        let grid = ExplorationGrid::new(
            &config.rules,
            0,
            Arc::clone(&ports.tiles),
            Arc::clone(&ports.hostiles),
        );
        let runner = PhaseRunner::new(
            ports,
            config.rules.clone(),
            clock,
            config.world_state_key.clone(),
        );

        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);

        let mut worker = WorldWorker::new(grid, runner, rng, command_rx, event_bus.clone());
        worker.bootstrap().await?;
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        let handle = WorldHandle::new(command_tx, event_bus);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let triggers = self
            .triggers
            .unwrap_or_else(|| Trigger::defaults(&config));
        let scheduler_handles = if triggers.is_empty() {
            Vec::new()
        } else {
            Scheduler::new(triggers, handle.clone(), shutdown_rx).spawn()
        };

        Ok(Runtime {
            handle,
            shutdown_tx,
            worker_handle,
            scheduler_handles,
        })
    }
}
