//! Cloneable façade for issuing commands to the world.
//!
//! [`WorldHandle`] hides channel plumbing and offers async helpers for every
//! world operation. All calls are serialized by the world worker.
use tokio::sync::{broadcast, mpsc, oneshot};

use horde_core::{
    ActionPermission, Direction, DiscoveryState, Location, PlayerId, WorldState, ZoneTag,
};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Topic, WorldEvent};
use crate::phase::TransitionOutcome;
use crate::workers::Command;

/// Client-facing handle to interact with the world
#[derive(Clone)]
pub struct WorldHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl WorldHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Whether `player` may take an action costing `required` action points.
    ///
    /// A zero cost skips the balance check, so free actions stay available
    /// at zero action points.
    pub async fn can_act(&self, player: PlayerId, required: u32) -> Result<ActionPermission> {
        self.request(|reply| Command::CanAct {
            player,
            required,
            reply,
        })
        .await?
    }

    /// Current world state, or `None` before a settlement exists.
    pub async fn world_state(&self) -> Result<Option<WorldState>> {
        self.request(|reply| Command::WorldState { reply }).await?
    }

    /// Resolves tonight's horde attack now.
    pub async fn begin_resolution(&self) -> Result<TransitionOutcome> {
        self.request(|reply| Command::BeginResolution { reply })
            .await?
    }

    /// Starts the next day now.
    pub async fn begin_interactive(&self) -> Result<TransitionOutcome> {
        self.request(|reply| Command::BeginInteractive { reply })
            .await?
    }

    /// Expires contested-zone state. Returns how many entries were removed.
    pub async fn sweep_contested(&self) -> Result<usize> {
        self.request(|reply| Command::SweepContested { reply }).await
    }

    pub async fn tile_state(&self, x: i32, y: i32) -> Result<DiscoveryState> {
        self.request(|reply| Command::TileState { x, y, reply })
            .await?
    }

    pub async fn location_at(&self, x: i32, y: i32) -> Result<ZoneTag> {
        self.request(|reply| Command::LocationAt { x, y, reply })
            .await?
    }

    /// Marks a tile explored and returns its discovery state.
    pub async fn mark_explored(&self, x: i32, y: i32) -> Result<DiscoveryState> {
        self.request(|reply| Command::MarkExplored { x, y, reply })
            .await?
    }

    /// Moves a player one tile, spending one action point.
    pub async fn move_player(&self, player: PlayerId, direction: Direction) -> Result<Location> {
        self.request(|reply| Command::MovePlayer {
            player,
            direction,
            reply,
        })
        .await?
    }

    /// Clears exploration and re-rolls points of interest.
    ///
    /// Returns the point-of-interest tags that could not be placed.
    pub async fn reset_map(&self) -> Result<Vec<ZoneTag>> {
        self.request(|reply| Command::ResetMap { reply }).await?
    }

    /// Resets every player and the map, and restarts the world at day one.
    pub async fn reset_world(&self) -> Result<WorldState> {
        self.request(|reply| Command::ResetWorld { reply }).await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Phase` - Phase changes and world resets
    /// - `Topic::Combat` - Attack reports
    /// - `Topic::Map` - Exploration, map resets and contested-zone sweeps
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<WorldEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<WorldEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub(crate) async fn shutdown_worker(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
