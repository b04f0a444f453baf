//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::WorldEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Phase transitions and world resets
    Phase,
    /// Horde attack reports
    Combat,
    /// Exploration and map changes
    Map,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Phase, Topic::Combat, Topic::Map];
}

impl WorldEvent {
    pub fn topic(&self) -> Topic {
        match self {
            WorldEvent::PhaseChanged { .. } | WorldEvent::WorldReset { .. } => Topic::Phase,
            WorldEvent::AttackResolved(_) => Topic::Combat,
            WorldEvent::TileExplored { .. }
            | WorldEvent::MapReset { .. }
            | WorldEvent::ContestedSwept { .. } => Topic::Map,
        }
    }
}

struct Channels {
    phase: broadcast::Sender<WorldEvent>,
    combat: broadcast::Sender<WorldEvent>,
    map: broadcast::Sender<WorldEvent>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<WorldEvent> {
        match topic {
            Topic::Phase => &self.phase,
            Topic::Combat => &self.combat,
            Topic::Map => &self.map,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Publishing is
/// best-effort: an event with no subscribers is dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                phase: broadcast::channel(capacity).0,
                combat: broadcast::channel(capacity).0,
                map: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: WorldEvent) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<WorldEvent> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<WorldEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
