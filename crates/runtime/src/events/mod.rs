//! Topic-based event bus for world events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need.

mod bus;
mod notify;
mod types;

pub use bus::{EventBus, Topic};
pub use notify::TracingNotificationSink;
pub use types::WorldEvent;
