//! Exploration grid: coordinates, zone tags, and discovery state.
//!
//! The grid is a fixed-size square with an immutable settlement center. Tiles
//! move from hidden to explored exactly once; a full reset re-seeds the center
//! and its 8 neighbors and re-rolls point-of-interest placement.

mod coord;
mod map;
mod zone;

pub use coord::{Direction, GridCoordinate};
pub use map::GridMap;
pub use zone::{DiscoveryState, ZoneTag};
