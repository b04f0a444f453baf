//! In-memory stand-ins for the hostile-presence service and notification sink.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use horde_core::{GridCoordinate, HordeAttackReport};

use crate::repository::{HostilePresence, NotificationSink, RepositoryError, Result};

#[derive(Debug, Default)]
struct HostileState {
    growth_steps: u32,
    generation: u32,
    contested: BTreeMap<GridCoordinate, DateTime<Utc>>,
}

/// Tracks hostile presence as counters plus a set of contested tiles with
/// expiry times.
#[derive(Default)]
pub struct InMemoryHostilePresence {
    state: RwLock<HostileState>,
}

impl InMemoryHostilePresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a tile contested until `expires_at`.
    pub fn contest(&self, coordinate: GridCoordinate, expires_at: DateTime<Utc>) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        state.contested.insert(coordinate, expires_at);
        Ok(())
    }

    pub fn contested_count(&self) -> usize {
        self.state
            .read()
            .map(|state| state.contested.len())
            .unwrap_or(0)
    }

    /// Growth steps applied since the last world initialization.
    pub fn growth_steps(&self) -> u32 {
        self.state.read().map(|state| state.growth_steps).unwrap_or(0)
    }

    /// How many times the presence was initialized for a new world.
    pub fn generation(&self) -> u32 {
        self.state.read().map(|state| state.generation).unwrap_or(0)
    }
}

#[async_trait]
impl HostilePresence for InMemoryHostilePresence {
    async fn grow_after_attack(&self) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        state.growth_steps = state.growth_steps.saturating_add(1);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        state.growth_steps = 0;
        state.contested.clear();
        Ok(())
    }

    async fn initialize_for_new_world(&self) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        state.generation = state.generation.saturating_add(1);
        Ok(())
    }

    async fn expire_contested(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let before = state.contested.len();
        state.contested.retain(|_, expires_at| *expires_at > now);
        Ok(before - state.contested.len())
    }
}

/// Notification sink that keeps every delivered report.
#[derive(Default)]
pub struct RecordingNotificationSink {
    reports: RwLock<Vec<HordeAttackReport>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<HordeAttackReport> {
        self.reports
            .read()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, report: &HordeAttackReport) -> Result<()> {
        let mut reports = self
            .reports
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        reports.push(report.clone());
        Ok(())
    }
}
