//! In-memory SettlementStore implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use horde_core::{Building, Settlement, SettlementId};

use crate::repository::{RepositoryError, Result, SettlementStore};

/// In-memory implementation of [`SettlementStore`].
///
/// The settlement with the lowest id is the default one.
pub struct InMemorySettlementStore {
    settlements: RwLock<BTreeMap<SettlementId, Settlement>>,
}

impl InMemorySettlementStore {
    pub fn new() -> Self {
        Self {
            settlements: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_settlement(settlement: Settlement) -> Self {
        let store = Self::new();
        if let Ok(mut settlements) = store.settlements.write() {
            settlements.insert(settlement.id, settlement);
        }
        store
    }

    pub fn insert(&self, settlement: Settlement) -> Result<()> {
        let mut settlements = self
            .settlements
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        settlements.insert(settlement.id, settlement);
        Ok(())
    }

    pub fn get(&self, id: SettlementId) -> Result<Option<Settlement>> {
        let settlements = self
            .settlements
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(settlements.get(&id).cloned())
    }

    fn modify<T>(&self, id: SettlementId, f: impl FnOnce(&mut Settlement) -> T) -> Result<T> {
        let mut settlements = self
            .settlements
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let settlement = settlements
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("settlement", id))?;
        Ok(f(settlement))
    }
}

impl Default for InMemorySettlementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementStore for InMemorySettlementStore {
    async fn default_settlement(&self) -> Result<Option<Settlement>> {
        let settlements = self
            .settlements
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(settlements.values().next().cloned())
    }

    async fn advance_day(&self, id: SettlementId) -> Result<u32> {
        self.modify(id, |settlement| {
            settlement.day = settlement.day.saturating_add(1);
            settlement.day
        })
    }

    async fn update_defense_total(&self, id: SettlementId, total: u32) -> Result<()> {
        self.modify(id, |settlement| settlement.defense_total = total)
    }

    async fn buildings(&self, id: SettlementId) -> Result<Vec<Building>> {
        self.modify(id, |settlement| settlement.buildings.clone())
    }

    async fn update_population(&self, id: SettlementId, population: u32) -> Result<()> {
        self.modify(id, |settlement| settlement.population = population)
    }
}
