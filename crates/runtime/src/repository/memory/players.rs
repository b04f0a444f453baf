//! In-memory PlayerStore implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use horde_core::{Condition, Location, Player, PlayerId, Status, VitalStatus, Zone};

use crate::repository::{PlayerStore, RepositoryError, Result};

/// In-memory implementation of [`PlayerStore`], keyed by player id.
pub struct InMemoryPlayerStore {
    players: RwLock<BTreeMap<PlayerId, Player>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with `players`.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let players = players.into_iter().map(|p| (p.id, p)).collect();
        Self {
            players: RwLock::new(players),
        }
    }

    /// Inserts or replaces a player record.
    pub fn insert(&self, player: Player) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players.insert(player.id, player);
        Ok(())
    }

    /// All players, dead or alive, ordered by id.
    pub fn all(&self) -> Result<Vec<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.values().cloned().collect())
    }

    fn modify<T>(&self, id: PlayerId, f: impl FnOnce(&mut Player) -> Result<T>) -> Result<T> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let player = players
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("player", id))?;
        f(player)
    }

    fn filtered(&self, predicate: impl Fn(&Player) -> bool) -> Result<Vec<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.values().filter(|p| predicate(p)).cloned().collect())
    }
}

impl Default for InMemoryPlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(&id).cloned())
    }

    async fn alive_players(&self) -> Result<Vec<Player>> {
        self.filtered(Player::is_alive)
    }

    async fn players_by_zone(&self, zone: Zone) -> Result<Vec<Player>> {
        self.filtered(|p| p.location.zone == zone)
    }

    async fn update_status(&self, id: PlayerId, status: VitalStatus) -> Result<()> {
        self.modify(id, |player| {
            player.vital = status;
            Ok(())
        })
    }

    async fn add_condition(&self, id: PlayerId, condition: Condition) -> Result<()> {
        self.modify(id, |player| {
            player.conditions.insert(condition);
            Ok(())
        })
    }

    async fn remove_condition(&self, id: PlayerId, condition: Condition) -> Result<()> {
        self.modify(id, |player| {
            player.remove_status(Status::from(condition));
            Ok(())
        })
    }

    async fn reset_action_points(&self, id: PlayerId) -> Result<()> {
        self.modify(id, |player| {
            player.restore_action_points();
            Ok(())
        })
    }

    async fn reset_all_players(&self) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        for player in players.values_mut() {
            player.vital = VitalStatus::Healthy;
            player.conditions.clear();
            player.location = Location::HOME;
            player.restore_action_points();
        }
        Ok(())
    }

    async fn update_location(&self, id: PlayerId, location: Location) -> Result<()> {
        self.modify(id, |player| {
            player.location = location;
            Ok(())
        })
    }

    async fn spend_action_points(&self, id: PlayerId, cost: u32) -> Result<()> {
        self.modify(id, |player| {
            let available = player.action_points;
            if player.spend_action_points(cost) {
                Ok(())
            } else {
                Err(RepositoryError::Unavailable(format!(
                    "player {id} has {available} action points, needs {cost}"
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use horde_core::{GridCoordinate, Wound};

    use super::*;

    fn store() -> InMemoryPlayerStore {
        InMemoryPlayerStore::with_players([
            Player::new(PlayerId(1), "ada", 6),
            Player::new(PlayerId(2), "bo", 6)
                .with_vital(VitalStatus::Dead)
                .with_location(Location::new(Zone::Waste, None)),
        ])
    }

    #[tokio::test]
    async fn alive_players_skips_the_dead() {
        let alive = store().alive_players().await.unwrap();
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].id, PlayerId(1));
    }

    #[tokio::test]
    async fn players_by_zone_filters_on_coarse_zone() {
        let store = store();
        let waste = store.players_by_zone(Zone::Waste).await.unwrap();
        assert_eq!(waste.len(), 1);
        assert_eq!(waste[0].id, PlayerId(2));
    }

    #[tokio::test]
    async fn removing_absent_condition_is_a_noop() {
        let store = store();
        store
            .remove_condition(PlayerId(1), Condition::Fed)
            .await
            .unwrap();
        let player = store.get_player(PlayerId(1)).await.unwrap().unwrap();
        assert!(player.conditions.is_empty());
    }

    #[tokio::test]
    async fn removing_condition_keeps_the_wound() {
        let store = store();
        store
            .update_status(PlayerId(1), VitalStatus::Wounded(Wound::Leg))
            .await
            .unwrap();
        store.add_condition(PlayerId(1), Condition::Fed).await.unwrap();
        store
            .remove_condition(PlayerId(1), Condition::Fed)
            .await
            .unwrap();
        let player = store.get_player(PlayerId(1)).await.unwrap().unwrap();
        assert_eq!(player.vital, VitalStatus::Wounded(Wound::Leg));
    }

    #[tokio::test]
    async fn removing_a_wound_condition_clears_the_vital_slot() {
        let store = store();
        store
            .update_status(PlayerId(1), VitalStatus::Wounded(Wound::Leg))
            .await
            .unwrap();
        store
            .remove_condition(PlayerId(1), Condition::Wounded(Wound::Leg))
            .await
            .unwrap();
        let player = store.get_player(PlayerId(1)).await.unwrap().unwrap();
        assert_eq!(player.vital, VitalStatus::Healthy);
        assert!(!player.is_wounded());
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let err = store()
            .update_status(PlayerId(9), VitalStatus::Dead)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: "player", .. }));
    }

    #[tokio::test]
    async fn spending_more_than_balance_fails_without_change() {
        let store = store();
        assert!(store.spend_action_points(PlayerId(1), 7).await.is_err());
        store.spend_action_points(PlayerId(1), 2).await.unwrap();
        let player = store.get_player(PlayerId(1)).await.unwrap().unwrap();
        assert_eq!(player.action_points, 4);
    }

    #[tokio::test]
    async fn reset_all_players_restores_defaults() {
        let store = store();
        store
            .update_location(
                PlayerId(1),
                Location::at(Zone::Waste, GridCoordinate::new(3, 4)),
            )
            .await
            .unwrap();
        store
            .add_condition(PlayerId(1), Condition::Infected)
            .await
            .unwrap();
        store.reset_all_players().await.unwrap();

        for player in store.all().unwrap() {
            assert!(player.is_alive());
            assert!(player.conditions.is_empty());
            assert_eq!(player.location, Location::HOME);
            assert_eq!(player.action_points, player.max_action_points);
        }
    }
}
