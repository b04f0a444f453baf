//! Partially revealed exploration map.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use super::{DiscoveryState, GridCoordinate, ZoneTag};
use crate::error::GridError;

/// Square exploration grid with a fixed settlement center.
///
/// Holds the in-memory discovery state and the point-of-interest placement of
/// one world generation. Persistence of explored tiles is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    size: u32,
    center: GridCoordinate,
    points_of_interest: BTreeMap<GridCoordinate, ZoneTag>,
    explored: BTreeSet<GridCoordinate>,
}

impl GridMap {
    /// Creates a map with the initial explored neighborhood and no points of interest.
    ///
    /// `size` must be at least 3 (see [`crate::WorldRules::validate`]).
    pub fn new(size: u32) -> Self {
        let half = (size / 2) as i32;
        let mut map = Self {
            size,
            center: GridCoordinate::new(half, half),
            points_of_interest: BTreeMap::new(),
            explored: BTreeSet::new(),
        };
        map.seed_explored();
        map
    }

    /// Creates a map and rolls point-of-interest placement.
    ///
    /// Returns the map and the tags that could not be placed.
    pub fn generate<R: Rng + ?Sized>(
        size: u32,
        tags: &[ZoneTag],
        attempts: u32,
        rng: &mut R,
    ) -> (Self, Vec<ZoneTag>) {
        let mut map = Self::new(size);
        let unplaced = map.place_points_of_interest(tags, attempts, rng);
        (map, unplaced)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn center(&self) -> GridCoordinate {
        self.center
    }

    pub fn is_valid_coordinate(&self, x: i32, y: i32) -> bool {
        let size = self.size as i32;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        self.is_valid_coordinate(coordinate.x, coordinate.y)
    }

    /// Returns the validated coordinate or [`GridError::OutOfBounds`].
    pub fn coordinate(&self, x: i32, y: i32) -> Result<GridCoordinate, GridError> {
        if self.is_valid_coordinate(x, y) {
            Ok(GridCoordinate::new(x, y))
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                size: self.size,
            })
        }
    }

    /// Zone type of a tile: the gate at the center, a point of interest if one
    /// was assigned, wasteland otherwise.
    pub fn location_at(&self, x: i32, y: i32) -> Result<ZoneTag, GridError> {
        let coordinate = self.coordinate(x, y)?;
        if coordinate == self.center {
            return Ok(ZoneTag::Gate);
        }
        Ok(self
            .points_of_interest
            .get(&coordinate)
            .copied()
            .unwrap_or(ZoneTag::Waste))
    }

    pub fn tile_state(&self, x: i32, y: i32) -> Result<DiscoveryState, GridError> {
        let coordinate = self.coordinate(x, y)?;
        if coordinate == self.center {
            return Ok(DiscoveryState::Town);
        }
        if !self.explored.contains(&coordinate) {
            return Ok(DiscoveryState::Hidden);
        }
        Ok(match self.points_of_interest.get(&coordinate) {
            Some(&tag) => DiscoveryState::PointOfInterest(tag),
            None => DiscoveryState::Explored,
        })
    }

    /// Marks a tile explored. Returns whether the tile was hidden before.
    pub fn mark_explored(&mut self, x: i32, y: i32) -> Result<bool, GridError> {
        let coordinate = self.coordinate(x, y)?;
        Ok(self.explored.insert(coordinate))
    }

    pub fn is_explored(&self, coordinate: GridCoordinate) -> bool {
        self.explored.contains(&coordinate)
    }

    /// Rehydrates persisted discovery state. Out-of-bounds entries are skipped
    /// and returned so the caller can report them.
    pub fn restore_explored(
        &mut self,
        tiles: impl IntoIterator<Item = GridCoordinate>,
    ) -> Vec<GridCoordinate> {
        let mut rejected = Vec::new();
        for tile in tiles {
            if self.contains(tile) {
                self.explored.insert(tile);
            } else {
                rejected.push(tile);
            }
        }
        rejected
    }

    /// Clears discovery back to the initial neighborhood and re-rolls points of interest.
    ///
    /// Returns the tags that could not be placed.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        tags: &[ZoneTag],
        attempts: u32,
        rng: &mut R,
    ) -> Vec<ZoneTag> {
        self.explored.clear();
        self.seed_explored();
        self.points_of_interest.clear();
        self.place_points_of_interest(tags, attempts, rng)
    }

    pub fn explored(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.explored.iter().copied()
    }

    pub fn points_of_interest(&self) -> impl Iterator<Item = (GridCoordinate, ZoneTag)> + '_ {
        self.points_of_interest.iter().map(|(&c, &t)| (c, t))
    }

    /// Center plus its 8 neighbors.
    pub fn initial_neighborhood(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dy| GridCoordinate::new(self.center.x + dx, self.center.y + dy))
        })
    }

    fn seed_explored(&mut self) {
        let seed: Vec<_> = self.initial_neighborhood().collect();
        self.explored.extend(seed);
    }

    fn place_points_of_interest<R: Rng + ?Sized>(
        &mut self,
        tags: &[ZoneTag],
        attempts: u32,
        rng: &mut R,
    ) -> Vec<ZoneTag> {
        let size = self.size as i32;
        let mut unplaced = Vec::new();

        for &tag in tags {
            let spot = (0..attempts)
                .map(|_| GridCoordinate::new(rng.gen_range(0..size), rng.gen_range(0..size)))
                .find(|&candidate| {
                    candidate.chebyshev_distance(self.center) > 1
                        && !self.points_of_interest.contains_key(&candidate)
                });

            match spot {
                Some(coordinate) => {
                    self.points_of_interest.insert(coordinate, tag);
                }
                None => unplaced.push(tag),
            }
        }
        unplaced
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn generated(seed: u64) -> GridMap {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (map, unplaced) = GridMap::generate(15, &ZoneTag::POINTS_OF_INTEREST, 100, &mut rng);
        assert!(unplaced.is_empty());
        map
    }

    fn every_tile(map: &GridMap) -> impl Iterator<Item = (i32, i32)> {
        let size = map.size() as i32;
        (0..size).flat_map(move |x| (0..size).map(move |y| (x, y)))
    }

    #[test]
    fn town_only_at_center() {
        let mut map = generated(1);
        let center = map.center();
        map.mark_explored(0, 0).unwrap();
        map.mark_explored(center.x, center.y).unwrap();

        for (x, y) in every_tile(&map) {
            let is_town = map.tile_state(x, y).unwrap() == DiscoveryState::Town;
            assert_eq!(is_town, (x, y) == (center.x, center.y));
        }
    }

    #[test]
    fn out_of_bounds_is_rejected_not_clamped() {
        let mut map = GridMap::new(5);
        assert_eq!(
            map.tile_state(5, 0),
            Err(GridError::OutOfBounds { x: 5, y: 0, size: 5 })
        );
        assert!(map.location_at(-1, 2).is_err());
        assert!(map.mark_explored(0, 9).is_err());
        assert!(!map.is_valid_coordinate(-1, 0));
        assert!(map.is_valid_coordinate(4, 4));
    }

    #[test]
    fn mark_explored_is_idempotent_and_keeps_poi_tag() {
        let mut map = generated(7);
        let (poi, tag) = map.points_of_interest().next().unwrap();

        assert_eq!(map.tile_state(poi.x, poi.y), Ok(DiscoveryState::Hidden));
        assert_eq!(map.mark_explored(poi.x, poi.y), Ok(true));
        let once = map.tile_state(poi.x, poi.y).unwrap();
        assert_eq!(map.mark_explored(poi.x, poi.y), Ok(false));
        let twice = map.tile_state(poi.x, poi.y).unwrap();

        assert_eq!(once, DiscoveryState::PointOfInterest(tag));
        assert_eq!(once, twice);
    }

    #[test]
    fn location_reports_gate_poi_and_waste() {
        let map = generated(3);
        let center = map.center();
        assert_eq!(map.location_at(center.x, center.y), Ok(ZoneTag::Gate));

        for (poi, tag) in map.points_of_interest() {
            assert_eq!(map.location_at(poi.x, poi.y), Ok(tag));
        }
        let plain = every_tile(&map)
            .map(GridCoordinate::from)
            .find(|c| *c != center && map.points_of_interest().all(|(poi, _)| poi != *c))
            .unwrap();
        assert_eq!(map.location_at(plain.x, plain.y), Ok(ZoneTag::Waste));
    }

    #[test]
    fn points_of_interest_avoid_center_and_each_other() {
        for seed in 0..20 {
            let map = generated(seed);
            let placed: Vec<_> = map.points_of_interest().collect();
            assert_eq!(placed.len(), ZoneTag::POINTS_OF_INTEREST.len());
            for (coordinate, _) in placed {
                assert!(coordinate.chebyshev_distance(map.center()) > 1);
            }
        }
    }

    #[test]
    fn reset_restores_initial_neighborhood() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut map = generated(11);
        map.mark_explored(0, 0).unwrap();
        map.mark_explored(14, 14).unwrap();

        map.reset(&ZoneTag::POINTS_OF_INTEREST, 100, &mut rng);

        let center = map.center();
        for coordinate in map.initial_neighborhood().collect::<Vec<_>>() {
            let expected = if coordinate == center {
                DiscoveryState::Town
            } else {
                DiscoveryState::Explored
            };
            assert_eq!(map.tile_state(coordinate.x, coordinate.y), Ok(expected));
        }
        assert_eq!(map.tile_state(0, 0), Ok(DiscoveryState::Hidden));
        assert_eq!(map.tile_state(14, 14), Ok(DiscoveryState::Hidden));
        assert_eq!(map.explored().count(), 9);
    }

    #[test]
    fn crowded_grid_drops_unplaceable_tags() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // A 3x3 grid is entirely the initial neighborhood.
        let (map, unplaced) =
            GridMap::generate(3, &[ZoneTag::Factory, ZoneTag::Bunker], 50, &mut rng);
        assert_eq!(map.points_of_interest().count(), 0);
        assert_eq!(unplaced, vec![ZoneTag::Factory, ZoneTag::Bunker]);
    }

    #[test]
    fn restore_skips_foreign_tiles() {
        let mut map = GridMap::new(5);
        let rejected = map.restore_explored([GridCoordinate::new(0, 0), GridCoordinate::new(7, 7)]);
        assert_eq!(rejected, vec![GridCoordinate::new(7, 7)]);
        assert!(map.is_explored(GridCoordinate::new(0, 0)));
    }
}
