//! Board logic: tile placement validation, open positions and pattern access.

use std::collections::{BTreeSet, HashMap};

use super::patterns::{GridPattern, PatternId, PatternTracker};
use super::tile::Tile;
use super::types::*;

/// The sparse, unbounded board.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    tiles: HashMap<Coord, Tile>,
    tracker: PatternTracker,
    /// Placement order, for replays and deterministic iteration.
    placed: Vec<Coord>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Placed tiles in placement order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.placed.iter().map(move |c| &self.tiles[c])
    }

    /// The tile lying in `direction` from `coord`. Corners give diagonal cells.
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> Option<&Tile> {
        self.tiles.get(&coord.neighbor(direction))
    }

    /// Check if a tile can be placed at the given position with its current rotation.
    ///
    /// Rules:
    /// 1. Position must be empty
    /// 2. The first tile goes to the origin; later ones need an occupied cardinal neighbour
    /// 3. All edges touching adjacent tiles must match
    pub fn can_place(&self, tile: &Tile, coord: Coord) -> bool {
        if tile.is_placed() || self.tiles.contains_key(&coord) {
            return false;
        }
        if self.tiles.is_empty() {
            return coord == Coord::ORIGIN;
        }

        let mut has_neighbor = false;
        for edge in Direction::EDGES {
            let Some(neighbor) = self.neighbor(coord, edge) else {
                continue;
            };
            has_neighbor = true;
            if !tile.terrain(edge).matches(neighbor.terrain(edge.opposite())) {
                return false;
            }
        }
        has_neighbor
    }

    /// Place a tile. On failure the tile is handed back and nothing changes.
    /// On success returns the patterns this placement completed.
    pub fn place(&mut self, mut tile: Tile, coord: Coord) -> Result<Vec<PatternId>, Tile> {
        if !self.can_place(&tile, coord) {
            tracing::trace!(tile = %tile.tile_type(), %coord, "placement rejected");
            return Err(tile);
        }

        tile.mark_placed(coord);
        tracing::debug!(
            tile = %tile.tile_type(),
            %coord,
            rotation = tile.rotation().degrees(),
            "tile placed"
        );
        self.tiles.insert(coord, tile);
        self.placed.push(coord);
        Ok(self.tracker.integrate(&mut self.tiles, coord))
    }

    /// Empty positions adjacent to placed tiles, sorted.
    pub fn open_positions(&self) -> Vec<Coord> {
        if self.tiles.is_empty() {
            return vec![Coord::ORIGIN];
        }
        let mut open: BTreeSet<Coord> = BTreeSet::new();
        for &coord in self.tiles.keys() {
            for edge in Direction::EDGES {
                let neighbor = coord.neighbor(edge);
                if !self.tiles.contains_key(&neighbor) {
                    open.insert(neighbor);
                }
            }
        }
        open.into_iter().collect()
    }

    /// Every (position, rotation) where this tile type fits. The tile's own
    /// rotation is ignored.
    pub fn valid_placements(&self, tile: &Tile) -> Vec<(Coord, Rotation)> {
        let mut probe = tile.clone();
        let mut placements = Vec::new();
        for coord in self.open_positions() {
            for rotation in Rotation::ALL {
                probe.set_rotation(rotation);
                if self.can_place(&probe, coord) {
                    placements.push((coord, rotation));
                }
            }
        }
        placements
    }

    /// Check if a tile fits anywhere in any rotation.
    pub fn has_valid_placement(&self, tile: &Tile) -> bool {
        let mut probe = tile.clone();
        self.open_positions().into_iter().any(|coord| {
            Rotation::ALL.into_iter().any(|rotation| {
                probe.set_rotation(rotation);
                self.can_place(&probe, coord)
            })
        })
    }

    pub fn patterns(&self) -> &PatternTracker {
        &self.tracker
    }

    /// Live patterns, used for end-of-game force closure.
    pub fn all_patterns(&self) -> Vec<PatternId> {
        self.tracker.iter().map(|(id, _)| id).collect()
    }

    pub fn pattern(&self, id: PatternId) -> Option<&GridPattern> {
        self.tracker.get(id)
    }

    /// Pattern covering a position of the tile at `coord`.
    pub fn pattern_at(&self, coord: Coord, position: Direction) -> Option<PatternId> {
        self.tiles.get(&coord)?.pattern_at(position)
    }

    /// Patterns completed since the last call.
    pub fn take_completed(&mut self) -> Vec<PatternId> {
        self.tracker.take_completed()
    }

    pub fn force_close(&mut self, id: PatternId) {
        self.tracker.force_close(id);
    }

    pub(crate) fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub(crate) fn pattern_mut(&mut self, id: PatternId) -> Option<&mut GridPattern> {
        self.tracker.get_mut(id)
    }
}
