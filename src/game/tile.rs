//! A single tile instance, held in a hand or placed on the grid.

use serde::Serialize;

use super::patterns::PatternId;
use super::players::PlayerId;
use super::tiles::{layout, rotated_positions, SegmentDefinition, TileType};
use super::types::*;

/// A meeple sitting on one position of a placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileMeeple {
    pub owner: PlayerId,
    pub position: Direction,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    tile_type: TileType,
    rotation: Rotation,
    coord: Option<Coord>,
    meeple: Option<TileMeeple>,
    /// Pattern each segment currently belongs to. Empty until placed.
    #[serde(skip)]
    segment_patterns: Vec<Option<PatternId>>,
}

impl Tile {
    fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            rotation: Rotation::Deg0,
            coord: None,
            meeple: None,
            segment_patterns: Vec::new(),
        }
    }

    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn coord(&self) -> Option<Coord> {
        self.coord
    }

    pub fn is_placed(&self) -> bool {
        self.coord.is_some()
    }

    /// Set the rotation. Returns false once the tile is on the grid.
    pub fn set_rotation(&mut self, rotation: Rotation) -> bool {
        if self.is_placed() {
            return false;
        }
        self.rotation = rotation;
        true
    }

    pub fn rotate_right(&mut self) -> bool {
        self.set_rotation(self.rotation.clockwise())
    }

    pub fn rotate_left(&mut self) -> bool {
        self.set_rotation(self.rotation.counter_clockwise())
    }

    #[inline]
    pub fn terrain(&self, position: Direction) -> TerrainType {
        layout(self.tile_type, self.rotation).terrain[position.index()]
    }

    /// Terrain at all nine positions, indexed by `Direction::index`.
    pub fn terrains(&self) -> [TerrainType; 9] {
        layout(self.tile_type, self.rotation).terrain
    }

    /// Index of the segment covering a position, if it is claimable.
    #[inline]
    pub fn segment_at(&self, position: Direction) -> Option<usize> {
        layout(self.tile_type, self.rotation).segment_at[position.index()].map(usize::from)
    }

    pub fn segment_count(&self) -> usize {
        self.tile_type.definition().segments.len()
    }

    pub fn segment(&self, index: usize) -> &'static SegmentDefinition {
        &self.tile_type.definition().segments[index]
    }

    /// Rotated positions covered by a segment.
    pub fn segment_positions(&self, index: usize) -> impl Iterator<Item = Direction> {
        rotated_positions(self.tile_type, self.rotation, index)
    }

    pub fn is_claimable(&self, position: Direction) -> bool {
        self.segment_at(position).is_some()
    }

    pub fn meeple(&self) -> Option<TileMeeple> {
        self.meeple
    }

    /// Owner of the meeple on a given position, if any.
    pub fn marker_owner(&self, position: Direction) -> Option<PlayerId> {
        self.meeple
            .filter(|m| m.position == position)
            .map(|m| m.owner)
    }

    pub fn has_meeple(&self) -> bool {
        self.meeple.is_some()
    }

    /// Pattern of the segment covering `position`. `None` until placed or if unclaimable.
    pub fn pattern_at(&self, position: Direction) -> Option<PatternId> {
        let segment = self.segment_at(position)?;
        self.pattern_of_segment(segment)
    }

    pub fn pattern_of_segment(&self, segment: usize) -> Option<PatternId> {
        self.segment_patterns.get(segment).copied().flatten()
    }

    /// Distinct patterns touched by this tile.
    pub fn patterns(&self) -> Vec<PatternId> {
        let mut ids: Vec<PatternId> = Vec::with_capacity(self.segment_patterns.len());
        for id in self.segment_patterns.iter().flatten() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    pub(crate) fn mark_placed(&mut self, coord: Coord) {
        self.coord = Some(coord);
        self.segment_patterns = vec![None; self.segment_count()];
    }

    pub(crate) fn set_segment_pattern(&mut self, segment: usize, pattern: PatternId) {
        self.segment_patterns[segment] = Some(pattern);
    }

    pub(crate) fn set_meeple(&mut self, meeple: TileMeeple) {
        assert!(self.meeple.is_none(), "tile already carries a meeple");
        self.meeple = Some(meeple);
    }

    pub(crate) fn clear_meeple(&mut self) -> Option<TileMeeple> {
        self.meeple.take()
    }
}

/// Creates tiles from the catalog.
pub struct TileFactory;

impl TileFactory {
    pub fn create_tile(tile_type: TileType) -> Tile {
        Tile::new(tile_type)
    }

    /// Placeholder used when a caller needs a tile but none was requested.
    pub fn default_tile() -> Tile {
        Tile::new(super::tiles::STARTING_TILE)
    }
}
