//! Complete tile catalog for the base game (24 types, 72 tiles).
//!
//! Every tile type is a list of segments. A segment is one connected piece of
//! a single terrain and lists the positions it covers at rotation 0 (north
//! up). Positions not covered by any segment are `TerrainType::Other`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::types::*;

use Direction::{
    East as E, Middle as C, North as N, NorthEast as NE, NorthWest as NW, South as S,
    SouthEast as SE, SouthWest as SW, West as W,
};
use TerrainType::{Castle, Fields, Monastery, Road};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    A, B, C, D, E, F, G, H, I, J, K, L,
    M, N, O, P, Q, R, S, T, U, V, W, X,
}

impl TileType {
    pub const ALL: [TileType; 24] = [
        TileType::A, TileType::B, TileType::C, TileType::D, TileType::E, TileType::F,
        TileType::G, TileType::H, TileType::I, TileType::J, TileType::K, TileType::L,
        TileType::M, TileType::N, TileType::O, TileType::P, TileType::Q, TileType::R,
        TileType::S, TileType::T, TileType::U, TileType::V, TileType::W, TileType::X,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn from_letter(letter: char) -> Option<TileType> {
        let upper = letter.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        TileType::ALL.get((upper as u8 - b'A') as usize).copied()
    }

    pub fn definition(self) -> &'static TileDefinition {
        &TILE_CATALOG[self.index()]
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone)]
pub struct SegmentDefinition {
    pub terrain: TerrainType,
    /// Positions covered at rotation 0.
    pub positions: Vec<Direction>,
    pub shield: bool,
    /// For fields: indices of castle segments on the same tile this field touches.
    pub adjacent_castles: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct TileDefinition {
    pub tile_type: TileType,
    pub description: &'static str,
    pub segments: Vec<SegmentDefinition>,
    pub count: u32,
}

/// Position lookups for one tile type at one rotation.
#[derive(Debug, Clone)]
pub struct RotatedLayout {
    pub terrain: [TerrainType; 9],
    pub segment_at: [Option<u8>; 9],
}

fn seg(terrain: TerrainType, positions: &[Direction]) -> SegmentDefinition {
    SegmentDefinition {
        terrain,
        positions: positions.to_vec(),
        shield: false,
        adjacent_castles: vec![],
    }
}

fn seg_shield(terrain: TerrainType, positions: &[Direction]) -> SegmentDefinition {
    SegmentDefinition {
        shield: true,
        ..seg(terrain, positions)
    }
}

fn field(positions: &[Direction], adjacent_castles: &[usize]) -> SegmentDefinition {
    SegmentDefinition {
        adjacent_castles: adjacent_castles.to_vec(),
        ..seg(Fields, positions)
    }
}

fn tile(
    tile_type: TileType,
    description: &'static str,
    count: u32,
    segments: Vec<SegmentDefinition>,
) -> TileDefinition {
    TileDefinition {
        tile_type,
        description,
        segments,
        count,
    }
}

pub static TILE_CATALOG: Lazy<Vec<TileDefinition>> = Lazy::new(|| {
    vec![
        tile(TileType::A, "monastery with road south", 2, vec![
            seg(Monastery, &[C]),
            seg(Road, &[S]),
            field(&[N, E, W, NE, SE, SW, NW], &[]),
        ]),
        tile(TileType::B, "monastery", 4, vec![
            seg(Monastery, &[C]),
            field(&[N, E, S, W, NE, SE, SW, NW], &[]),
        ]),
        tile(TileType::C, "castle on all sides with shield", 1, vec![
            seg_shield(Castle, &[N, E, S, W, NE, SE, SW, NW, C]),
        ]),
        tile(TileType::D, "castle north, straight road east-west", 4, vec![
            seg(Castle, &[N]),
            seg(Road, &[E, W, C]),
            field(&[NE, NW], &[0]),
            field(&[S, SE, SW], &[]),
        ]),
        tile(TileType::E, "castle north", 5, vec![
            seg(Castle, &[N]),
            field(&[E, S, W, NE, SE, SW, NW, C], &[0]),
        ]),
        tile(TileType::F, "castle east-west with shield", 2, vec![
            seg_shield(Castle, &[E, W, C]),
            field(&[N, NE, NW], &[0]),
            field(&[S, SE, SW], &[0]),
        ]),
        tile(TileType::G, "castle north-south", 1, vec![
            seg(Castle, &[N, S, C]),
            field(&[E, NE, SE], &[0]),
            field(&[W, NW, SW], &[0]),
        ]),
        tile(TileType::H, "separate castles north and south", 3, vec![
            seg(Castle, &[N]),
            seg(Castle, &[S]),
            field(&[E, W, NE, SE, SW, NW, C], &[0, 1]),
        ]),
        tile(TileType::I, "separate castles north and west", 2, vec![
            seg(Castle, &[N]),
            seg(Castle, &[W]),
            field(&[E, S, NE, SE, SW, NW, C], &[0, 1]),
        ]),
        tile(TileType::J, "castle north, road curve east-south", 3, vec![
            seg(Castle, &[N]),
            seg(Road, &[E, S]),
            field(&[W, NE, SW, NW, C], &[0]),
            field(&[SE], &[]),
        ]),
        tile(TileType::K, "castle north, road curve south-west", 3, vec![
            seg(Castle, &[N]),
            seg(Road, &[S, W]),
            field(&[E, NE, SE, NW, C], &[0]),
            field(&[SW], &[]),
        ]),
        tile(TileType::L, "castle north, road junction east-south-west", 3, vec![
            seg(Castle, &[N]),
            seg(Road, &[E]),
            seg(Road, &[S]),
            seg(Road, &[W]),
            field(&[NE, NW], &[0]),
            field(&[SE], &[]),
            field(&[SW], &[]),
        ]),
        tile(TileType::M, "castle north-west with shield", 2, vec![
            seg_shield(Castle, &[N, W, NW]),
            field(&[E, S, NE, SE, SW, C], &[0]),
        ]),
        tile(TileType::N, "castle north-west", 3, vec![
            seg(Castle, &[N, W, NW]),
            field(&[E, S, NE, SE, SW, C], &[0]),
        ]),
        tile(TileType::O, "castle north-west with shield, road curve east-south", 2, vec![
            seg_shield(Castle, &[N, W, NW]),
            seg(Road, &[E, S]),
            field(&[NE, SW, C], &[0]),
            field(&[SE], &[]),
        ]),
        tile(TileType::P, "castle north-west, road curve east-south", 3, vec![
            seg(Castle, &[N, W, NW]),
            seg(Road, &[E, S]),
            field(&[NE, SW, C], &[0]),
            field(&[SE], &[]),
        ]),
        tile(TileType::Q, "castle north-east-west with shield", 2, vec![
            seg_shield(Castle, &[N, E, W, NE, NW, C]),
            field(&[S, SE, SW], &[0]),
        ]),
        tile(TileType::R, "castle north-east-west with shield, road south", 2, vec![
            seg_shield(Castle, &[N, E, W, NE, NW, C]),
            seg(Road, &[S]),
            field(&[SW], &[0]),
            field(&[SE], &[0]),
        ]),
        tile(TileType::S, "castle north-east-west", 2, vec![
            seg(Castle, &[N, E, W, NE, NW, C]),
            field(&[S, SE, SW], &[0]),
        ]),
        tile(TileType::T, "castle north-east-west, road south", 1, vec![
            seg(Castle, &[N, E, W, NE, NW, C]),
            seg(Road, &[S]),
            field(&[SW], &[0]),
            field(&[SE], &[0]),
        ]),
        tile(TileType::U, "straight road north-south", 8, vec![
            seg(Road, &[N, S, C]),
            field(&[E, NE, SE], &[]),
            field(&[W, NW, SW], &[]),
        ]),
        tile(TileType::V, "road curve south-west", 9, vec![
            seg(Road, &[S, W]),
            field(&[N, E, NE, SE, NW, C], &[]),
            field(&[SW], &[]),
        ]),
        tile(TileType::W, "road junction north-south-west", 4, vec![
            seg(Road, &[N]),
            seg(Road, &[S]),
            seg(Road, &[W]),
            field(&[E, NE, SE], &[]),
            field(&[NW], &[]),
            field(&[SW], &[]),
        ]),
        tile(TileType::X, "crossroads", 1, vec![
            seg(Road, &[N]),
            seg(Road, &[E]),
            seg(Road, &[S]),
            seg(Road, &[W]),
            field(&[NE], &[]),
            field(&[SE], &[]),
            field(&[SW], &[]),
            field(&[NW], &[]),
        ]),
    ]
});

/// Pre-computed lookup tables: `[tile_type][rotation_steps]`.
pub static ROTATED_LAYOUTS: Lazy<Vec<[RotatedLayout; 4]>> = Lazy::new(|| {
    TILE_CATALOG
        .iter()
        .map(|def| std::array::from_fn(|steps| build_layout(def, Rotation::ALL[steps])))
        .collect()
});

fn build_layout(def: &TileDefinition, rotation: Rotation) -> RotatedLayout {
    let mut terrain = [TerrainType::Other; 9];
    let mut segment_at = [None; 9];
    for (idx, segment) in def.segments.iter().enumerate() {
        for position in &segment.positions {
            let rotated = position.rotate(rotation).index();
            terrain[rotated] = segment.terrain;
            segment_at[rotated] = Some(idx as u8);
        }
    }
    RotatedLayout { terrain, segment_at }
}

/// Zero-allocation layout lookup.
#[inline]
pub fn layout(tile_type: TileType, rotation: Rotation) -> &'static RotatedLayout {
    &ROTATED_LAYOUTS[tile_type.index()][rotation.steps()]
}

/// Positions covered by a segment once the tile is rotated.
pub fn rotated_positions(
    tile_type: TileType,
    rotation: Rotation,
    segment: usize,
) -> impl Iterator<Item = Direction> {
    tile_type.definition().segments[segment]
        .positions
        .iter()
        .map(move |p| p.rotate(rotation))
}

pub const STARTING_TILE: TileType = TileType::D;

/// Build the draw stack in catalog order. Excludes one copy of the starting tile.
pub fn build_tile_stack() -> Vec<TileType> {
    let mut stack = Vec::with_capacity(71);
    for def in TILE_CATALOG.iter() {
        let count = if def.tile_type == STARTING_TILE {
            def.count - 1
        } else {
            def.count
        };
        stack.extend(std::iter::repeat(def.tile_type).take(count as usize));
    }
    stack
}

/// Total number of tiles in the base game.
pub fn tile_total() -> u32 {
    TILE_CATALOG.iter().map(|t| t.count).sum()
}
