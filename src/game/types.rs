//! Core value types: terrain, tile positions, rotations and grid coordinates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Castle,
    Road,
    Monastery,
    Fields,
    /// Filler that can never be claimed, e.g. the village on a crossroads.
    Other,
}

impl TerrainType {
    /// Terrain kinds a meeple can be placed on, in scoreboard order.
    pub const CLAIMABLE: [TerrainType; 4] = [
        TerrainType::Castle,
        TerrainType::Road,
        TerrainType::Monastery,
        TerrainType::Fields,
    ];

    #[inline]
    pub fn is_claimable(self) -> bool {
        self != TerrainType::Other
    }

    /// Edge terrains connect only when equal, and `Other` connects to nothing.
    #[inline]
    pub fn matches(self, other: TerrainType) -> bool {
        self == other && self != TerrainType::Other
    }
}

/// One of the nine positions on a tile: four edges, four corners and the middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
    Middle,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::Middle,
    ];

    /// Cardinal edges in clockwise order starting at north.
    pub const EDGES: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Index into per-position arrays (`[T; 9]`), matching `ALL`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_edge(self) -> bool {
        self.index() < 4
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
            Direction::Middle => Direction::Middle,
        }
    }

    /// Grid offset of the cell lying in this direction. North is +y.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
            Direction::NorthWest => (-1, 1),
            Direction::Middle => (0, 0),
        }
    }

    /// Rotate clockwise. Edges and corners each cycle among themselves.
    pub fn rotate(self, rotation: Rotation) -> Direction {
        let steps = rotation.steps();
        let idx = self.index();
        match self {
            Direction::Middle => Direction::Middle,
            _ if self.is_edge() => Direction::EDGES[(idx + steps) % 4],
            _ => Direction::ALL[4 + (idx - 4 + steps) % 4],
        }
    }

    /// The two corners touching an edge. Empty for corners and the middle.
    pub fn flanking_corners(self) -> &'static [Direction] {
        match self {
            Direction::North => &[Direction::NorthWest, Direction::NorthEast],
            Direction::East => &[Direction::NorthEast, Direction::SouthEast],
            Direction::South => &[Direction::SouthEast, Direction::SouthWest],
            Direction::West => &[Direction::SouthWest, Direction::NorthWest],
            _ => &[],
        }
    }

    /// The corner of the neighbouring tile that touches this corner across `edge`.
    /// e.g. `NorthEast` across `East` is the neighbour's `NorthWest`.
    pub fn mirror_across(self, edge: Direction) -> Direction {
        let vertical = matches!(edge, Direction::North | Direction::South);
        match (self, vertical) {
            (Direction::NorthEast, true) => Direction::SouthEast,
            (Direction::SouthEast, true) => Direction::NorthEast,
            (Direction::SouthWest, true) => Direction::NorthWest,
            (Direction::NorthWest, true) => Direction::SouthWest,
            (Direction::NorthEast, false) => Direction::NorthWest,
            (Direction::NorthWest, false) => Direction::NorthEast,
            (Direction::SouthEast, false) => Direction::SouthWest,
            (Direction::SouthWest, false) => Direction::SouthEast,
            (other, _) => other,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
            Direction::NorthEast => "NE",
            Direction::SouthEast => "SE",
            Direction::SouthWest => "SW",
            Direction::NorthWest => "NW",
            Direction::Middle => "C",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Clockwise rotation of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[inline]
    pub fn steps(self) -> usize {
        self as usize
    }

    pub fn degrees(self) -> u32 {
        self.steps() as u32 * 90
    }

    pub fn from_degrees(degrees: u32) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn clockwise(self) -> Rotation {
        Rotation::ALL[(self.steps() + 1) % 4]
    }

    pub fn counter_clockwise(self) -> Rotation {
        Rotation::ALL[(self.steps() + 3) % 4]
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> u32 {
        rotation.degrees()
    }
}

impl TryFrom<u32> for Rotation {
    type Error = String;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees).ok_or_else(|| format!("Invalid rotation: {degrees}"))
    }
}

/// A cell on the unbounded grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// All 8 surrounding cells (for monastery completion).
    pub fn all_surrounding(self) -> impl Iterator<Item = Coord> {
        Direction::ALL
            .into_iter()
            .filter(|d| *d != Direction::Middle)
            .map(move |d| self.neighbor(d))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
