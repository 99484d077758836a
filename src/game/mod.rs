//! Rules of the tile-placement game: tiles, grid, patterns, scoring and turns.

pub mod board;
pub mod meeples;
pub mod patterns;
pub mod players;
pub mod round;
pub mod scoring;
pub mod tile;
pub mod tiles;
pub mod types;

pub use board::Grid;
pub use patterns::{GridPattern, PatternId, PatternStatus};
pub use players::{Player, PlayerId};
pub use round::Round;
pub use tile::{Tile, TileFactory};
pub use tiles::TileType;
pub use types::{Coord, Direction, Rotation, TerrainType};
