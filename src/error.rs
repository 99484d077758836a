//! Error types returned across the library boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::players::PlayerId;
use crate::game::types::{Coord, Direction, Rotation};

/// Marker pool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeepleError {
    #[error("{player} has no free meeples")]
    NoFreeMeeples { player: PlayerId },
}

/// Reasons a turn is rejected. A rejected turn changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("the round is already over")]
    RoundOver,

    #[error("hand index {index} out of range (hand holds {hand_len} tiles)")]
    NoSuchTile { index: usize, hand_len: usize },

    #[error("tile cannot be placed at {coord} with rotation {}", rotation.degrees())]
    InvalidPlacement { coord: Coord, rotation: Rotation },

    #[error("position {position} is not claimable on this tile")]
    UnclaimablePosition { position: Direction },

    #[error("the pattern at {position} is already claimed")]
    PatternClaimed { position: Direction },

    #[error(transparent)]
    Meeple(#[from] MeepleError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Anything that can stop a headless game.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}
