//! Event log and result types produced by a round.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::players::PlayerId;
use crate::game::tiles::TileType;
use crate::game::types::{Coord, Direction, Rotation, TerrainType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        players: usize,
        stack_size: usize,
        seed: u64,
    },
    TilePlaced {
        player: PlayerId,
        tile_type: TileType,
        coord: Coord,
        rotation: Rotation,
    },
    MeeplePlaced {
        player: PlayerId,
        coord: Coord,
        position: Direction,
        terrain: TerrainType,
    },
    PatternCompleted {
        terrain: TerrainType,
        tiles: usize,
    },
    PointsScored {
        player: PlayerId,
        points: u32,
        terrain: TerrainType,
        /// Scored by the end-of-game pass.
        #[serde(default)]
        game_over: bool,
    },
    MeeplesReturned {
        player: PlayerId,
        count: u32,
    },
    /// A drawn or held tile that fits nowhere on the grid.
    TileDiscarded {
        player: PlayerId,
        tile_type: TileType,
    },
    TurnSkipped {
        player: PlayerId,
    },
    RoundFinished {
        winners: Vec<PlayerId>,
        scores: BTreeMap<PlayerId, u32>,
    },
}

/// What one turn did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub player: PlayerId,
    pub events: Vec<GameEvent>,
}

impl TurnOutcome {
    /// Points each player earned this turn.
    pub fn points(&self) -> BTreeMap<PlayerId, u32> {
        let mut points = BTreeMap::new();
        for event in &self.events {
            if let GameEvent::PointsScored { player, points: p, .. } = event {
                *points.entry(*player).or_insert(0) += p;
            }
        }
        points
    }
}

/// Final score of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub score: u32,
    pub terrain_scores: BTreeMap<TerrainType, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Highest score. More than one entry is a shared win.
    pub winners: Vec<PlayerId>,
    pub standings: Vec<Standing>,
    pub turns: usize,
    pub tiles_placed: usize,
}

impl GameResult {
    pub fn is_draw(&self) -> bool {
        self.winners.len() != 1
    }

    pub fn score_of(&self, player: PlayerId) -> Option<u32> {
        self.standings
            .iter()
            .find(|s| s.player == player)
            .map(|s| s.score)
    }
}
