//! Players: score, per-terrain breakdown, free meeples and hand of tiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tile::Tile;
use super::types::TerrainType;

pub const MAX_MEEPLES: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    id: PlayerId,
    score: u32,
    terrain_scores: BTreeMap<TerrainType, u32>,
    free_meeples: u32,
    hand: Vec<Tile>,
    hand_size: usize,
}

impl Player {
    pub fn new(id: PlayerId, hand_size: usize) -> Self {
        Self {
            id,
            score: 0,
            terrain_scores: TerrainType::CLAIMABLE.iter().map(|t| (*t, 0)).collect(),
            free_meeples: MAX_MEEPLES,
            hand: Vec::with_capacity(hand_size),
            hand_size,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Points earned from one terrain kind. Always 0 for `Other`.
    pub fn terrain_score(&self, terrain: TerrainType) -> u32 {
        self.terrain_scores.get(&terrain).copied().unwrap_or(0)
    }

    pub fn terrain_scores(&self) -> &BTreeMap<TerrainType, u32> {
        &self.terrain_scores
    }

    pub fn free_meeples(&self) -> u32 {
        self.free_meeples
    }

    pub fn has_free_meeples(&self) -> bool {
        self.free_meeples > 0
    }

    pub fn hand(&self) -> &[Tile] {
        &self.hand
    }

    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    pub fn has_full_hand(&self) -> bool {
        self.hand.len() >= self.hand_size
    }

    pub fn has_empty_hand(&self) -> bool {
        self.hand.is_empty()
    }

    /// Add points to the overall score and to the terrain breakdown.
    pub fn add_points(&mut self, amount: u32, terrain: TerrainType) {
        debug_assert!(terrain.is_claimable(), "points for unclaimable terrain");
        *self.terrain_scores.entry(terrain).or_insert(0) += amount;
        self.score += amount;
    }

    /// Add a tile to the hand. Hands it back if the hand is full.
    pub fn add_tile(&mut self, tile: Tile) -> Result<(), Tile> {
        if self.has_full_hand() {
            return Err(tile);
        }
        self.hand.push(tile);
        Ok(())
    }

    /// Remove a tile from the hand by index.
    pub fn drop_tile(&mut self, index: usize) -> Option<Tile> {
        (index < self.hand.len()).then(|| self.hand.remove(index))
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Vec<Tile> {
        &mut self.hand
    }

    pub(crate) fn take_meeple(&mut self) -> bool {
        if self.free_meeples == 0 {
            return false;
        }
        self.free_meeples -= 1;
        true
    }

    pub(crate) fn return_meeple(&mut self) {
        assert!(self.free_meeples < MAX_MEEPLES, "{} returned more meeples than issued", self.id);
        self.free_meeples += 1;
    }
}
