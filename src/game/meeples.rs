//! Meeple issue, placement and return.

use super::board::Grid;
use super::patterns::{PatternId, PlacedMeeple};
use super::players::{Player, PlayerId};
use super::tile::TileMeeple;
use super::types::{Coord, Direction};
use crate::error::MeepleError;

/// A meeple taken from a player's supply. It is consumed by
/// [`place_on_tile`], so it can't be placed twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an issued meeple is lost from the supply unless placed"]
pub struct Meeple {
    owner: PlayerId,
}

impl Meeple {
    pub fn owner(&self) -> PlayerId {
        self.owner
    }
}

/// Take a meeple from the player's supply.
pub fn issue(player: &mut Player) -> Result<Meeple, MeepleError> {
    if !player.take_meeple() {
        return Err(MeepleError::NoFreeMeeples { player: player.id() });
    }
    Ok(Meeple { owner: player.id() })
}

/// Give an issued but unplaced meeple back to its owner.
pub fn cancel(meeple: Meeple, player: &mut Player) {
    assert_eq!(meeple.owner, player.id(), "meeple returned to the wrong player");
    player.return_meeple();
}

/// Check if a meeple can be placed on this spot.
///
/// Rules:
/// 1. The position is claimable on a placed tile
/// 2. The tile carries no meeple yet
/// 3. The pattern the position belongs to has no meeples on it
pub fn can_place_meeple(grid: &Grid, coord: Coord, position: Direction) -> bool {
    let Some(tile) = grid.tile(coord) else {
        return false;
    };
    if tile.has_meeple() {
        return false;
    }
    let Some(id) = tile.pattern_at(position) else {
        return false;
    };
    grid.pattern(id)
        .map(|p| !p.is_claimed() && !p.is_scored())
        .unwrap_or(false)
}

/// Put a meeple on a position of a placed tile and attach it to the pattern.
///
/// Panics if there is no tile, the position is unclaimable, the tile already
/// carries a meeple, or the pattern was already scored.
pub fn place_on_tile(grid: &mut Grid, meeple: Meeple, coord: Coord, position: Direction) -> PatternId {
    let tile = grid
        .tile_mut(coord)
        .unwrap_or_else(|| panic!("no tile at {coord} to place a meeple on"));
    let id = tile
        .pattern_at(position)
        .unwrap_or_else(|| panic!("position {position} at {coord} cannot be claimed"));
    tile.set_meeple(TileMeeple {
        owner: meeple.owner,
        position,
    });

    let pattern = grid
        .pattern_mut(id)
        .expect("tile back-reference points at a live pattern");
    pattern.add_meeple(PlacedMeeple {
        owner: meeple.owner,
        coord,
        position,
    });

    tracing::debug!(player = %meeple.owner, %coord, %position, "meeple placed");
    id
}

/// Return every meeple on the pattern to its owner. Returns how many each
/// player got back.
pub fn return_all(grid: &mut Grid, id: PatternId, players: &mut [Player]) -> Vec<(PlayerId, u32)> {
    let meeples = grid
        .pattern_mut(id)
        .expect("returning meeples of a live pattern")
        .take_meeples();

    let mut returned: Vec<(PlayerId, u32)> = Vec::new();
    for meeple in meeples {
        if let Some(tile) = grid.tile_mut(meeple.coord) {
            tile.clear_meeple();
        }
        let player = players
            .iter_mut()
            .find(|p| p.id() == meeple.owner)
            .unwrap_or_else(|| panic!("meeple owner {} is not in this round", meeple.owner));
        player.return_meeple();

        match returned.iter_mut().find(|(pid, _)| *pid == meeple.owner) {
            Some((_, count)) => *count += 1,
            None => returned.push((meeple.owner, 1)),
        }
    }
    returned
}
