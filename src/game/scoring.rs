//! Scoring of completed patterns and the end-of-game pass.
//!
//! Points go to every player holding the most meeples on a pattern. All
//! meeples on a scored pattern go back to their owners, rewarded or not.

use std::collections::BTreeSet;

use serde::Serialize;

use super::board::Grid;
use super::meeples;
use super::patterns::{GridPattern, PatternId, PatternStatus};
use super::players::{Player, PlayerId};
use super::types::TerrainType;

pub const CASTLE_POINTS_COMPLETE: u32 = 2;
pub const CASTLE_POINTS_FORCE_CLOSED: u32 = 1;
pub const SHIELD_BONUS: u32 = 1;
pub const ROAD_POINTS: u32 = 1;
/// The monastery tile plus its eight neighbours.
pub const MONASTERY_POINTS: u32 = 9;
pub const FIELD_POINTS_PER_CASTLE: u32 = 3;

/// Points given to one player for one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreAward {
    pub player: PlayerId,
    pub points: u32,
    pub terrain: TerrainType,
}

/// Value of a closed pattern, before it is shared between owners.
pub fn pattern_value(grid: &Grid, pattern: &GridPattern) -> u32 {
    let tiles = pattern.tile_count() as u32;
    match (pattern.terrain(), pattern.status()) {
        (_, PatternStatus::Open) => 0,
        (TerrainType::Castle, PatternStatus::Complete) => {
            tiles * CASTLE_POINTS_COMPLETE + pattern.shields() * SHIELD_BONUS
        }
        (TerrainType::Castle, PatternStatus::ForceClosed) => {
            tiles * CASTLE_POINTS_FORCE_CLOSED + pattern.shields() * SHIELD_BONUS
        }
        (TerrainType::Road, _) => tiles * ROAD_POINTS,
        (TerrainType::Monastery, PatternStatus::Complete) => MONASTERY_POINTS,
        (TerrainType::Monastery, PatternStatus::ForceClosed) => 0,
        (TerrainType::Fields, PatternStatus::ForceClosed) => {
            bordering_complete_castles(grid, pattern).len() as u32 * FIELD_POINTS_PER_CASTLE
        }
        (TerrainType::Fields, PatternStatus::Complete) => {
            panic!("fields never complete during play")
        }
        (TerrainType::Other, _) => 0,
    }
}

/// Distinct castles completed during play that touch the field.
pub fn bordering_complete_castles(grid: &Grid, field: &GridPattern) -> BTreeSet<PatternId> {
    let mut castles = BTreeSet::new();
    for member in field.members() {
        let Some(tile) = grid.tile(member.coord) else {
            continue;
        };
        for &castle_segment in &tile.segment(member.segment).adjacent_castles {
            let Some(id) = tile.pattern_of_segment(castle_segment) else {
                continue;
            };
            if grid.pattern(id).is_some_and(GridPattern::is_complete) {
                castles.insert(id);
            }
        }
    }
    castles
}

/// Players holding the most meeples on the pattern. Empty if unclaimed.
pub fn majority_owners(pattern: &GridPattern) -> Vec<PlayerId> {
    let counts = pattern.meeple_counts();
    let Some(&max) = counts.values().max() else {
        return Vec::new();
    };
    counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(player, _)| player)
        .collect()
}

/// Score a pattern, pay its majority owners and return its meeples.
///
/// During play the pattern must be complete. With `game_over` an open pattern
/// is force-closed first and scored at reduced value. Panics on a pattern
/// that was already scored.
pub fn score(
    grid: &mut Grid,
    id: PatternId,
    game_over: bool,
    players: &mut [Player],
) -> Vec<ScoreAward> {
    let pattern = grid.pattern(id).expect("scoring a live pattern");
    assert!(!pattern.is_scored(), "pattern scored twice: {pattern}");
    if pattern.is_open() {
        assert!(game_over, "scoring an open pattern during play: {pattern}");
        grid.force_close(id);
    }

    let pattern = grid.pattern(id).expect("scoring a live pattern");
    let terrain = pattern.terrain();
    let points = pattern_value(grid, pattern);
    let owners = majority_owners(pattern);

    let mut awards = Vec::with_capacity(owners.len());
    if points > 0 {
        for owner in owners {
            let player = players
                .iter_mut()
                .find(|p| p.id() == owner)
                .unwrap_or_else(|| panic!("pattern owner {owner} is not in this round"));
            player.add_points(points, terrain);
            awards.push(ScoreAward {
                player: owner,
                points,
                terrain,
            });
        }
    }

    meeples::return_all(grid, id, players);
    grid.pattern_mut(id)
        .expect("scoring a live pattern")
        .mark_scored();

    if !awards.is_empty() {
        tracing::debug!(?terrain, points, owners = awards.len(), game_over, "pattern scored");
    }
    awards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::players::MAX_MEEPLES;
    use crate::game::tile::{Tile, TileFactory};
    use crate::game::tiles::TileType;
    use crate::game::types::{Coord, Direction, Rotation};

    fn tile(tile_type: TileType, rotation: Rotation) -> Tile {
        let mut tile = TileFactory::create_tile(tile_type);
        tile.set_rotation(rotation);
        tile
    }

    fn claim(grid: &mut Grid, player: &mut Player, coord: Coord, position: Direction) -> PatternId {
        let meeple = meeples::issue(player).unwrap();
        meeples::place_on_tile(grid, meeple, coord, position)
    }

    #[test]
    fn test_complete_castle_with_two_tiles() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1), Player::new(PlayerId(1), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        let castle = claim(&mut grid, &mut players[0], Coord::ORIGIN, Direction::North);

        let completed = grid.place(tile(TileType::E, Rotation::Deg180), Coord::new(0, 1)).unwrap();
        let castle_now = grid.pattern_at(Coord::new(0, 1), Direction::South).unwrap();
        assert_eq!(castle_now, castle);
        assert_eq!(completed, vec![castle]);

        let awards = score(&mut grid, castle, false, &mut players);
        assert_eq!(
            awards,
            vec![ScoreAward { player: PlayerId(0), points: 4, terrain: TerrainType::Castle }]
        );
        assert_eq!(players[0].score(), 4);
        assert_eq!(players[0].terrain_score(TerrainType::Castle), 4);
        assert_eq!(players[0].free_meeples(), MAX_MEEPLES);
        assert_eq!(players[1].score(), 0);
        assert!(grid.pattern(castle).unwrap().is_scored());
    }

    #[test]
    fn test_force_closed_road_keeps_full_value() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        grid.place(tile(TileType::U, Rotation::Deg90), Coord::new(1, 0)).unwrap();
        let road = claim(&mut grid, &mut players[0], Coord::new(1, 0), Direction::East);

        let awards = score(&mut grid, road, true, &mut players);
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].points, 2);
        assert_eq!(grid.pattern(road).unwrap().status(), PatternStatus::ForceClosed);
    }

    #[test]
    fn test_shield_adds_one_point_in_either_phase() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        grid.place(tile(TileType::M, Rotation::Deg180), Coord::new(0, 1)).unwrap();
        let castle = claim(&mut grid, &mut players[0], Coord::ORIGIN, Direction::North);
        assert_eq!(grid.pattern(castle).unwrap().shields(), 1);
        assert!(grid.pattern(castle).unwrap().is_open());

        let awards = score(&mut grid, castle, true, &mut players);
        assert_eq!(
            awards,
            vec![ScoreAward {
                player: PlayerId(0),
                points: 2 * CASTLE_POINTS_FORCE_CLOSED + SHIELD_BONUS,
                terrain: TerrainType::Castle,
            }]
        );
        assert_eq!(players[0].score(), 3);
    }

    #[test]
    fn test_unclaimed_pattern_scores_nobody() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        let completed = grid.place(tile(TileType::E, Rotation::Deg180), Coord::new(0, 1)).unwrap();
        assert!(score(&mut grid, completed[0], false, &mut players).is_empty());
        assert_eq!(players[0].score(), 0);
        assert!(grid.pattern(completed[0]).unwrap().is_scored());
    }

    #[test]
    #[should_panic(expected = "scoring an open pattern during play")]
    fn test_open_pattern_during_play_panics() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        let road = grid.pattern_at(Coord::ORIGIN, Direction::East).unwrap();
        score(&mut grid, road, false, &mut players);
    }

    #[test]
    #[should_panic(expected = "pattern scored twice")]
    fn test_double_scoring_panics() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        let road = grid.pattern_at(Coord::ORIGIN, Direction::East).unwrap();
        score(&mut grid, road, true, &mut players);
        score(&mut grid, road, true, &mut players);
    }

    #[test]
    fn test_majority_owners_ties_share() {
        let mut grid = Grid::new();
        let mut players = vec![
            Player::new(PlayerId(0), 1),
            Player::new(PlayerId(1), 1),
            Player::new(PlayerId(2), 1),
        ];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        grid.place(tile(TileType::U, Rotation::Deg90), Coord::new(1, 0)).unwrap();
        let road = claim(&mut grid, &mut players[0], Coord::ORIGIN, Direction::East);
        claim(&mut grid, &mut players[1], Coord::new(1, 0), Direction::East);
        assert_eq!(majority_owners(grid.pattern(road).unwrap()), vec![PlayerId(0), PlayerId(1)]);

        let awards = score(&mut grid, road, true, &mut players);
        assert_eq!(awards.len(), 2);
        assert!(awards.iter().all(|a| a.points == 2));
        assert_eq!(players[0].score(), 2);
        assert_eq!(players[1].score(), 2);
        assert_eq!(players[2].score(), 0);
        assert!(players.iter().all(|p| p.free_meeples() == MAX_MEEPLES));
    }

    #[test]
    fn test_majority_owners_strict_winner() {
        let mut grid = Grid::new();
        let mut players = vec![Player::new(PlayerId(0), 1), Player::new(PlayerId(1), 1)];
        grid.place(tile(TileType::D, Rotation::Deg0), Coord::ORIGIN).unwrap();
        grid.place(tile(TileType::U, Rotation::Deg90), Coord::new(1, 0)).unwrap();
        grid.place(tile(TileType::U, Rotation::Deg90), Coord::new(-1, 0)).unwrap();
        let road = claim(&mut grid, &mut players[0], Coord::ORIGIN, Direction::East);
        claim(&mut grid, &mut players[0], Coord::new(-1, 0), Direction::East);
        claim(&mut grid, &mut players[1], Coord::new(1, 0), Direction::East);

        assert_eq!(majority_owners(grid.pattern(road).unwrap()), vec![PlayerId(0)]);
        let castle = grid.pattern_at(Coord::ORIGIN, Direction::North).unwrap();
        assert!(majority_owners(grid.pattern(castle).unwrap()).is_empty());

        score(&mut grid, road, true, &mut players);
        assert_eq!(players[0].score(), 3);
        assert_eq!(players[1].score(), 0);
        assert_eq!(players[1].free_meeples(), MAX_MEEPLES);
    }
}
