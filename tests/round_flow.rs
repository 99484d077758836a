//! Whole rounds driven through the public `Round` API.
//!
//! Run with:
//!     cargo test --test round_flow

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use meeple_rules_engine::config::GameSettings;
use meeple_rules_engine::engine::models::GameEvent;
use meeple_rules_engine::engine::simulator::random_move;
use meeple_rules_engine::error::{MeepleError, PlacementError};
use meeple_rules_engine::game::players::{PlayerId, MAX_MEEPLES};
use meeple_rules_engine::game::round::Round;
use meeple_rules_engine::game::tiles::tile_total;
use meeple_rules_engine::game::types::{Coord, Direction, Rotation, TerrainType};

fn settings(player_count: usize, hand_size: usize, seed: u64) -> GameSettings {
    GameSettings {
        player_count,
        hand_size,
        seed,
        tile_limit: None,
    }
}

/// Play random legal moves until the round is over.
fn play_out(round: &mut Round, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..500 {
        if round.is_over() {
            return;
        }
        match random_move(round, &mut rng) {
            Some(m) => {
                round
                    .play_turn(m.hand_index, m.rotation, m.coord, m.meeple)
                    .unwrap_or_else(|e| panic!("legal move rejected: {e}"));
            }
            None => {
                round.skip_turn().unwrap();
            }
        }
    }
    panic!("round did not finish within 500 turns");
}

/// Everything a rejected turn must leave untouched.
fn snapshot(round: &Round) -> (usize, Vec<Coord>, Vec<(u32, u32, usize)>, usize, PlayerId, usize) {
    (
        round.grid().tile_count(),
        round.grid().tiles().filter_map(|t| t.coord()).collect(),
        round
            .players()
            .iter()
            .map(|p| (p.score(), p.free_meeples(), p.hand().len()))
            .collect(),
        round.stack_size(),
        round.active_player().id(),
        round.events().len(),
    )
}

#[test]
fn rejected_placement_changes_nothing() {
    let mut round = Round::new(&settings(2, 1, 17)).unwrap();
    let before = snapshot(&round);

    let err = round
        .play_turn(0, Rotation::Deg0, Coord::new(9, 9), None)
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidPlacement { .. }));
    assert_eq!(snapshot(&round), before);
}

#[test]
fn rejected_meeple_rolls_back_the_tile() {
    // Play until the active tile has a position nobody can claim, such as
    // the middle of a crossroads, then try to claim it.
    let mut round = Round::new(&settings(2, 1, 23)).unwrap();
    let mut rng = StdRng::seed_from_u64(23);
    let mut tested = false;

    while !round.is_over() && !tested {
        let hand_tile = round
            .active_player()
            .hand()
            .first()
            .filter(|_| round.active_player().has_free_meeples())
            .cloned();
        if let Some(mut tile) = hand_tile {
            if let Some(&(coord, rotation)) = round.valid_placements(0).first() {
                tile.set_rotation(rotation);
                let unclaimable = Direction::ALL
                    .into_iter()
                    .find(|&p| tile.terrain(p) == TerrainType::Other);
                if let Some(position) = unclaimable {
                    let before = snapshot(&round);
                    let err = round
                        .play_turn(0, rotation, coord, Some(position))
                        .unwrap_err();
                    assert_eq!(err, PlacementError::UnclaimablePosition { position });
                    assert_eq!(snapshot(&round), before);
                    assert_eq!(round.active_player().hand()[0].tile_type(), tile.tile_type());
                    tested = true;
                    continue;
                }
            }
        }
        match random_move(&round, &mut rng) {
            Some(m) => {
                round
                    .play_turn(m.hand_index, m.rotation, m.coord, m.meeple)
                    .unwrap();
            }
            None => {
                round.skip_turn().unwrap();
            }
        }
    }
    assert!(tested, "no tile with an unclaimable position was drawn");
}

#[test]
fn claimed_pattern_cannot_be_claimed_again() {
    // Play until a placement would extend a pattern someone already holds,
    // then try to put a second meeple on it.
    let mut round = Round::new(&settings(2, 1, 5)).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let mut tested = false;

    while !round.is_over() && !tested {
        if round.active_player().has_free_meeples() {
            'search: for (coord, rotation) in round.valid_placements(0) {
                let open = round.meeple_positions(0, rotation, coord);
                let mut tile = round.active_player().hand()[0].clone();
                tile.set_rotation(rotation);
                for position in Direction::ALL {
                    if !tile.is_claimable(position) || open.contains(&position) {
                        continue;
                    }
                    let before = snapshot(&round);
                    let err = round
                        .play_turn(0, rotation, coord, Some(position))
                        .unwrap_err();
                    assert_eq!(err, PlacementError::PatternClaimed { position });
                    assert_eq!(snapshot(&round), before);
                    tested = true;
                    break 'search;
                }
            }
        }
        if tested {
            break;
        }
        match random_move(&round, &mut rng) {
            Some(m) => {
                round
                    .play_turn(m.hand_index, m.rotation, m.coord, m.meeple)
                    .unwrap();
            }
            None => {
                round.skip_turn().unwrap();
            }
        }
    }
    assert!(tested, "no placement touched a claimed pattern");
}

/// Pick a placement and a claim, preferring fields so meeples stay out
/// until the end of the round.
fn greedy_claim(round: &Round) -> Option<(Coord, Rotation, Option<Direction>)> {
    let mut any_claim = None;
    let mut no_claim = None;
    for (coord, rotation) in round.valid_placements(0) {
        let mut tile = round.active_player().hand()[0].clone();
        tile.set_rotation(rotation);
        let positions = round.meeple_positions(0, rotation, coord);
        if let Some(&field) = positions.iter().find(|&&p| tile.terrain(p) == TerrainType::Fields) {
            return Some((coord, rotation, Some(field)));
        }
        match positions.first() {
            Some(&p) if any_claim.is_none() => any_claim = Some((coord, rotation, Some(p))),
            None if no_claim.is_none() => no_claim = Some((coord, rotation, None)),
            _ => {}
        }
    }
    any_claim.or(no_claim)
}

#[test]
fn empty_meeple_pool_rolls_back_the_turn() {
    let mut round = Round::new(&settings(2, 1, 13)).unwrap();
    let mut tested = false;

    while !round.is_over() && !tested {
        let Some((coord, rotation, claim)) = greedy_claim(&round) else {
            round.skip_turn().unwrap();
            continue;
        };
        if !round.active_player().has_free_meeples() {
            let mut tile = round.active_player().hand()[0].clone();
            tile.set_rotation(rotation);
            let position = Direction::ALL
                .into_iter()
                .find(|&p| tile.is_claimable(p))
                .unwrap_or(Direction::Middle);
            let player = round.active_player().id();
            let before = snapshot(&round);
            let hand_before = round.active_player().hand()[0].tile_type();

            let err = round
                .play_turn(0, rotation, coord, Some(position))
                .unwrap_err();
            assert_eq!(err, PlacementError::Meeple(MeepleError::NoFreeMeeples { player }));
            assert_eq!(snapshot(&round), before);
            assert!(round.grid().tile(coord).is_none());
            assert_eq!(round.active_player().hand()[0].tile_type(), hand_before);

            // The same placement without a meeple still goes through.
            round.play_turn(0, rotation, coord, None).unwrap();
            assert_eq!(round.grid().tile(coord).unwrap().tile_type(), hand_before);
            tested = true;
            continue;
        }
        round.play_turn(0, rotation, coord, claim).unwrap();
    }
    assert!(tested, "no player ran out of meeples");
}

#[test]
fn full_round_returns_every_meeple_and_scores_every_pattern() {
    let mut round = Round::new(&settings(3, 1, 99)).unwrap();
    play_out(&mut round, 99);
    let result = round.finish();

    for player in round.players() {
        assert_eq!(player.free_meeples(), MAX_MEEPLES);
        assert!(player.has_empty_hand());
        let breakdown: u32 = player.terrain_scores().values().sum();
        assert_eq!(breakdown, player.score());
    }
    for (_, pattern) in round.grid().patterns().iter() {
        assert!(pattern.is_scored(), "unscored pattern left: {pattern}");
        assert_eq!(pattern.meeple_count(), 0);
        assert!(!pattern.is_open());
    }
    assert!(round.grid().tiles().all(|t| !t.has_meeple()));

    let best = round.players().iter().map(|p| p.score()).max().unwrap();
    for winner in &result.winners {
        assert_eq!(result.score_of(*winner), Some(best));
    }
    assert!(matches!(round.events().last(), Some(GameEvent::RoundFinished { .. })));
}

#[test]
fn event_points_add_up_to_final_scores() {
    let mut round = Round::new(&settings(2, 1, 31)).unwrap();
    play_out(&mut round, 31);
    round.finish();

    let mut from_events: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for event in round.events() {
        if let GameEvent::PointsScored { player, points, .. } = event {
            *from_events.entry(*player).or_insert(0) += points;
        }
    }
    for player in round.players() {
        assert_eq!(from_events.get(&player.id()).copied().unwrap_or(0), player.score());
    }
}

#[test]
fn every_tile_is_placed_or_discarded() {
    let mut round = Round::new(&settings(4, 3, 8)).unwrap();
    play_out(&mut round, 8);
    let result = round.finish();

    let discarded = round
        .events()
        .iter()
        .filter(|e| matches!(e, GameEvent::TileDiscarded { .. }))
        .count();
    assert_eq!(result.tiles_placed - 1 + discarded, tile_total() as usize - 1);
}

#[test]
fn placed_tiles_match_all_their_neighbours() {
    let mut round = Round::new(&settings(2, 2, 61)).unwrap();
    play_out(&mut round, 61);

    let grid = round.grid();
    let mut seen = HashSet::new();
    for tile in grid.tiles() {
        let coord = tile.coord().unwrap();
        assert!(seen.insert(coord));
        for edge in Direction::EDGES {
            if let Some(neighbor) = grid.neighbor(coord, edge) {
                assert!(
                    tile.terrain(edge).matches(neighbor.terrain(edge.opposite())),
                    "{} at {coord} does not match {} on its {edge} edge",
                    tile.tile_type(),
                    neighbor.tile_type(),
                );
            }
        }
    }

    // Every placed segment sits in exactly one live pattern.
    let mut members = HashSet::new();
    for (id, pattern) in grid.patterns().iter() {
        for member in pattern.members() {
            assert!(members.insert(*member));
            assert_eq!(grid.tile(member.coord).unwrap().pattern_of_segment(member.segment), Some(id));
        }
    }
    let segments: usize = grid.tiles().map(|t| t.segment_count()).sum();
    assert_eq!(members.len(), segments);
}

#[test]
fn tile_limit_shortens_the_round() {
    let limited = GameSettings {
        tile_limit: Some(12),
        ..settings(2, 1, 3)
    };
    let mut round = Round::new(&limited).unwrap();
    play_out(&mut round, 3);
    let result = round.finish();
    assert!(result.tiles_placed <= 13);
    assert!(round.play_turn(0, Rotation::Deg0, Coord::new(0, 1), None).is_err());
}
