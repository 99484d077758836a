//! One round of the game: players, draw stack, grid and turn order.
//!
//! A turn is applied to a copy of the round and committed only when every
//! step succeeded, so a rejected turn leaves no trace.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::board::Grid;
use super::meeples;
use super::players::{Player, PlayerId};
use super::scoring;
use super::tile::TileFactory;
use super::tiles::{build_tile_stack, TileType, STARTING_TILE};
use super::types::{Coord, Direction, Rotation};
use crate::config::GameSettings;
use crate::engine::models::{GameEvent, GameResult, Standing, TurnOutcome};
use crate::error::{ConfigError, PlacementError};

#[derive(Debug, Clone)]
pub struct Round {
    settings: GameSettings,
    grid: Grid,
    players: Vec<Player>,
    stack: Vec<TileType>,
    active: usize,
    turns: usize,
    events: Vec<GameEvent>,
    result: Option<GameResult>,
}

impl Round {
    /// Shuffle the stack, lay the starting tile and deal every hand.
    pub fn new(settings: &GameSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let mut stack = build_tile_stack();
        let mut rng = StdRng::seed_from_u64(settings.seed);
        stack.shuffle(&mut rng);
        if let Some(limit) = settings.tile_limit {
            stack.truncate(limit);
        }

        let mut grid = Grid::new();
        if grid.place(TileFactory::create_tile(STARTING_TILE), Coord::ORIGIN).is_err() {
            unreachable!("the first tile always fits at the origin");
        }

        let players = (0..settings.player_count)
            .map(|i| Player::new(PlayerId(i), settings.hand_size))
            .collect();

        let mut round = Self {
            settings: settings.clone(),
            grid,
            players,
            stack,
            active: 0,
            turns: 0,
            events: Vec::new(),
            result: None,
        };
        round.events.push(GameEvent::RoundStarted {
            players: settings.player_count,
            stack_size: round.stack.len(),
            seed: settings.seed,
        });

        let mut dealt = Vec::new();
        for idx in 0..round.players.len() {
            round.refill_hand(idx, &mut dealt);
        }
        round.events.extend(dealt);

        tracing::info!(
            players = settings.player_count,
            hand_size = settings.hand_size,
            stack = round.stack.len(),
            seed = settings.seed,
            "round started"
        );
        Ok(round)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active]
    }

    /// Tiles left to draw.
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Everything that happened so far, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// True once the stack and every hand are empty, or after `finish`.
    pub fn is_over(&self) -> bool {
        self.result.is_some()
            || (self.stack.is_empty() && self.players.iter().all(Player::has_empty_hand))
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Every (position, rotation) where a tile of the active hand fits.
    pub fn valid_placements(&self, hand_index: usize) -> Vec<(Coord, Rotation)> {
        self.active_player()
            .hand()
            .get(hand_index)
            .map(|tile| self.grid.valid_placements(tile))
            .unwrap_or_default()
    }

    /// Positions the active player could claim after placing the tile this way.
    pub fn meeple_positions(&self, hand_index: usize, rotation: Rotation, coord: Coord) -> Vec<Direction> {
        if !self.active_player().has_free_meeples() {
            return Vec::new();
        }
        let Some(tile) = self.active_player().hand().get(hand_index) else {
            return Vec::new();
        };
        let mut tile = tile.clone();
        tile.set_rotation(rotation);
        let mut grid = self.grid.clone();
        if grid.place(tile, coord).is_err() {
            return Vec::new();
        }
        Direction::ALL
            .into_iter()
            .filter(|&position| meeples::can_place_meeple(&grid, coord, position))
            .collect()
    }

    /// Place a tile from the active hand and optionally claim one of its
    /// positions. Completed patterns are scored before the turn passes on.
    pub fn play_turn(
        &mut self,
        hand_index: usize,
        rotation: Rotation,
        coord: Coord,
        meeple: Option<Direction>,
    ) -> Result<TurnOutcome, PlacementError> {
        if self.is_over() {
            return Err(PlacementError::RoundOver);
        }
        let mut next = self.clone();
        let outcome = next.apply_turn(hand_index, rotation, coord, meeple)?;
        *self = next;
        Ok(outcome)
    }

    fn apply_turn(
        &mut self,
        hand_index: usize,
        rotation: Rotation,
        coord: Coord,
        meeple: Option<Direction>,
    ) -> Result<TurnOutcome, PlacementError> {
        let idx = self.active;
        let player = self.players[idx].id();
        let mut events = Vec::new();

        let hand_len = self.players[idx].hand().len();
        let mut tile = self.players[idx]
            .drop_tile(hand_index)
            .ok_or(PlacementError::NoSuchTile { index: hand_index, hand_len })?;
        let tile_type = tile.tile_type();
        tile.set_rotation(rotation);
        self.grid
            .place(tile, coord)
            .map_err(|_| PlacementError::InvalidPlacement { coord, rotation })?;
        events.push(GameEvent::TilePlaced {
            player,
            tile_type,
            coord,
            rotation,
        });

        if let Some(position) = meeple {
            let issued = meeples::issue(&mut self.players[idx])?;
            let placed = self
                .grid
                .tile(coord)
                .ok_or(PlacementError::InvalidPlacement { coord, rotation })?;
            let terrain = placed.terrain(position);
            if !placed.is_claimable(position) {
                return Err(PlacementError::UnclaimablePosition { position });
            }
            if !meeples::can_place_meeple(&self.grid, coord, position) {
                return Err(PlacementError::PatternClaimed { position });
            }
            meeples::place_on_tile(&mut self.grid, issued, coord, position);
            events.push(GameEvent::MeeplePlaced {
                player,
                coord,
                position,
                terrain,
            });
        }

        self.score_completed(&mut events);
        self.refill_hand(idx, &mut events);
        self.turns += 1;
        self.advance();

        tracing::debug!(%player, tile = %tile_type, %coord, events = events.len(), "turn played");
        self.events.extend(events.iter().cloned());
        Ok(TurnOutcome { player, events })
    }

    /// Pass the turn. Tiles in the active hand that fit nowhere are discarded
    /// and replaced from the stack.
    pub fn skip_turn(&mut self) -> Result<TurnOutcome, PlacementError> {
        if self.is_over() {
            return Err(PlacementError::RoundOver);
        }
        let idx = self.active;
        let player = self.players[idx].id();
        let mut events = Vec::new();

        let hand = std::mem::take(self.players[idx].hand_mut());
        for tile in hand {
            if self.grid.has_valid_placement(&tile) {
                self.players[idx].hand_mut().push(tile);
            } else {
                events.push(GameEvent::TileDiscarded {
                    player,
                    tile_type: tile.tile_type(),
                });
            }
        }
        events.push(GameEvent::TurnSkipped { player });

        self.refill_hand(idx, &mut events);
        self.turns += 1;
        self.advance();

        tracing::debug!(%player, discarded = events.len() - 1, "turn skipped");
        self.events.extend(events.iter().cloned());
        Ok(TurnOutcome { player, events })
    }

    /// End the round: force-close and score every remaining pattern, then
    /// rank the players. Calling it again returns the same result.
    pub fn finish(&mut self) -> GameResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        let mut events = Vec::new();
        for id in self.grid.all_patterns() {
            let Some(pattern) = self.grid.pattern(id) else {
                continue;
            };
            if pattern.is_scored() {
                continue;
            }
            let returned = pattern.meeple_counts();
            for award in scoring::score(&mut self.grid, id, true, &mut self.players) {
                events.push(GameEvent::PointsScored {
                    player: award.player,
                    points: award.points,
                    terrain: award.terrain,
                    game_over: true,
                });
            }
            events.extend(
                returned
                    .into_iter()
                    .map(|(player, count)| GameEvent::MeeplesReturned { player, count }),
            );
        }

        let winners = self.winners();
        let result = GameResult {
            winners: winners.clone(),
            standings: self
                .players
                .iter()
                .map(|p| Standing {
                    player: p.id(),
                    score: p.score(),
                    terrain_scores: p.terrain_scores().clone(),
                })
                .collect(),
            turns: self.turns,
            tiles_placed: self.grid.tile_count(),
        };
        events.push(GameEvent::RoundFinished {
            winners,
            scores: self.players.iter().map(|p| (p.id(), p.score())).collect(),
        });
        self.events.extend(events);

        tracing::info!(
            winners = ?result.winners,
            turns = result.turns,
            tiles = result.tiles_placed,
            "round finished"
        );
        self.result = Some(result.clone());
        result
    }

    /// Players with the highest current score.
    pub fn winners(&self) -> Vec<PlayerId> {
        let best = self.players.iter().map(Player::score).max().unwrap_or(0);
        self.players
            .iter()
            .filter(|p| p.score() == best)
            .map(Player::id)
            .collect()
    }

    fn score_completed(&mut self, events: &mut Vec<GameEvent>) {
        for id in self.grid.take_completed() {
            let pattern = self
                .grid
                .pattern(id)
                .expect("completed patterns stay live");
            events.push(GameEvent::PatternCompleted {
                terrain: pattern.terrain(),
                tiles: pattern.tile_count(),
            });
            let returned = pattern.meeple_counts();
            for award in scoring::score(&mut self.grid, id, false, &mut self.players) {
                events.push(GameEvent::PointsScored {
                    player: award.player,
                    points: award.points,
                    terrain: award.terrain,
                    game_over: false,
                });
            }
            events.extend(
                returned
                    .into_iter()
                    .map(|(player, count)| GameEvent::MeeplesReturned { player, count }),
            );
        }
    }

    /// Draw until the hand is full or the stack runs out. Tiles that fit
    /// nowhere are discarded.
    fn refill_hand(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        let player = self.players[idx].id();
        while !self.players[idx].has_full_hand() {
            let Some(tile_type) = self.stack.pop() else {
                break;
            };
            let tile = TileFactory::create_tile(tile_type);
            if !self.grid.has_valid_placement(&tile) {
                tracing::debug!(%player, tile = %tile_type, "drawn tile fits nowhere, discarded");
                events.push(GameEvent::TileDiscarded { player, tile_type });
                continue;
            }
            if self.players[idx].add_tile(tile).is_err() {
                break;
            }
        }
    }

    /// Move to the next player who still holds tiles.
    fn advance(&mut self) {
        let count = self.players.len();
        for _ in 0..count {
            self.active = (self.active + 1) % count;
            if !self.players[self.active].has_empty_hand() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::players::MAX_MEEPLES;

    fn settings(seed: u64) -> GameSettings {
        GameSettings {
            player_count: 2,
            hand_size: 1,
            seed,
            tile_limit: None,
        }
    }

    #[test]
    fn test_new_round_deals_hands() {
        let round = Round::new(&settings(7)).unwrap();
        assert_eq!(round.grid().tile_count(), 1);
        assert_eq!(round.players().len(), 2);
        for player in round.players() {
            assert_eq!(player.hand().len(), 1);
            assert_eq!(player.free_meeples(), MAX_MEEPLES);
        }
        assert!(round.stack_size() <= 69);
        assert_eq!(round.active_player().id(), PlayerId(0));
        assert!(matches!(round.events()[0], GameEvent::RoundStarted { players: 2, .. }));
    }

    #[test]
    fn test_same_seed_same_stack() {
        let a = Round::new(&settings(11)).unwrap();
        let b = Round::new(&settings(11)).unwrap();
        assert_eq!(a.stack, b.stack);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = GameSettings {
            player_count: 1,
            ..settings(0)
        };
        assert!(Round::new(&bad).is_err());
    }

    #[test]
    fn test_turn_passes_to_next_player() {
        let mut round = Round::new(&settings(3)).unwrap();
        let (coord, rotation) = round.valid_placements(0)[0];
        let outcome = round.play_turn(0, rotation, coord, None).unwrap();
        assert_eq!(outcome.player, PlayerId(0));
        assert!(matches!(outcome.events[0], GameEvent::TilePlaced { .. }));
        assert_eq!(round.active_player().id(), PlayerId(1));
        assert_eq!(round.grid().tile_count(), 2);
        assert_eq!(round.turns(), 1);
    }

    #[test]
    fn test_bad_hand_index_rejected() {
        let mut round = Round::new(&settings(3)).unwrap();
        let err = round
            .play_turn(4, Rotation::Deg0, Coord::new(0, 1), None)
            .unwrap_err();
        assert_eq!(err, PlacementError::NoSuchTile { index: 4, hand_len: 1 });
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut round = Round::new(&settings(5)).unwrap();
        let first = round.finish();
        let events = round.events().len();
        let second = round.finish();
        assert_eq!(first, second);
        assert_eq!(round.events().len(), events);
        assert!(round.is_over());
        assert_eq!(
            round.play_turn(0, Rotation::Deg0, Coord::new(0, 1), None),
            Err(PlacementError::RoundOver)
        );
    }
}
