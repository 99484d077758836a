//! Headless self-play: uniform random legal moves, single games and batches.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::GameSettings;
use crate::engine::models::GameResult;
use crate::error::EngineError;
use crate::game::round::Round;
use crate::game::types::{Coord, Direction, Rotation};

/// Upper bound on turns in one round. A base game needs well under 200.
const MAX_TURNS: usize = 500;

/// Chance that the random player claims something when it can.
const MEEPLE_PROBABILITY: f64 = 0.5;

/// One move of the active player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub hand_index: usize,
    pub coord: Coord,
    pub rotation: Rotation,
    pub meeple: Option<Direction>,
}

/// Pick a uniformly random placement from the active hand, then maybe a
/// random meeple position on it. `None` when nothing in the hand fits.
pub fn random_move(round: &Round, rng: &mut StdRng) -> Option<Move> {
    let hand_len = round.active_player().hand().len();
    let placements: Vec<(usize, Coord, Rotation)> = (0..hand_len)
        .flat_map(|hand_index| {
            round
                .valid_placements(hand_index)
                .into_iter()
                .map(move |(coord, rotation)| (hand_index, coord, rotation))
        })
        .collect();

    let &(hand_index, coord, rotation) = placements.choose(rng)?;
    let meeple = if rng.gen_bool(MEEPLE_PROBABILITY) {
        round
            .meeple_positions(hand_index, rotation, coord)
            .choose(rng)
            .copied()
    } else {
        None
    };
    Some(Move {
        hand_index,
        coord,
        rotation,
        meeple,
    })
}

/// Play a whole round with random moves and score it.
pub fn play_random_round(settings: &GameSettings, seed: u64) -> Result<GameResult, EngineError> {
    let mut round = Round::new(settings)?;
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..MAX_TURNS {
        if round.is_over() {
            break;
        }
        match random_move(&round, &mut rng) {
            Some(m) => {
                round.play_turn(m.hand_index, m.rotation, m.coord, m.meeple)?;
            }
            None => {
                round.skip_turn()?;
            }
        }
    }
    if !round.is_over() {
        tracing::warn!(turns = round.turns(), "round hit the turn limit, finishing early");
    }
    Ok(round.finish())
}

/// Aggregated results of a batch of self-play games.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub num_games: usize,
    /// Outright wins per seat.
    pub wins: Vec<usize>,
    pub draws: usize,
    /// Final score of every game, per seat.
    pub scores: Vec<Vec<u32>>,
    pub game_durations_ms: Vec<f64>,
}

impl BatchResult {
    fn new(num_games: usize, seats: usize) -> Self {
        Self {
            num_games,
            wins: vec![0; seats],
            draws: 0,
            scores: vec![Vec::with_capacity(num_games); seats],
            game_durations_ms: Vec::with_capacity(num_games),
        }
    }

    fn record(&mut self, result: &GameResult, elapsed_ms: f64) {
        for standing in &result.standings {
            if let Some(scores) = self.scores.get_mut(standing.player.0) {
                scores.push(standing.score);
            }
        }
        match result.winners.as_slice() {
            [winner] => {
                if let Some(wins) = self.wins.get_mut(winner.0) {
                    *wins += 1;
                }
            }
            _ => self.draws += 1,
        }
        self.game_durations_ms.push(elapsed_ms);
    }

    pub fn win_rate(&self, seat: usize) -> f64 {
        self.wins.get(seat).copied().unwrap_or(0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, seat: usize) -> f64 {
        match self.scores.get(seat) {
            Some(s) if !s.is_empty() => s.iter().map(|&v| f64::from(v)).sum::<f64>() / s.len() as f64,
            _ => 0.0,
        }
    }

    pub fn score_stddev(&self, seat: usize) -> f64 {
        let scores = match self.scores.get(seat) {
            Some(s) if s.len() >= 2 => s,
            _ => return 0.0,
        };
        let avg = self.avg_score(seat);
        let variance = scores
            .iter()
            .map(|&s| (f64::from(s) - avg).powi(2))
            .sum::<f64>()
            / (scores.len() - 1) as f64;
        variance.sqrt()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Self-play results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for seat in 0..self.wins.len() {
            lines.push(format!(
                "  {:>8}: {:3} wins ({:5.1}%)  avg={:5.1} +/- {:4.1}",
                format!("p{seat}"),
                self.wins[seat],
                self.win_rate(seat) * 100.0,
                self.avg_score(seat),
                self.score_stddev(seat),
            ));
        }
        lines.push(format!("  {:>8}: {}", "Draws", self.draws));
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!("  Avg game: {:.1}ms  |  Total: {:.1}s", avg_ms, total_ms / 1000.0));
        }
        lines.join("\n")
    }
}

/// Run `num_games` random rounds in parallel. Game `i` shuffles its stack
/// with `base_seed + i`, wrapping at `u64::MAX`, and plays with the same seed.
pub fn run_batch(
    settings: &GameSettings,
    num_games: usize,
    base_seed: u64,
) -> Result<BatchResult, EngineError> {
    settings.validate()?;

    let outcomes: Vec<(GameResult, f64)> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seed = base_seed.wrapping_add(game_idx as u64);
            let game_settings = GameSettings {
                seed,
                ..settings.clone()
            };
            let t0 = Instant::now();
            let result = play_random_round(&game_settings, seed)?;
            Ok((result, t0.elapsed().as_secs_f64() * 1000.0))
        })
        .collect::<Result<_, EngineError>>()?;

    let mut batch = BatchResult::new(num_games, settings.player_count);
    for (result, elapsed_ms) in &outcomes {
        batch.record(result, *elapsed_ms);
    }
    tracing::info!(games = num_games, draws = batch.draws, "batch finished");
    Ok(batch)
}
