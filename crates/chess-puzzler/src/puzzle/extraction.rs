//! Per-ply classification and the per-game scan.

use std::collections::HashSet;

use tracing::debug;

use super::cook::{trim_advantage_line, DECISIVE_ADVANTAGE};
use super::generator::Generator;
use super::{Analysis, Puzzle, MATE_RATING, UNSCORED_ADVANTAGE_RATING};
use crate::engine::{Engine, EngineError};
use crate::position::Position;
use crate::record::GameRecord;
use crate::score::{win_chance, PovScore, Score};
use crate::sink::PuzzleSink;

/// Assumed score before the first ply.
pub const INITIAL_SCORE: Score = Score::Cp(20);

/// A game already this lopsided is not an interesting starting point.
pub const ALREADY_WINNING: Score = Score::Cp(300);

/// Below this, an advantage swing must come from being down material.
pub const CLEARLY_WINNING: Score = Score::Cp(400);

/// Win-chance jump that marks a blunder worth probing.
pub const SWING_THRESHOLD: f64 = 0.6;

/// Tier from which mate-in-one and two-move puzzles are accepted.
pub const SHORT_PUZZLE_TIER: u8 = 3;

impl<E, S> Generator<E, S>
where
    E: Engine,
    S: PuzzleSink<E::Position>,
{
    /// Decide whether the position after a game move starts a puzzle.
    ///
    /// `prev_score` is relative to the side to move here; `current_eval` is
    /// the game annotation for this position.
    pub async fn analyze_position(
        &mut self,
        game_id: &str,
        ply: usize,
        position: &E::Position,
        prev_score: Score,
        current_eval: PovScore,
        tier: u8,
    ) -> Result<Analysis<E::Position>, EngineError> {
        let winner = position.turn();
        let score = current_eval.pov(winner);

        if position.legal_move_count() < 2 {
            return Ok(Analysis::Score(score));
        }

        debug!(ply, %score, "Position");

        if prev_score > ALREADY_WINNING && score < Score::MATE_SOON {
            debug!(ply, %prev_score, %score, "Too much of a winning position to start with");
            return Ok(Analysis::Score(score));
        }
        if position.material_diff(winner) > 0 {
            debug!(ply, ?winner, "Already up in material");
            return Ok(Analysis::Score(score));
        }
        if score >= Score::Mate(1) && tier < SHORT_PUZZLE_TIER {
            debug!(ply, "Mate in one");
            return Ok(Analysis::Score(score));
        }

        if score > Score::MATE_SOON {
            debug!(game_id, ply, "Mate found, probing...");
            if self.sink.is_seen(position) {
                debug!("Skip duplicate position");
                return Ok(Analysis::Score(score));
            }
            let solution = self.cook_mate(position.clone(), winner).await?;
            return Ok(match solution {
                Some(moves) if !(tier == 1 && moves.len() == 3) => Analysis::Puzzle(Puzzle {
                    position: position.clone(),
                    moves,
                    cp: MATE_RATING,
                }),
                _ => Analysis::Score(score),
            });
        }

        if score >= DECISIVE_ADVANTAGE
            && win_chance(score) > win_chance(prev_score) + SWING_THRESHOLD
        {
            if score < CLEARLY_WINNING && position.material_diff(winner) > -1 {
                debug!("Not clearly winning and not from being down in material, aborting");
                return Ok(Analysis::Score(score));
            }
            debug!(game_id, ply, %prev_score, %score, "Advantage swing, probing...");
            if self.sink.is_seen(position) {
                debug!("Skip duplicate position");
                return Ok(Analysis::Score(score));
            }

            let solution = self.cook_advantage(position.clone(), winner).await?;
            self.sink.mark_seen(game_id);
            let Some(solution) = solution else {
                return Ok(Analysis::Score(score));
            };

            let solution = trim_advantage_line(solution);
            if solution.len() <= 1 {
                debug!("Discard one-mover");
                return Ok(Analysis::Score(score));
            }
            if tier < SHORT_PUZZLE_TIER && solution.len() == 3 {
                debug!("Discard two-mover");
                return Ok(Analysis::Score(score));
            }

            let cp = solution
                .last()
                .and_then(|pair| pair.best.score.cp())
                .unwrap_or(UNSCORED_ADVANTAGE_RATING);
            return Ok(Analysis::Puzzle(Puzzle {
                position: position.clone(),
                moves: solution.into_iter().map(|pair| pair.best.mv).collect(),
                cp,
            }));
        }

        Ok(Analysis::Score(score))
    }

    /// Scan a game and return its first puzzle.
    ///
    /// A ply without evaluation ends the scan. After a transposition back to
    /// an earlier position, plies are skipped until an irreversible move.
    pub async fn analyze_game(
        &mut self,
        game: &GameRecord<E::Position>,
        tier: u8,
    ) -> Result<Option<Puzzle<E::Position>>, EngineError> {
        debug!(game_id = %game.id, tier, "Analyzing");

        let mut prev_score = INITIAL_SCORE;
        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut position = game.start.clone();
        let mut skip_until_irreversible = false;

        for (index, ply) in game.plies.iter().enumerate() {
            let ply_number = index + 1;

            if skip_until_irreversible {
                if position.is_irreversible(&ply.mv) {
                    skip_until_irreversible = false;
                    seen_keys.clear();
                } else {
                    position = position.play(&ply.mv);
                    continue;
                }
            }

            let Some(current_eval) = ply.eval else {
                debug!(ply = ply_number, "Skipping game without eval");
                return Ok(None);
            };

            position = position.play(&ply.mv);
            if !seen_keys.insert(position.key()) {
                skip_until_irreversible = true;
                continue;
            }

            if position.castling_rights() != position.max_castling_rights() {
                continue;
            }

            match self
                .analyze_position(&game.id, ply_number, &position, prev_score, current_eval, tier)
                .await?
            {
                Analysis::Puzzle(puzzle) => return Ok(Some(puzzle)),
                Analysis::Score(score) => prev_score = -score,
            }
        }

        debug!(game_id = %game.id, "Found nothing");
        Ok(None)
    }
}
