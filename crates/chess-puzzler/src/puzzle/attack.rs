//! Is the engine's best move forced enough to be a puzzle move?

use shakmaty::Color;
use tracing::debug;

use super::generator::Generator;
use super::pair::{probe, NextMovePair};
use crate::engine::{Engine, EngineError};
use crate::position::Position;
use crate::score::{win_chance, PovScore, Score};
use crate::sink::PuzzleSink;

/// A non-mating alternative this good makes a mate-in-one ambiguous.
pub const NON_MATE_WIN_THRESHOLD: f64 = 0.6;

/// Win-chance lead the best move needs over the runner-up.
pub const ATTACK_MARGIN: f64 = 0.7;

/// Lines inspected when several moves mate at once.
const MATE_IN_ONE_MULTIPV: usize = 5;

impl<E, S> Generator<E, S>
where
    E: Engine,
    S: PuzzleSink<E::Position>,
{
    /// The best move mates at once and nothing else keeps a clear win.
    pub async fn is_valid_mate_in_one(
        &mut self,
        pair: &NextMovePair<E::Position>,
    ) -> Result<bool, EngineError> {
        if pair.best.score != Score::Mate(1) {
            return Ok(false);
        }
        let second = match &pair.second {
            None => return Ok(true),
            Some(second) if win_chance(second.score) <= NON_MATE_WIN_THRESHOLD => return Ok(true),
            Some(second) => second,
        };
        if second.score != Score::Mate(1) {
            return Ok(false);
        }

        // several mates in one: the best non-mating move has to be bad enough
        debug!("Looking for best non-mating move...");
        let turn = pair.position.turn();
        let lines = self
            .engine
            .analyse(&pair.position, MATE_IN_ONE_MULTIPV, &self.config.pair_limit)
            .await?;
        for line in lines {
            let score = PovScore::new(line.score, turn).pov(pair.winner);
            if score < Score::Mate(1) && win_chance(score) > NON_MATE_WIN_THRESHOLD {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Is `pair.best` the only reasonable continuation?
    pub async fn is_valid_attack(
        &mut self,
        pair: &NextMovePair<E::Position>,
    ) -> Result<bool, EngineError> {
        let Some(second) = &pair.second else {
            return Ok(true);
        };
        if self.is_valid_mate_in_one(pair).await? {
            return Ok(true);
        }
        Ok(win_chance(pair.best.score) > win_chance(second.score) + ATTACK_MARGIN)
    }

    /// Probe the next pair; on the winner's turn, require a forcing best move.
    pub(crate) async fn next_pair(
        &mut self,
        position: &E::Position,
        winner: Color,
    ) -> Result<Option<NextMovePair<E::Position>>, EngineError> {
        let Some(pair) = probe(&mut self.engine, position, winner, &self.config.pair_limit).await?
        else {
            debug!("Engine returned no line");
            return Ok(None);
        };
        if position.turn() == winner && !self.is_valid_attack(&pair).await? {
            debug!(best = %pair.best.score, second = ?pair.second.as_ref().map(|s| s.score), "No valid attack");
            return Ok(None);
        }
        Ok(Some(pair))
    }
}
