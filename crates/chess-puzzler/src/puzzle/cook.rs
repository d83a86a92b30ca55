//! Line cooking: extend a candidate tactic move by move until it is either
//! proven or refuted.
//!
//! Both cookers walk the line iteratively and own their position, so the
//! caller's position is never touched and long forced lines cost no stack.

use shakmaty::Color;
use tracing::debug;

use super::generator::Generator;
use super::pair::NextMovePair;
use crate::engine::{Engine, EngineError};
use crate::position::Position;
use crate::score::Score;
use crate::sink::PuzzleSink;

/// Advantage lines must stay at least this good for the winner.
pub const DECISIVE_ADVANTAGE: Score = Score::Cp(200);

impl<E, S> Generator<E, S>
where
    E: Engine,
    S: PuzzleSink<E::Position>,
{
    /// Follow a forced mate for `winner` until the game ends.
    ///
    /// Returns `None` as soon as an attacking move is not forcing, the mate
    /// drifts past [`Score::MATE_SOON`], or the defender has no reply.
    pub async fn cook_mate(
        &mut self,
        mut position: E::Position,
        winner: Color,
    ) -> Result<Option<Vec<<E::Position as Position>::Move>>, EngineError> {
        let mut line = Vec::new();

        while !position.is_game_over() {
            let mv = if position.turn() == winner {
                let Some(pair) = self.next_pair(&position, winner).await? else {
                    return Ok(None);
                };
                if pair.best.score < Score::MATE_SOON {
                    debug!(score = %pair.best.score, "Best move is not a mate, we're probably not searching deep enough");
                    return Ok(None);
                }
                pair.best.mv
            } else {
                let limit = self.config.mate_defense_limit;
                match self.engine.play(&position, &limit).await? {
                    Some(mv) => mv,
                    None => return Ok(None),
                }
            };

            position = position.play(&mv);
            line.push(mv);
        }

        Ok(Some(line))
    }

    /// Follow a winning advantage for `winner` while every attacking move
    /// stays forcing.
    ///
    /// A non-forcing position ends the line successfully; a repetition or a
    /// score below [`DECISIVE_ADVANTAGE`] refutes it.
    pub async fn cook_advantage(
        &mut self,
        mut position: E::Position,
        winner: Color,
    ) -> Result<Option<Vec<NextMovePair<E::Position>>>, EngineError> {
        let mut line = Vec::new();

        loop {
            if position.is_repetition(2) {
                debug!("Found repetition, canceling");
                return Ok(None);
            }

            let Some(pair) = self.next_pair(&position, winner).await? else {
                return Ok(Some(line));
            };
            if pair.best.score < DECISIVE_ADVANTAGE {
                debug!(score = %pair.best.score, "Not winning enough, aborting");
                return Ok(None);
            }

            position = position.play(&pair.best.mv);
            line.push(pair);
        }
    }
}

/// Drop trailing pairs until the line ends on a genuine attacker choice:
/// odd length, last pair with a runner-up.
pub fn trim_advantage_line<P: Position>(mut line: Vec<NextMovePair<P>>) -> Vec<NextMovePair<P>> {
    while let Some(last) = line.last() {
        if line.len() % 2 == 1 && last.second.is_some() {
            break;
        }
        if last.second.is_none() {
            debug!("Remove final only-move");
        }
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CandidateMove;
    use crate::chess_position::ChessPosition;

    fn pair(second: bool, cp: i32) -> NextMovePair<ChessPosition> {
        let position = ChessPosition::default();
        let mv = position.parse_uci("e2e4").unwrap();
        let alt = position.parse_uci("d2d4").unwrap();
        NextMovePair {
            position,
            winner: Color::White,
            best: CandidateMove { mv, score: Score::Cp(cp) },
            second: second.then(|| CandidateMove { mv: alt, score: Score::Cp(0) }),
        }
    }

    #[test]
    fn test_trim_even_tail() {
        let line = vec![pair(true, 500), pair(true, 450), pair(true, 400), pair(false, 380)];
        let trimmed = trim_advantage_line(line);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[2].best.score, Score::Cp(400));
    }

    #[test]
    fn test_trim_only_move_tail() {
        // odd length but the last attacker move had no alternative
        let line = vec![pair(true, 500), pair(true, 450), pair(true, 420), pair(true, 400), pair(false, 380)];
        let trimmed = trim_advantage_line(line);
        assert_eq!(trimmed.len(), 3);
        assert!(trimmed.last().unwrap().second.is_some());
    }

    #[test]
    fn test_trim_keeps_valid_line() {
        let line = vec![pair(true, 500), pair(false, 450), pair(true, 400)];
        assert_eq!(trim_advantage_line(line).len(), 3);
    }

    #[test]
    fn test_trim_can_empty_the_line() {
        assert!(trim_advantage_line(vec![pair(false, 500)]).is_empty());
        assert!(trim_advantage_line(Vec::<NextMovePair<ChessPosition>>::new()).is_empty());
    }

    #[test]
    fn test_trimmed_lines_end_on_attacker_choice() {
        for len in 0..8 {
            for only_move_at in 0..=len {
                let line: Vec<_> = (0..len).map(|i| pair(i != only_move_at, 500)).collect();
                let trimmed = trim_advantage_line(line);
                if let Some(last) = trimmed.last() {
                    assert_eq!(trimmed.len() % 2, 1);
                    assert!(last.second.is_some());
                }
            }
        }
    }
}
