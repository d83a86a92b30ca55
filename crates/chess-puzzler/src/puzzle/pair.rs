//! Top-two engine lines at a position.

use shakmaty::Color;

use crate::engine::{CandidateMove, Engine, EngineError, Limit};
use crate::position::Position;

/// The best and runner-up moves at `position`, scored for `winner`.
#[derive(Debug, Clone)]
pub struct NextMovePair<P: Position> {
    pub position: P,
    pub winner: Color,
    pub best: CandidateMove<P::Move>,
    /// Absent when the engine found a single legal continuation
    pub second: Option<CandidateMove<P::Move>>,
}

/// Ask the engine for its two best lines and express them for `winner`.
///
/// Returns `None` when the engine produced no line at all.
pub async fn probe<E: Engine>(
    engine: &mut E,
    position: &E::Position,
    winner: Color,
    limit: &Limit,
) -> Result<Option<NextMovePair<E::Position>>, EngineError> {
    let turn = position.turn();
    let mut lines = engine.analyse(position, 2, limit).await?.into_iter();

    let Some(best) = lines.next() else {
        return Ok(None);
    };
    let second = lines.next();

    Ok(Some(NextMovePair {
        position: position.clone(),
        winner,
        best: best.pov(turn, winner),
        second: second.map(|line| line.pov(turn, winner)),
    }))
}
