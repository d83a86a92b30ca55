//! The analysis-engine capability consumed by the generator.

use std::time::Duration;

use shakmaty::Color;
use thiserror::Error;

use crate::position::Position;
use crate::score::{PovScore, Score};

/// Errors from the external engine. These abort the current game only.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine process error: {0}")]
    Process(String),

    #[error("Engine returned an unusable move: {0}")]
    InvalidMove(String),
}

/// Search bound. Every field that is set applies; whichever is reached
/// first stops the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limit {
    pub depth: Option<u32>,
    pub time: Option<Duration>,
    pub nodes: Option<u64>,
}

impl Limit {
    pub const fn new(depth: u32, time: Duration, nodes: u64) -> Self {
        Self {
            depth: Some(depth),
            time: Some(time),
            nodes: Some(nodes),
        }
    }
}

/// A ranked engine line: the first move and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMove<M> {
    pub mv: M,
    pub score: Score,
}

impl<M> CandidateMove<M> {
    /// Re-express a side-to-move score from `pov`'s point of view.
    pub fn pov(self, side_to_move: Color, pov: Color) -> Self {
        Self {
            mv: self.mv,
            score: PovScore::new(self.score, side_to_move).pov(pov),
        }
    }
}

/// Multi-line position search.
///
/// Scores are relative to the side to move at `position`. Calls block the
/// caller until the limit elapses; no concurrent calls are made.
#[allow(async_fn_in_trait)]
pub trait Engine {
    type Position: Position;

    /// Up to `multipv` lines, best first. Terminal positions yield no lines.
    async fn analyse(
        &mut self,
        position: &Self::Position,
        multipv: usize,
        limit: &Limit,
    ) -> Result<Vec<CandidateMove<<Self::Position as Position>::Move>>, EngineError>;

    /// The single move the engine would play, if any.
    async fn play(
        &mut self,
        position: &Self::Position,
        limit: &Limit,
    ) -> Result<Option<<Self::Position as Position>::Move>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_pov() {
        let line = CandidateMove { mv: "e2e4", score: Score::Cp(80) };
        assert_eq!(line.clone().pov(Color::White, Color::White).score, Score::Cp(80));
        assert_eq!(line.pov(Color::Black, Color::White).score, Score::Cp(-80));

        let mate = CandidateMove { mv: "h5f7", score: Score::Mate(1) };
        assert_eq!(mate.pov(Color::Black, Color::White).score, Score::Mate(-1));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Process("engine exited".to_string());
        assert!(err.to_string().contains("engine exited"));
        let err = EngineError::InvalidMove("z9z9".to_string());
        assert!(err.to_string().contains("z9z9"));
    }
}
