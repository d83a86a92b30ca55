/// Puzzle data model and the extraction pipeline

pub mod attack;
pub mod cook;
pub mod extraction;
pub mod generator;
pub mod pair;

use shakmaty::Color;

use crate::position::Position;
use crate::score::Score;

pub use generator::{Generator, GeneratorConfig};
pub use pair::NextMovePair;

/// Rating given to every mate puzzle.
pub const MATE_RATING: i32 = 999_999_999;

/// Rating of an advantage puzzle whose final score is not in centipawns.
pub const UNSCORED_ADVANTAGE_RATING: i32 = 999_999_998;

/// A position plus the forced line that solves it.
#[derive(Debug, Clone)]
pub struct Puzzle<P: Position> {
    /// Position before the first solution move
    pub position: P,
    /// Solver moves interleaved with the defender's replies
    pub moves: Vec<P::Move>,
    /// Priority: [`MATE_RATING`] for mates, final centipawns otherwise
    pub cp: i32,
}

impl<P: Position> Puzzle<P> {
    /// The side that plays the solution.
    pub fn solver(&self) -> Color {
        self.position.turn()
    }

    pub fn is_mate(&self) -> bool {
        self.cp == MATE_RATING
    }
}

/// Outcome of analysing one ply: a puzzle, or the score to carry forward.
#[derive(Debug, Clone)]
pub enum Analysis<P: Position> {
    Puzzle(Puzzle<P>),
    Score(Score),
}
