//! Deduplication and output capability.

use std::collections::HashSet;

use thiserror::Error;

use crate::position::Position;
use crate::puzzle::Puzzle;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where puzzles go, and what has already been produced.
pub trait PuzzleSink<P: Position> {
    /// Whether a puzzle starting from this position already exists.
    fn is_seen(&self, position: &P) -> bool;

    /// Record that a game has been scanned for advantage puzzles.
    fn mark_seen(&mut self, game_id: &str);

    fn submit(&mut self, game_id: &str, puzzle: &Puzzle<P>, source: &str)
        -> Result<(), SinkError>;
}

#[derive(Debug, Clone)]
pub struct SubmittedPuzzle<P: Position> {
    pub game_id: String,
    pub source: String,
    pub puzzle: Puzzle<P>,
}

/// In-process sink: remembers everything, writes nothing.
#[derive(Debug, Clone)]
pub struct MemorySink<P: Position> {
    seen_positions: HashSet<String>,
    seen_games: HashSet<String>,
    submitted: Vec<SubmittedPuzzle<P>>,
}

impl<P: Position> Default for MemorySink<P> {
    fn default() -> Self {
        Self {
            seen_positions: HashSet::new(),
            seen_games: HashSet::new(),
            submitted: Vec::new(),
        }
    }
}

impl<P: Position> MemorySink<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_seen_position(&mut self, position: &P) {
        self.seen_positions.insert(position.key());
    }

    pub fn is_game_seen(&self, game_id: &str) -> bool {
        self.seen_games.contains(game_id)
    }

    pub fn submitted(&self) -> &[SubmittedPuzzle<P>] {
        &self.submitted
    }
}

impl<P: Position> PuzzleSink<P> for MemorySink<P> {
    fn is_seen(&self, position: &P) -> bool {
        self.seen_positions.contains(&position.key())
    }

    fn mark_seen(&mut self, game_id: &str) {
        self.seen_games.insert(game_id.to_string());
    }

    fn submit(
        &mut self,
        game_id: &str,
        puzzle: &Puzzle<P>,
        source: &str,
    ) -> Result<(), SinkError> {
        self.seen_positions.insert(puzzle.position.key());
        self.submitted.push(SubmittedPuzzle {
            game_id: game_id.to_string(),
            source: source.to_string(),
            puzzle: puzzle.clone(),
        });
        Ok(())
    }
}
