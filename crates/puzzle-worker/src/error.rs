//! Worker error types

use chess_core::PgnError;
use chess_puzzler::{EngineError, RecordError, SinkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Game record error: {0}")]
    Record(#[from] RecordError),

    #[error("PGN error: {0}")]
    Pgn(#[from] PgnError),

    #[error("Puzzle output error: {0}")]
    Sink(#[from] SinkError),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}
