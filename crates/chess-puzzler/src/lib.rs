//! Tactical puzzle extraction from evaluation-annotated games.
//!
//! A [`Generator`] walks a [`GameRecord`], looks for evaluation swings and
//! short mates, and cooks each candidate into a line that is forced at every
//! decision of the solving side. The engine, the rules and the output are
//! capabilities ([`Engine`], [`Position`], [`PuzzleSink`]) so the extraction
//! logic runs the same against Stockfish or a scripted test double.

pub mod chess_position;
pub mod engine;
pub mod position;
pub mod puzzle;
pub mod record;
pub mod score;
pub mod sink;

pub use chess_position::ChessPosition;
pub use engine::{CandidateMove, Engine, EngineError, Limit};
pub use position::Position;
pub use puzzle::{Analysis, Generator, GeneratorConfig, NextMovePair, Puzzle};
pub use record::{GameRecord, Ply, RecordError};
pub use score::{win_chance, PovScore, Score};
pub use sink::{MemorySink, PuzzleSink, SinkError};
