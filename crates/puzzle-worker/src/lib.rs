//! Puzzle worker
//!
//! Scans PGN files with a local UCI engine and appends the puzzles it finds
//! to a JSON-lines file.

pub mod config;
pub mod driver;
pub mod error;
pub mod sink;
pub mod stockfish;

/// Generator version stored with every puzzle.
pub const VERSION: &str = "48WC";
