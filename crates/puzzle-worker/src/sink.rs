//! JSON-lines puzzle output with in-memory deduplication

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chess_puzzler::chess_position::uci;
use chess_puzzler::puzzle::Puzzle;
use chess_puzzler::{ChessPosition, Position, PuzzleSink, SinkError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One line of the output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub game_id: String,
    /// Position before the first solution move
    pub fen: String,
    /// Solution in UCI notation
    pub moves: Vec<String>,
    pub cp: i32,
    pub source: String,
    pub generator: String,
}

/// Appends each puzzle as a JSON object and remembers what it has seen.
pub struct JsonlSink<W: Write> {
    writer: W,
    version: String,
    seen_positions: HashSet<String>,
    seen_games: HashSet<String>,
}

impl JsonlSink<File> {
    /// Open `path` for appending. Puzzles already in the file count as seen,
    /// so a restarted run does not emit them again.
    pub fn open(path: &Path, version: &str) -> Result<Self, SinkError> {
        let mut seen_positions = HashSet::new();
        let mut seen_games = HashSet::new();

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: PuzzleRecord = match serde_json::from_str(&line) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(error = %e, "Ignoring unreadable puzzle line");
                        continue;
                    }
                };
                if let Ok(position) = ChessPosition::from_fen(&record.fen) {
                    seen_positions.insert(position.key());
                }
                seen_games.insert(record.game_id);
            }
            info!(puzzles = seen_positions.len(), path = %path.display(), "Loaded existing puzzles");
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: file,
            version: version.to_string(),
            seen_positions,
            seen_games,
        })
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W, version: &str) -> Self {
        Self {
            writer,
            version: version.to_string(),
            seen_positions: HashSet::new(),
            seen_games: HashSet::new(),
        }
    }

    pub fn is_game_seen(&self, game_id: &str) -> bool {
        self.seen_games.contains(game_id)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> PuzzleSink<ChessPosition> for JsonlSink<W> {
    fn is_seen(&self, position: &ChessPosition) -> bool {
        self.seen_positions.contains(&position.key())
    }

    fn mark_seen(&mut self, game_id: &str) {
        self.seen_games.insert(game_id.to_string());
    }

    fn submit(
        &mut self,
        game_id: &str,
        puzzle: &Puzzle<ChessPosition>,
        source: &str,
    ) -> Result<(), SinkError> {
        let record = PuzzleRecord {
            game_id: game_id.to_string(),
            fen: puzzle.position.fen(),
            moves: puzzle.moves.iter().map(uci).collect(),
            cp: puzzle.cp,
            source: source.to_string(),
            generator: self.version.clone(),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;

        self.seen_positions.insert(puzzle.position.key());
        self.seen_games.insert(game_id.to_string());
        Ok(())
    }
}
