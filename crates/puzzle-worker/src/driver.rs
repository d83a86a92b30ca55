//! Game loop: read, filter, analyse, submit.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use chess_core::{AnnotatedGame, GameFilter, PgnGames};
use chess_puzzler::puzzle::Puzzle;
use chess_puzzler::{ChessPosition, Engine, GameRecord, Generator, PuzzleSink};
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::sink::JsonlSink;
use crate::stockfish::StockfishEngine;
use crate::VERSION;

pub type StockfishGenerator = Generator<StockfishEngine, JsonlSink<File>>;

/// Analyse one game and submit its puzzle, if any.
pub async fn process_game<E, W>(
    generator: &mut Generator<E, JsonlSink<W>>,
    game: &AnnotatedGame,
    tier: u8,
    source: &str,
) -> Result<Option<Puzzle<ChessPosition>>, WorkerError>
where
    E: Engine<Position = ChessPosition>,
    W: Write,
{
    let game_id = game.id();
    if generator.sink().is_game_seen(game_id) {
        debug!(game_id, "Game already seen");
        return Ok(None);
    }

    let record = GameRecord::from_annotated(game)?;
    let Some(puzzle) = generator.analyze_game(&record, tier).await? else {
        return Ok(None);
    };

    generator.sink_mut().submit(game_id, &puzzle, source)?;
    Ok(Some(puzzle))
}

/// Scan every file matching the configured pattern. Returns the number of
/// puzzles written; `games` counts the accepted games read so far.
pub async fn run(
    config: &WorkerConfig,
    generator: &mut StockfishGenerator,
    games: &AtomicU64,
) -> Result<u64, WorkerError> {
    let filter = GameFilter::new(config.players.clone());
    let mut skipped = 0;
    let mut puzzles = 0;

    info!("Skipping first {} games", config.skip);

    for entry in glob::glob(&config.files)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Unreadable path");
                continue;
            }
        };
        let source = config.source_label(&path);
        let pgn = match PgnGames::open(&path, filter.clone()) {
            Ok(pgn) => pgn,
            Err(e) => {
                error!(file = %path.display(), error = %e, "Cannot open PGN");
                continue;
            }
        };
        info!(file = %path.display(), source = %source, "Reading games");

        for (i, game) in pgn.enumerate() {
            let game = match game {
                Ok(game) => game,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "PGN read failed, skipping rest of file");
                    break;
                }
            };

            let read = games.fetch_add(1, Ordering::Relaxed) + 1;
            if read % 1000 == 0 {
                info!("{read} games read");
            }
            if skipped < config.skip {
                skipped += 1;
                continue;
            }

            match process_game(generator, &game, config.tier, &source).await {
                Ok(Some(_)) => {
                    puzzles += 1;
                    info!(
                        "v{VERSION} {} {} knps, tier {}, game {i}",
                        path.display(),
                        generator.engine_mut().avg_knps(),
                        config.tier
                    );
                    println!("Game: {}", game.id());
                }
                Ok(None) => {}
                Err(e) => error!("Exception on {}: {e}", game.id()),
            }
        }
    }

    Ok(puzzles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{AnnotatedMove, Eval, GameHeaders};
    use chess_puzzler::puzzle::MATE_RATING;
    use chess_puzzler::{CandidateMove, EngineError, GeneratorConfig, Limit, Score};

    use crate::sink::PuzzleRecord;

    /// Answers every search with the same lines.
    struct CannedEngine {
        lines: Vec<(&'static str, Score)>,
        calls: usize,
    }

    impl Engine for CannedEngine {
        type Position = ChessPosition;

        async fn analyse(
            &mut self,
            position: &ChessPosition,
            multipv: usize,
            _limit: &Limit,
        ) -> Result<Vec<CandidateMove<shakmaty::Move>>, EngineError> {
            self.calls += 1;
            Ok(self
                .lines
                .iter()
                .take(multipv)
                .filter_map(|(uci, score)| {
                    position.parse_uci(uci).map(|mv| CandidateMove { mv, score: *score })
                })
                .collect())
        }

        async fn play(
            &mut self,
            _position: &ChessPosition,
            _limit: &Limit,
        ) -> Result<Option<shakmaty::Move>, EngineError> {
            Ok(None)
        }
    }

    fn generator(
        lines: Vec<(&'static str, Score)>,
    ) -> Generator<CannedEngine, JsonlSink<Vec<u8>>> {
        Generator::new(
            CannedEngine { lines, calls: 0 },
            JsonlSink::new(Vec::new(), VERSION),
            GeneratorConfig::default(),
        )
    }

    fn game(moves: &[(&str, Option<Eval>)]) -> AnnotatedGame {
        AnnotatedGame {
            headers: GameHeaders {
                site: Some("https://lichess.org/fool1234".to_string()),
                white: "alice".to_string(),
                black: "bob".to_string(),
                ..Default::default()
            },
            moves: moves
                .iter()
                .map(|(san, eval)| AnnotatedMove {
                    san: san.to_string(),
                    eval: *eval,
                })
                .collect(),
        }
    }

    fn fools_mate() -> AnnotatedGame {
        game(&[
            ("f3", Some(Eval::Cp(-40))),
            ("e5", Some(Eval::Cp(-50))),
            ("g4", Some(Eval::Mate(-1))),
            ("Qh4#", None),
        ])
    }

    #[tokio::test]
    async fn test_puzzle_is_written() {
        let mut gen = generator(vec![("d8h4", Score::Mate(1))]);

        let puzzle = process_game(&mut gen, &fools_mate(), 10, "test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(puzzle.cp, MATE_RATING);
        assert_eq!(puzzle.moves.len(), 1);

        let output = String::from_utf8(gen.sink().writer().clone()).unwrap();
        let record: PuzzleRecord = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(record.game_id, "fool1234");
        assert_eq!(record.moves, vec!["d8h4"]);
        assert_eq!(
            record.fen,
            "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2"
        );
        assert_eq!(record.generator, "48WC");
        assert!(gen.sink().is_game_seen("fool1234"));
    }

    #[tokio::test]
    async fn test_seen_game_is_skipped() {
        let mut gen = generator(vec![("d8h4", Score::Mate(1))]);
        gen.sink_mut().mark_seen("fool1234");

        let puzzle = process_game(&mut gen, &fools_mate(), 10, "test").await.unwrap();

        assert!(puzzle.is_none());
        assert_eq!(gen.engine_mut().calls, 0);
    }

    #[tokio::test]
    async fn test_illegal_move_is_an_error() {
        let mut gen = generator(Vec::new());
        let broken = game(&[("e4", Some(Eval::Cp(20))), ("Ke3", Some(Eval::Cp(300)))]);

        let result = process_game(&mut gen, &broken, 10, "test").await;

        assert!(matches!(result, Err(WorkerError::Record(_))));
    }

    #[tokio::test]
    async fn test_game_without_evals_yields_nothing() {
        let mut gen = generator(vec![("d8h4", Score::Mate(1))]);
        let bare = game(&[("f3", None), ("e5", None), ("g4", None), ("Qh4#", None)]);

        let puzzle = process_game(&mut gen, &bare, 10, "test").await.unwrap();

        assert!(puzzle.is_none());
        assert!(gen.sink().writer().is_empty());
    }
}
