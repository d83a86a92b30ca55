//! PGN reading for evaluation-annotated games.
//!
//! Games are streamed with `pgn-reader`; headers are checked against a
//! [`GameFilter`] before any movetext is decoded, so rejected games cost
//! almost nothing. Lichess-style `[%eval ...]` comments are attached to the
//! move they follow.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::LazyLock;

use pgn_reader::{RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use thiserror::Error;

use crate::filter::GameFilter;
use crate::game_data::{AnnotatedGame, AnnotatedMove, Eval, GameHeaders};

static EVAL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[%eval\s+([^\s\],]+)").ok());

#[derive(Error, Debug)]
pub enum PgnError {
    #[error("PGN read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract the evaluation from a PGN comment body, if it carries one.
pub fn parse_eval_comment(comment: &str) -> Option<Eval> {
    let cap = EVAL_RE.as_ref()?.captures(comment)?;
    Eval::parse(cap.get(1)?.as_str())
}

/// Visitor that turns accepted games into [`AnnotatedGame`]s.
struct GameCollector {
    filter: GameFilter,
    /// Games whose headers were read, accepted or not
    scanned: u64,
}

impl Visitor for GameCollector {
    type Tags = GameHeaders;
    type Movetext = AnnotatedGame;
    type Output = Option<AnnotatedGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameHeaders> {
        ControlFlow::Continue(GameHeaders::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameHeaders,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().into_owned();
        match name {
            b"Site" => tags.site = Some(value),
            b"White" => tags.white = value,
            b"Black" => tags.black = value,
            b"WhiteTitle" => tags.white_title = Some(value),
            b"BlackTitle" => tags.black_title = Some(value),
            b"Variant" => tags.variant = Some(value),
            b"Result" => tags.result = value,
            b"FEN" => tags.fen = Some(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameHeaders) -> ControlFlow<Self::Output, AnnotatedGame> {
        self.scanned += 1;
        if !self.filter.accepts(&tags) {
            return ControlFlow::Break(None);
        }
        ControlFlow::Continue(AnnotatedGame {
            headers: tags,
            moves: Vec::new(),
        })
    }

    fn san(&mut self, game: &mut AnnotatedGame, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        game.moves.push(AnnotatedMove {
            san: san_plus.to_string(),
            eval: None,
        });
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        game: &mut AnnotatedGame,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = String::from_utf8_lossy(comment.as_bytes());
        if let Some(eval) = parse_eval_comment(&text) {
            if let Some(last) = game.moves.last_mut() {
                last.eval.get_or_insert(eval);
            }
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _game: &mut AnnotatedGame) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, game: AnnotatedGame) -> Self::Output {
        Some(game)
    }
}

/// Streaming iterator over the accepted games of a PGN source.
pub struct PgnGames<R: Read> {
    reader: Reader<R>,
    collector: GameCollector,
}

impl PgnGames<Box<dyn Read>> {
    /// Open a PGN file, decompressing it on the fly when the name ends in
    /// `.zst` (the format of the Lichess database dumps).
    pub fn open(path: &Path, filter: GameFilter) -> Result<Self, PgnError> {
        let file = File::open(path)?;
        let source: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "zst") {
            Box::new(zstd::stream::read::Decoder::new(file)?)
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(source, filter))
    }
}

impl<R: Read> PgnGames<R> {
    pub fn new(source: R, filter: GameFilter) -> Self {
        Self {
            reader: Reader::new(source),
            collector: GameCollector { filter, scanned: 0 },
        }
    }

    /// Number of games seen so far, including filtered ones.
    pub fn scanned(&self) -> u64 {
        self.collector.scanned
    }
}

impl<R: Read> Iterator for PgnGames<R> {
    type Item = Result<AnnotatedGame, PgnError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_game(&mut self.collector) {
                Ok(Some(Some(game))) => return Some(Ok(game)),
                Ok(Some(None)) => continue,
                Ok(None) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
