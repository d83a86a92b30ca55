//! A game as the generator walks it: a start position and annotated plies.

use chess_core::AnnotatedGame;
use shakmaty::san::SanPlus;
use thiserror::Error;

use crate::chess_position::ChessPosition;
use crate::position::Position;
use crate::score::{PovScore, Score};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid starting FEN: {0}")]
    InvalidFen(String),

    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove { ply: usize, san: String },
}

/// One half-move and the evaluation of the position it leads to.
#[derive(Debug, Clone)]
pub struct Ply<M> {
    pub mv: M,
    pub eval: Option<PovScore>,
}

#[derive(Debug, Clone)]
pub struct GameRecord<P: Position> {
    pub id: String,
    pub start: P,
    pub plies: Vec<Ply<P::Move>>,
}

impl GameRecord<ChessPosition> {
    /// Replay the SAN movetext of an annotated game.
    pub fn from_annotated(game: &AnnotatedGame) -> Result<Self, RecordError> {
        let start = match game.headers.fen.as_deref() {
            Some(fen) => ChessPosition::from_fen(fen).map_err(RecordError::InvalidFen)?,
            None => ChessPosition::default(),
        };

        let mut position = start.clone();
        let mut plies = Vec::with_capacity(game.moves.len());
        for (i, annotated) in game.moves.iter().enumerate() {
            let illegal = || RecordError::IllegalMove {
                ply: i + 1,
                san: annotated.san.clone(),
            };
            let san: SanPlus = annotated.san.parse().map_err(|_| illegal())?;
            let mv = san.san.to_move(position.chess()).map_err(|_| illegal())?;
            position = position.play(&mv);
            plies.push(Ply {
                mv,
                eval: annotated.eval.map(|e| PovScore::white(Score::from(e))),
            });
        }

        Ok(Self {
            id: game.id().to_string(),
            start,
            plies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{AnnotatedMove, Eval, GameHeaders};
    use shakmaty::Color;

    fn game(moves: &[(&str, Option<Eval>)]) -> AnnotatedGame {
        AnnotatedGame {
            headers: GameHeaders {
                site: Some("https://lichess.org/xyz".to_string()),
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

    #[test]
    fn test_from_annotated() {
        let record = GameRecord::from_annotated(&game(&[
            ("e4", Some(Eval::Cp(30))),
            ("e5", Some(Eval::Cp(25))),
            ("Nf3", None),
        ]))
        .unwrap();

        assert_eq!(record.id, "xyz");
        assert_eq!(record.plies.len(), 3);
        let eval = record.plies[1].eval.unwrap();
        assert_eq!(eval.pov(Color::Black), Score::Cp(-25));
        assert!(record.plies[2].eval.is_none());
    }

    #[test]
    fn test_illegal_move_is_reported() {
        let err = GameRecord::from_annotated(&game(&[("e4", None), ("e4", None)])).unwrap_err();
        match err {
            RecordError::IllegalMove { ply, san } => {
                assert_eq!(ply, 2);
                assert_eq!(san, "e4");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_custom_start_position() {
        let mut g = game(&[("Ra8#", Some(Eval::Mate(0)))]);
        g.headers.fen = Some("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1".to_string());
        let record = GameRecord::from_annotated(&g).unwrap();
        assert_eq!(record.start.turn(), Color::White);
        assert_eq!(record.plies.len(), 1);
    }
}
