//! [`Position`] implementation backed by shakmaty.

use std::sync::Arc;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, Position as _, Role, Square,
};

use crate::position::Position;

/// Plies without capture or pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// A standard chess position plus the history needed for repetition checks
/// and for replaying it to a UCI engine.
#[derive(Debug, Clone)]
pub struct ChessPosition {
    pos: Chess,
    start_fen: Arc<str>,
    /// Moves played since `start_fen`
    moves: Vec<UciMove>,
    /// Repetition keys of every position reached, current one last
    keys: Vec<Arc<str>>,
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl ChessPosition {
    pub fn new(pos: Chess) -> Self {
        let start_fen: Arc<str> = Fen::from_position(&pos, EnPassantMode::Legal)
            .to_string()
            .into();
        let key = normalized_fen(&pos).into();
        Self {
            pos,
            start_fen,
            moves: Vec::new(),
            keys: vec![key],
        }
    }

    /// Parse a FEN, rejecting illegal setups.
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let fen: Fen = fen.parse().map_err(|e| format!("{e}"))?;
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| format!("{e}"))?;
        Ok(Self::new(pos))
    }

    pub fn chess(&self) -> &Chess {
        &self.pos
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn moves(&self) -> &[UciMove] {
        &self.moves
    }

    /// Resolve a UCI move string against this position.
    pub fn parse_uci(&self, uci: &str) -> Option<Move> {
        let uci: UciMove = uci.parse().ok()?;
        uci.to_move(&self.pos).ok()
    }
}

/// UCI notation for a move, e.g. `e2e4`, `e7e8q`, `e1g1`.
pub fn uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// Board, side to move, castling and legal en passant square (EPD fields).
fn normalized_fen(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn material_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

impl Position for ChessPosition {
    type Move = Move;

    fn turn(&self) -> Color {
        self.pos.turn()
    }

    fn legal_move_count(&self) -> usize {
        self.pos.legal_moves().len()
    }

    fn is_game_over(&self) -> bool {
        self.pos.is_game_over()
            || self.pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES
            || self.is_repetition(5)
    }

    fn is_repetition(&self, count: usize) -> bool {
        match self.keys.last() {
            Some(current) => self.keys.iter().filter(|k| *k == current).count() >= count,
            None => false,
        }
    }

    fn is_irreversible(&self, mv: &Move) -> bool {
        if mv.is_zeroing() || self.pos.ep_square(EnPassantMode::Legal).is_some() {
            return true;
        }
        let mut after = self.pos.clone();
        after.play_unchecked(mv.clone());
        after.castles().castling_rights() != self.pos.castles().castling_rights()
    }

    fn castling_rights(&self) -> u64 {
        self.pos.castles().castling_rights().0
    }

    fn max_castling_rights(&self) -> u64 {
        let board = self.pos.board();
        let mut max = 0u64;
        if board.king_of(Color::White) == Some(Square::E1) {
            let corners = Bitboard::from(Square::A1) | Bitboard::from(Square::H1);
            max |= (board.rooks() & board.by_color(Color::White) & corners).0;
        }
        if board.king_of(Color::Black) == Some(Square::E8) {
            let corners = Bitboard::from(Square::A8) | Bitboard::from(Square::H8);
            max |= (board.rooks() & board.by_color(Color::Black) & corners).0;
        }
        max
    }

    fn play(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        next.moves.push(mv.to_uci(CastlingMode::Standard));
        next.pos.play_unchecked(mv.clone());
        next.keys.push(normalized_fen(&next.pos).into());
        next
    }

    fn key(&self) -> String {
        normalized_fen(&self.pos)
    }

    fn material_diff(&self, color: Color) -> i32 {
        let board = self.pos.board();
        let mut score = 0i32;
        for sq in board.occupied() {
            if let Some(piece) = board.piece_at(sq) {
                let val = material_value(piece.role);
                if piece.color == color {
                    score += val;
                } else {
                    score -= val;
                }
            }
        }
        score
    }
}
