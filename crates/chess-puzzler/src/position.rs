//! The chess-rules capability consumed by the generator.

use std::fmt;

use shakmaty::Color;

/// Persistent handle on a game position.
///
/// [`Position::play`] returns a new value and never touches `self`, so a
/// speculative line can be explored and dropped without affecting the
/// position it started from.
pub trait Position: Clone + fmt::Debug {
    type Move: Clone + fmt::Debug;

    fn turn(&self) -> Color;

    fn legal_move_count(&self) -> usize;

    fn is_game_over(&self) -> bool;

    /// Whether the current position has occurred at least `count` times,
    /// counting itself.
    fn is_repetition(&self, count: usize) -> bool;

    /// Whether playing `mv` here makes every earlier position unreachable.
    fn is_irreversible(&self, mv: &Self::Move) -> bool;

    /// Current castling rights as a bitmask of rook squares.
    fn castling_rights(&self) -> u64;

    /// The rights the current piece placement could still carry.
    fn max_castling_rights(&self) -> u64;

    fn play(&self, mv: &Self::Move) -> Self;

    /// Canonical key identifying the position for repetition and dedup.
    fn key(&self) -> String;

    /// Material of `color` minus material of the opponent, in pawns.
    fn material_diff(&self, color: Color) -> i32;
}
