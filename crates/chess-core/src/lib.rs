//! Annotated game records and PGN reading.

pub mod filter;
pub mod game_data;
pub mod pgn;

pub use filter::GameFilter;
pub use game_data::{AnnotatedGame, AnnotatedMove, Eval, GameHeaders};
pub use pgn::{PgnError, PgnGames};
