//! Engine scores and the win-chance curve.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use chess_core::Eval;
use serde::{Deserialize, Serialize};
use shakmaty::Color;

/// Logistic slope of the win-chance curve (lichess accuracy model).
const WIN_CHANCE_MULTIPLIER: f64 = -0.003_682_08;

/// An engine score relative to one side.
///
/// Ordering: positive mates rank highest (shorter first), then centipawns by
/// value, then non-positive mates. Among those a longer defence ranks above a
/// shorter one and `Mate(0)` (already mated) is the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

impl Score {
    /// Mates closer than this are trusted as genuine.
    pub const MATE_SOON: Score = Score::Mate(15);

    pub fn cp(self) -> Option<i32> {
        match self {
            Score::Cp(cp) => Some(cp),
            Score::Mate(_) => None,
        }
    }

    pub fn mate(self) -> Option<i32> {
        match self {
            Score::Mate(n) => Some(n),
            Score::Cp(_) => None,
        }
    }

    fn rank(self) -> (bool, bool, i64, i64) {
        match self {
            Score::Mate(n) => (n > 0, false, -i64::from(n), 0),
            Score::Cp(cp) => (false, true, 0, i64::from(cp)),
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        match self {
            Score::Cp(cp) => Score::Cp(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }
}

impl From<Eval> for Score {
    fn from(eval: Eval) -> Score {
        match eval {
            Eval::Cp(cp) => Score::Cp(cp),
            Eval::Mate(n) => Score::Mate(n),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "{cp:+}cp"),
            Score::Mate(n) => write!(f, "#{n}"),
        }
    }
}

/// A score together with the side it is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PovScore {
    pub score: Score,
    pub color: Color,
}

impl PovScore {
    pub fn new(score: Score, color: Color) -> Self {
        Self { score, color }
    }

    pub fn white(score: Score) -> Self {
        Self::new(score, Color::White)
    }

    /// The same evaluation seen from `color`.
    pub fn pov(self, color: Color) -> Score {
        if color == self.color {
            self.score
        } else {
            -self.score
        }
    }
}

/// Winning chances in `[-1, 1]` for the side the score is relative to.
///
/// Mates saturate at ±1 regardless of distance; centipawns follow a logistic
/// curve through the origin.
pub fn win_chance(score: Score) -> f64 {
    match score {
        Score::Mate(n) if n > 0 => 1.0,
        Score::Mate(_) => -1.0,
        Score::Cp(cp) => 2.0 / (1.0 + (WIN_CHANCE_MULTIPLIER * f64::from(cp)).exp()) - 1.0,
    }
}
