use serde::{Deserialize, Serialize};

/// Engine evaluation attached to a move, from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eval {
    /// Centipawns (positive = White better)
    Cp(i32),
    /// Mate in N moves (positive = White mates, negative = Black mates)
    Mate(i32),
}

impl Eval {
    /// Parse the value of a `[%eval ...]` annotation: `0.35`, `-1.2`, `#3`, `#-2`.
    pub fn parse(raw: &str) -> Option<Eval> {
        let raw = raw.trim();
        if let Some(mate) = raw.strip_prefix('#') {
            return mate.parse().ok().map(Eval::Mate);
        }
        let pawns: f64 = raw.parse().ok()?;
        if !pawns.is_finite() {
            return None;
        }
        Some(Eval::Cp((pawns * 100.0).round() as i32))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameHeaders {
    pub site: Option<String>,
    pub white: String,
    pub black: String,
    pub white_title: Option<String>,
    pub black_title: Option<String>,
    pub variant: Option<String>,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    /// Starting position when the game does not begin from the standard setup
    pub fen: Option<String>,
}

impl GameHeaders {
    /// Short game identifier: the last path segment of the Site header.
    pub fn game_id(&self) -> &str {
        match self.site.as_deref() {
            Some(site) => site
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(site),
            None => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedMove {
    pub san: String,
    pub eval: Option<Eval>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedGame {
    pub headers: GameHeaders,
    pub moves: Vec<AnnotatedMove>,
}

impl AnnotatedGame {
    pub fn id(&self) -> &str {
        self.headers.game_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eval() {
        assert_eq!(Eval::parse("0.35"), Some(Eval::Cp(35)));
        assert_eq!(Eval::parse("-1.2"), Some(Eval::Cp(-120)));
        assert_eq!(Eval::parse("12"), Some(Eval::Cp(1200)));
        assert_eq!(Eval::parse("#3"), Some(Eval::Mate(3)));
        assert_eq!(Eval::parse("#-2"), Some(Eval::Mate(-2)));
        assert_eq!(Eval::parse("abc"), None);
        assert_eq!(Eval::parse("#"), None);
    }

    #[test]
    fn test_game_id_from_site() {
        let headers = GameHeaders {
            site: Some("https://lichess.org/abcd1234".to_string()),
            ..Default::default()
        };
        assert_eq!(headers.game_id(), "abcd1234");

        let missing = GameHeaders::default();
        assert_eq!(missing.game_id(), "?");
    }
}
