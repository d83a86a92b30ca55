//! Metadata filter deciding which games are worth scanning.

use crate::game_data::GameHeaders;

/// Accepts standard-variant games between humans, optionally restricted to
/// a set of players.
#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    players: Option<Vec<String>>,
}

impl GameFilter {
    pub fn new(players: Option<Vec<String>>) -> Self {
        Self {
            players: players.filter(|p| !p.is_empty()),
        }
    }

    pub fn accepts(&self, headers: &GameHeaders) -> bool {
        let variant = headers.variant.as_deref().unwrap_or("Standard");
        if variant != "Standard" {
            return false;
        }

        let white_title = headers.white_title.as_deref().unwrap_or("");
        let black_title = headers.black_title.as_deref().unwrap_or("");
        if white_title.contains("BOT") || black_title.contains("BOT") {
            return false;
        }

        match &self.players {
            Some(players) => players
                .iter()
                .any(|p| *p == headers.white || *p == headers.black),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(white: &str, black: &str) -> GameHeaders {
        GameHeaders {
            white: white.to_string(),
            black: black.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_standard_human_games() {
        let filter = GameFilter::default();
        assert!(filter.accepts(&headers("alice", "bob")));
    }

    #[test]
    fn test_rejects_variants_and_bots() {
        let filter = GameFilter::default();

        let mut chess960 = headers("alice", "bob");
        chess960.variant = Some("Chess960".to_string());
        assert!(!filter.accepts(&chess960));

        let mut bot = headers("alice", "stockfish-bot");
        bot.black_title = Some("BOT".to_string());
        assert!(!filter.accepts(&bot));
    }

    #[test]
    fn test_player_restriction() {
        let filter = GameFilter::new(Some(vec!["carol".to_string()]));
        assert!(filter.accepts(&headers("carol", "bob")));
        assert!(filter.accepts(&headers("alice", "carol")));
        assert!(!filter.accepts(&headers("alice", "bob")));
    }

    #[test]
    fn test_empty_player_list_means_everyone() {
        let filter = GameFilter::new(Some(vec![]));
        assert!(filter.accepts(&headers("alice", "bob")));
    }
}
