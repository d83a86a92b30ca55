#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chess_puzzler::{CandidateMove, Engine, EngineError, Limit, Ply, Position, PovScore, Score};
use shakmaty::Color;

/// Position double: a node in a tree of move labels.
///
/// The path of labels from the root identifies the node, so scripts can
/// attach legal-move counts, keys and engine answers to any line.
#[derive(Clone, Debug)]
pub struct FakePosition {
    path: Vec<String>,
    world: Arc<World>,
}

#[derive(Debug)]
pub struct World {
    start_turn: Color,
    legal_moves: HashMap<String, usize>,
    game_over: HashSet<String>,
    repeated: HashSet<String>,
    material: HashMap<String, i32>,
    irreversible: HashSet<String>,
    lost_castling: HashSet<String>,
    keys: HashMap<String, String>,
    /// Path length of every position whose legal moves were counted
    counted: Mutex<Vec<usize>>,
}

/// Builder for the [`World`] a [`FakePosition`] tree lives in.
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            world: World {
                start_turn: Color::White,
                legal_moves: HashMap::new(),
                game_over: HashSet::new(),
                repeated: HashSet::new(),
                material: HashMap::new(),
                irreversible: HashSet::new(),
                lost_castling: HashSet::new(),
                keys: HashMap::new(),
                counted: Mutex::new(Vec::new()),
            },
        }
    }

    pub fn legal_moves(mut self, path: &str, count: usize) -> Self {
        self.world.legal_moves.insert(path.to_string(), count);
        self
    }

    pub fn game_over(mut self, path: &str) -> Self {
        self.world.game_over.insert(path.to_string());
        self
    }

    pub fn repeated(mut self, path: &str) -> Self {
        self.world.repeated.insert(path.to_string());
        self
    }

    /// White's material lead at `path`, in pawns.
    pub fn material(mut self, path: &str, white_lead: i32) -> Self {
        self.world.material.insert(path.to_string(), white_lead);
        self
    }

    pub fn irreversible(mut self, mv: &str) -> Self {
        self.world.irreversible.insert(mv.to_string());
        self
    }

    pub fn lost_castling(mut self, path: &str) -> Self {
        self.world.lost_castling.insert(path.to_string());
        self
    }

    pub fn key(mut self, path: &str, key: &str) -> Self {
        self.world.keys.insert(path.to_string(), key.to_string());
        self
    }

    pub fn root(self) -> FakePosition {
        FakePosition {
            path: Vec::new(),
            world: Arc::new(self.world),
        }
    }
}

impl FakePosition {
    pub fn path(&self) -> String {
        self.path.join(" ")
    }

    /// Path lengths of the positions whose legal moves were counted, in order.
    pub fn counted(&self) -> Vec<usize> {
        self.world.counted.lock().unwrap().clone()
    }
}

impl Position for FakePosition {
    type Move = String;

    fn turn(&self) -> Color {
        if self.path.len() % 2 == 0 {
            self.world.start_turn
        } else {
            !self.world.start_turn
        }
    }

    fn legal_move_count(&self) -> usize {
        self.world.counted.lock().unwrap().push(self.path.len());
        self.world.legal_moves.get(&self.path()).copied().unwrap_or(5)
    }

    fn is_game_over(&self) -> bool {
        self.world.game_over.contains(&self.path())
    }

    fn is_repetition(&self, _count: usize) -> bool {
        self.world.repeated.contains(&self.path())
    }

    fn is_irreversible(&self, mv: &String) -> bool {
        self.world.irreversible.contains(mv)
    }

    fn castling_rights(&self) -> u64 {
        if self.world.lost_castling.contains(&self.path()) {
            0b0001
        } else {
            0b1111
        }
    }

    fn max_castling_rights(&self) -> u64 {
        0b1111
    }

    fn play(&self, mv: &String) -> Self {
        let mut path = self.path.clone();
        path.push(mv.clone());
        Self {
            path,
            world: Arc::clone(&self.world),
        }
    }

    fn key(&self) -> String {
        let path = self.path();
        self.world.keys.get(&path).cloned().unwrap_or(path)
    }

    fn material_diff(&self, color: Color) -> i32 {
        let white = self.world.material.get(&self.path()).copied().unwrap_or(0);
        match color {
            Color::White => white,
            Color::Black => -white,
        }
    }
}

/// Engine double answering from canned lines keyed by position path.
///
/// Scores are given from the side to move, as a real engine reports them.
#[derive(Default)]
pub struct ScriptedEngine {
    lines: HashMap<String, Vec<(String, Score)>>,
    replies: HashMap<String, String>,
    pub analysed: Vec<String>,
    pub played: Vec<String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(mut self, path: &str, lines: &[(&str, Score)]) -> Self {
        self.lines.insert(
            path.to_string(),
            lines.iter().map(|(mv, score)| (mv.to_string(), *score)).collect(),
        );
        self
    }

    pub fn reply(mut self, path: &str, mv: &str) -> Self {
        self.replies.insert(path.to_string(), mv.to_string());
        self
    }
}

impl Engine for ScriptedEngine {
    type Position = FakePosition;

    async fn analyse(
        &mut self,
        position: &FakePosition,
        multipv: usize,
        _limit: &Limit,
    ) -> Result<Vec<CandidateMove<String>>, EngineError> {
        let path = position.path();
        let lines = self
            .lines
            .get(&path)
            .map(|lines| {
                lines
                    .iter()
                    .take(multipv)
                    .map(|(mv, score)| CandidateMove { mv: mv.clone(), score: *score })
                    .collect()
            })
            .unwrap_or_default();
        self.analysed.push(path);
        Ok(lines)
    }

    async fn play(
        &mut self,
        position: &FakePosition,
        _limit: &Limit,
    ) -> Result<Option<String>, EngineError> {
        let path = position.path();
        let reply = self.replies.get(&path).cloned();
        self.played.push(path);
        Ok(reply)
    }
}

/// Move labels `m1`..`mN`.
pub fn moves(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("m{i}")).collect()
}

/// Path of the position after the first `ply` labels of [`moves`].
pub fn path_after(ply: usize) -> String {
    moves(ply).join(" ")
}

/// Plies annotated with a level White evaluation, except where `missing`.
pub fn level_plies(count: usize, missing: &[usize]) -> Vec<Ply<String>> {
    moves(count)
        .into_iter()
        .enumerate()
        .map(|(i, mv)| Ply {
            mv,
            eval: (!missing.contains(&(i + 1))).then(|| PovScore::white(Score::Cp(0))),
        })
        .collect()
}
