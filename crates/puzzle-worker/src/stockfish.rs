//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::process::Stdio;

use chess_puzzler::{CandidateMove, ChessPosition, Engine, EngineError, Limit, Score};
use shakmaty::Move;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

/// One `info` line of a running search
#[derive(Debug, Clone, PartialEq)]
pub struct InfoLine {
    /// 1-based line rank
    pub multipv: usize,
    pub score: Option<Score>,
    pub nps: Option<u64>,
    /// Principal variation in UCI notation
    pub pv: Vec<String>,
}

impl InfoLine {
    /// Parse an engine `info` line. Other output yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("info") {
            return None;
        }

        let mut info = InfoLine {
            multipv: 1,
            score: None,
            nps: None,
            pv: Vec::new(),
        };
        while let Some(token) = tokens.next() {
            match token {
                "multipv" => info.multipv = tokens.next()?.parse().ok()?,
                "nps" => info.nps = tokens.next().and_then(|v| v.parse().ok()),
                "score" => {
                    info.score = match (tokens.next(), tokens.next()) {
                        (Some("cp"), Some(v)) => v.parse().ok().map(Score::Cp),
                        (Some("mate"), Some(v)) => v.parse().ok().map(Score::Mate),
                        _ => None,
                    }
                }
                // string payloads run to the end of the line
                "string" => break,
                "pv" => {
                    info.pv = tokens.by_ref().map(str::to_string).collect();
                }
                _ => {}
            }
        }
        Some(info)
    }
}

/// Running average of the engine's reported speed.
#[derive(Debug, Default, Clone, Copy)]
pub struct KnpsAverage {
    total: u64,
    samples: u64,
}

impl KnpsAverage {
    pub fn record(&mut self, nps: u64) {
        self.total += nps / 1000;
        self.samples += 1;
    }

    pub fn get(&self) -> u64 {
        if self.samples == 0 {
            0
        } else {
            self.total / self.samples
        }
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    knps: KnpsAverage,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str, threads: usize) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Process(format!("Failed to spawn {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Process("engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::Process("engine stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            knps: KnpsAverage::default(),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine.send(&format!("setoption name Threads value {threads}")).await?;
        engine.send("setoption name Hash value 256").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Average search speed over every completed search, in knps
    pub fn avg_knps(&self) -> u64 {
        self.knps.get()
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next output line, trimmed. End of output means the engine died.
    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line).await? == 0 {
            return Err(EngineError::Process("engine closed its output".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            let line = self.read_line().await?;
            debug!(line = %line, "SF >");
            if line == expected {
                return Ok(());
            }
        }
    }

    /// Start a search and collect its `info` lines until `bestmove`.
    async fn search(
        &mut self,
        position: &ChessPosition,
        multipv: usize,
        limit: &Limit,
    ) -> Result<(Vec<InfoLine>, Option<String>), EngineError> {
        self.send(&format!("setoption name MultiPV value {multipv}")).await?;
        self.send(&position_command(position)).await?;
        self.send(&go_command(limit)).await?;

        let mut lines: Vec<Option<InfoLine>> = vec![None; multipv];
        let mut last_nps = None;
        loop {
            let line = self.read_line().await?;
            if let Some(info) = InfoLine::parse(&line) {
                last_nps = info.nps.or(last_nps);
                if info.score.is_some() && !info.pv.is_empty() {
                    if let Some(slot) = lines.get_mut(info.multipv.wrapping_sub(1)) {
                        *slot = Some(info);
                    }
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                if let Some(nps) = last_nps {
                    self.knps.record(nps);
                }
                let best = rest
                    .split_whitespace()
                    .next()
                    .filter(|mv| *mv != "(none)")
                    .map(str::to_string);
                return Ok((lines.into_iter().flatten().collect(), best));
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Engine for StockfishEngine {
    type Position = ChessPosition;

    async fn analyse(
        &mut self,
        position: &ChessPosition,
        multipv: usize,
        limit: &Limit,
    ) -> Result<Vec<CandidateMove<Move>>, EngineError> {
        let (lines, _) = self.search(position, multipv, limit).await?;
        lines
            .into_iter()
            .filter_map(|line| Some((line.pv.into_iter().next()?, line.score?)))
            .map(|(uci, score)| {
                position
                    .parse_uci(&uci)
                    .map(|mv| CandidateMove { mv, score })
                    .ok_or(EngineError::InvalidMove(uci))
            })
            .collect()
    }

    async fn play(
        &mut self,
        position: &ChessPosition,
        limit: &Limit,
    ) -> Result<Option<Move>, EngineError> {
        let (_, best) = self.search(position, 1, limit).await?;
        best.map(|uci| position.parse_uci(&uci).ok_or(EngineError::InvalidMove(uci)))
            .transpose()
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// `position` command replaying the game from its start, so the engine
/// knows the repetition history.
fn position_command(position: &ChessPosition) -> String {
    let mut cmd = format!("position fen {}", position.start_fen());
    if !position.moves().is_empty() {
        cmd.push_str(" moves");
        for mv in position.moves() {
            cmd.push(' ');
            cmd.push_str(&mv.to_string());
        }
    }
    cmd
}

fn go_command(limit: &Limit) -> String {
    let mut cmd = String::from("go");
    if let Some(depth) = limit.depth {
        cmd.push_str(&format!(" depth {depth}"));
    }
    if let Some(nodes) = limit.nodes {
        cmd.push_str(&format!(" nodes {nodes}"));
    }
    if let Some(time) = limit.time {
        cmd.push_str(&format!(" movetime {}", time.as_millis()));
    }
    if cmd == "go" {
        cmd.push_str(" infinite");
    }
    cmd
}
