//! Worker configuration from command-line flags and environment variables

use std::env;
use std::path::PathBuf;

use crate::error::WorkerError;

const DEFAULT_ENGINE: &str = "stockfish";
const DEFAULT_THREADS: usize = 4;
const DEFAULT_OUTPUT: &str = "puzzles.jsonl";
const DEFAULT_TIER: u8 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Glob pattern of the PGN files to scan
    pub files: String,

    /// Path to the UCI engine binary
    pub engine_path: String,

    /// Engine search threads
    pub threads: usize,

    /// Filtered games to pass over before analysing
    pub skip: u64,

    /// JSON-lines puzzle output
    pub output: PathBuf,

    pub tier: u8,

    /// `-v` count; 2 or more enables debug logs
    pub verbose: u8,

    /// Only games involving one of these players
    pub players: Option<Vec<String>>,
}

impl WorkerConfig {
    /// Load configuration from process arguments, falling back to
    /// environment variables for the engine, threads and output.
    pub fn load<I>(args: I) -> Result<Self, WorkerError>
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse(args, |key| env::var(key).ok())
    }

    pub fn parse<I, F>(args: I, env: F) -> Result<Self, WorkerError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut files = None;
        let mut engine_path = env("STOCKFISH_PATH");
        let mut threads = env("ENGINE_THREADS")
            .map(|v| parse_number("ENGINE_THREADS", &v))
            .transpose()?;
        let mut output = env("PUZZLE_OUTPUT").map(PathBuf::from);
        let mut skip = 0;
        let mut tier = DEFAULT_TIER;
        let mut verbose: u8 = 0;
        let mut players: Option<Vec<String>> = None;

        let mut args = args.into_iter().peekable();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--file" | "-f" => files = Some(value(&arg, args.next())?),
                "--engine" | "-e" => engine_path = Some(value(&arg, args.next())?),
                "--threads" | "-t" => threads = Some(parse_number(&arg, &value(&arg, args.next())?)?),
                "--skip" => skip = parse_number(&arg, &value(&arg, args.next())?)?,
                "--output" | "-o" => output = Some(PathBuf::from(value(&arg, args.next())?)),
                "--tier" => tier = parse_number(&arg, &value(&arg, args.next())?)?,
                "--players" => {
                    let list = players.get_or_insert_with(Vec::new);
                    while let Some(player) = args.next_if(|a| !a.starts_with('-')) {
                        list.push(player);
                    }
                }
                "--verbose" => verbose = verbose.saturating_add(1),
                flag if flag.starts_with("-v") && flag[1..].chars().all(|c| c == 'v') => {
                    let count = u8::try_from(flag.len() - 1).unwrap_or(u8::MAX);
                    verbose = verbose.saturating_add(count);
                }
                other => return Err(WorkerError::Config(format!("Unknown argument: {other}"))),
            }
        }

        let files = files.ok_or_else(|| WorkerError::Config("--file is required".into()))?;

        Ok(Self {
            files,
            engine_path: engine_path.unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
            threads: threads.unwrap_or(DEFAULT_THREADS),
            skip,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            tier,
            verbose,
            players,
        })
    }

    /// Label stored with each puzzle: the player list, or the file name.
    pub fn source_label(&self, file: &std::path::Path) -> String {
        match &self.players {
            Some(players) => players.join("_"),
            None => file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "?".to_string()),
        }
    }
}

fn value(flag: &str, next: Option<String>) -> Result<String, WorkerError> {
    next.ok_or_else(|| WorkerError::Config(format!("{flag} needs a value")))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, WorkerError> {
    raw.parse()
        .map_err(|_| WorkerError::Config(format!("{name}: not a number: {raw}")))
}
