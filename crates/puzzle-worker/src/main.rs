//! Puzzle Worker
//!
//! Reads evaluation-annotated PGN files and extracts tactical puzzles with a
//! local Stockfish.

use std::sync::atomic::{AtomicU64, Ordering};

use chess_puzzler::{Generator, GeneratorConfig};
use tracing::{info, Level};

use puzzle_worker::config::WorkerConfig;
use puzzle_worker::driver;
use puzzle_worker::sink::JsonlSink;
use puzzle_worker::stockfish::StockfishEngine;
use puzzle_worker::VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let config = WorkerConfig::load(std::env::args().skip(1))?;

    let level = if config.verbose >= 2 {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    println!("v{VERSION}");
    info!(
        engine = %config.engine_path,
        threads = config.threads,
        output = %config.output.display(),
        tier = config.tier,
        "Worker config loaded"
    );

    let engine = StockfishEngine::new(&config.engine_path, config.threads).await?;
    let sink = JsonlSink::open(&config.output, VERSION)?;
    let mut generator = Generator::new(engine, sink, GeneratorConfig::default());

    let games = AtomicU64::new(0);
    let interrupted = tokio::select! {
        result = driver::run(&config, &mut generator, &games) => {
            let puzzles = result?;
            info!(games = games.load(Ordering::Relaxed), puzzles, "All files scanned");
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    let (mut engine, _) = generator.into_parts();
    engine.quit().await;

    if interrupted {
        println!("v{VERSION} {} Game {}", config.files, games.load(Ordering::Relaxed));
        std::process::exit(1);
    }
    Ok(())
}
