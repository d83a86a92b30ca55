use std::time::Duration;

use crate::engine::{Engine, Limit};
use crate::sink::PuzzleSink;

/// Search bounds used while cooking lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Top-two probes and the mate-in-one recheck
    pub pair_limit: Limit,
    /// Defender replies inside a mate line
    pub mate_defense_limit: Limit,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pair_limit: Limit::new(50, Duration::from_secs(30), 30_000_000),
            mate_defense_limit: Limit::new(15, Duration::from_secs(10), 10_000_000),
        }
    }
}

/// Owns the engine and the dedup sink for a run.
///
/// The analysis operations live next to the stage they implement:
/// attack validation in [`super::attack`], line cooking in [`super::cook`],
/// per-ply and per-game scanning in [`super::extraction`].
pub struct Generator<E, S> {
    pub(crate) engine: E,
    pub(crate) sink: S,
    pub(crate) config: GeneratorConfig,
}

impl<E, S> Generator<E, S>
where
    E: Engine,
    S: PuzzleSink<E::Position>,
{
    pub fn new(engine: E, sink: S, config: GeneratorConfig) -> Self {
        Self {
            engine,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (E, S) {
        (self.engine, self.sink)
    }
}
