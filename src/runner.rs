//! Fixed-step driver for the match engine
//!
//! The transport wakes the runner with wall-clock elapsed time; the runner
//! converts it into whole ticks of `tick_ms` so the simulation always sees
//! the same step size.

use crate::settings::Settings;
use crate::sim::MatchEngine;

pub struct Runner {
    engine: MatchEngine,
    accumulator: f32,
    tick_ms: f32,
    max_substeps: u32,
    ticks: u64,
}

impl Runner {
    pub fn new(settings: &Settings) -> Self {
        let seed = settings.resolved_seed();
        log::info!(
            "Runner: tick {}ms, up to {} ticks per wake, seed {}",
            settings.tick_ms,
            settings.max_substeps,
            seed
        );
        Self {
            engine: MatchEngine::new(seed),
            accumulator: 0.0,
            tick_ms: settings.tick_ms,
            max_substeps: settings.max_substeps.max(1),
            ticks: 0,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchEngine {
        &mut self.engine
    }

    pub fn tick_ms(&self) -> f32 {
        self.tick_ms
    }

    /// Total ticks run since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Feed elapsed wall time and run as many whole ticks as fit.
    ///
    /// Returns the number of ticks run. Long stalls are dropped rather than
    /// replayed: at most `max_substeps` ticks of backlog are kept.
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0;
        }
        let backlog = self.tick_ms * self.max_substeps as f32;
        self.accumulator = (self.accumulator + elapsed_ms).min(backlog);

        let mut substeps = 0;
        while self.accumulator >= self.tick_ms && substeps < self.max_substeps {
            self.engine.tick(self.tick_ms);
            self.accumulator -= self.tick_ms;
            substeps += 1;
        }
        self.ticks += u64::from(substeps);
        substeps
    }
}
