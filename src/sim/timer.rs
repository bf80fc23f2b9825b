//! Tick-advanced countdown timers
//!
//! Every delayed effect in a match (respawn, power expiry, invulnerability,
//! item spawning, goal celebration, message clearing) is a `Countdown` that
//! the tick advances. Nothing is scheduled outside the tick.

use serde::{Deserialize, Serialize};

/// A decrementing millisecond counter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining_ms: f32,
}

impl Countdown {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            remaining_ms: duration_ms,
        }
    }

    /// A countdown that is not running
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    pub fn is_running(&self) -> bool {
        self.remaining_ms > 0.0
    }

    /// Advance by `dt_ms`; returns true on the tick that reaches zero
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.remaining_ms -= dt_ms;
        self.remaining_ms <= 0.0
    }

    pub fn restart(&mut self, duration_ms: f32) {
        self.remaining_ms = duration_ms;
    }

    pub fn stop(&mut self) {
        self.remaining_ms = 0.0;
    }
}
