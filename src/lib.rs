//! Tale Soccer - authoritative two-player soccer simulation
//!
//! Core modules:
//! - `sim`: Match engine (lifecycle, physics, collisions, timers, snapshots)
//! - `runner`: Fixed-step accumulator that feeds wall-clock time to the engine
//! - `settings`: Runtime settings for the headless server loop

pub mod runner;
pub mod settings;
pub mod sim;

pub use runner::Runner;
pub use settings::{Settings, SettingsError};
pub use sim::{MatchEngine, Snapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal tick length in milliseconds; velocities are expressed per nominal tick
    pub const NOMINAL_TICK_MS: f32 = 16.0;
    /// Ball integration substeps per tick
    pub const BALL_SUBSTEPS: u32 = 3;

    /// Square field side length
    pub const FIELD_SIZE: f32 = 500.0;
    /// Goal mouth height, centered vertically on the left and right walls
    pub const GOAL_HEIGHT: f32 = 100.0;

    /// Player box side length
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Base player speed (units per move)
    pub const BASE_SPEED: f32 = 5.0;
    pub const MAX_HP: u32 = 100;
    /// Spawn x of the left-side player; the right-side player spawns at FIELD_SIZE - 100
    pub const LEFT_SPAWN_X: f32 = 60.0;
    pub const RIGHT_SPAWN_INSET: f32 = 100.0;
    pub const MAX_PLAYERS: usize = 2;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Restitution for ball vs player contacts
    pub const RESTITUTION: f32 = 0.85;
    /// Share of the player's velocity handed to the ball on contact
    pub const KICK_TRANSFER: f32 = 0.4;
    /// Extra damping applied to the ball after a bounce off a player
    pub const CONTACT_DAMPING: f32 = 0.98;
    /// Global ball damping per nominal tick
    pub const BALL_DAMPING: f32 = 0.99;
    /// Wall bounce keeps 90% of the speed
    pub const WALL_BOUNCE: f32 = 0.9;
    /// Extra separation added when pushing the ball out of a player
    pub const SEPARATION_SLOP: f32 = 0.5;
    /// How far a player is pushed back when touching the ball
    pub const PLAYER_RECOIL: f32 = 1.0;

    /// Spikes
    pub const SPIKE_DAMAGE: u32 = 20;
    pub const INVULNERABLE_MS: f32 = 700.0;

    /// Power-ups
    pub const POWER_DURATION_MS: f32 = 10_000.0;
    pub const SPEED_MULTIPLIER: f32 = 1.75;
    pub const PICKUP_RADIUS: f32 = 30.0;
    pub const ITEM_SPAWN_MS: f32 = 20_000.0;
    pub const ITEM_MARGIN: f32 = 25.0;

    /// Lifecycle timers
    pub const RESPAWN_MS: f32 = 3_000.0;
    pub const GOAL_PAUSE_MS: f32 = 2_000.0;
    pub const RESPAWN_MESSAGE_MS: f32 = 1_500.0;
}

/// Clamp a value into `[lo, hi]`
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Center of the field
#[inline]
pub fn field_center() -> Vec2 {
    Vec2::splat(consts::FIELD_SIZE / 2.0)
}

/// Top-left corner that centers a player box on the field
#[inline]
pub fn centered_player_pos() -> Vec2 {
    Vec2::splat(consts::FIELD_SIZE / 2.0 - consts::PLAYER_SIZE / 2.0)
}
