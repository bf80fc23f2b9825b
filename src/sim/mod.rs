//! Authoritative match simulation
//!
//! All gameplay logic lives here. This module must stay single-threaded and
//! deterministic:
//! - Timers are countdowns advanced by the tick, never scheduled callbacks
//! - Seeded RNG only
//! - Stable iteration order (players in join order, items by id)
//! - No transport or rendering dependencies

pub mod collision;
pub mod engine;
pub mod geometry;
pub mod movement;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{BoxContact, Contact, Fighter, resolve_box_box, resolve_box_circle};
pub use engine::{JoinOutcome, MatchEngine, ReadyOutcome};
pub use geometry::{Body, Circle, Square};
pub use snapshot::Snapshot;
pub use state::{
    Ball, Item, MatchEvent, MatchPhase, MatchState, Player, Power, PowerKind, Side, TeamColor,
};
pub use tick::tick;
pub use timer::Countdown;
