//! Match state and core entity types
//!
//! Everything the simulation mutates lives in one owned `MatchState`. The
//! engine passes it by reference into every operation; there is no global
//! or static state.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Fighter;
use super::geometry::{Body, Circle, Square};
use super::timer::Countdown;
use crate::consts::*;
use crate::{centered_player_pos, field_center};

/// Lifecycle phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchPhase {
    /// Zero or one player, no physics
    Lobby,
    /// Two players present, waiting for both to ready up
    WaitingForReady,
    /// Active gameplay
    Playing,
    /// Goal celebration: ball frozen, further goals suppressed
    GoalPause { pause: Countdown },
}

impl MatchPhase {
    /// True while ticks advance physics (including the goal celebration)
    pub fn is_live(&self) -> bool {
        matches!(self, MatchPhase::Playing | MatchPhase::GoalPause { .. })
    }
}

/// Half of the field a player defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn color(self) -> TeamColor {
        match self {
            Side::Left => TeamColor::Blue,
            Side::Right => TeamColor::Red,
        }
    }

    /// Top-left spawn position for a player on this side
    pub fn spawn_pos(self) -> Vec2 {
        let x = match self {
            Side::Left => LEFT_SPAWN_X,
            Side::Right => FIELD_SIZE - RIGHT_SPAWN_INSET,
        };
        Vec2::new(x, FIELD_SIZE / 2.0 - PLAYER_SIZE / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Blue,
    Red,
}

impl TeamColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamColor::Blue => "blue",
            TeamColor::Red => "red",
        }
    }
}

/// Power-up types (also the item types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerKind {
    Speed,
    Spikes,
}

/// A timed power attached to a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub kind: PowerKind,
    pub remaining: Countdown,
}

/// A player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub color: TeamColor,
    /// Top-left corner of the player box and its last move velocity
    pub body: Body,
    pub hp: u32,
    /// Current speed (base speed, or boosted by the speed power)
    pub speed: f32,
    pub score: u32,
    pub power: Option<Power>,
    /// Present while the player is knocked out
    pub respawn: Option<Countdown>,
    /// Spike invulnerability window
    pub invulnerable: Countdown,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, side: Side) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            side,
            color: side.color(),
            body: Body {
                pos: side.spawn_pos(),
                vel: Vec2::ZERO,
            },
            hp: MAX_HP,
            speed: BASE_SPEED,
            score: 0,
            power: None,
            respawn: None,
            invulnerable: Countdown::idle(),
        }
    }

    /// A player with a running respawn timer is not on the field
    pub fn is_respawning(&self) -> bool {
        self.respawn.is_some_and(|t| t.is_running())
    }

    pub fn square(&self) -> Square {
        Square::new(self.body.pos, PLAYER_SIZE)
    }

    pub fn fighter(&self) -> Fighter {
        Fighter {
            square: self.square(),
            hp: self.hp,
            spiked: self.power.is_some_and(|p| p.kind == PowerKind::Spikes),
            invulnerable_ms: self.invulnerable.remaining_ms(),
        }
    }

    /// Copy a resolved fighter back onto the player
    pub fn apply_fighter(&mut self, fighter: &Fighter) {
        self.body.pos = fighter.square.pos;
        self.hp = fighter.hp;
        self.invulnerable = Countdown::new(fighter.invulnerable_ms);
    }

    /// Acquire a power, replacing any previous one
    ///
    /// Spikes leave the current speed alone; a boost picked up earlier lasts
    /// until the spikes expire.
    pub fn grant_power(&mut self, kind: PowerKind) {
        self.power = Some(Power {
            kind,
            remaining: Countdown::new(POWER_DURATION_MS),
        });
        if kind == PowerKind::Speed {
            self.speed = BASE_SPEED * SPEED_MULTIPLIER;
        }
    }

    pub fn clear_power(&mut self) {
        self.power = None;
        self.speed = BASE_SPEED;
    }

    /// Bring a knocked-out player back at the field center
    pub fn respawn(&mut self) {
        self.hp = MAX_HP;
        self.body = Body {
            pos: centered_player_pos(),
            vel: Vec2::ZERO,
        };
        self.respawn = None;
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: field_center(),
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
        }
    }
}

impl Ball {
    pub fn circle(&self) -> Circle {
        Circle {
            pos: self.pos,
            vel: self.vel,
            radius: self.radius,
        }
    }

    pub fn apply_circle(&mut self, circle: &Circle) {
        self.pos = circle.pos;
        self.vel = circle.vel;
    }

    /// Back to the center, at rest
    pub fn reset(&mut self) {
        *self = Ball::default();
    }
}

/// A power-up lying on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerKind,
}

/// Notable things that happened, drained by the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatchEvent {
    PlayerJoined { id: String, color: TeamColor },
    /// Both seats taken, waiting for both players to ready up
    WaitingForReady,
    /// Roster cleared (third join or explicit reset)
    RosterReset,
    MatchStarted,
    PlayerLeft { id: String },
    GoalScored { scorer: String, score: u32 },
    PlayerKnockedOut { id: String },
    PlayerRespawned { id: String },
    ItemSpawned { id: u32, kind: PowerKind },
    ItemCollected { player: String, kind: PowerKind },
    PowerExpired { player: String, kind: PowerKind },
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub phase: MatchPhase,
    /// Players in join order (at most two)
    pub players: Vec<Player>,
    pub ball: Ball,
    pub items: Vec<Item>,
    /// Players that pressed start
    pub ready: BTreeSet<String>,
    pub message: String,
    pub confetti: bool,
    /// Countdown to the next item spawn
    pub item_spawn: Countdown,
    /// Seconds left before each knocked-out player respawns
    pub respawn_seconds: BTreeMap<String, f32>,
    /// Clears a flashed message unless it was replaced
    message_clear: Countdown,
    rng: Pcg32,
    next_id: u32,
    events: Vec<MatchEvent>,
}

impl MatchState {
    /// Create an empty lobby with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phase: MatchPhase::Lobby,
            players: Vec::new(),
            ball: Ball::default(),
            items: Vec::new(),
            ready: BTreeSet::new(),
            message: String::new(),
            confetti: false,
            item_spawn: Countdown::new(ITEM_SPAWN_MS),
            respawn_seconds: BTreeMap::new(),
            message_clear: Countdown::idle(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Allocate a new item ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_index(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player_on_side(&self, side: Side) -> Option<&Player> {
        self.players.iter().find(|p| p.side == side)
    }

    pub fn player_on_side_mut(&mut self, side: Side) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.side == side)
    }

    /// Side for the next player to join
    pub fn free_side(&self) -> Side {
        match self.players.first() {
            Some(p) => p.side.other(),
            None => Side::Left,
        }
    }

    /// Set a persistent message
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = text.into();
        self.message_clear.stop();
    }

    /// Set a message that clears itself after `ttl_ms` unless replaced
    pub fn flash_message(&mut self, text: impl Into<String>, ttl_ms: f32) {
        self.message = text.into();
        self.message_clear.restart(ttl_ms);
    }

    pub fn clear_message(&mut self) {
        self.set_message(String::new());
    }

    /// Advance the message-clear countdown
    pub fn advance_message(&mut self, dt_ms: f32) {
        if self.message_clear.advance(dt_ms) {
            self.message.clear();
        }
    }

    pub fn push_event(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild the respawn projection from the per-player timers
    pub fn refresh_respawn_projection(&mut self) {
        self.respawn_seconds = self
            .players
            .iter()
            .filter_map(|p| {
                p.respawn
                    .map(|t| (p.id.clone(), (t.remaining_ms() / 1000.0).max(0.0)))
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_and_spawns() {
        assert_eq!(Side::Left.spawn_pos(), Vec2::new(60.0, 230.0));
        assert_eq!(Side::Right.spawn_pos(), Vec2::new(400.0, 230.0));
        assert_eq!(Side::Left.color(), TeamColor::Blue);
        assert_eq!(Side::Right.color().as_str(), "red");
    }

    #[test]
    fn test_power_overwrites_previous() {
        let mut player = Player::new("a", "Ana", Side::Left);
        player.grant_power(PowerKind::Speed);
        assert_eq!(player.speed, BASE_SPEED * SPEED_MULTIPLIER);

        player.grant_power(PowerKind::Spikes);
        let power = player.power.expect("power");
        assert_eq!(power.kind, PowerKind::Spikes);
        assert_eq!(power.remaining.remaining_ms(), POWER_DURATION_MS);
        assert_eq!(player.speed, BASE_SPEED * SPEED_MULTIPLIER);
        assert!(player.fighter().spiked);

        player.clear_power();
        assert_eq!(player.speed, BASE_SPEED);
    }

    #[test]
    fn test_spikes_keep_base_speed() {
        let mut player = Player::new("a", "Ana", Side::Left);
        player.grant_power(PowerKind::Spikes);
        assert_eq!(player.speed, BASE_SPEED);
    }

    #[test]
    fn test_respawn_resets_player() {
        let mut player = Player::new("a", "Ana", Side::Right);
        player.hp = 0;
        player.body.vel = Vec2::new(5.0, -5.0);
        player.respawn = Some(Countdown::new(RESPAWN_MS));
        assert!(player.is_respawning());

        player.respawn();
        assert_eq!(player.hp, MAX_HP);
        assert_eq!(player.body.pos, Vec2::new(230.0, 230.0));
        assert_eq!(player.body.vel, Vec2::ZERO);
        assert!(!player.is_respawning());
    }

    #[test]
    fn test_flash_message_clears_unless_replaced() {
        let mut state = MatchState::new(1);
        state.flash_message("hello", 100.0);
        state.advance_message(100.0);
        assert!(state.message.is_empty());

        state.flash_message("hello", 100.0);
        state.set_message("replaced");
        state.advance_message(200.0);
        assert_eq!(state.message, "replaced");
    }

    #[test]
    fn test_free_side_follows_remaining_player() {
        let mut state = MatchState::new(1);
        assert_eq!(state.free_side(), Side::Left);
        state.players.push(Player::new("b", "Bo", Side::Right));
        assert_eq!(state.free_side(), Side::Left);
        state.players[0] = Player::new("a", "Ana", Side::Left);
        assert_eq!(state.free_side(), Side::Right);
    }
}
