//! Match engine: the contract the transport layer talks to
//!
//! The transport feeds discrete events (`join`, `move_player`, `ready_up`,
//! `disconnect`) as messages arrive and calls `tick` on its own fixed
//! interval. Every call runs to completion on the caller's thread; the engine
//! never blocks, spawns or schedules anything.

use serde::Serialize;

use super::movement::{apply_move, sanitize_intent};
use super::snapshot::Snapshot;
use super::state::{MatchEvent, MatchPhase, MatchState, Player, Side, TeamColor};
use super::tick::tick;
use crate::consts::*;

/// Name used when a player joins without one
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub color: TeamColor,
    pub side: Side,
    /// The roster was full and had to be reset to seat this player
    pub reset: bool,
}

/// Result of a ready-up request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyOutcome {
    /// True once the match is running
    pub started: bool,
}

/// Single authoritative owner of one match
#[derive(Debug, Clone)]
pub struct MatchEngine {
    state: MatchState,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MatchEngine {
    /// Create an empty lobby; `seed` drives item spawning
    pub fn new(seed: u64) -> Self {
        Self {
            state: MatchState::new(seed),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    /// Seat a player, resetting the roster first if both seats are taken
    pub fn join(&mut self, id: &str, name: &str) -> JoinOutcome {
        let name = match name.trim() {
            "" => DEFAULT_PLAYER_NAME,
            trimmed => trimmed,
        };

        if let Some(player) = self.state.player_mut(id) {
            player.name = name.to_owned();
            return JoinOutcome {
                color: player.color,
                side: player.side,
                reset: false,
            };
        }

        let reset = self.state.players.len() >= MAX_PLAYERS;
        if reset {
            self.reset_roster("New player connected. Restarting match...");
        }

        let side = self.state.free_side();
        let player = Player::new(id, name, side);
        let color = player.color;
        self.state.players.push(player);

        log::info!("{} ({}) joined as {}", name, id, color.as_str());
        self.state.push_event(MatchEvent::PlayerJoined {
            id: id.to_owned(),
            color,
        });

        if self.state.players.len() == MAX_PLAYERS && self.state.phase == MatchPhase::Lobby {
            self.state.phase = MatchPhase::WaitingForReady;
            self.state
                .set_message("Both players connected, press start to kick off.");
            self.state.push_event(MatchEvent::WaitingForReady);
        }

        JoinOutcome { color, side, reset }
    }

    /// Apply a movement intent; ignored outside play or for unknown players
    pub fn move_player(&mut self, id: &str, dx: f32, dy: f32) -> bool {
        match sanitize_intent(dx, dy) {
            Some(intent) => apply_move(&mut self.state, id, intent),
            None => false,
        }
    }

    /// Mark a player ready; the match starts once both seats are ready
    pub fn ready_up(&mut self, id: &str) -> ReadyOutcome {
        if self.state.player(id).is_none() {
            return ReadyOutcome { started: false };
        }
        if self.state.phase.is_live() {
            return ReadyOutcome { started: true };
        }
        // Nobody to play against yet
        if self.state.players.len() < MAX_PLAYERS {
            return ReadyOutcome { started: false };
        }

        self.state.ready.insert(id.to_owned());
        let all_ready = self
            .state
            .players
            .iter()
            .all(|p| self.state.ready.contains(&p.id));

        if !all_ready {
            log::debug!("{} ready, waiting for opponent", id);
            return ReadyOutcome { started: false };
        }

        self.start_match();
        ReadyOutcome { started: true }
    }

    /// Remove a player; the match clock keeps running for the other one
    pub fn disconnect(&mut self, id: &str) -> bool {
        let Some(idx) = self.state.player_index(id) else {
            return false;
        };

        self.state.players.remove(idx);
        self.state.ready.remove(id);
        self.state.respawn_seconds.remove(id);
        if self.state.phase == MatchPhase::WaitingForReady {
            self.state.phase = MatchPhase::Lobby;
        }

        log::info!("{} disconnected", id);
        self.state.set_message("A player disconnected.");
        self.state
            .push_event(MatchEvent::PlayerLeft { id: id.to_owned() });
        true
    }

    /// Clear the roster and return to the lobby
    pub fn reset_lobby(&mut self) {
        self.reset_roster("Match reset. Waiting for players...");
    }

    /// Advance the simulation by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f32) {
        tick(&mut self.state, dt_ms);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Take the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.state.drain_events()
    }

    fn start_match(&mut self) {
        let state = &mut self.state;
        state.phase = MatchPhase::Playing;
        state.item_spawn.restart(ITEM_SPAWN_MS);
        state.items.clear();
        state.set_message("Kick-off!");

        log::info!("both players ready, match started");
        state.push_event(MatchEvent::MatchStarted);
    }

    fn reset_roster(&mut self, message: &str) {
        let state = &mut self.state;
        log::warn!("resetting match ({} players seated)", state.players.len());

        state.players.clear();
        state.items.clear();
        state.ready.clear();
        state.respawn_seconds.clear();
        state.ball.reset();
        state.confetti = false;
        state.item_spawn.restart(ITEM_SPAWN_MS);
        state.phase = MatchPhase::Lobby;
        state.set_message(message);
        state.push_event(MatchEvent::RosterReset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Item, PowerKind};
    use glam::Vec2;

    fn started_engine() -> MatchEngine {
        let mut engine = MatchEngine::new(11);
        engine.join("A", "Ana");
        engine.join("B", "Bo");
        engine.ready_up("A");
        assert!(engine.ready_up("B").started);
        engine.drain_events();
        engine
    }

    #[test]
    fn test_join_assigns_seats() {
        let mut engine = MatchEngine::new(1);

        let first = engine.join("A", "Ana");
        assert_eq!(first.color, TeamColor::Blue);
        assert_eq!(first.side, Side::Left);
        assert!(!first.reset);
        assert_eq!(engine.phase(), MatchPhase::Lobby);

        let second = engine.join("B", "Bo");
        assert_eq!(second.color, TeamColor::Red);
        assert_eq!(engine.phase(), MatchPhase::WaitingForReady);

        let snapshot = engine.snapshot();
        assert_eq!((snapshot.players["A"].x, snapshot.players["A"].y), (60.0, 230.0));
        assert_eq!((snapshot.players["B"].x, snapshot.players["B"].y), (400.0, 230.0));

        let events = engine.drain_events();
        assert_eq!(events.last(), Some(&MatchEvent::WaitingForReady));
    }

    #[test]
    fn test_blank_name_falls_back() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "   ");
        assert_eq!(engine.state().players[0].name, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_rejoin_keeps_seat() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "Ana");
        let again = engine.join("A", "Ana B");
        assert_eq!(again.side, Side::Left);
        assert_eq!(engine.player_count(), 1);
        assert_eq!(engine.state().players[0].name, "Ana B");
    }

    #[test]
    fn test_third_join_forces_reset() {
        let mut engine = started_engine();
        engine.state.items.push(Item {
            id: 9,
            pos: Vec2::new(100.0, 100.0),
            kind: PowerKind::Speed,
        });

        let outcome = engine.join("C", "Cy");
        assert!(outcome.reset);
        assert_eq!(outcome.color, TeamColor::Blue);
        assert_eq!(engine.player_count(), 1);
        assert_eq!(engine.phase(), MatchPhase::Lobby);
        assert!(engine.state().items.is_empty());
        assert!(engine.state().ready.is_empty());
        assert!(engine.drain_events().contains(&MatchEvent::RosterReset));
    }

    #[test]
    fn test_ready_up_waits_for_both() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "Ana");
        assert!(!engine.ready_up("A").started);

        engine.join("B", "Bo");
        assert!(!engine.ready_up("B").started);
        assert_eq!(engine.phase(), MatchPhase::WaitingForReady);

        assert!(engine.ready_up("A").started);
        assert_eq!(engine.phase(), MatchPhase::Playing);
        assert_eq!(engine.state().message, "Kick-off!");
        assert_eq!(engine.state().item_spawn.remaining_ms(), ITEM_SPAWN_MS);
        assert!(engine.drain_events().contains(&MatchEvent::MatchStarted));
    }

    #[test]
    fn test_ready_up_unknown_player() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "Ana");
        assert!(!engine.ready_up("ghost").started);
        assert!(engine.state().ready.is_empty());
    }

    #[test]
    fn test_moves_ignored_before_start() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "Ana");
        engine.join("B", "Bo");
        assert!(!engine.move_player("A", 1.0, 0.0));
        assert_eq!(engine.snapshot().players["A"].x, 60.0);
    }

    #[test]
    fn test_fifty_moves_right() {
        let mut engine = started_engine();
        // Keep the ball out of the lane
        engine.state.ball.pos = Vec2::new(250.0, 450.0);

        for _ in 0..50 {
            assert!(engine.move_player("A", 1.0, 0.0));
            let x = engine.snapshot().players["A"].x;
            assert!((0.0..=FIELD_SIZE - PLAYER_SIZE).contains(&x));
        }
        assert_eq!(engine.snapshot().players["A"].x, 310.0);
    }

    #[test]
    fn test_malformed_intent_ignored() {
        let mut engine = started_engine();
        assert!(!engine.move_player("A", f32::NAN, 1.0));
        assert_eq!(engine.snapshot().players["A"].y, 230.0);
    }

    #[test]
    fn test_knocked_out_player_cannot_move() {
        let mut engine = started_engine();
        engine.state.ball.pos = Vec2::new(100.0, 100.0);
        engine.state.players[0].hp = 0;

        engine.tick(NOMINAL_TICK_MS);
        assert!(!engine.move_player("A", 0.0, 1.0));
        assert_eq!(engine.snapshot().respawn["A"], 3.0);

        engine.tick(RESPAWN_MS);
        assert!(engine.move_player("A", 0.0, 1.0));
        let snapshot = engine.snapshot();
        let a = &snapshot.players["A"];
        assert_eq!(a.hp, MAX_HP);
        assert_eq!((a.x, a.y), (230.0, 235.0));
    }

    #[test]
    fn test_disconnect_keeps_match_running() {
        let mut engine = started_engine();
        engine.state.ball.vel = Vec2::new(2.0, 0.0);

        assert!(engine.disconnect("B"));
        assert!(!engine.disconnect("B"));
        assert_eq!(engine.phase(), MatchPhase::Playing);
        assert_eq!(engine.state().message, "A player disconnected.");

        engine.tick(NOMINAL_TICK_MS);
        assert!(engine.snapshot().ball.x > 250.0);
        assert!(engine.move_player("A", 0.0, 1.0));

        // Newcomer takes the free seat
        let outcome = engine.join("C", "Cy");
        assert!(!outcome.reset);
        assert_eq!(outcome.side, Side::Right);
    }

    #[test]
    fn test_disconnect_while_waiting_returns_to_lobby() {
        let mut engine = MatchEngine::new(1);
        engine.join("A", "Ana");
        engine.join("B", "Bo");
        engine.ready_up("A");
        engine.disconnect("A");
        assert_eq!(engine.phase(), MatchPhase::Lobby);
        assert!(engine.state().ready.is_empty());

        // The remaining player keeps the right seat, newcomer goes left
        let outcome = engine.join("C", "Cy");
        assert_eq!(outcome.side, Side::Left);
        assert_eq!(engine.phase(), MatchPhase::WaitingForReady);
    }

    #[test]
    fn test_reset_lobby() {
        let mut engine = started_engine();
        engine.state.confetti = true;
        engine.reset_lobby();
        assert_eq!(engine.phase(), MatchPhase::Lobby);
        assert_eq!(engine.player_count(), 0);
        assert!(!engine.snapshot().confetti);
    }

    #[test]
    fn test_goal_through_engine() {
        let mut engine = started_engine();
        engine.state.ball.pos = Vec2::new(10.0, 250.0);
        engine.tick(NOMINAL_TICK_MS);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.players["B"].score, 1);
        assert!(snapshot.confetti);

        engine.tick(GOAL_PAUSE_MS);
        let snapshot = engine.snapshot();
        assert!(!snapshot.confetti);
        assert_eq!(snapshot.message, "");
        assert_eq!((snapshot.ball.x, snapshot.ball.y), (250.0, 250.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Players stay on the field whatever they are told to do
            #[test]
            fn prop_players_stay_on_field(
                moves in proptest::collection::vec((0usize..2, -1i8..=1, -1i8..=1), 1..200)
            ) {
                let mut engine = started_engine();
                for (who, dx, dy) in moves {
                    let id = if who == 0 { "A" } else { "B" };
                    engine.move_player(id, dx as f32, dy as f32);
                    engine.tick(NOMINAL_TICK_MS);
                    for p in engine.snapshot().players.values() {
                        prop_assert!(p.x >= 0.0 && p.x <= FIELD_SIZE - PLAYER_SIZE);
                        prop_assert!(p.y >= 0.0 && p.y <= FIELD_SIZE - PLAYER_SIZE);
                    }
                }
            }
        }
    }
}
