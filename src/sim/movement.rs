//! Movement intents
//!
//! Moves are applied the moment they arrive, between ticks: position first,
//! then player vs player, player vs ball, and finally item pickup.

use glam::Vec2;

use super::collision::{resolve_box_box, resolve_box_circle};
use super::geometry::clamp_to_field;
use super::state::{MatchEvent, MatchPhase, MatchState};
use crate::consts::*;

/// Validate a raw movement intent
///
/// Non-finite input is rejected, each axis is clamped to `[-1, 1]`. Diagonals
/// are not normalized.
pub fn sanitize_intent(dx: f32, dy: f32) -> Option<Vec2> {
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    Some(Vec2::new(dx.clamp(-1.0, 1.0), dy.clamp(-1.0, 1.0)))
}

/// Apply a movement intent for player `id`, returns false when ignored
pub fn apply_move(state: &mut MatchState, id: &str, intent: Vec2) -> bool {
    if !state.phase.is_live() {
        return false;
    }
    let Some(idx) = state.player_index(id) else {
        return false;
    };
    if state.players[idx].is_respawning() {
        return false;
    }

    let player = &mut state.players[idx];
    player.body.vel = intent * player.speed;
    player.body.pos = clamp_to_field(player.body.pos + player.body.vel, PLAYER_SIZE);

    collide_with_players(state, idx);

    // The ball stays frozen during the goal celebration
    if !matches!(state.phase, MatchPhase::GoalPause { .. }) {
        let player = &mut state.players[idx];
        let mut circle = state.ball.circle();
        if resolve_box_circle(player.square(), &mut circle, Some(&mut player.body)).is_some() {
            state.ball.apply_circle(&circle);
        }
    }

    collect_items(state, idx);
    true
}

fn collide_with_players(state: &mut MatchState, idx: usize) {
    for other in 0..state.players.len() {
        if other == idx || state.players[other].is_respawning() {
            continue;
        }

        let mut a = state.players[idx].fighter();
        let mut b = state.players[other].fighter();
        let Some(contact) = resolve_box_box(&mut a, &mut b) else {
            continue;
        };

        state.players[idx].apply_fighter(&a);
        state.players[other].apply_fighter(&b);

        for (hit, victim) in [(contact.a_damaged, idx), (contact.b_damaged, other)] {
            if hit {
                let victim = &state.players[victim];
                log::debug!("{} spiked, hp now {}", victim.id, victim.hp);
            }
        }
    }
}

/// Consume every item within reach of the player's corner
fn collect_items(state: &mut MatchState, idx: usize) {
    let pos = state.players[idx].body.pos;
    let mut collected = Vec::new();
    state.items.retain(|item| {
        if item.pos.distance(pos) < PICKUP_RADIUS {
            collected.push(item.kind);
            false
        } else {
            true
        }
    });

    // Lowest index wins when several items are reached at once
    for kind in collected.into_iter().rev() {
        let player = &mut state.players[idx];
        player.grant_power(kind);
        log::debug!("{} picked up {:?}", player.id, kind);
        let event = MatchEvent::ItemCollected {
            player: player.id.clone(),
            kind,
        };
        state.push_event(event);
    }
}
