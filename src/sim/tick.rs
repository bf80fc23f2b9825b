//! Fixed timestep simulation tick
//!
//! Advances the ball, every countdown and the item spawner in a fixed order.
//! Ball velocities are expressed per nominal tick, so the integration scales
//! with `dt / NOMINAL_TICK_MS` and a zero `dt` leaves the world untouched.

use rand::Rng;

use super::collision::resolve_box_circle;
use super::geometry::Circle;
use super::state::{Item, MatchEvent, MatchPhase, MatchState, PowerKind, Side};
use super::timer::Countdown;
use crate::clamp;
use crate::consts::*;

/// Advance the match by `dt_ms` milliseconds
pub fn tick(state: &mut MatchState, dt_ms: f32) {
    let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

    if !state.phase.is_live() {
        state.refresh_respawn_projection();
        return;
    }

    // Messages flashed during this tick keep their full lifetime
    state.advance_message(dt);
    advance_respawns(state, dt);

    // Ball is frozen while a goal is being celebrated
    if !matches!(state.phase, MatchPhase::GoalPause { .. }) {
        integrate_ball(state, dt);
    }

    update_goals(state, dt);
    knock_out_players(state);
    advance_powers(state, dt);
    spawn_items(state, dt);
    state.refresh_respawn_projection();
}

fn advance_respawns(state: &mut MatchState, dt: f32) {
    let mut respawned = Vec::new();
    for player in &mut state.players {
        let Some(timer) = player.respawn.as_mut() else {
            continue;
        };
        if timer.advance(dt) {
            player.respawn();
            respawned.push((player.id.clone(), player.name.clone()));
        }
    }

    for (id, name) in respawned {
        log::info!("{} respawned", id);
        state.flash_message(format!("{name} is back in the game"), RESPAWN_MESSAGE_MS);
        state.push_event(MatchEvent::PlayerRespawned { id });
    }
}

fn integrate_ball(state: &mut MatchState, dt: f32) {
    // No elapsed time, no contacts either
    if dt <= 0.0 {
        return;
    }
    let steps = dt / NOMINAL_TICK_MS;
    let substeps = BALL_SUBSTEPS as f32;
    let mut circle = state.ball.circle();

    for _ in 0..BALL_SUBSTEPS {
        circle.pos += circle.vel * steps / substeps;
        bounce_off_walls(&mut circle);

        for player in state.players.iter_mut().filter(|p| !p.is_respawning()) {
            resolve_box_circle(player.square(), &mut circle, Some(&mut player.body));
        }
    }

    circle.vel *= BALL_DAMPING.powf(steps);
    state.ball.apply_circle(&circle);
}

/// Reflect off the field walls, each axis independently
fn bounce_off_walls(circle: &mut Circle) {
    let lo = circle.radius;
    let hi = FIELD_SIZE - circle.radius;

    if circle.pos.x < lo || circle.pos.x > hi {
        circle.vel.x *= -WALL_BOUNCE;
        circle.pos.x = clamp(circle.pos.x, lo, hi);
    }
    if circle.pos.y < lo || circle.pos.y > hi {
        circle.vel.y *= -WALL_BOUNCE;
        circle.pos.y = clamp(circle.pos.y, lo, hi);
    }
}

fn update_goals(state: &mut MatchState, dt: f32) {
    match state.phase {
        MatchPhase::GoalPause { mut pause } => {
            if pause.advance(dt) {
                end_celebration(state);
            } else {
                state.phase = MatchPhase::GoalPause { pause };
            }
        }
        MatchPhase::Playing => {
            if let Some(side) = scoring_side(state) {
                score_goal(state, side);
            }
        }
        _ => {}
    }
}

/// Side of the player credited with a goal, if the ball is in a goal mouth
fn scoring_side(state: &MatchState) -> Option<Side> {
    let ball = &state.ball;
    let goal_top = FIELD_SIZE / 2.0 - GOAL_HEIGHT / 2.0;
    if !(ball.pos.y > goal_top && ball.pos.y < goal_top + GOAL_HEIGHT) {
        return None;
    }

    if ball.pos.x - ball.radius <= 0.0 {
        Some(Side::Right)
    } else if ball.pos.x + ball.radius >= FIELD_SIZE {
        Some(Side::Left)
    } else {
        None
    }
}

fn score_goal(state: &mut MatchState, side: Side) {
    if state.players.len() < MAX_PLAYERS {
        return;
    }
    let Some(scorer) = state.player_on_side_mut(side) else {
        return;
    };
    scorer.score += 1;
    let (id, score) = (scorer.id.clone(), scorer.score);

    log::info!("goal for {} ({:?} side), score {}", id, side, score);
    state.phase = MatchPhase::GoalPause {
        pause: Countdown::new(GOAL_PAUSE_MS),
    };
    state.set_message("GOAL!");
    state.confetti = true;
    state.push_event(MatchEvent::GoalScored { scorer: id, score });
}

fn end_celebration(state: &mut MatchState) {
    state.confetti = false;
    state.clear_message();
    state.ball.reset();
    state.phase = MatchPhase::Playing;
}

fn knock_out_players(state: &mut MatchState) {
    let mut knocked_out = Vec::new();
    for player in &mut state.players {
        if player.hp == 0 && player.respawn.is_none() {
            player.respawn = Some(Countdown::new(RESPAWN_MS));
            knocked_out.push((player.id.clone(), player.name.clone()));
        }
    }

    for (id, name) in knocked_out {
        log::info!("{} knocked out", id);
        state.set_message(format!("{name} was knocked out"));
        state.push_event(MatchEvent::PlayerKnockedOut { id });
    }
}

fn advance_powers(state: &mut MatchState, dt: f32) {
    let mut expired = Vec::new();
    for player in &mut state.players {
        player.invulnerable.advance(dt);

        let Some(power) = player.power.as_mut() else {
            continue;
        };
        if power.remaining.advance(dt) {
            let kind = power.kind;
            player.clear_power();
            expired.push((player.id.clone(), kind));
        }
    }

    for (player, kind) in expired {
        log::debug!("{} lost {:?}", player, kind);
        state.push_event(MatchEvent::PowerExpired { player, kind });
    }
}

fn spawn_items(state: &mut MatchState, dt: f32) {
    if !state.item_spawn.advance(dt) {
        return;
    }

    let rng = state.rng();
    let kind = if rng.random_bool(0.5) {
        PowerKind::Speed
    } else {
        PowerKind::Spikes
    };
    let x = rng.random_range(ITEM_MARGIN..FIELD_SIZE - ITEM_MARGIN);
    let y = rng.random_range(ITEM_MARGIN..FIELD_SIZE - ITEM_MARGIN);

    let id = state.next_entity_id();
    state.items.push(Item {
        id,
        pos: glam::Vec2::new(x, y),
        kind,
    });
    state.item_spawn.restart(ITEM_SPAWN_MS);

    log::debug!("spawned {:?} item {} at ({:.1}, {:.1})", kind, id, x, y);
    state.push_event(MatchEvent::ItemSpawned { id, kind });
}
