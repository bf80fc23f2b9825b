//! Serializable projection of the match
//!
//! Field names follow what the browser client reads (`vx`, `powerTimer`,
//! `r`, item `type`), so the transport can send `to_json()` as-is.

use std::collections::BTreeMap;

use serde::Serialize;

use super::state::{MatchPhase, MatchState, Player, PowerKind, TeamColor};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hp: u32,
    pub color: TeamColor,
    pub speed: f32,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_timer: Option<f32>,
    pub invulnerable: bool,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            x: p.body.pos.x,
            y: p.body.pos.y,
            vx: p.body.vel.x,
            vy: p.body.vel.y,
            hp: p.hp,
            color: p.color,
            speed: p.speed,
            score: p.score,
            power: p.power.map(|power| power.kind),
            power_timer: p.power.map(|power| power.remaining.remaining_ms()),
            invulnerable: p.invulnerable.is_running(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: PowerKind,
}

/// Everything a client needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: MatchPhase,
    pub players: BTreeMap<String, PlayerSnapshot>,
    pub ball: BallSnapshot,
    pub items: Vec<ItemSnapshot>,
    pub message: String,
    pub confetti: bool,
    /// Seconds until each knocked-out player returns
    pub respawn: BTreeMap<String, f32>,
}

impl Snapshot {
    pub fn capture(state: &MatchState) -> Self {
        Self {
            phase: state.phase,
            players: state
                .players
                .iter()
                .map(|p| (p.id.clone(), PlayerSnapshot::from(p)))
                .collect(),
            ball: BallSnapshot {
                x: state.ball.pos.x,
                y: state.ball.pos.y,
                vx: state.ball.vel.x,
                vy: state.ball.vel.y,
                r: state.ball.radius,
            },
            items: state
                .items
                .iter()
                .map(|item| ItemSnapshot {
                    id: item.id,
                    x: item.pos.x,
                    y: item.pos.y,
                    kind: item.kind,
                })
                .collect(),
            message: state.message.clone(),
            confetti: state.confetti,
            respawn: state.respawn_seconds.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
