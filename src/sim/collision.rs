//! Collision detection and response
//!
//! Two primitives drive the whole match: a player box against the ball
//! (separation, recoil and a restitution impulse) and a player box against
//! another player box (symmetric separation plus spike damage).

use glam::Vec2;

use super::geometry::{Body, Circle, Square, clamp_circle_to_field, clamp_to_field};
use crate::consts::*;

/// Contact details for a box vs circle hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the box toward the circle center
    pub normal: Vec2,
    /// Overlap before separation
    pub penetration: f32,
}

/// Resolve a circle overlapping a square
///
/// The circle is pushed out along the contact normal. When `body` is given it
/// is the box occupant: it recoils by one unit and its velocity is used both
/// for the approach test and as an extra kick on the circle.
pub fn resolve_box_circle(
    square: Square,
    circle: &mut Circle,
    mut body: Option<&mut Body>,
) -> Option<Contact> {
    let closest = square.closest_point(circle.pos);
    let delta = circle.pos - closest;
    let dist_sq = delta.length_squared();
    let radius = circle.radius;

    if dist_sq >= radius * radius {
        return None;
    }

    // Center inside the box leaves a zero normal; the circle is only clamped.
    let dist = match dist_sq.sqrt() {
        d if d > 0.0 => d,
        _ => 0.001,
    };
    let normal = delta / dist;
    let overlap = radius - dist;

    circle.pos += normal * (overlap + SEPARATION_SLOP);

    if let Some(body) = body.as_deref_mut() {
        body.pos = clamp_to_field(body.pos - normal * PLAYER_RECOIL, square.size);
    }

    let body_vel = body.map(|b| b.vel).unwrap_or(Vec2::ZERO);
    let rel_dot = (circle.vel - body_vel).dot(normal);

    // Only bounce when approaching
    if rel_dot < 0.0 {
        let impulse = -(1.0 + RESTITUTION) * rel_dot;
        circle.vel += normal * impulse;
        circle.vel += body_vel * KICK_TRANSFER;
        circle.vel *= CONTACT_DAMPING;
    }

    circle.pos = clamp_circle_to_field(circle.pos, radius);

    Some(Contact {
        normal,
        penetration: overlap,
    })
}

/// A player box as seen by the box vs box primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fighter {
    pub square: Square,
    pub hp: u32,
    /// Spikes power active
    pub spiked: bool,
    /// Remaining invulnerability window
    pub invulnerable_ms: f32,
}

impl Fighter {
    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }
}

/// Which side of a box vs box contact took spike damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxContact {
    pub a_damaged: bool,
    pub b_damaged: bool,
}

/// Resolve two overlapping player boxes
///
/// Overlap is measured between the top-left corners as if both boxes were
/// circles with diameter equal to the box size.
pub fn resolve_box_box(a: &mut Fighter, b: &mut Fighter) -> Option<BoxContact> {
    let delta = a.square.pos - b.square.pos;
    let dist = delta.length();
    let min_dist = (a.square.size + b.square.size) / 2.0;

    if !(dist > 0.0 && dist < min_dist) {
        return None;
    }

    let half_overlap = (min_dist - dist) / 2.0;
    let normal = delta / dist;

    a.square.pos = clamp_to_field(a.square.pos + normal * half_overlap, a.square.size);
    b.square.pos = clamp_to_field(b.square.pos - normal * half_overlap, b.square.size);

    // Both directions are checked independently
    let b_damaged = spike_contact(a, b);
    let a_damaged = spike_contact(b, a);

    Some(BoxContact {
        a_damaged,
        b_damaged,
    })
}

/// Apply spike damage from `attacker` to `victim`, returns true on a hit
pub fn spike_contact(attacker: &Fighter, victim: &mut Fighter) -> bool {
    if !attacker.spiked || victim.is_invulnerable() {
        return false;
    }
    victim.hp = victim.hp.saturating_sub(SPIKE_DAMAGE);
    victim.invulnerable_ms = INVULNERABLE_MS;
    true
}
