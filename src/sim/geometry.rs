//! Geometric value types for the collision primitives
//!
//! Collision math never sees players or balls directly. Entities project
//! themselves into these records, the primitives mutate the records, and the
//! entities copy the result back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp;
use crate::consts::FIELD_SIZE;

/// An axis-aligned square described by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub pos: Vec2,
    pub size: f32,
}

impl Square {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self { pos, size }
    }

    /// Point of the square closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.pos.x.max(p.x.min(self.pos.x + self.size)),
            self.pos.y.max(p.y.min(self.pos.y + self.size)),
        )
    }
}

/// A moving circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// The occupant of a square: whatever moves the box around
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Clamp a box corner so a box of `size` stays on the field
#[inline]
pub fn clamp_to_field(pos: Vec2, size: f32) -> Vec2 {
    let max = FIELD_SIZE - size;
    Vec2::new(clamp(pos.x, 0.0, max), clamp(pos.y, 0.0, max))
}

/// Clamp a circle center so the circle stays on the field
#[inline]
pub fn clamp_circle_to_field(pos: Vec2, radius: f32) -> Vec2 {
    let max = FIELD_SIZE - radius;
    Vec2::new(clamp(pos.x, radius, max), clamp(pos.y, radius, max))
}
