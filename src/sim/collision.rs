//! Collision detection between the player and obstacles
//!
//! Obstacle hitboxes are inset horizontally so a graze against sprite
//! padding does not end the run. Vertical edges of the gap are exact.

use super::state::{GameState, Obstacle};
use crate::tuning::Tuning;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Horizontal overlap (touching edges do not overlap)
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.x < right && self.right() > left
    }
}

/// Player bounding box at its current position
pub fn player_rect(state: &GameState) -> Rect {
    let t = &state.tuning;
    Rect::new(t.player_x, state.player.y, t.player_width, t.player_height)
}

/// Horizontal extent of an obstacle's hitbox after insets
pub fn obstacle_hit_range(obstacle: &Obstacle, tuning: &Tuning) -> (f32, f32) {
    (
        obstacle.x + tuning.hitbox_inset,
        obstacle.trailing_edge(tuning) - tuning.hitbox_inset,
    )
}

/// Whether the player box hits the obstacle's top or bottom pipe
pub fn hits_obstacle(player: &Rect, obstacle: &Obstacle, tuning: &Tuning) -> bool {
    let (left, right) = obstacle_hit_range(obstacle, tuning);
    if !player.overlaps_x(left, right) {
        return false;
    }
    player.y < obstacle.gap_top || player.bottom() > obstacle.gap_bottom(tuning)
}

/// Whether the player has left the playable band (above the top or into the floor)
pub fn out_of_bounds(player: &Rect, tuning: &Tuning) -> bool {
    player.y < 0.0 || player.bottom() > tuning.floor_y()
}
