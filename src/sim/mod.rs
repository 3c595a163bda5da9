//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call to `tick` is one logical frame
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, hits_obstacle, out_of_bounds, player_rect};
pub use state::{GameEvent, GamePhase, GameState, Obstacle, ObstacleVariant, Player, Star};
pub use tick::{
    TickInput, apply_jump, game_over, idle_y, player_rotation, scroll_speed_for_score,
    spawn_obstacle, tick, variant_for_score,
};
