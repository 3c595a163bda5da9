//! Data-driven game balance
//!
//! Every physics and layout constant lives here so hosts can retune the game
//! without touching the simulation. Units are logical pixels and frames
//! (one frame = [`crate::consts::FRAME_DT`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Physics, spawning and layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Playfield ===
    /// Logical playfield width
    pub width: f32,
    /// Logical playfield height (including the ground strip)
    pub height: f32,
    /// Height of the ground strip at the bottom
    pub ground_height: f32,
    /// Width of one repeating ground tile
    pub ground_tile_width: f32,

    // === Player ===
    /// Fixed horizontal position of the player's left edge
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Velocity set by a jump (negative is up)
    pub jump_impulse: f32,
    /// Rotation per unit of velocity (radians)
    pub tilt_per_velocity: f32,
    /// Rotation clamp (radians)
    pub max_tilt: f32,
    /// Idle hover amplitude (pixels)
    pub idle_amplitude: f32,
    /// Idle hover frequency (Hz)
    pub idle_frequency: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    /// Vertical opening between the top and bottom pipe
    pub gap_size: f32,
    /// Minimum distance between a gap and the top/floor
    pub min_gap_margin: f32,
    /// Height of the fallback band used when the gap range is degenerate
    pub degenerate_band: f32,
    /// Frames between spawns
    pub spawn_interval: u64,
    /// Horizontal inset applied to obstacle hitboxes on each side
    pub hitbox_inset: f32,
    /// Points per skin phase
    pub phase_length: u32,

    // === Speed ===
    pub base_speed: f32,
    pub speed_increment: f32,
    /// Points per speed step
    pub speed_step_points: u32,
    pub max_speed: f32,

    // === Effects ===
    /// Frames per full day/night cycle
    pub day_cycle_ticks: u64,
    /// Shake magnitude set on death (pixels)
    pub death_shake: f32,
    /// Geometric decay per frame
    pub shake_decay: f32,
    pub star_count: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            ground_height: 80.0,
            ground_tile_width: 48.0,

            player_x: 80.0,
            player_width: 34.0,
            player_height: 24.0,
            gravity: 0.45,
            jump_impulse: -7.5,
            tilt_per_velocity: 0.08,
            max_tilt: std::f32::consts::FRAC_PI_4,
            idle_amplitude: 10.0,
            idle_frequency: 0.8,

            obstacle_width: 60.0,
            gap_size: 150.0,
            min_gap_margin: 60.0,
            degenerate_band: 40.0,
            spawn_interval: 100,
            hitbox_inset: 6.0,
            phase_length: 10,

            base_speed: 2.5,
            speed_increment: 0.25,
            speed_step_points: 5,
            max_speed: 5.0,

            day_cycle_ticks: 3600,
            death_shake: 10.0,
            shake_decay: 0.9,
            star_count: 40,
        }
    }
}

impl Tuning {
    /// Y coordinate of the ground line
    pub fn floor_y(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Vertical start position (player centered in the play area)
    pub fn start_y(&self) -> f32 {
        (self.floor_y() - self.player_height) / 2.0
    }

    /// Parse and validate a tuning JSON document (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TuningError::Invalid("playfield must have positive size"));
        }
        if self.ground_height < 0.0 || self.ground_height >= self.height {
            return Err(TuningError::Invalid("ground must fit inside the playfield"));
        }
        if self.ground_tile_width <= 0.0 {
            return Err(TuningError::Invalid("ground tile width must be positive"));
        }
        if self.spawn_interval == 0 {
            return Err(TuningError::Invalid("spawn interval must be at least one frame"));
        }
        if self.phase_length == 0 || self.speed_step_points == 0 {
            return Err(TuningError::Invalid("point steps must be non-zero"));
        }
        if self.day_cycle_ticks < 4 {
            return Err(TuningError::Invalid("day cycle needs at least four frames"));
        }
        if self.hitbox_inset * 2.0 >= self.obstacle_width {
            return Err(TuningError::Invalid("hitbox inset swallows the obstacle"));
        }
        if !(0.0..1.0).contains(&self.shake_decay) {
            return Err(TuningError::Invalid("shake decay must be in [0, 1)"));
        }
        if self.max_speed < self.base_speed {
            return Err(TuningError::Invalid("max speed below base speed"));
        }
        Ok(())
    }
}
