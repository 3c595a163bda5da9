//! Flappy minigame engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions)
//! - `engine`: Lifecycle controller wrapping the sim with side effects
//! - `audio`: Procedural tone synthesis
//! - `leaderboard`: Score submission/ranking collaborator
//! - `renderer`: Scene building and WebGPU rendering
//! - `platform`: Input, storage, music ducking and sharing
//! - `tuning`: Data-driven physics constants
//! - `settings`: Player preferences
//! - `web`: Browser mount/unmount glue (wasm32 only)

pub mod audio;
pub mod engine;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::{Engine, HudSnapshot};
pub use leaderboard::{Leaderboard, LocalLeaderboard};
pub use settings::Settings;
pub use tuning::Tuning;

/// Loop timing constants
pub mod consts {
    /// Fixed simulation timestep (one logical frame at 60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per display frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest wall-clock delta accepted per display frame (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Leaderboard game identifier
    pub const GAME_ID: &str = "flappy";
}

/// Linear interpolation between two RGBA colors
#[inline]
pub fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Convert 8-bit sRGB components to a float color
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}
