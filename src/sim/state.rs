//! Game state and core simulation types
//!
//! The tick function is the only writer of a [`GameState`]; everything else
//! reads it or queues input.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Hovering, waiting for the first jump
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Run ended, waiting for an explicit reset
    Over,
}

/// Obstacle skin, chosen from the score phase at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleVariant {
    A,
    B,
}

/// A pipe pair scrolling toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    /// Y of the gap's top edge
    pub gap_top: f32,
    /// Set once the player has cleared this obstacle
    pub passed: bool,
    pub variant: ObstacleVariant,
}

impl Obstacle {
    /// Right edge
    pub fn trailing_edge(&self, tuning: &Tuning) -> f32 {
        self.x + tuning.obstacle_width
    }

    /// Y of the gap's bottom edge
    pub fn gap_bottom(&self, tuning: &Tuning) -> f32 {
        self.gap_top + tuning.gap_size
    }
}

/// The player character (x is fixed, see [`Tuning::player_x`])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top edge
    pub y: f32,
    /// Vertical speed (positive is down)
    pub velocity: f32,
}

/// A background star; only its opacity animates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub twinkle_phase: f32,
    pub size: f32,
}

/// Things that happened during a tick, drained by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Idle -> Running
    Started,
    /// Jump impulse applied while running
    Jumped,
    /// An obstacle was cleared
    Scored { score: u32 },
    /// Running -> Over
    Died { score: u32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub seed: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Oldest (leftmost) first
    pub obstacles: VecDeque<Obstacle>,
    pub score: u32,
    /// Frames spent running since the last reset
    pub frame_count: u64,
    /// Frames since construction, in every phase
    pub clock_ticks: u64,
    pub scroll_speed: f32,
    /// Total ground scroll distance
    pub scroll_offset: f32,
    /// Position inside the day/night cycle
    pub day_clock: u64,
    pub screen_shake: f32,
    pub stars: Vec<Star>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed. Invalid tuning is
    /// replaced by the defaults.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("{}, using default tuning", e);
                Tuning::default()
            }
        };
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = generate_stars(&tuning, &mut rng);
        let player = Player {
            y: tuning.start_y(),
            velocity: 0.0,
        };
        let scroll_speed = tuning.base_speed;

        Self {
            tuning,
            seed,
            phase: GamePhase::Idle,
            player,
            obstacles: VecDeque::new(),
            score: 0,
            frame_count: 0,
            clock_ticks: 0,
            scroll_speed,
            scroll_offset: 0.0,
            day_clock: 0,
            screen_shake: 0.0,
            stars,
            rng,
            events: Vec::new(),
        }
    }

    /// Return to the pre-game state. Stars and the day clock carry over.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Idle;
        self.player = Player {
            y: self.tuning.start_y(),
            velocity: 0.0,
        };
        self.obstacles.clear();
        self.score = 0;
        self.frame_count = 0;
        self.scroll_speed = self.tuning.base_speed;
        self.screen_shake = 0.0;
        self.events.clear();
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// Draw a uniform sample in `[lo, hi)` from the run's RNG
    pub(crate) fn random_range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }
}

/// Scatter stars across the upper part of the sky
fn generate_stars(tuning: &Tuning, rng: &mut Pcg32) -> Vec<Star> {
    let sky_height = tuning.floor_y() * 0.6;
    (0..tuning.star_count)
        .map(|_| Star {
            pos: Vec2::new(
                rng.random_range(0.0..tuning.width),
                rng.random_range(0.0..sky_height.max(1.0)),
            ),
            twinkle_phase: rng.random_range(0.0..std::f32::consts::TAU),
            size: rng.random_range(0.8..2.0),
        })
        .collect()
}
