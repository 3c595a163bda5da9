//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, one logical
//! frame per call.

use super::collision::{hits_obstacle, out_of_bounds, player_rect};
use super::state::{GameEvent, GamePhase, GameState, Obstacle, ObstacleVariant};
use crate::consts::FRAME_DT;
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (click/tap/space), one-shot
    pub jump: bool,
    /// Demo mode - the game flies itself
    pub autopilot: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.clock_ticks += 1;
    state.day_clock = (state.day_clock + 1) % state.tuning.day_cycle_ticks;

    // Decay screen shake
    state.screen_shake *= state.tuning.shake_decay;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    if input.jump {
        apply_jump(state);
    }

    if input.autopilot {
        match state.phase {
            GamePhase::Idle => apply_jump(state),
            GamePhase::Running if autopilot_wants_jump(state) => apply_jump(state),
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Idle => {
            state.player.y = idle_y(&state.tuning, state.clock_ticks);
            state.player.velocity = 0.0;
            state.scroll_offset += state.tuning.base_speed;
        }
        GamePhase::Running => step_running(state),
        GamePhase::Over => {}
    }
}

/// Apply a jump according to the current phase
pub fn apply_jump(state: &mut GameState) {
    match state.phase {
        GamePhase::Idle => {
            state.phase = GamePhase::Running;
            state.player.velocity = 0.0;
            state.events.push(GameEvent::Started);
            log::debug!("Run started (seed {})", state.seed);
        }
        GamePhase::Running => {
            state.player.velocity = state.tuning.jump_impulse;
            state.events.push(GameEvent::Jumped);
        }
        GamePhase::Over => {}
    }
}

fn step_running(state: &mut GameState) {
    // 1. Frame counter and speed
    state.frame_count += 1;
    state.scroll_speed = scroll_speed_for_score(&state.tuning, state.score);

    // 2. Integrate
    state.player.velocity += state.tuning.gravity;
    state.player.y += state.player.velocity;

    // 3. Spawn
    if state.frame_count % state.tuning.spawn_interval == 0 {
        spawn_obstacle(state);
    }

    // 4. Scroll and cull
    let speed = state.scroll_speed;
    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= speed;
    }
    let width = state.tuning.obstacle_width;
    while state
        .obstacles
        .front()
        .is_some_and(|o| o.x + width < 0.0)
    {
        state.obstacles.pop_front();
    }
    state.scroll_offset += speed;

    // 5. Obstacle collisions and scoring
    let player = player_rect(state);
    let mut collided = false;
    let mut cleared = 0;
    for obstacle in state.obstacles.iter_mut() {
        if hits_obstacle(&player, obstacle, &state.tuning) {
            collided = true;
            break;
        }
        if !obstacle.passed && obstacle.trailing_edge(&state.tuning) < player.x {
            obstacle.passed = true;
            cleared += 1;
        }
    }
    for _ in 0..cleared {
        state.score += 1;
        state.events.push(GameEvent::Scored { score: state.score });
    }

    // 6. Bounds
    if out_of_bounds(&player, &state.tuning) {
        collided = true;
    }

    // 7. Death
    if collided {
        game_over(state);
    }
}

/// End the run. Only the first call per run has any effect.
pub fn game_over(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }
    state.phase = GamePhase::Over;
    state.screen_shake = state.tuning.death_shake;
    state.events.push(GameEvent::Died { score: state.score });
    log::info!("Game over with score {}", state.score);
}

/// Append a new obstacle at the right edge of the playfield
pub fn spawn_obstacle(state: &mut GameState) {
    let t = &state.tuning;
    let lo = t.min_gap_margin;
    let mut hi = t.floor_y() - t.gap_size - t.min_gap_margin;
    if hi <= lo {
        hi = lo + t.degenerate_band;
    }
    let x = t.width;
    let variant = variant_for_score(t, state.score);

    let gap_top = state.random_range(lo, hi);
    state.obstacles.push_back(Obstacle {
        x,
        gap_top,
        passed: false,
        variant,
    });
}

/// Scroll speed for a score, stepped and clamped
pub fn scroll_speed_for_score(tuning: &Tuning, score: u32) -> f32 {
    let steps = (score / tuning.speed_step_points) as f32;
    (tuning.base_speed + steps * tuning.speed_increment).min(tuning.max_speed)
}

/// Obstacle skin for newly spawned obstacles at this score
pub fn variant_for_score(tuning: &Tuning, score: u32) -> ObstacleVariant {
    if (score / tuning.phase_length).is_multiple_of(2) {
        ObstacleVariant::A
    } else {
        ObstacleVariant::B
    }
}

/// Hover position while waiting for the first jump
pub fn idle_y(tuning: &Tuning, clock_ticks: u64) -> f32 {
    let t = clock_ticks as f32 * FRAME_DT;
    tuning.start_y() + (t * tuning.idle_frequency * std::f32::consts::TAU).sin() * tuning.idle_amplitude
}

/// Sprite rotation; only tilts while running
pub fn player_rotation(state: &GameState) -> f32 {
    if state.phase != GamePhase::Running {
        return 0.0;
    }
    let t = &state.tuning;
    (state.player.velocity * t.tilt_per_velocity).clamp(-t.max_tilt, t.max_tilt)
}

/// Demo-mode pilot: flap when the next frame would sink below the target gap
fn autopilot_wants_jump(state: &GameState) -> bool {
    let t = &state.tuning;
    let margin = t.player_height * 0.5;
    let target_bottom = state
        .obstacles
        .iter()
        .find(|o| o.trailing_edge(t) >= t.player_x)
        .map(|o| o.gap_bottom(t) - margin)
        .unwrap_or(t.floor_y() * 0.6);

    let next_velocity = state.player.velocity + t.gravity;
    let next_bottom = state.player.y + next_velocity + t.player_height;
    next_bottom > target_bottom && state.player.velocity >= 0.0
}
