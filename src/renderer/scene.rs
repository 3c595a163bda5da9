//! Frame composition
//!
//! Turns a [`GameState`] into a flat display list in logical playfield
//! coordinates. Nothing here touches the GPU, so every visual rule can be
//! checked in tests.

use glam::Vec2;

use super::assets::{AssetId, AssetStatus};
use super::sky::{self, BodyKind, Color};
use super::vertex::colors;
use crate::settings::Settings;
use crate::sim::{GameState, ObstacleVariant, Rect, player_rotation};

/// Height of the cap drawn on placeholder obstacles
const CAP_HEIGHT: f32 = 24.0;
/// How far a placeholder cap overhangs the obstacle body on each side
const CAP_OVERHANG: f32 = 4.0;
/// Grass lip on top of the ground strip
const GRASS_HEIGHT: f32 = 8.0;

/// A single draw operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Vertical three-stop gradient (top, middle, bottom)
    Gradient { rect: Rect, stops: [Color; 3] },
    /// Solid rectangle rotated about its center
    Rect { rect: Rect, color: Color, rotation: f32 },
    Circle { center: Vec2, radius: f32, color: Color },
    /// Textured rectangle rotated about its center
    Sprite {
        asset: AssetId,
        rect: Rect,
        rotation: f32,
        flip_y: bool,
    },
}

/// Display list for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    /// Offset applied to everything (screen shake)
    pub offset: Vec2,
    pub commands: Vec<DrawCmd>,
}

/// Compose the frame for the current state
pub fn build_scene(state: &GameState, assets: &dyn AssetStatus, settings: &Settings) -> Scene {
    let t = &state.tuning;
    let mut commands = Vec::with_capacity(64 + state.stars.len());

    draw_sky(state, settings, &mut commands);
    for obstacle in &state.obstacles {
        let (asset, body, cap) = match obstacle.variant {
            ObstacleVariant::A => (AssetId::ObstacleA, colors::OBSTACLE_A, colors::OBSTACLE_A_CAP),
            ObstacleVariant::B => (AssetId::ObstacleB, colors::OBSTACLE_B, colors::OBSTACLE_B_CAP),
        };
        let top = Rect::new(obstacle.x, 0.0, t.obstacle_width, obstacle.gap_top);
        let bottom_y = obstacle.gap_bottom(t);
        let bottom = Rect::new(obstacle.x, bottom_y, t.obstacle_width, t.floor_y() - bottom_y);

        if assets.is_ready(asset) {
            commands.push(sprite(asset, top, 0.0, true));
            commands.push(sprite(asset, bottom, 0.0, false));
        } else {
            commands.push(solid(top, body));
            commands.push(solid(bottom, body));
            let cap_w = t.obstacle_width + 2.0 * CAP_OVERHANG;
            let cap_x = obstacle.x - CAP_OVERHANG;
            commands.push(solid(Rect::new(cap_x, top.bottom() - CAP_HEIGHT, cap_w, CAP_HEIGHT), cap));
            commands.push(solid(Rect::new(cap_x, bottom_y, cap_w, CAP_HEIGHT), cap));
        }
    }
    draw_ground(state, assets, &mut commands);

    let player = Rect::new(t.player_x, state.player.y, t.player_width, t.player_height);
    let rotation = player_rotation(state);
    if assets.is_ready(AssetId::Player) {
        commands.push(sprite(AssetId::Player, player, rotation, false));
    } else {
        commands.push(DrawCmd::Rect {
            rect: player,
            color: colors::PLAYER,
            rotation,
        });
    }

    Scene {
        width: t.width,
        height: t.height,
        offset: shake_offset(state, settings),
        commands,
    }
}

fn solid(rect: Rect, color: Color) -> DrawCmd {
    DrawCmd::Rect {
        rect,
        color,
        rotation: 0.0,
    }
}

fn sprite(asset: AssetId, rect: Rect, rotation: f32, flip_y: bool) -> DrawCmd {
    DrawCmd::Sprite {
        asset,
        rect,
        rotation,
        flip_y,
    }
}

fn draw_sky(state: &GameState, settings: &Settings, out: &mut Vec<DrawCmd>) {
    let t = &state.tuning;
    let (clock, cycle) = (state.day_clock, t.day_cycle_ticks);

    out.push(DrawCmd::Gradient {
        rect: Rect::new(0.0, 0.0, t.width, t.floor_y()),
        stops: sky::sky_gradient(clock, cycle),
    });

    if sky::stars_visible(clock, cycle) {
        for star in &state.stars {
            let alpha = if settings.reduced_motion {
                0.8
            } else {
                sky::star_alpha(state.clock_ticks, star.twinkle_phase)
            };
            let mut color = colors::STAR;
            color[3] = alpha;
            out.push(DrawCmd::Circle {
                center: star.pos,
                radius: star.size,
                color,
            });
        }
    }

    let body = sky::celestial_body(clock, cycle, t.width, t.floor_y());
    let color = match body.kind {
        BodyKind::Sun => colors::SUN,
        BodyKind::Moon => colors::MOON,
    };
    let mut glow = color;
    glow[3] = 0.25;
    out.push(DrawCmd::Circle {
        center: body.center,
        radius: body.radius * 1.6,
        color: glow,
    });
    out.push(DrawCmd::Circle {
        center: body.center,
        radius: body.radius,
        color,
    });
}

/// Left edge of the first ground tile
pub fn ground_phase(scroll_offset: f32, tile_width: f32) -> f32 {
    if tile_width <= 0.0 {
        return 0.0;
    }
    -scroll_offset.rem_euclid(tile_width)
}

fn draw_ground(state: &GameState, assets: &dyn AssetStatus, out: &mut Vec<DrawCmd>) {
    let t = &state.tuning;
    let floor = t.floor_y();
    out.push(solid(Rect::new(0.0, floor, t.width, t.ground_height), colors::GROUND));

    let tile = t.ground_tile_width.max(1.0);
    let textured = assets.is_ready(AssetId::Ground);
    let mut x = ground_phase(state.scroll_offset, tile);
    while x < t.width {
        if textured {
            out.push(sprite(AssetId::Ground, Rect::new(x, floor, tile, t.ground_height), 0.0, false));
        } else {
            out.push(solid(
                Rect::new(x, floor + GRASS_HEIGHT, tile * 0.5, t.ground_height - GRASS_HEIGHT),
                colors::GROUND_STRIPE,
            ));
        }
        x += tile;
    }

    if !textured {
        out.push(solid(Rect::new(0.0, floor, t.width, GRASS_HEIGHT), colors::GRASS));
    }
}

/// Pseudo-random jitter that decays with the sim's shake magnitude
fn shake_offset(state: &GameState, settings: &Settings) -> Vec2 {
    if state.screen_shake <= 0.0 || !settings.effective_screen_shake() {
        return Vec2::ZERO;
    }
    let phase = state.clock_ticks as f32;
    Vec2::new((phase * 1.7).sin(), (phase * 2.3).cos()) * state.screen_shake
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::assets::NoAssets;
    use crate::sim::{GamePhase, Obstacle};
    use crate::tuning::Tuning;

    struct Ready(Vec<AssetId>);

    impl AssetStatus for Ready {
        fn is_ready(&self, id: AssetId) -> bool {
            self.0.contains(&id)
        }
    }

    fn state() -> GameState {
        GameState::new(Tuning::default(), 11)
    }

    fn with_obstacle(variant: ObstacleVariant) -> GameState {
        let mut state = state();
        state.obstacles.push_back(Obstacle {
            x: 200.0,
            gap_top: 150.0,
            passed: false,
            variant,
        });
        state
    }

    fn sprites(scene: &Scene) -> Vec<AssetId> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Sprite { asset, .. } => Some(*asset),
                _ => None,
            })
            .collect()
    }

    fn colored(scene: &Scene, color: Color) -> usize {
        scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { color: fill, .. } if *fill == color))
            .count()
    }

    #[test]
    fn unloaded_assets_fall_back_to_placeholders() {
        let state = with_obstacle(ObstacleVariant::A);
        let scene = build_scene(&state, &NoAssets, &Settings::default());
        assert!(sprites(&scene).is_empty());
        assert_eq!(colored(&scene, colors::OBSTACLE_A), 2);
        assert_eq!(colored(&scene, colors::PLAYER), 1);
    }

    #[test]
    fn loaded_assets_draw_sprites() {
        let state = with_obstacle(ObstacleVariant::B);
        let scene = build_scene(&state, &Ready(AssetId::ALL.to_vec()), &Settings::default());
        let drawn = sprites(&scene);
        assert_eq!(drawn.iter().filter(|a| **a == AssetId::ObstacleB).count(), 2);
        assert!(drawn.contains(&AssetId::Player));
        assert!(drawn.contains(&AssetId::Ground));
        assert!(!drawn.contains(&AssetId::ObstacleA));
    }

    #[test]
    fn obstacle_skin_follows_frozen_variant() {
        let mut state = with_obstacle(ObstacleVariant::A);
        // Score has moved into the B phase; the existing obstacle keeps A
        state.score = 15;
        let scene = build_scene(&state, &NoAssets, &Settings::default());
        assert_eq!(colored(&scene, colors::OBSTACLE_A), 2);
        assert_eq!(colored(&scene, colors::OBSTACLE_B), 0);
    }

    #[test]
    fn obstacle_segments_frame_the_gap() {
        let state = with_obstacle(ObstacleVariant::A);
        let t = &state.tuning;
        let scene = build_scene(&state, &Ready(vec![AssetId::ObstacleA]), &Settings::default());
        let rects: Vec<(Rect, bool)> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Sprite {
                    asset: AssetId::ObstacleA,
                    rect,
                    flip_y,
                    ..
                } => Some((*rect, *flip_y)),
                _ => None,
            })
            .collect();
        assert_eq!(rects.len(), 2);
        let (top, top_flipped) = rects[0];
        let (bottom, bottom_flipped) = rects[1];
        assert!(top_flipped && !bottom_flipped);
        assert_eq!(top.bottom(), 150.0);
        assert_eq!(bottom.y, 150.0 + t.gap_size);
        assert_eq!(bottom.bottom(), t.floor_y());
    }

    #[test]
    fn ground_phase_wraps_with_scroll() {
        assert_eq!(ground_phase(0.0, 48.0), 0.0);
        assert_eq!(ground_phase(10.0, 48.0), -10.0);
        assert_eq!(ground_phase(58.0, 48.0), -10.0);
        assert_eq!(ground_phase(96.0, 48.0), 0.0);
    }

    #[test]
    fn ground_tiles_cover_the_width() {
        let mut state = state();
        state.scroll_offset = 1234.5;
        let scene = build_scene(&state, &Ready(vec![AssetId::Ground]), &Settings::default());
        let tiles: Vec<Rect> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Sprite {
                    asset: AssetId::Ground,
                    rect,
                    ..
                } => Some(*rect),
                _ => None,
            })
            .collect();
        assert!(tiles[0].x <= 0.0 && tiles[0].right() > 0.0);
        assert!(tiles.last().unwrap().right() >= state.tuning.width);
    }

    #[test]
    fn stars_only_drawn_at_night() {
        let mut state = state();
        let stars = state.stars.len();
        let circles = |s: &Scene| {
            s.commands
                .iter()
                .filter(|c| matches!(c, DrawCmd::Circle { .. }))
                .count()
        };

        state.day_clock = 100;
        let day = build_scene(&state, &NoAssets, &Settings::default());
        state.day_clock = state.tuning.day_cycle_ticks * 7 / 8;
        let night = build_scene(&state, &NoAssets, &Settings::default());
        assert_eq!(circles(&night), circles(&day) + stars);
    }

    #[test]
    fn player_tilts_only_while_running() {
        let mut state = state();
        state.player.velocity = 6.0;
        let rotation = |s: &Scene| {
            s.commands.iter().find_map(|c| match c {
                DrawCmd::Rect {
                    color, rotation, ..
                } if *color == colors::PLAYER => Some(*rotation),
                _ => None,
            })
        };
        let idle = build_scene(&state, &NoAssets, &Settings::default());
        assert_eq!(rotation(&idle), Some(0.0));

        state.phase = GamePhase::Running;
        let running = build_scene(&state, &NoAssets, &Settings::default());
        assert!(rotation(&running).unwrap() > 0.0);
    }

    #[test]
    fn shake_respects_settings() {
        let mut state = state();
        state.screen_shake = 8.0;
        state.clock_ticks = 3;
        let shaken = build_scene(&state, &NoAssets, &Settings::default());
        assert_ne!(shaken.offset, Vec2::ZERO);

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let still = build_scene(&state, &NoAssets, &calm);
        assert_eq!(still.offset, Vec2::ZERO);
    }
}
