//! Shape generation for 2D primitives
//!
//! Tessellates a [`Scene`] into triangles already in normalized device
//! coordinates. The logical playfield keeps its aspect ratio and is centered
//! in the surface; the rest of the surface is left to the clear color.

use std::f32::consts::PI;
use std::ops::Range;

use glam::Vec2;

use super::assets::AssetId;
use super::scene::{DrawCmd, Scene};
use super::sky::Color;
use super::vertex::{Vertex, colors};
use crate::sim::Rect;

/// Triangles per full circle
const CIRCLE_SEGMENTS: u32 = 24;

/// A run of vertices drawn with the same texture
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// `None` draws with the white texel
    pub texture: Option<AssetId>,
    pub range: Range<u32>,
}

/// Tessellated frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub batches: Vec<Batch>,
}

impl Mesh {
    fn push(&mut self, texture: Option<AssetId>, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        let end = self.vertices.len() as u32;

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture && batch.range.end == start => {
                batch.range.end = end;
            }
            _ => self.batches.push(Batch {
                texture,
                range: start..end,
            }),
        }
    }
}

/// Maps logical coordinates onto the surface, preserving aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    origin: Vec2,
    surface: Vec2,
}

impl Viewport {
    pub fn fit(logical: Vec2, surface: (u32, u32)) -> Self {
        let surface = Vec2::new(surface.0.max(1) as f32, surface.1.max(1) as f32);
        let logical = logical.max(Vec2::ONE);
        let scale = (surface.x / logical.x).min(surface.y / logical.y);
        let origin = (surface - logical * scale) * 0.5;
        Self {
            scale,
            origin,
            surface,
        }
    }

    /// Logical point (y down) to NDC (y up)
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        let px = self.origin + p * self.scale;
        Vec2::new(px.x / self.surface.x * 2.0 - 1.0, 1.0 - px.y / self.surface.y * 2.0)
    }
}

/// Tessellate a scene for a surface of the given pixel size
pub fn tessellate(scene: &Scene, surface: (u32, u32)) -> Mesh {
    let view = Viewport::fit(Vec2::new(scene.width, scene.height), surface);
    let shift = scene.offset;
    let to_ndc = |p: Vec2| view.to_ndc(p + shift);
    let mut mesh = Mesh::default();

    for cmd in &scene.commands {
        match cmd {
            DrawCmd::Gradient { rect, stops } => {
                let verts = gradient(rect, stops, to_ndc);
                mesh.push(None, &verts);
            }
            DrawCmd::Rect {
                rect,
                color,
                rotation,
            } => {
                let corners = quad_corners(rect, *rotation).map(to_ndc);
                mesh.push(None, &quad(corners, [[0.0, 0.0]; 4], *color));
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
            } => {
                let verts: Vec<Vertex> = circle(*center, *radius, *color, CIRCLE_SEGMENTS)
                    .into_iter()
                    .map(|v| {
                        let p = to_ndc(Vec2::from(v.position));
                        Vertex::solid(p, v.color)
                    })
                    .collect();
                mesh.push(None, &verts);
            }
            DrawCmd::Sprite {
                asset,
                rect,
                rotation,
                flip_y,
            } => {
                let corners = quad_corners(rect, *rotation).map(to_ndc);
                let uvs = if *flip_y {
                    [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
                } else {
                    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
                };
                mesh.push(Some(*asset), &quad(corners, uvs, colors::WHITE));
            }
        }
    }

    mesh
}

/// Corners (top-left, top-right, bottom-right, bottom-left) rotated about the center
pub fn quad_corners(rect: &Rect, rotation: f32) -> [Vec2; 4] {
    let center = Vec2::new(rect.x + rect.w * 0.5, rect.y + rect.h * 0.5);
    let half = Vec2::new(rect.w * 0.5, rect.h * 0.5);
    let rot = Vec2::from_angle(rotation);
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|c| center + rot.rotate(c))
}

/// Two triangles from four corners
fn quad(corners: [Vec2; 4], uvs: [[f32; 2]; 4], color: Color) -> [Vertex; 6] {
    let v = |i: usize| Vertex::new(corners[i].x, corners[i].y, uvs[i], color);
    [v(0), v(1), v(2), v(0), v(2), v(3)]
}

/// Two stacked quads: top stop to middle stop, middle stop to bottom stop
fn gradient(rect: &Rect, stops: &[Color; 3], to_ndc: impl Fn(Vec2) -> Vec2) -> Vec<Vertex> {
    let mid = rect.y + rect.h * 0.5;
    let bands = [(rect.y, mid, stops[0], stops[1]), (mid, rect.bottom(), stops[1], stops[2])];

    let mut vertices = Vec::with_capacity(12);
    for (y0, y1, c0, c1) in bands {
        let tl = Vertex::solid(to_ndc(Vec2::new(rect.x, y0)), c0);
        let tr = Vertex::solid(to_ndc(Vec2::new(rect.right(), y0)), c0);
        let br = Vertex::solid(to_ndc(Vec2::new(rect.right(), y1)), c1);
        let bl = Vertex::solid(to_ndc(Vec2::new(rect.x, y1)), c1);
        vertices.extend_from_slice(&[tl, tr, br, tl, br, bl]);
    }
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::solid(center, color));
        vertices.push(Vertex::solid(center + Vec2::from_angle(theta1) * radius, color));
        vertices.push(Vertex::solid(center + Vec2::from_angle(theta2) * radius, color));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    fn scene(commands: Vec<DrawCmd>) -> Scene {
        Scene {
            width: 400.0,
            height: 600.0,
            offset: Vec2::ZERO,
            commands,
        }
    }

    fn rect_cmd() -> DrawCmd {
        DrawCmd::Rect {
            rect: Rect::new(10.0, 10.0, 20.0, 20.0),
            color: colors::PLAYER,
            rotation: 0.0,
        }
    }

    fn sprite_cmd(asset: AssetId) -> DrawCmd {
        DrawCmd::Sprite {
            asset,
            rect: Rect::new(50.0, 50.0, 30.0, 30.0),
            rotation: 0.0,
            flip_y: false,
        }
    }

    #[test]
    fn exact_fit_maps_corners_to_ndc_corners() {
        let view = Viewport::fit(Vec2::new(400.0, 600.0), (400, 600));
        assert!(close(view.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 1.0)));
        assert!(close(view.to_ndc(Vec2::new(400.0, 600.0)), Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn wide_surface_is_pillarboxed() {
        // 800x600 surface, 400x600 playfield: scale 1, 200px bars each side
        let view = Viewport::fit(Vec2::new(400.0, 600.0), (800, 600));
        assert!(close(view.to_ndc(Vec2::ZERO), Vec2::new(-0.5, 1.0)));
        assert!(close(view.to_ndc(Vec2::new(400.0, 600.0)), Vec2::new(0.5, -1.0)));
    }

    #[test]
    fn tall_surface_is_letterboxed() {
        // 400x1200 surface: scale 1, 300px bars top and bottom
        let view = Viewport::fit(Vec2::new(400.0, 600.0), (400, 1200));
        assert!(close(view.to_ndc(Vec2::ZERO), Vec2::new(-1.0, 0.5)));
        assert!(close(view.to_ndc(Vec2::new(400.0, 600.0)), Vec2::new(1.0, -0.5)));
    }

    #[test]
    fn batches_merge_consecutive_textures() {
        let mesh = tessellate(
            &scene(vec![
                rect_cmd(),
                rect_cmd(),
                sprite_cmd(AssetId::Player),
                sprite_cmd(AssetId::Player),
                rect_cmd(),
            ]),
            (400, 600),
        );
        let textures: Vec<_> = mesh.batches.iter().map(|b| b.texture).collect();
        assert_eq!(textures, vec![None, Some(AssetId::Player), None]);
        assert_eq!(mesh.batches[0].range, 0..12);
        assert_eq!(mesh.batches[1].range, 12..24);
        assert_eq!(mesh.batches.last().unwrap().range.end as usize, mesh.vertices.len());
    }

    #[test]
    fn rotation_keeps_center() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        let corners = quad_corners(&rect, PI / 2.0);
        let center = corners.iter().copied().sum::<Vec2>() / 4.0;
        assert!(close(center, Vec2::new(20.0, 10.0)));
        // A quarter turn swaps the extents
        let width = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max)
            - corners.iter().map(|c| c.x).fold(f32::MAX, f32::min);
        assert!((width - 20.0).abs() < 1e-3);
    }

    #[test]
    fn flipped_sprite_swaps_v() {
        let mut cmd = sprite_cmd(AssetId::ObstacleA);
        if let DrawCmd::Sprite { flip_y, .. } = &mut cmd {
            *flip_y = true;
        }
        let mesh = tessellate(&scene(vec![cmd]), (400, 600));
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 0.0]);
    }

    #[test]
    fn shake_offset_moves_everything() {
        let mut shaken = scene(vec![rect_cmd()]);
        shaken.offset = Vec2::new(4.0, 0.0);
        let a = tessellate(&scene(vec![rect_cmd()]), (400, 600));
        let b = tessellate(&shaken, (400, 600));
        let dx = b.vertices[0].position[0] - a.vertices[0].position[0];
        assert!((dx - 4.0 / 400.0 * 2.0).abs() < 1e-5);
    }

    #[test]
    fn gradient_uses_stops_top_to_bottom() {
        let stops = [colors::SUN, colors::MOON, colors::GRASS];
        let mesh = tessellate(
            &scene(vec![DrawCmd::Gradient {
                rect: Rect::new(0.0, 0.0, 400.0, 600.0),
                stops,
            }]),
            (400, 600),
        );
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.vertices[0].color, colors::SUN);
        assert_eq!(mesh.vertices[2].color, colors::MOON);
        assert_eq!(mesh.vertices[8].color, colors::GRASS);
    }

    #[test]
    fn circle_has_one_triangle_per_segment() {
        let verts = circle(Vec2::ZERO, 5.0, colors::SUN, 12);
        assert_eq!(verts.len(), 36);
        for v in verts.iter().skip(1).step_by(3) {
            assert!((Vec2::from(v.position).length() - 5.0).abs() < 1e-4);
        }
    }
}
