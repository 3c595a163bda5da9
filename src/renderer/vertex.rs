//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 2D vertex with texture coordinates and a tint color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv,
            color,
        }
    }

    /// Untextured vertex (samples the white texel)
    pub fn solid(pos: Vec2, color: [f32; 4]) -> Self {
        Self::new(pos.x, pos.y, [0.0, 0.0], color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: (2 * std::mem::size_of::<[f32; 2]>()) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements and asset placeholders
pub mod colors {
    use crate::rgb;

    pub const PLAYER: [f32; 4] = rgb(247, 200, 60);
    pub const OBSTACLE_A: [f32; 4] = rgb(92, 184, 92);
    pub const OBSTACLE_A_CAP: [f32; 4] = rgb(60, 140, 60);
    pub const OBSTACLE_B: [f32; 4] = rgb(186, 104, 200);
    pub const OBSTACLE_B_CAP: [f32; 4] = rgb(142, 68, 173);
    pub const GROUND: [f32; 4] = rgb(222, 184, 135);
    pub const GROUND_STRIPE: [f32; 4] = rgb(196, 154, 108);
    pub const GRASS: [f32; 4] = rgb(115, 191, 46);
    pub const SUN: [f32; 4] = rgb(255, 221, 87);
    pub const MOON: [f32; 4] = rgb(236, 240, 241);
    pub const STAR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Clear color outside the letterboxed playfield
    pub const LETTERBOX: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}
