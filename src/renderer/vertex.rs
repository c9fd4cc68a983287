//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// RGBA, components in 0..=1
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
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
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Shared palette for the minigames
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.02, 0.02, 0.05, 1.0];
    pub const BOARD: Color = [0.12, 0.12, 0.2, 1.0];
    pub const GRID_LINE: Color = [0.3, 0.3, 0.4, 1.0];
    pub const WALL: Color = [0.7, 0.7, 0.8, 1.0];
    pub const PLAYER: Color = [0.2, 0.8, 0.4, 1.0];
    pub const OPPONENT: Color = [1.0, 0.4, 0.2, 1.0];
    pub const NEUTRAL: Color = [1.0, 1.0, 1.0, 1.0];
    pub const FOOD: Color = [0.9, 0.2, 0.3, 1.0];
    pub const HIGHLIGHT: Color = [0.9, 0.85, 0.3, 1.0];
    pub const PROJECTILE: Color = [1.0, 0.9, 0.5, 1.0];
    pub const LIGHT_SQUARE: Color = [0.93, 0.85, 0.71, 1.0];
    pub const DARK_SQUARE: Color = [0.71, 0.53, 0.39, 1.0];
    pub const WHITE_PIECE: Color = [0.98, 0.98, 0.95, 1.0];
    pub const BLACK_PIECE: Color = [0.1, 0.1, 0.12, 1.0];
    pub const CARD_BACK: Color = [0.4, 0.7, 1.0, 1.0];
    pub const DIM: Color = [0.4, 0.4, 0.45, 1.0];
}
