//! Immediate-mode drawing surface
//!
//! Games redraw their whole scene every frame through [`Surface`]. The
//! [`DrawList`] implementation tessellates each call into triangles that the
//! wgpu pipeline uploads as one vertex buffer.

use glam::Vec2;

use super::shapes;
use super::vertex::{Color, Vertex, colors};

/// Drawing calls available to a game's draw routine (world pixels, y down)
pub trait Surface {
    /// Discard everything drawn so far and set the background
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, corner: Vec2, size: Vec2, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
}

/// Triangle list built from drawing calls
#[derive(Debug, Clone)]
pub struct DrawList {
    clear_color: Color,
    vertices: Vec<Vertex>,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            clear_color: colors::BACKGROUND,
            vertices: Vec::new(),
        }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Surface for DrawList {
    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
    }

    fn fill_rect(&mut self, corner: Vec2, size: Vec2, color: Color) {
        self.vertices.extend(shapes::rect(corner, size, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.vertices.extend(shapes::circle(
            center,
            radius,
            color,
            shapes::segments_for(radius),
        ));
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        let half = width * 0.5;
        self.vertices.extend(shapes::ring(
            center,
            (radius - half).max(0.0),
            radius + half,
            color,
            shapes::segments_for(radius),
        ));
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.vertices.extend(shapes::line(from, to, width, color));
    }
}
