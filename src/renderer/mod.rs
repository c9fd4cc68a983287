//! Rendering module
//!
//! Games draw through the immediate-mode [`Surface`] trait; [`DrawList`]
//! tessellates the calls and the wgpu [`RenderState`] presents them.

pub mod draw;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use draw::{DrawList, Surface};
pub use pipeline::{RenderState, world_to_ndc};
pub use vertex::{Color, Vertex, colors};
