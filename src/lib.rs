//! Somnia MiniHub - a catalog of small arcade and board minigames
//!
//! Core modules:
//! - `sim`: Deterministic simulation (generic game session, collisions, grids)
//! - `ai`: Opponent policies (random, heuristic, minimax, BFS, search worker)
//! - `games`: Per-game state, transition, policy and draw routine
//! - `renderer`: Immediate-mode drawing surface and WebGPU pipeline
//! - `catalog`: Game registry used by the entry points
//! - `settings`: Explicit configuration passed into every game

pub mod ai;
pub mod catalog;
pub mod error;
pub mod games;
pub mod highscores;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use catalog::{Arcade, GameKind, Hud, launch};
pub use error::{SettingsError, WorkerError};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep for frame-driven games (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum steps per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta handed to a frame-driven game (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame rate that per-frame speeds are quoted at
    pub const REFERENCE_FPS: f32 = 60.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the ray from `from` to `to` (screen coordinates, y down)
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Convert a speed quoted per frame at 60 fps into units per second
#[inline]
pub fn per_second(per_frame: f32) -> f32 {
    per_frame * consts::REFERENCE_FPS
}
