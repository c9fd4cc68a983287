//! Deterministic simulation module
//!
//! Game-independent pieces of every minigame:
//! - Fixed interval or per-frame stepping through one generic session
//! - Seeded RNG only (one `Pcg32` per session)
//! - Swept collision tests for continuous motion
//! - No rendering or platform dependencies beyond the `Surface` trait

pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use collision::{
    Aabb, SweepHit, circles_overlap, point_in_circle, ray_aabb, reflect_velocity,
    segment_hits_circle, sweep_aabb,
};
pub use grid::{Cell, Dir, WallGrid, Walls};
pub use state::{RngState, ScoreBoard, SessionToken, Side, Status, Verdict};
pub use tick::{GameSession, Schedule, Simulation, StepContext};
