//! Shooting Gallery
//!
//! Targets pop up at random; clicking inside one scores it. The round is
//! timed: reach the goal before the clock runs out.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::GallerySettings;
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict, point_in_circle};

pub const WIDTH: f32 = 300.0;
pub const HEIGHT: f32 = 400.0;
/// Target diameter
pub const TARGET_SIZE: f32 = 20.0;

pub struct Gallery {
    settings: GallerySettings,
    /// Target centres, oldest first
    targets: Vec<Vec2>,
    /// Last click, drawn as a marker
    last_shot: Option<Vec2>,
    score: u32,
    time_left: f32,
}

impl Gallery {
    pub fn new(settings: GallerySettings) -> Self {
        let time_left = settings.round_secs;
        Self {
            settings,
            targets: Vec::new(),
            last_shot: None,
            score: 0,
            time_left,
        }
    }

    pub fn targets(&self) -> &[Vec2] {
        &self.targets
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Remove the topmost target under `point`
    fn shoot(&mut self, point: Vec2) -> bool {
        self.last_shot = Some(point);
        let hit = self
            .targets
            .iter()
            .rposition(|&target| point_in_circle(point, target, TARGET_SIZE / 2.0));
        match hit {
            Some(i) => {
                self.targets.remove(i);
                self.score += 1;
                true
            }
            None => false,
        }
    }
}

impl Simulation for Gallery {
    type Intent = Vec2;

    fn name(&self) -> &'static str {
        "gallery"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Vec2> {
        match event {
            InputEvent::PointerDown(p) => Some(*p),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Vec2>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        if let Some(point) = intent
            && self.shoot(point)
            && self.score >= self.settings.goal
        {
            log::info!("gallery: goal reached with {:.1}s left", self.time_left);
            return Some(Verdict::Won(Side::Player));
        }

        self.time_left -= ctx.dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            return Some(Verdict::Won(Side::Opponent));
        }

        let chance = (self.settings.spawn_rate * ctx.dt).clamp(0.0, 1.0) as f64;
        if ctx.rng.random_bool(chance) {
            let x = ctx.rng.random_range(0.0..WIDTH - TARGET_SIZE);
            let y = ctx.rng.random_range(0.0..HEIGHT - TARGET_SIZE);
            self.targets.push(Vec2::new(x, y) + TARGET_SIZE / 2.0);
        }
        None
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        *self = Self::new(self.settings.clone());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        for &target in &self.targets {
            surface.fill_circle(target, TARGET_SIZE / 2.0, colors::OPPONENT);
            surface.fill_circle(target, TARGET_SIZE / 5.0, colors::NEUTRAL);
        }
        if let Some(shot) = self.last_shot {
            surface.fill_rect(shot - 2.0, Vec2::splat(4.0), colors::DIM);
        }
        // Time bar along the top edge
        let frac = (self.time_left / self.settings.round_secs.max(f32::EPSILON)).clamp(0.0, 1.0);
        surface.fill_rect(Vec2::ZERO, Vec2::new(WIDTH * frac, 4.0), colors::HIGHLIGHT);
    }

    fn message(&self) -> String {
        if self.score >= self.settings.goal {
            format!("Goal reached! Score: {}", self.score)
        } else if self.time_left <= 0.0 {
            format!("Time's up! Score: {}", self.score)
        } else {
            format!("Score: {} / {}  Time: {:.0}", self.score, self.settings.goal, self.time_left.ceil())
        }
    }

    fn round_score(&self) -> (u32, u32) {
        (self.score, 0)
    }
}
