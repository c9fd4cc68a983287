//! Space Shooter
//!
//! Enemies fall from the top; the ship slides along the bottom and fires
//! upward. A shot enemy scores one point, an enemy touching the ship ends
//! the run.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::input::{InputEvent, Key};
use crate::per_second;
use crate::renderer::{Surface, colors};
use crate::settings::ShooterSettings;
use crate::sim::{Aabb, Schedule, Side, Simulation, StepContext, Verdict, sweep_aabb};

pub const WIDTH: f32 = 300.0;
pub const HEIGHT: f32 = 400.0;
pub const SHIP_SIZE: f32 = 30.0;
pub const ENEMY_SIZE: f32 = 30.0;
pub const BULLET_SIZE: Vec2 = Vec2::new(5.0, 10.0);
/// Ship movement per key press
pub const SHIP_STEP: f32 = 10.0;
pub const BULLET_SPEED: f32 = 5.0;
pub const ENEMY_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Left,
    Right,
    Fire,
}

pub struct SpaceShooter {
    settings: ShooterSettings,
    /// Top-left corner of the ship
    ship: Vec2,
    /// Top-left corners
    bullets: Vec<Vec2>,
    enemies: Vec<Vec2>,
    score: u32,
    destroyed: bool,
}

impl SpaceShooter {
    pub fn new(settings: ShooterSettings) -> Self {
        Self {
            settings,
            ship: Vec2::new(WIDTH / 2.0 - SHIP_SIZE / 2.0, HEIGHT - 50.0),
            bullets: Vec::new(),
            enemies: Vec::new(),
            score: 0,
            destroyed: false,
        }
    }

    pub fn ship(&self) -> Vec2 {
        self.ship
    }

    pub fn bullets(&self) -> &[Vec2] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Vec2] {
        &self.enemies
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn ship_box(&self) -> Aabb {
        Aabb::from_corner(self.ship, Vec2::splat(SHIP_SIZE))
    }

    /// Move bullets and enemies, removing every bullet/enemy pair that meets
    fn advance_field(&mut self, dt: f32) {
        let bullet_delta = Vec2::new(0.0, -per_second(BULLET_SPEED) * dt);
        let enemy_delta = Vec2::new(0.0, per_second(ENEMY_SPEED) * dt);

        let enemies = &mut self.enemies;
        let mut hits = 0;
        self.bullets.retain_mut(|bullet| {
            let moving = Aabb::from_corner(*bullet, BULLET_SIZE);
            // Sweep in the enemies' frame so closing speeds cannot skip a hit
            let struck = enemies.iter().position(|enemy| {
                let target = Aabb::from_corner(*enemy, Vec2::splat(ENEMY_SIZE));
                sweep_aabb(&moving, bullet_delta - enemy_delta, &target).is_some()
            });
            match struck {
                Some(i) => {
                    enemies.swap_remove(i);
                    hits += 1;
                    false
                }
                None => {
                    *bullet += bullet_delta;
                    bullet.y + BULLET_SIZE.y > 0.0
                }
            }
        });
        self.score += hits;

        for enemy in &mut self.enemies {
            *enemy += enemy_delta;
        }
        self.enemies.retain(|enemy| enemy.y < HEIGHT);
    }

    fn spawn(&mut self, dt: f32, rng: &mut Pcg32) {
        let chance = (self.settings.spawn_rate * dt).clamp(0.0, 1.0) as f64;
        if rng.random_bool(chance) {
            let x = rng.random_range(0.0..WIDTH - ENEMY_SIZE);
            self.enemies.push(Vec2::new(x, 0.0));
        }
    }
}

impl Simulation for SpaceShooter {
    type Intent = Intent;

    fn name(&self) -> &'static str {
        "space_shooter"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Intent> {
        match event {
            InputEvent::KeyDown(Key::Left | Key::Letter('a')) => Some(Intent::Left),
            InputEvent::KeyDown(Key::Right | Key::Letter('d')) => Some(Intent::Right),
            InputEvent::KeyDown(Key::Space) | InputEvent::PointerDown(_) => Some(Intent::Fire),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        match intent {
            Some(Intent::Left) => self.ship.x = (self.ship.x - SHIP_STEP).max(0.0),
            Some(Intent::Right) => self.ship.x = (self.ship.x + SHIP_STEP).min(WIDTH - SHIP_SIZE),
            Some(Intent::Fire) => {
                let muzzle = Vec2::new(self.ship.x + (SHIP_SIZE - BULLET_SIZE.x) / 2.0, self.ship.y);
                self.bullets.push(muzzle);
            }
            None => {}
        }

        self.advance_field(ctx.dt);

        let ship = self.ship_box();
        let rammed = self
            .enemies
            .iter()
            .any(|enemy| Aabb::from_corner(*enemy, Vec2::splat(ENEMY_SIZE)).overlaps(&ship));
        if rammed {
            self.destroyed = true;
            log::info!("space_shooter: ship destroyed with {} points", self.score);
            return Some(Verdict::Won(Side::Opponent));
        }

        self.spawn(ctx.dt, ctx.rng);
        None
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        *self = Self::new(self.settings.clone());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let ship_color = if self.destroyed {
            colors::OPPONENT
        } else {
            colors::PLAYER
        };
        surface.fill_rect(self.ship, Vec2::splat(SHIP_SIZE), ship_color);
        for &bullet in &self.bullets {
            surface.fill_rect(bullet, BULLET_SIZE, colors::PROJECTILE);
        }
        for &enemy in &self.enemies {
            surface.fill_rect(enemy, Vec2::splat(ENEMY_SIZE), colors::NEUTRAL);
        }
    }

    fn message(&self) -> String {
        if self.destroyed {
            format!("Game over! Score: {}", self.score)
        } else {
            format!("Score: {}", self.score)
        }
    }

    fn round_score(&self) -> (u32, u32) {
        (self.score, 0)
    }
}
