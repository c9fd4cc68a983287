//! Tank Battle
//!
//! Two tanks trade shots across an open field. The player aims with the
//! pointer and fires on click; the opponent fires straight at the player on a
//! fixed interval. Shells are swept against the target tank each step.

use std::f32::consts::PI;

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::ai::Policy;
use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::TankSettings;
use crate::sim::{Dir, Schedule, Side, Simulation, StepContext, Verdict, segment_hits_circle};
use crate::{aim_angle, per_second, polar_to_cartesian};

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 400.0;
pub const PLAYER_START: Vec2 = Vec2::new(100.0, 300.0);
pub const OPPONENT_START: Vec2 = Vec2::new(600.0, 300.0);
pub const SHELL_SPEED: f32 = 5.0;
/// Distance from a tank's centre that counts as a hit
pub const HIT_RADIUS: f32 = 20.0;
pub const BARREL_LENGTH: f32 = 40.0;
/// Idle barrel sweep, radians per second
pub const BARREL_SWEEP: f32 = 0.4;
/// Player tank movement per key press
pub const TANK_STEP: f32 = 10.0;
const BODY: Vec2 = Vec2::new(40.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Aim(Vec2),
    Fire(Vec2),
    Drive(Dir),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shell {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub owner: Side,
}

impl Shell {
    fn new(from: Vec2, angle: f32, owner: Side) -> Self {
        Self {
            pos: from,
            velocity: polar_to_cartesian(per_second(SHELL_SPEED), angle),
            owner,
        }
    }
}

/// Aims straight at the player's current position
#[derive(Debug, Clone, Copy)]
pub struct DirectFire;

impl Policy<TankBattle, f32> for DirectFire {
    fn choose_move(&mut self, tank: &TankBattle, _rng: &mut Pcg32) -> Option<f32> {
        Some(aim_angle(tank.opponent, tank.player))
    }
}

pub struct TankBattle {
    settings: TankSettings,
    player: Vec2,
    opponent: Vec2,
    /// Last pointer position
    aim: Vec2,
    /// Opponent barrel angle, cosmetic only
    barrel: f32,
    shells: Vec<Shell>,
    /// Seconds since the opponent last fired
    reload: f32,
    hits: (u32, u32),
}

impl TankBattle {
    pub fn new(settings: TankSettings) -> Self {
        Self {
            settings,
            player: PLAYER_START,
            opponent: OPPONENT_START,
            aim: OPPONENT_START,
            barrel: 0.0,
            shells: Vec::new(),
            reload: 0.0,
            hits: (0, 0),
        }
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn barrel(&self) -> f32 {
        self.barrel
    }

    fn in_field(pos: Vec2) -> bool {
        pos.x > 0.0 && pos.x < WIDTH && pos.y > 0.0 && pos.y < HEIGHT
    }

    /// Move shells, scoring those that reach the other tank
    fn update_shells(&mut self, dt: f32) {
        let (player, opponent) = (self.player, self.opponent);
        let mut hits = self.hits;
        self.shells.retain_mut(|shell| {
            let to = shell.pos + shell.velocity * dt;
            let target = match shell.owner {
                Side::Player => opponent,
                Side::Opponent => player,
            };
            if segment_hits_circle(shell.pos, to, target, HIT_RADIUS).is_some() {
                match shell.owner {
                    Side::Player => hits.0 += 1,
                    Side::Opponent => hits.1 += 1,
                }
                log::debug!("tank: {:?} scores a hit", shell.owner);
                return false;
            }
            shell.pos = to;
            Self::in_field(to)
        });
        self.hits = hits;
    }
}

impl Simulation for TankBattle {
    type Intent = Intent;

    fn name(&self) -> &'static str {
        "tank"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Intent> {
        match event {
            InputEvent::PointerMove(p) => Some(Intent::Aim(*p)),
            InputEvent::PointerDown(p) => Some(Intent::Fire(*p)),
            InputEvent::KeyDown(key) => key.as_direction().map(Intent::Drive),
        }
    }

    fn step(&mut self, intent: Option<Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        match intent {
            Some(Intent::Aim(p)) => self.aim = p,
            Some(Intent::Fire(p)) => {
                self.aim = p;
                let angle = aim_angle(self.player, p);
                self.shells.push(Shell::new(self.player, angle, Side::Player));
            }
            Some(Intent::Drive(dir)) => {
                let (dx, dy) = dir.delta();
                let half = BODY / 2.0;
                self.player = (self.player + Vec2::new(dx as f32, dy as f32) * TANK_STEP)
                    .clamp(half, Vec2::new(WIDTH, HEIGHT) - half);
            }
            None => {}
        }

        self.barrel += BARREL_SWEEP * ctx.dt;
        if self.barrel > PI {
            self.barrel = 0.0;
        }

        let interval = self.settings.fire_interval;
        self.reload += ctx.dt;
        if interval > 0.0 && self.reload >= interval {
            self.reload -= interval;
            if let Some(angle) = DirectFire.choose_move(self, ctx.rng) {
                self.shells.push(Shell::new(self.opponent, angle, Side::Opponent));
            }
        }

        self.update_shells(ctx.dt);

        let target = self.settings.hits_to_win;
        if self.hits.0 >= target {
            Some(Verdict::Won(Side::Player))
        } else if self.hits.1 >= target {
            Some(Verdict::Won(Side::Opponent))
        } else {
            None
        }
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        *self = Self::new(self.settings.clone());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let tanks = [
            (self.player, aim_angle(self.player, self.aim), colors::PLAYER),
            (self.opponent, self.barrel, colors::OPPONENT),
        ];
        for (pos, angle, color) in tanks {
            surface.fill_rect(pos - BODY / 2.0, BODY, color);
            let muzzle = pos + polar_to_cartesian(BARREL_LENGTH, angle);
            surface.line(pos, muzzle, 6.0, colors::WALL);
        }
        for shell in &self.shells {
            let color = match shell.owner {
                Side::Player => colors::PLAYER,
                Side::Opponent => colors::OPPONENT,
            };
            surface.fill_circle(shell.pos, 3.0, color);
        }
    }

    fn message(&self) -> String {
        let (player, opponent) = self.hits;
        let target = self.settings.hits_to_win;
        if player >= target {
            "You win!".to_string()
        } else if opponent >= target {
            "AI wins!".to_string()
        } else {
            format!("Hits {} - {}", player, opponent)
        }
    }

    fn round_score(&self) -> (u32, u32) {
        self.hits
    }
}
