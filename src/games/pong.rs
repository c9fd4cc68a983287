//! Pong
//!
//! Player paddle on the left, tracking opponent on the right. The ball is
//! swept against both paddles each step so it cannot tunnel at large `dt`.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::ai::Policy;
use crate::input::{InputEvent, Key};
use crate::per_second;
use crate::renderer::{Surface, colors};
use crate::settings::PongSettings;
use crate::sim::{Aabb, Schedule, Side, Simulation, StepContext, Verdict, reflect_velocity, sweep_aabb};

pub const WIDTH: f32 = 600.0;
pub const HEIGHT: f32 = 400.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const BALL_SIZE: f32 = 10.0;
/// Player paddle movement per key press
pub const PADDLE_STEP: f32 = 10.0;
/// Full opponent paddle speed before the difficulty factor
pub const PADDLE_SPEED: f32 = 10.0;
pub const BALL_SPEED: f32 = 5.0;
/// Half-width of the opponent's random dead zone
pub const JITTER: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Move the paddle by this many pixels
    Nudge(f32),
    /// Centre the paddle on this y
    Aim(f32),
}

/// Follows the ball with a jittery dead zone
///
/// Chooses -1 (up), 1 (down) or 0 for the opponent paddle.
#[derive(Debug, Clone, Copy)]
pub struct PaddleTracker;

impl Policy<Pong, f32> for PaddleTracker {
    fn choose_move(&mut self, pong: &Pong, rng: &mut Pcg32) -> Option<f32> {
        let center = pong.opponent_y + PADDLE_HEIGHT / 2.0;
        let jitter = rng.random_range(-JITTER..JITTER);
        let dir = if pong.ball.y < center - jitter {
            -1.0
        } else if pong.ball.y > center + jitter {
            1.0
        } else {
            0.0
        };
        Some(dir)
    }
}

pub struct Pong {
    settings: PongSettings,
    /// Ball centre
    ball: Vec2,
    velocity: Vec2,
    /// Top edges of the paddles
    player_y: f32,
    opponent_y: f32,
    points: (u32, u32),
}

impl Pong {
    pub fn new(settings: PongSettings) -> Self {
        Self {
            settings,
            ball: Vec2::new(WIDTH, HEIGHT) / 2.0,
            velocity: Vec2::splat(per_second(BALL_SPEED)),
            player_y: (HEIGHT - PADDLE_HEIGHT) / 2.0,
            opponent_y: (HEIGHT - PADDLE_HEIGHT) / 2.0,
            points: (0, 0),
        }
    }

    pub fn ball(&self) -> Vec2 {
        self.ball
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn player_y(&self) -> f32 {
        self.player_y
    }

    pub fn opponent_y(&self) -> f32 {
        self.opponent_y
    }

    fn clamp_paddle(y: f32) -> f32 {
        y.clamp(0.0, HEIGHT - PADDLE_HEIGHT)
    }

    fn player_paddle(&self) -> Aabb {
        Aabb::from_corner(Vec2::new(0.0, self.player_y), Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT))
    }

    fn opponent_paddle(&self) -> Aabb {
        Aabb::from_corner(
            Vec2::new(WIDTH - PADDLE_WIDTH, self.opponent_y),
            Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
        )
    }

    fn ball_box(&self) -> Aabb {
        Aabb::from_center(self.ball, Vec2::splat(BALL_SIZE / 2.0))
    }

    /// Centre serve; the ball heads toward `toward`
    fn serve(&mut self, toward: Side) {
        let speed = per_second(BALL_SPEED);
        self.ball = Vec2::new(WIDTH, HEIGHT) / 2.0;
        self.velocity.x = match toward {
            Side::Player => -speed,
            Side::Opponent => speed,
        };
    }

    /// Move the ball for `dt`, bouncing off the paddle it is heading for
    fn move_ball(&mut self, dt: f32) {
        let delta = self.velocity * dt;
        let paddle = if self.velocity.x < 0.0 {
            self.player_paddle()
        } else {
            self.opponent_paddle()
        };

        match sweep_aabb(&self.ball_box(), delta, &paddle) {
            Some(hit) => {
                self.ball += delta * hit.time;
                if hit.normal == Vec2::ZERO {
                    self.velocity.x = -self.velocity.x;
                } else {
                    self.velocity = reflect_velocity(self.velocity, hit.normal);
                }
                self.ball += self.velocity * dt * (1.0 - hit.time);
            }
            None => self.ball += delta,
        }

        let half = BALL_SIZE / 2.0;
        if self.ball.y - half < 0.0 {
            self.ball.y = 2.0 * half - self.ball.y;
            self.velocity.y = self.velocity.y.abs();
        } else if self.ball.y + half > HEIGHT {
            self.ball.y = 2.0 * (HEIGHT - half) - self.ball.y;
            self.velocity.y = -self.velocity.y.abs();
        }
    }
}

impl Simulation for Pong {
    type Intent = Intent;

    fn name(&self) -> &'static str {
        "pong"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Intent> {
        match event {
            InputEvent::KeyDown(Key::Up | Key::Letter('w')) => Some(Intent::Nudge(-PADDLE_STEP)),
            InputEvent::KeyDown(Key::Down | Key::Letter('s')) => Some(Intent::Nudge(PADDLE_STEP)),
            InputEvent::PointerMove(p) => Some(Intent::Aim(p.y)),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        match intent {
            Some(Intent::Nudge(dy)) => self.player_y = Self::clamp_paddle(self.player_y + dy),
            Some(Intent::Aim(y)) => self.player_y = Self::clamp_paddle(y - PADDLE_HEIGHT / 2.0),
            None => {}
        }

        let dir = PaddleTracker.choose_move(self, ctx.rng).unwrap_or(0.0);
        let speed = per_second(PADDLE_SPEED) * self.settings.difficulty;
        self.opponent_y = Self::clamp_paddle(self.opponent_y + dir * speed * ctx.dt);

        self.move_ball(ctx.dt);

        let scorer = if self.ball.x < 0.0 {
            Side::Opponent
        } else if self.ball.x > WIDTH {
            Side::Player
        } else {
            return None;
        };

        match scorer {
            Side::Player => self.points.0 += 1,
            Side::Opponent => self.points.1 += 1,
        }
        log::debug!("pong: point to {:?}, {}-{}", scorer, self.points.0, self.points.1);
        self.serve(scorer);

        let target = self.settings.points_to_win;
        if self.points.0 >= target {
            Some(Verdict::Won(Side::Player))
        } else if self.points.1 >= target {
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
        surface.line(
            Vec2::new(WIDTH / 2.0, 0.0),
            Vec2::new(WIDTH / 2.0, HEIGHT),
            2.0,
            colors::GRID_LINE,
        );
        let paddle = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
        surface.fill_rect(Vec2::new(0.0, self.player_y), paddle, colors::PLAYER);
        surface.fill_rect(
            Vec2::new(WIDTH - PADDLE_WIDTH, self.opponent_y),
            paddle,
            colors::OPPONENT,
        );
        surface.fill_circle(self.ball, BALL_SIZE / 2.0, colors::NEUTRAL);
    }

    fn message(&self) -> String {
        let (player, opponent) = self.points;
        let target = self.settings.points_to_win;
        if player >= target {
            "You win!".to_string()
        } else if opponent >= target {
            "AI wins!".to_string()
        } else {
            format!("{} - {}", player, opponent)
        }
    }

    fn round_score(&self) -> (u32, u32) {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};

    fn running(game: Pong) -> GameSession<Pong> {
        GameSession::resume(game, RngState::new(3), 1, Status::Running)
    }

    #[test]
    fn test_waits_for_input() {
        let mut s = GameSession::new(Pong::new(PongSettings::default()), RngState::new(3), 1);
        s.advance(0.016);
        assert_eq!(s.game().ball(), Vec2::new(300.0, 200.0));
        s.submit(Intent::Nudge(PADDLE_STEP));
        s.advance(0.016);
        assert_eq!(s.status(), Status::Running);
        assert_eq!(s.game().player_y(), 160.0);
    }

    #[test]
    fn test_paddle_stays_on_screen() {
        let mut s = running(Pong::new(PongSettings::default()));
        for _ in 0..40 {
            s.submit(Intent::Nudge(-PADDLE_STEP));
            s.step(0.001);
        }
        assert_eq!(s.game().player_y(), 0.0);
        s.submit(Intent::Aim(HEIGHT));
        s.step(0.001);
        assert_eq!(s.game().player_y(), HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_fast_ball_does_not_tunnel() {
        let mut game = Pong::new(PongSettings::default());
        game.ball = Vec2::new(30.0, 200.0);
        game.velocity = Vec2::new(-300.0, 0.0);
        game.player_y = 150.0;
        let mut s = running(game);
        // 30 px of travel in one step, more than the paddle is wide
        s.step(0.1);
        assert!(s.game().velocity().x > 0.0);
        assert!(s.game().ball().x > PADDLE_WIDTH);
        assert_eq!(s.game().round_score(), (0, 0));
    }

    #[test]
    fn test_wall_bounce() {
        let mut game = Pong::new(PongSettings::default());
        game.ball = Vec2::new(300.0, 8.0);
        game.velocity = Vec2::new(300.0, -300.0);
        let mut s = running(game);
        s.step(0.02);
        assert!(s.game().velocity().y > 0.0);
        assert!(s.game().ball().y >= BALL_SIZE / 2.0);
    }

    #[test]
    fn test_goal_serves_toward_scorer() {
        let mut game = Pong::new(PongSettings::default());
        game.ball = Vec2::new(3.0, 20.0);
        game.velocity = Vec2::new(-300.0, 300.0);
        game.player_y = 300.0;
        let mut s = running(game);
        s.step(0.05);
        assert_eq!(s.game().round_score(), (0, 1));
        assert_eq!(s.game().ball(), Vec2::new(300.0, 200.0));
        assert!(s.game().velocity().x > 0.0);

        let mut game = Pong::new(PongSettings::default());
        game.ball = Vec2::new(597.0, 20.0);
        game.velocity = Vec2::new(300.0, 300.0);
        game.opponent_y = 300.0;
        let mut s = running(game);
        s.step(0.05);
        assert_eq!(s.game().round_score(), (1, 0));
        assert!(s.game().velocity().x < 0.0);
    }

    #[test]
    fn test_match_point_ends_round() {
        let mut game = Pong::new(PongSettings::default());
        game.points = (4, 2);
        game.ball = Vec2::new(597.0, 20.0);
        game.velocity = Vec2::new(300.0, 300.0);
        game.opponent_y = 300.0;
        let mut s = running(game);
        assert_eq!(s.step(0.05), Some(Verdict::Won(Side::Player)));
        assert_eq!(s.message(), "You win!");
        assert_eq!(s.scores().player, 1);
    }

    #[test]
    fn test_opponent_tracks_ball() {
        let mut game = Pong::new(PongSettings::default());
        game.ball = Vec2::new(300.0, 390.0);
        game.velocity = Vec2::new(-300.0, 0.0);
        let start = game.opponent_y;
        let mut s = running(game);
        for _ in 0..10 {
            s.step(0.016);
        }
        assert!(s.game().opponent_y() > start);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut s = running(Pong::new(PongSettings::default()));
        for _ in 0..50 {
            s.step(0.016);
        }
        s.new_game();
        assert_eq!(s.game().ball(), Vec2::new(300.0, 200.0));
        assert_eq!(s.game().round_score(), (0, 0));
        assert_eq!(s.game().player_y(), 150.0);
    }
}
