//! Reaction Duel
//!
//! Countdown, then a random wait, then the signal. Whoever reacts first
//! after the signal takes the point; clicking before it costs one.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::ai::Policy;
use crate::input::{InputEvent, Key};
use crate::renderer::{Surface, colors};
use crate::settings::ReactionSettings;
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

pub const COUNTDOWN_SECS: f32 = 3.0;
pub const MIN_DELAY: f32 = 2.0;
pub const MAX_DELAY: f32 = 5.0;
pub const AI_MIN_REACTION: f32 = 0.15;
pub const AI_MAX_REACTION: f32 = 0.4;
/// Pause on the result before the next duel
pub const RESULT_SECS: f32 = 1.5;
pub const SIZE: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Countdown { left: f32 },
    /// Signal not shown yet
    Waiting { left: f32 },
    Signal { elapsed: f32, ai_time: f32 },
    Result { left: f32 },
}

/// Reaction time drawn uniformly from the opponent's range
#[derive(Debug, Clone, Copy)]
pub struct Reflex;

impl Policy<ReactionDuel, f32> for Reflex {
    fn choose_move(&mut self, _duel: &ReactionDuel, rng: &mut Pcg32) -> Option<f32> {
        Some(rng.random_range(AI_MIN_REACTION..AI_MAX_REACTION))
    }
}

pub struct ReactionDuel {
    settings: ReactionSettings,
    phase: Phase,
    points: (u32, u32),
    /// Outcome of the last duel, for the HUD
    last: Option<String>,
}

impl ReactionDuel {
    pub fn new(settings: ReactionSettings) -> Self {
        Self {
            settings,
            phase: Phase::Countdown {
                left: COUNTDOWN_SECS,
            },
            points: (0, 0),
            last: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn award(&mut self, side: Side, summary: String) -> Option<Verdict> {
        match side {
            Side::Player => self.points.0 += 1,
            Side::Opponent => self.points.1 += 1,
        }
        log::debug!("reaction: {}", summary);
        self.last = Some(summary);
        self.phase = Phase::Result { left: RESULT_SECS };

        let target = self.settings.points_to_win;
        if self.points.0 >= target {
            Some(Verdict::Won(Side::Player))
        } else if self.points.1 >= target {
            Some(Verdict::Won(Side::Opponent))
        } else {
            None
        }
    }
}

impl Simulation for ReactionDuel {
    type Intent = ();

    fn name(&self) -> &'static str {
        "reaction"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::splat(SIZE)
    }

    fn autostart(&self) -> bool {
        true
    }

    fn map_input(&self, event: &InputEvent) -> Option<()> {
        match event {
            InputEvent::PointerDown(_) | InputEvent::KeyDown(Key::Space | Key::Enter) => Some(()),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<()>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        let clicked = intent.is_some();
        let dt = ctx.dt;

        match self.phase {
            Phase::Countdown { .. } | Phase::Waiting { .. } if clicked => {
                self.points.0 = self.points.0.saturating_sub(1);
                self.last = Some("Too early! -1 point".to_string());
            }
            _ => {}
        }

        match self.phase {
            Phase::Countdown { left } if left - dt <= 0.0 => {
                let delay = ctx.rng.random_range(MIN_DELAY..MAX_DELAY);
                self.phase = Phase::Waiting { left: delay };
            }
            Phase::Countdown { left } => self.phase = Phase::Countdown { left: left - dt },
            Phase::Waiting { left } if left - dt <= 0.0 => {
                let ai_time = Reflex.choose_move(self, ctx.rng).unwrap_or(AI_MAX_REACTION);
                self.phase = Phase::Signal { elapsed: 0.0, ai_time };
            }
            Phase::Waiting { left } => self.phase = Phase::Waiting { left: left - dt },
            Phase::Signal { elapsed, ai_time } => {
                if clicked {
                    let ms = |secs: f32| (secs * 1000.0).round() as u32;
                    let summary = format!("Your time: {}ms vs AI: {}ms", ms(elapsed), ms(ai_time));
                    let side = if elapsed < ai_time {
                        Side::Player
                    } else {
                        Side::Opponent
                    };
                    return self.award(side, summary);
                }
                let elapsed = elapsed + dt;
                if elapsed >= ai_time {
                    let summary = format!("AI reacted in {}ms", (ai_time * 1000.0).round() as u32);
                    return self.award(Side::Opponent, summary);
                }
                self.phase = Phase::Signal { elapsed, ai_time };
            }
            Phase::Result { left } if left - dt <= 0.0 => {
                self.phase = Phase::Countdown {
                    left: COUNTDOWN_SECS,
                };
            }
            Phase::Result { left } => self.phase = Phase::Result { left: left - dt },
        }
        None
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        *self = Self::new(self.settings.clone());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let centre = Vec2::splat(SIZE / 2.0);
        let pad = match self.phase {
            Phase::Countdown { .. } => colors::DIM,
            Phase::Waiting { .. } => colors::OPPONENT,
            Phase::Signal { .. } => colors::FOOD,
            Phase::Result { .. } => colors::NEUTRAL,
        };
        surface.fill_circle(centre, SIZE * 0.4, pad);

        if let Phase::Countdown { left } = self.phase {
            // One pip per remaining second
            let pips = left.ceil() as u32;
            for i in 0..pips {
                let x = centre.x + (i as f32 - (pips as f32 - 1.0) / 2.0) * 30.0;
                surface.fill_circle(Vec2::new(x, centre.y), 8.0, colors::HIGHLIGHT);
            }
        }

        let target = self.settings.points_to_win.max(1) as f32;
        let bar = |points: u32| SIZE * 0.4 * (points as f32 / target).min(1.0);
        surface.fill_rect(Vec2::new(10.0, 10.0), Vec2::new(bar(self.points.0), 8.0), colors::PLAYER);
        surface.fill_rect(Vec2::new(10.0, 22.0), Vec2::new(bar(self.points.1), 8.0), colors::OPPONENT);
    }

    fn message(&self) -> String {
        let (player, opponent) = self.points;
        let target = self.settings.points_to_win;
        if player >= target {
            return "You win the duel!".to_string();
        }
        if opponent >= target {
            return "AI wins the duel!".to_string();
        }
        let prompt = match self.phase {
            Phase::Countdown { left } => format!("Get ready... {}", left.ceil() as u32),
            Phase::Waiting { .. } => "Wait for it...".to_string(),
            Phase::Signal { .. } => "CLICK!".to_string(),
            Phase::Result { .. } => self.last.clone().unwrap_or_default(),
        };
        format!("{} ({} - {})", prompt, player, opponent)
    }

    fn round_score(&self) -> (u32, u32) {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};

    fn session() -> GameSession<ReactionDuel> {
        GameSession::new(ReactionDuel::new(ReactionSettings::default()), RngState::new(77), 1)
    }

    fn run_until(s: &mut GameSession<ReactionDuel>, pred: impl Fn(Phase) -> bool) {
        for _ in 0..2000 {
            if pred(s.game().phase()) {
                return;
            }
            s.step(0.01);
        }
        panic!("phase never reached");
    }

    #[test]
    fn test_starts_counting_down() {
        let s = session();
        assert_eq!(s.status(), Status::Running);
        assert_eq!(s.game().phase(), Phase::Countdown { left: 3.0 });
    }

    #[test]
    fn test_early_click_costs_a_point_not_below_zero() {
        let mut s = session();
        s.submit(());
        s.step(0.01);
        assert_eq!(s.game().round_score(), (0, 0));

        let mut game = ReactionDuel::new(ReactionSettings::default());
        game.points = (2, 0);
        game.phase = Phase::Waiting { left: 1.0 };
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.submit(());
        s.step(0.01);
        assert_eq!(s.game().round_score(), (1, 0));
    }

    #[test]
    fn test_signal_follows_random_delay() {
        let mut s = session();
        run_until(&mut s, |p| matches!(p, Phase::Waiting { .. }));
        let Phase::Waiting { left } = s.game().phase() else {
            unreachable!()
        };
        assert!((MIN_DELAY..MAX_DELAY).contains(&left));
        run_until(&mut s, |p| matches!(p, Phase::Signal { .. }));
        let Phase::Signal { ai_time, .. } = s.game().phase() else {
            unreachable!()
        };
        assert!((AI_MIN_REACTION..AI_MAX_REACTION).contains(&ai_time));
    }

    #[test]
    fn test_faster_player_scores() {
        let mut game = ReactionDuel::new(ReactionSettings::default());
        game.phase = Phase::Signal {
            elapsed: 0.1,
            ai_time: 0.3,
        };
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.submit(());
        assert_eq!(s.step(0.01), None);
        assert_eq!(s.game().round_score(), (1, 0));
        assert_eq!(s.message(), "Your time: 100ms vs AI: 300ms (1 - 0)");
    }

    #[test]
    fn test_silence_gives_the_point_away() {
        let mut s = session();
        run_until(&mut s, |p| matches!(p, Phase::Result { .. }));
        assert_eq!(s.game().round_score(), (0, 1));
        run_until(&mut s, |p| matches!(p, Phase::Countdown { .. }));
    }

    #[test]
    fn test_fifth_point_wins() {
        let mut game = ReactionDuel::new(ReactionSettings::default());
        game.points = (1, 4);
        game.phase = Phase::Signal {
            elapsed: 0.39,
            ai_time: 0.2,
        };
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        assert_eq!(s.step(0.01), Some(Verdict::Won(Side::Opponent)));
        assert_eq!(s.message(), "AI wins the duel!");
    }

    #[test]
    fn test_reset() {
        let mut s = session();
        run_until(&mut s, |p| matches!(p, Phase::Result { .. }));
        s.new_game();
        assert_eq!(s.status(), Status::Running);
        assert_eq!(s.game().round_score(), (0, 0));
        assert_eq!(s.game().phase(), Phase::Countdown { left: 3.0 });
    }
}
