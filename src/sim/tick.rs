//! Generic game session and tick scheduler
//!
//! Every minigame implements [`Simulation`]: its state shape, transition,
//! opponent policy and draw routine. [`GameSession`] wraps one of them and owns
//! everything the games used to duplicate: the pending-intent slot, the status
//! machine, the scoreboard, the seeded RNG and the fixed-interval accumulator.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::state::{RngState, ScoreBoard, SessionToken, Status, Verdict};
use crate::consts::*;
use crate::input::{InputEvent, Key};
use crate::renderer::Surface;

/// How often a game wants to be stepped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule {
    /// Fixed wall-clock period in seconds (grid games)
    Interval(f32),
    /// Once per display refresh with the (clamped) frame delta
    Frame,
}

/// Per-step context handed to [`Simulation::step`]
pub struct StepContext<'a> {
    /// Seconds covered by this step
    pub dt: f32,
    /// Session RNG; the only source of randomness a game may use
    pub rng: &'a mut Pcg32,
    /// Identity of the current round, for deferred work
    pub token: SessionToken,
}

/// One minigame: state shape + transition + policy + draw routine
pub trait Simulation {
    /// A move or attempted transition (column, direction, square, ...)
    type Intent: Clone + std::fmt::Debug;

    fn name(&self) -> &'static str;

    fn schedule(&self) -> Schedule;

    /// World size in pixels (y down)
    fn world_size(&self) -> Vec2;

    /// Rounds that start Running without waiting for player input
    fn autostart(&self) -> bool {
        false
    }

    /// Translate a raw input event into an intent, if it means anything here
    fn map_input(&self, event: &InputEvent) -> Option<Self::Intent>;

    /// Advance the round by one update
    ///
    /// Illegal intents are ignored. Returns a verdict once the round is over;
    /// the session never steps the game again until the next reset.
    fn step(&mut self, intent: Option<Self::Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict>;

    /// Restore the defined initial state of a round
    fn reset(&mut self, rng: &mut Pcg32);

    /// Immediate-mode redraw of the whole scene
    fn draw(&self, surface: &mut dyn Surface);

    /// Status line for the HUD
    fn message(&self) -> String;

    /// In-round points (player, opponent), distinct from rounds won
    fn round_score(&self) -> (u32, u32) {
        (0, 0)
    }
}

/// One live game plus the bookkeeping shared by every game
pub struct GameSession<G: Simulation> {
    game: G,
    status: Status,
    scores: ScoreBoard,
    rng: Pcg32,
    pending: Option<G::Intent>,
    token: SessionToken,
    accumulator: f32,
}

impl<G: Simulation> GameSession<G> {
    pub fn new(mut game: G, rng_state: RngState, session_id: u64) -> Self {
        let mut rng = rng_state.to_rng();
        game.reset(&mut rng);
        let status = if game.autostart() {
            Status::Running
        } else {
            Status::Idle
        };
        log::info!(
            "Session {} started: {} (seed {})",
            session_id,
            game.name(),
            rng_state.seed
        );
        Self {
            game,
            status,
            scores: ScoreBoard::default(),
            rng,
            pending: None,
            token: SessionToken::new(session_id),
            accumulator: 0.0,
        }
    }

    /// Wrap a game that is already set up, without resetting it
    pub fn resume(game: G, rng_state: RngState, session_id: u64, status: Status) -> Self {
        Self {
            game,
            status,
            scores: ScoreBoard::default(),
            rng: rng_state.to_rng(),
            pending: None,
            token: SessionToken::new(session_id),
            accumulator: 0.0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn scores(&self) -> ScoreBoard {
        self.scores
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn pending(&self) -> Option<&G::Intent> {
        self.pending.as_ref()
    }

    /// Record an intent for the next step (latest wins)
    pub fn submit(&mut self, intent: G::Intent) {
        self.pending = Some(intent);
    }

    /// Escape toggles pause; everything else goes through the game's mapping
    pub fn handle_input(&mut self, event: &InputEvent) {
        if *event == InputEvent::KeyDown(Key::Escape) {
            self.toggle_pause();
            return;
        }
        if let Some(intent) = self.game.map_input(event) {
            self.submit(intent);
        }
    }

    /// Run exactly one simulation step of `dt` seconds
    pub fn step(&mut self, dt: f32) -> Option<Verdict> {
        let intent = self.pending.take();

        match self.status {
            Status::Paused | Status::Won(_) | Status::Draw => {
                if let Some(intent) = intent {
                    log::debug!("Ignoring {:?} while {}", intent, self.status.as_str());
                }
                return None;
            }
            Status::Idle => {
                if intent.is_none() {
                    return None;
                }
                self.status = Status::Running;
            }
            Status::Running => {}
        }

        let mut ctx = StepContext {
            dt,
            rng: &mut self.rng,
            token: self.token,
        };
        let verdict = self.game.step(intent, &mut ctx)?;

        self.status = verdict.into();
        self.scores.record(verdict);
        log::info!(
            "{} round over: {} (player {} - opponent {})",
            self.game.name(),
            self.status.as_str(),
            self.scores.player,
            self.scores.opponent
        );
        Some(verdict)
    }

    /// Advance by `elapsed` wall-clock seconds; returns the steps taken
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = elapsed.clamp(0.0, MAX_FRAME_DT);
        match self.game.schedule() {
            Schedule::Interval(period) if period > 0.0 => {
                self.accumulator += elapsed;
                let mut substeps = 0;
                while self.accumulator >= period && substeps < MAX_SUBSTEPS {
                    self.step(period);
                    self.accumulator -= period;
                    substeps += 1;
                }
                if substeps == MAX_SUBSTEPS {
                    // Drop the backlog instead of catching up forever
                    self.accumulator %= period;
                }
                substeps
            }
            _ => {
                self.step(elapsed);
                1
            }
        }
    }

    /// Advance, then redraw the scene
    pub fn frame(&mut self, elapsed: f32, surface: &mut dyn Surface) {
        self.advance(elapsed);
        self.draw(surface);
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.game.draw(surface);
    }

    /// Start a fresh round; the scoreboard carries over
    pub fn new_game(&mut self) {
        self.token = self.token.next();
        self.game.reset(&mut self.rng);
        self.status = if self.game.autostart() {
            Status::Running
        } else {
            Status::Idle
        };
        self.pending = None;
        self.accumulator = 0.0;
        log::info!(
            "{} new round (generation {})",
            self.game.name(),
            self.token.generation
        );
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            other => other,
        };
    }

    /// HUD status line
    pub fn message(&self) -> String {
        match self.status {
            Status::Paused => "Paused".to_string(),
            _ => self.game.message(),
        }
    }
}
