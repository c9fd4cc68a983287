//! Game registry
//!
//! Entry points pick a [`GameKind`], [`launch`] it into a boxed [`Arcade`] and
//! from then on only talk to the trait object: feed input, run frames, read
//! the [`Hud`].

use glam::Vec2;
use serde::Serialize;

use crate::games::{
    ChessGame, ConnectFour, Gallery, Hangman, MazeEscape, MemoryMatch, Pong, ReactionDuel, Snake,
    SpaceShooter, TankBattle, TicTacToe,
};
use crate::highscores::HighScores;
use crate::input::InputEvent;
use crate::renderer::Surface;
use crate::settings::Settings;
use crate::sim::{GameSession, RngState, ScoreBoard, Simulation, Status};

/// Every game in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
    Chess,
    Snake,
    Pong,
    Tank,
    Maze,
    SpaceShooter,
    Gallery,
    Memory,
    Hangman,
    Reaction,
}

impl GameKind {
    pub const ALL: [GameKind; 12] = [
        GameKind::TicTacToe,
        GameKind::ConnectFour,
        GameKind::Chess,
        GameKind::Snake,
        GameKind::Pong,
        GameKind::Tank,
        GameKind::Maze,
        GameKind::SpaceShooter,
        GameKind::Gallery,
        GameKind::Memory,
        GameKind::Hangman,
        GameKind::Reaction,
    ];

    /// Identifier used in URLs and logs; matches `Simulation::name`
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tictactoe",
            GameKind::ConnectFour => "connect_four",
            GameKind::Chess => "chess",
            GameKind::Snake => "snake",
            GameKind::Pong => "pong",
            GameKind::Tank => "tank",
            GameKind::Maze => "maze",
            GameKind::SpaceShooter => "space_shooter",
            GameKind::Gallery => "gallery",
            GameKind::Memory => "memory",
            GameKind::Hangman => "hangman",
            GameKind::Reaction => "reaction",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::TicTacToe => "Tic-Tac-Toe",
            GameKind::ConnectFour => "Connect Four",
            GameKind::Chess => "Chess",
            GameKind::Snake => "Snake",
            GameKind::Pong => "Pong",
            GameKind::Tank => "Tank Battle",
            GameKind::Maze => "Maze Escape",
            GameKind::SpaceShooter => "Space Shooter",
            GameKind::Gallery => "Shooting Gallery",
            GameKind::Memory => "Memory Match",
            GameKind::Hangman => "Hangman",
            GameKind::Reaction => "Reaction Duel",
        }
    }

    /// Runs with a score and no opponent; they feed the high-score table
    pub fn is_single_player(&self) -> bool {
        matches!(self, GameKind::Snake | GameKind::SpaceShooter | GameKind::Gallery)
    }

    fn index(&self) -> u64 {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0) as u64
    }
}

/// HUD snapshot of one running game
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub game: &'static str,
    pub status: Status,
    pub message: String,
    /// Rounds won per side
    pub scores: ScoreBoard,
    /// Points inside the current round (player, opponent)
    pub round_score: (u32, u32),
    /// Best single-player run so far
    pub best: Option<u64>,
}

/// Object-safe face of a running game session
pub trait Arcade {
    fn name(&self) -> &'static str;

    fn world_size(&self) -> Vec2;

    fn handle_input(&mut self, event: &InputEvent);

    /// Advance by wall-clock seconds; returns the simulation steps taken
    fn advance(&mut self, elapsed: f32) -> u32;

    fn draw(&self, surface: &mut dyn Surface);

    fn frame(&mut self, elapsed: f32, surface: &mut dyn Surface) {
        self.advance(elapsed);
        self.draw(surface);
    }

    fn new_game(&mut self);

    fn toggle_pause(&mut self);

    fn status(&self) -> Status;

    fn hud(&self) -> Hud;

    fn high_scores(&self) -> Option<&HighScores>;
}

/// A session plus the per-session extras the catalog adds
pub struct Cabinet<G: Simulation> {
    session: GameSession<G>,
    /// Present for single-player games only
    high_scores: Option<HighScores>,
    recorded: bool,
}

impl<G: Simulation> Cabinet<G> {
    pub fn new(session: GameSession<G>, single_player: bool) -> Self {
        Self {
            session,
            high_scores: single_player.then(HighScores::new),
            recorded: false,
        }
    }

    pub fn session(&self) -> &GameSession<G> {
        &self.session
    }

    /// Put a finished run on the table, once per round
    fn record_run(&mut self) {
        if self.recorded || !self.session.status().is_terminal() {
            return;
        }
        self.recorded = true;
        if let Some(table) = self.high_scores.as_mut() {
            let score = self.session.game().round_score().0 as u64;
            table.add_score(score, self.session.token().generation);
        }
    }
}

impl<G: Simulation> Arcade for Cabinet<G> {
    fn name(&self) -> &'static str {
        self.session.game().name()
    }

    fn world_size(&self) -> Vec2 {
        self.session.game().world_size()
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.session.handle_input(event);
    }

    fn advance(&mut self, elapsed: f32) -> u32 {
        let steps = self.session.advance(elapsed);
        self.record_run();
        steps
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.session.draw(surface);
    }

    fn new_game(&mut self) {
        self.session.new_game();
        self.recorded = false;
    }

    fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    fn status(&self) -> Status {
        self.session.status()
    }

    fn hud(&self) -> Hud {
        Hud {
            game: self.name(),
            status: self.session.status(),
            message: self.session.message(),
            scores: self.session.scores(),
            round_score: self.session.game().round_score(),
            best: self.high_scores.as_ref().and_then(HighScores::top_score),
        }
    }

    fn high_scores(&self) -> Option<&HighScores> {
        self.high_scores.as_ref()
    }
}

fn cabinet<G: Simulation + 'static>(kind: GameKind, game: G, seed: u64) -> Box<dyn Arcade> {
    let id = kind.index() + 1;
    let session = GameSession::new(game, RngState::with_stream(seed, id), id);
    Box::new(Cabinet::new(session, kind.is_single_player()))
}

/// Start a fresh session of `kind`
pub fn launch(kind: GameKind, settings: &Settings, seed: u64) -> Box<dyn Arcade> {
    log::info!("Launching {} (seed {})", kind.title(), seed);
    match kind {
        GameKind::TicTacToe => cabinet(kind, TicTacToe::new(settings.tictactoe.clone()), seed),
        GameKind::ConnectFour => cabinet(kind, ConnectFour::new(settings.connect_four.clone()), seed),
        GameKind::Chess => {
            let game = if settings.search_worker {
                ChessGame::with_worker(settings.chess.clone(), settings.worker_timeout)
            } else {
                ChessGame::new(settings.chess.clone())
            };
            cabinet(kind, game, seed)
        }
        GameKind::Snake => cabinet(kind, Snake::new(settings.snake.clone()), seed),
        GameKind::Pong => cabinet(kind, Pong::new(settings.pong.clone()), seed),
        GameKind::Tank => cabinet(kind, TankBattle::new(settings.tank.clone()), seed),
        GameKind::Maze => cabinet(kind, MazeEscape::new(settings.maze.clone()), seed),
        GameKind::SpaceShooter => cabinet(kind, SpaceShooter::new(settings.shooter.clone()), seed),
        GameKind::Gallery => cabinet(kind, Gallery::new(settings.gallery.clone()), seed),
        GameKind::Memory => cabinet(kind, MemoryMatch::new(settings.memory.clone()), seed),
        GameKind::Hangman => cabinet(kind, Hangman::new(settings.hangman.clone()), seed),
        GameKind::Reaction => cabinet(kind, ReactionDuel::new(settings.reaction.clone()), seed),
    }
}
