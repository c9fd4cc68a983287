//! The minigames
//!
//! Each module holds one game's state shape, transition, opponent policy and
//! draw routine, implemented through `sim::Simulation`.

pub mod chess;
pub mod connect_four;
pub mod gallery;
pub mod hangman;
pub mod maze;
pub mod memory;
pub mod pong;
pub mod reaction;
pub mod snake;
pub mod space_shooter;
pub mod tank;
pub mod tictactoe;

pub use self::chess::ChessGame;
pub use connect_four::ConnectFour;
pub use gallery::Gallery;
pub use hangman::Hangman;
pub use maze::MazeEscape;
pub use memory::MemoryMatch;
pub use pong::Pong;
pub use reaction::ReactionDuel;
pub use snake::Snake;
pub use space_shooter::SpaceShooter;
pub use tank::TankBattle;
pub use tictactoe::TicTacToe;

use glam::Vec2;

/// One-shot countdown in simulation seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Delay {
    remaining: Option<f32>,
}

impl Delay {
    pub fn start(&mut self, secs: f32) {
        self.remaining = Some(secs.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    /// Count down; true exactly once, on the step the delay runs out
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) if left - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}

/// Cell under `point` on a board of `cols` x `rows` square cells
pub fn board_cell(point: Vec2, origin: Vec2, cell: f32, cols: usize, rows: usize) -> Option<(usize, usize)> {
    let local = (point - origin) / cell;
    if local.x < 0.0 || local.y < 0.0 {
        return None;
    }
    let (col, row) = (local.x as usize, local.y as usize);
    (col < cols && row < rows).then_some((col, row))
}
