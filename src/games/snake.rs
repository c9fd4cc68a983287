//! Snake
//!
//! Moves one cell per interval. Hitting a wall or the body ends the run;
//! eating grows the snake by one and scores a point.

use std::collections::VecDeque;

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::SnakeSettings;
use crate::sim::{Cell, Dir, Schedule, Side, Simulation, StepContext, Verdict};

/// Pixel size of one cell
pub const CELL: f32 = 20.0;

pub struct Snake {
    settings: SnakeSettings,
    /// Head first
    body: VecDeque<Cell>,
    heading: Dir,
    food: Option<Cell>,
    score: u32,
    dead: bool,
}

impl Snake {
    pub fn new(settings: SnakeSettings) -> Self {
        let mut snake = Self {
            settings,
            body: VecDeque::new(),
            heading: Dir::Right,
            food: None,
            score: 0,
            dead: false,
        };
        snake.body.push_back(snake.start());
        snake
    }

    fn start(&self) -> Cell {
        let mid = self.settings.grid_size / 2;
        Cell::new(mid, mid)
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn heading(&self) -> Dir {
        self.heading
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        let n = self.settings.grid_size;
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y)
    }

    /// Uniform pick among cells the snake does not cover
    fn place_food(&mut self, rng: &mut Pcg32) {
        let n = self.settings.grid_size;
        let free: Vec<Cell> = (0..n)
            .flat_map(|y| (0..n).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        self.food = free.choose(rng).copied();
    }
}

impl Simulation for Snake {
    type Intent = Dir;

    fn name(&self) -> &'static str {
        "snake"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Interval(self.settings.interval)
    }

    fn world_size(&self) -> Vec2 {
        Vec2::splat(self.settings.grid_size as f32 * CELL)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Dir> {
        match event {
            InputEvent::KeyDown(key) => key.as_direction(),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Dir>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        if let Some(dir) = intent {
            // Reversing into the neck is not a move
            if dir != self.heading.opposite() || self.body.len() == 1 {
                self.heading = dir;
            }
        }

        let head = self.body.front().copied()?.step(self.heading);
        let eating = self.food == Some(head);

        let hits_body = self
            .body
            .iter()
            .take(if eating { self.body.len() } else { self.body.len() - 1 })
            .any(|&segment| segment == head);
        if !self.in_bounds(head) || hits_body {
            self.dead = true;
            log::info!("snake: run over with {} points", self.score);
            return Some(Verdict::Won(Side::Opponent));
        }

        self.body.push_front(head);
        if eating {
            self.score += 1;
            self.place_food(ctx.rng);
            if self.food.is_none() {
                return Some(Verdict::Won(Side::Player));
            }
        } else {
            self.body.pop_back();
        }
        None
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.body.clear();
        self.body.push_back(self.start());
        self.heading = Dir::Right;
        self.score = 0;
        self.dead = false;
        self.place_food(rng);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let size = Vec2::splat(CELL - 1.0);
        let corner = |cell: Cell| Vec2::new(cell.x as f32, cell.y as f32) * CELL;

        if let Some(food) = self.food {
            surface.fill_rect(corner(food), size, colors::FOOD);
        }
        for (i, &segment) in self.body.iter().enumerate() {
            let color = if i == 0 { colors::HIGHLIGHT } else { colors::PLAYER };
            surface.fill_rect(corner(segment), size, color);
        }
    }

    fn message(&self) -> String {
        if self.dead {
            format!("Game over! Score: {}", self.score)
        } else if self.food.is_none() && self.score > 0 {
            format!("Board cleared! Score: {}", self.score)
        } else {
            format!("Score: {}", self.score)
        }
    }

    fn round_score(&self) -> (u32, u32) {
        (self.score, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};

    fn session() -> GameSession<Snake> {
        GameSession::new(Snake::new(SnakeSettings::default()), RngState::new(12), 1)
    }

    #[test]
    fn test_starts_centred_heading_right() {
        let s = session();
        assert_eq!(s.game().body().front(), Some(&Cell::new(10, 10)));
        assert_eq!(s.game().heading(), Dir::Right);
        let food = s.game().food().unwrap();
        assert!(!s.game().body().contains(&food));
    }

    #[test]
    fn test_waits_for_first_key() {
        let mut s = session();
        assert_eq!(s.advance(0.1), 1);
        assert_eq!(s.game().body().front(), Some(&Cell::new(10, 10)));
        s.submit(Dir::Down);
        s.advance(0.1);
        assert_eq!(s.status(), Status::Running);
        assert_eq!(s.game().body().front(), Some(&Cell::new(10, 11)));
    }

    #[test]
    fn test_wall_ends_run() {
        let mut game = Snake::new(SnakeSettings::default());
        game.body = VecDeque::from([Cell::new(19, 5)]);
        game.food = Some(Cell::new(0, 0));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        assert_eq!(s.step(0.1), Some(Verdict::Won(Side::Opponent)));
        assert_eq!(s.message(), "Game over! Score: 0");
        assert_eq!(s.scores().opponent, 1);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = Snake::new(SnakeSettings::default());
        game.food = Some(Cell::new(11, 10));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.step(0.1);
        assert_eq!(s.game().score(), 1);
        assert_eq!(s.game().body().len(), 2);
        assert_ne!(s.game().food(), Some(Cell::new(11, 10)));
        assert_eq!(s.game().round_score(), (1, 0));
    }

    #[test]
    fn test_reverse_is_rejected() {
        let mut game = Snake::new(SnakeSettings::default());
        game.body = VecDeque::from([Cell::new(5, 5), Cell::new(4, 5)]);
        game.food = Some(Cell::new(0, 0));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.submit(Dir::Left);
        assert_eq!(s.step(0.1), None);
        assert_eq!(s.game().body().front(), Some(&Cell::new(6, 5)));
    }

    #[test]
    fn test_self_collision() {
        let mut game = Snake::new(SnakeSettings::default());
        // Head at (5,5) moving up into its own body
        game.body = VecDeque::from([
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 4),
            Cell::new(5, 4),
            Cell::new(4, 4),
        ]);
        game.heading = Dir::Left;
        game.food = Some(Cell::new(0, 0));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.submit(Dir::Up);
        assert_eq!(s.step(0.1), Some(Verdict::Won(Side::Opponent)));
    }

    #[test]
    fn test_following_the_tail_is_safe() {
        let mut game = Snake::new(SnakeSettings::default());
        game.body = VecDeque::from([
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 4),
            Cell::new(5, 4),
        ]);
        game.heading = Dir::Left;
        game.food = Some(Cell::new(0, 0));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        s.submit(Dir::Up);
        assert_eq!(s.step(0.1), None);
        assert_eq!(s.game().body().front(), Some(&Cell::new(5, 4)));
    }

    #[test]
    fn test_filling_the_board_wins() {
        let settings = SnakeSettings {
            grid_size: 2,
            interval: 0.1,
        };
        let mut game = Snake::new(settings);
        game.body = VecDeque::from([Cell::new(0, 1), Cell::new(0, 0), Cell::new(1, 0)]);
        game.heading = Dir::Right;
        game.food = Some(Cell::new(1, 1));
        let mut s = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        assert_eq!(s.step(0.1), Some(Verdict::Won(Side::Player)));
        assert_eq!(s.game().score(), 1);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut s = session();
        s.submit(Dir::Up);
        for _ in 0..30 {
            s.advance(0.1);
        }
        assert!(s.status().is_terminal());
        s.new_game();
        assert_eq!(s.game().body().len(), 1);
        assert_eq!(s.game().score(), 0);
        assert_eq!(s.status(), Status::Idle);
    }
}
