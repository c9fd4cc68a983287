//! Maze Escape
//!
//! A race to the exit through a freshly carved maze. The opponent follows the
//! BFS shortest path one cell per `ai_interval`.

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::ai::{Policy, shortest_path};
use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::MazeSettings;
use crate::sim::{Cell, Dir, Schedule, Side, Simulation, StepContext, Verdict, WallGrid};

/// Pixel size of one cell
pub const CELL: f32 = 30.0;

/// Next cell on the shortest route to the exit
#[derive(Debug, Clone, Copy)]
pub struct PathFollower;

impl Policy<MazeEscape, Cell> for PathFollower {
    fn choose_move(&mut self, maze: &MazeEscape, _rng: &mut Pcg32) -> Option<Cell> {
        shortest_path(&maze.grid, maze.opponent, maze.exit())
            .get(1)
            .copied()
    }
}

pub struct MazeEscape {
    settings: MazeSettings,
    grid: WallGrid,
    player: Cell,
    opponent: Cell,
    /// Seconds until the opponent moves again
    ai_clock: f32,
}

impl MazeEscape {
    pub fn new(settings: MazeSettings) -> Self {
        let grid = WallGrid::closed(settings.width, settings.height);
        let mut maze = Self {
            settings,
            grid,
            player: Cell::new(0, 0),
            opponent: Cell::new(0, 0),
            ai_clock: 0.0,
        };
        maze.place_runners();
        maze
    }

    fn place_runners(&mut self) {
        let (w, h) = (self.settings.width as i32, self.settings.height as i32);
        self.player = Cell::new(1, 1);
        self.opponent = Cell::new(w - 2, h - 2);
        self.ai_clock = self.settings.ai_interval;
    }

    pub fn grid(&self) -> &WallGrid {
        &self.grid
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn opponent(&self) -> Cell {
        self.opponent
    }

    pub fn exit(&self) -> Cell {
        Cell::new(self.settings.width as i32 - 2, 1)
    }
}

impl Simulation for MazeEscape {
    type Intent = Dir;

    fn name(&self) -> &'static str {
        "maze"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(self.settings.width as f32, self.settings.height as f32) * CELL
    }

    fn map_input(&self, event: &InputEvent) -> Option<Dir> {
        match event {
            InputEvent::KeyDown(key) => key.as_direction(),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Dir>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        if let Some(dir) = intent
            && self.grid.can_move(self.player, dir)
        {
            self.player = self.player.step(dir);
        }

        self.ai_clock -= ctx.dt;
        if self.ai_clock <= 0.0 {
            self.ai_clock += self.settings.ai_interval;
            match PathFollower.choose_move(self, ctx.rng) {
                Some(next) => self.opponent = next,
                None => log::debug!("maze: opponent has no route from {:?}", self.opponent),
            }
        }

        let exit = self.exit();
        if self.player == exit {
            Some(Verdict::Won(Side::Player))
        } else if self.opponent == exit {
            Some(Verdict::Won(Side::Opponent))
        } else {
            None
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.grid = WallGrid::generate(self.settings.width, self.settings.height, rng);
        self.place_runners();
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let origin = |cell: Cell| Vec2::new(cell.x as f32, cell.y as f32) * CELL;
        let centre = |cell: Cell| origin(cell) + Vec2::splat(CELL / 2.0);

        surface.fill_rect(origin(self.exit()) + 2.0, Vec2::splat(CELL - 4.0), colors::FOOD);

        for cell in self.grid.cells_iter() {
            let Some(walls) = self.grid.walls(cell) else {
                continue;
            };
            let o = origin(cell);
            if walls.has(Dir::Up) {
                surface.line(o, o + Vec2::new(CELL, 0.0), 2.0, colors::WALL);
            }
            if walls.has(Dir::Left) {
                surface.line(o, o + Vec2::new(0.0, CELL), 2.0, colors::WALL);
            }
            if walls.has(Dir::Right) && cell.x as usize == self.grid.width() - 1 {
                surface.line(o + Vec2::new(CELL, 0.0), o + CELL, 2.0, colors::WALL);
            }
            if walls.has(Dir::Down) && cell.y as usize == self.grid.height() - 1 {
                surface.line(o + Vec2::new(0.0, CELL), o + CELL, 2.0, colors::WALL);
            }
        }

        surface.fill_circle(centre(self.player), CELL / 3.0, colors::PLAYER);
        surface.fill_circle(centre(self.opponent), CELL / 3.0, colors::OPPONENT);
    }

    fn message(&self) -> String {
        let exit = self.exit();
        if self.player == exit {
            "You escaped!".to_string()
        } else if self.opponent == exit {
            "AI escaped first!".to_string()
        } else {
            "Find the exit".to_string()
        }
    }
}
