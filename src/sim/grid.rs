//! Grid cells, directions and walled grids
//!
//! `WallGrid` stores four wall flags per cell. Mazes are carved with a
//! randomized depth-first backtracker, which always yields a spanning tree:
//! every cell reachable, no cycles, exactly `cells - 1` open edges.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate (x to the right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell in `dir` (may be out of bounds)
    pub fn step(self, dir: Dir) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Four grid directions, in top/right/bottom/left order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }
}

/// Wall flags of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Default for Walls {
    fn default() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

impl Walls {
    pub fn has(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.top,
            Dir::Right => self.right,
            Dir::Down => self.bottom,
            Dir::Left => self.left,
        }
    }

    fn set(&mut self, dir: Dir, wall: bool) {
        match dir {
            Dir::Up => self.top = wall,
            Dir::Right => self.right = wall,
            Dir::Down => self.bottom = wall,
            Dir::Left => self.left = wall,
        }
    }
}

/// Fixed-size grid of walled cells (row-major)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallGrid {
    width: usize,
    height: usize,
    cells: Vec<Walls>,
}

impl WallGrid {
    /// Grid with every wall standing
    pub fn closed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Walls::default(); width * height],
        }
    }

    /// Carve a maze with a randomized depth-first backtracker from (0, 0)
    ///
    /// Each visited cell shuffles the four directions and descends into every
    /// unvisited neighbour in that order, removing the wall in between. The
    /// walk uses an explicit stack so large grids cannot overflow the call
    /// stack.
    pub fn generate<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let mut grid = Self::closed(width, height);
        if grid.cells.is_empty() {
            return grid;
        }

        let mut visited = vec![false; width * height];
        let mut stack: Vec<(Cell, [Dir; 4], usize)> = Vec::with_capacity(width * height);

        let start = Cell::new(0, 0);
        visited[0] = true;
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        stack.push((start, dirs, 0));

        while let Some(frame) = stack.last_mut() {
            let (cell, dirs, next) = *frame;
            if next == dirs.len() {
                stack.pop();
                continue;
            }
            frame.2 += 1;

            let dir = dirs[next];
            let neighbour = cell.step(dir);
            let Some(index) = grid.index(neighbour) else {
                continue;
            };
            if visited[index] {
                continue;
            }

            grid.carve(cell, dir);
            visited[index] = true;
            let mut dirs = Dir::ALL;
            dirs.shuffle(rng);
            stack.push((neighbour, dirs, 0));
        }

        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// Row-major index of an in-bounds cell
    pub fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    pub fn walls(&self, cell: Cell) -> Option<Walls> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// True when a move from `cell` in `dir` stays inside and crosses no wall
    pub fn can_move(&self, cell: Cell, dir: Dir) -> bool {
        match self.walls(cell) {
            Some(walls) => !walls.has(dir) && self.in_bounds(cell.step(dir)),
            None => false,
        }
    }

    /// Remove the wall between `cell` and its neighbour in `dir` (both sides)
    pub fn carve(&mut self, cell: Cell, dir: Dir) {
        let neighbour = cell.step(dir);
        let (Some(a), Some(b)) = (self.index(cell), self.index(neighbour)) else {
            return;
        };
        self.cells[a].set(dir, false);
        self.cells[b].set(dir.opposite(), false);
    }

    /// Reachable neighbours in top/right/bottom/left order
    pub fn open_neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Dir::ALL
            .into_iter()
            .filter(move |&dir| self.can_move(cell, dir))
            .map(move |dir| cell.step(dir))
    }

    /// Number of open wall-edges between adjacent cells
    pub fn open_edge_count(&self) -> usize {
        self.cells_iter()
            .map(|cell| {
                usize::from(self.can_move(cell, Dir::Right)) + usize::from(self.can_move(cell, Dir::Down))
            })
            .sum()
    }

    /// All cells in row-major order
    pub fn cells_iter(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x as i32, y as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::VecDeque;

    fn reachable_count(grid: &WallGrid, start: Cell) -> usize {
        let mut seen = vec![false; grid.len()];
        let mut queue = VecDeque::from([start]);
        seen[grid.index(start).unwrap()] = true;
        let mut count = 0;
        while let Some(cell) = queue.pop_front() {
            count += 1;
            for n in grid.open_neighbours(cell) {
                let i = grid.index(n).unwrap();
                if !seen[i] {
                    seen[i] = true;
                    queue.push_back(n);
                }
            }
        }
        count
    }

    #[test]
    fn test_closed_grid_has_no_moves() {
        let grid = WallGrid::closed(3, 3);
        assert!(!grid.can_move(Cell::new(1, 1), Dir::Up));
        assert_eq!(grid.open_edge_count(), 0);
    }

    #[test]
    fn test_carve_opens_both_sides() {
        let mut grid = WallGrid::closed(2, 1);
        grid.carve(Cell::new(0, 0), Dir::Right);
        assert!(grid.can_move(Cell::new(0, 0), Dir::Right));
        assert!(grid.can_move(Cell::new(1, 0), Dir::Left));
        assert_eq!(grid.open_edge_count(), 1);
    }

    #[test]
    fn test_outer_boundary_never_opens() {
        let mut grid = WallGrid::closed(2, 2);
        grid.carve(Cell::new(0, 0), Dir::Up);
        assert!(!grid.can_move(Cell::new(0, 0), Dir::Up));
    }

    #[test]
    fn test_two_by_two_maze_has_three_openings() {
        for seed in 0..64 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = WallGrid::generate(2, 2, &mut rng);
            assert_eq!(grid.open_edge_count(), 3, "seed {seed}");
            assert_eq!(reachable_count(&grid, Cell::new(0, 0)), 4);
        }
    }

    #[test]
    fn test_large_maze_does_not_overflow() {
        let mut rng = Pcg32::seed_from_u64(9);
        let grid = WallGrid::generate(120, 120, &mut rng);
        assert_eq!(grid.open_edge_count(), 120 * 120 - 1);
    }

    proptest! {
        #[test]
        fn prop_maze_is_spanning_tree(w in 2usize..14, h in 2usize..14, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let grid = WallGrid::generate(w, h, &mut rng);
            prop_assert_eq!(grid.open_edge_count(), w * h - 1);
            let from = Cell::new((seed % w as u64) as i32, ((seed / 7) % h as u64) as i32);
            prop_assert_eq!(reachable_count(&grid, from), w * h);
        }
    }
}
