//! Breadth-first search on walled grids

use std::collections::VecDeque;

use crate::sim::grid::{Cell, WallGrid};

/// Shortest path from `start` to `goal`, both endpoints included
///
/// Neighbours are expanded in top/right/bottom/left order, so ties between
/// equally short paths always resolve the same way. Returns an empty path when
/// either cell is out of bounds or the goal is unreachable.
pub fn shortest_path(grid: &WallGrid, start: Cell, goal: Cell) -> Vec<Cell> {
    let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };

    let mut parent: Vec<Option<usize>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::from([start]);
    seen[start_idx] = true;

    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            break;
        }
        let Some(cell_idx) = grid.index(cell) else {
            continue;
        };
        for next in grid.open_neighbours(cell) {
            let Some(next_idx) = grid.index(next) else {
                continue;
            };
            if !seen[next_idx] {
                seen[next_idx] = true;
                parent[next_idx] = Some(cell_idx);
                queue.push_back(next);
            }
        }
    }

    if !seen[goal_idx] {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut at = goal_idx;
    loop {
        path.push(cell_at(grid, at));
        match parent[at] {
            Some(prev) => at = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

fn cell_at(grid: &WallGrid, index: usize) -> Cell {
    Cell::new((index % grid.width()) as i32, (index / grid.width()) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Dir;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// All-pairs distances by Floyd-Warshall, the brute-force reference
    fn all_pairs(grid: &WallGrid) -> Vec<Vec<Option<usize>>> {
        let n = grid.len();
        let mut dist = vec![vec![None; n]; n];
        for cell in grid.cells_iter() {
            let i = grid.index(cell).unwrap();
            dist[i][i] = Some(0);
            for next in grid.open_neighbours(cell) {
                dist[i][grid.index(next).unwrap()] = Some(1);
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    if let (Some(a), Some(b)) = (dist[i][k], dist[k][j]) {
                        if dist[i][j].is_none_or(|d| a + b < d) {
                            dist[i][j] = Some(a + b);
                        }
                    }
                }
            }
        }
        dist
    }

    fn assert_valid_path(grid: &WallGrid, path: &[Cell]) {
        for pair in path.windows(2) {
            let step = Dir::ALL
                .into_iter()
                .find(|&d| pair[0].step(d) == pair[1]);
            let dir = step.expect("path cells must be adjacent");
            assert!(grid.can_move(pair[0], dir), "path crosses a wall");
        }
    }

    #[test]
    fn test_path_includes_endpoints() {
        let mut rng = Pcg32::seed_from_u64(4);
        let grid = WallGrid::generate(6, 6, &mut rng);
        let path = shortest_path(&grid, Cell::new(0, 0), Cell::new(5, 5));
        assert_eq!(path.first(), Some(&Cell::new(0, 0)));
        assert_eq!(path.last(), Some(&Cell::new(5, 5)));
        assert_valid_path(&grid, &path);
    }

    #[test]
    fn test_same_cell() {
        let grid = WallGrid::closed(3, 3);
        assert_eq!(shortest_path(&grid, Cell::new(1, 1), Cell::new(1, 1)), vec![Cell::new(1, 1)]);
    }

    #[test]
    fn test_unreachable_is_empty() {
        let grid = WallGrid::closed(3, 3);
        assert!(shortest_path(&grid, Cell::new(0, 0), Cell::new(2, 2)).is_empty());
        assert!(shortest_path(&grid, Cell::new(0, 0), Cell::new(7, 0)).is_empty());
    }

    proptest! {
        #[test]
        fn prop_bfs_matches_brute_force(
            w in 2usize..6,
            h in 2usize..6,
            seed in any::<u64>(),
            extra in 0usize..6,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut grid = WallGrid::generate(w, h, &mut rng);
            // Knock out a few more walls so several routes exist
            for _ in 0..extra {
                let cell = Cell::new(rng.random_range(0..w as i32), rng.random_range(0..h as i32));
                grid.carve(cell, Dir::ALL[rng.random_range(0..4)]);
            }

            let dist = all_pairs(&grid);
            for a in grid.cells_iter() {
                for b in grid.cells_iter() {
                    let path = shortest_path(&grid, a, b);
                    let expected = dist[grid.index(a).unwrap()][grid.index(b).unwrap()];
                    prop_assert_eq!(path.len().checked_sub(1), expected);
                    assert_valid_path(&grid, &path);
                }
            }
        }
    }
}
