//! A* pathfinding on the maze grid
//!
//! 4-directional moves, unit step cost, Manhattan heuristic. Every query
//! returns at least one cell: unreachable or blocked endpoints degrade to the
//! nearest walkable cell and finally to a path holding only the source.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::maze::{Cell, Grid};

/// Result of pathfinding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Cells from source to goal inclusive, never empty
    pub cells: Vec<Cell>,
}

impl PathResult {
    /// The degenerate path that stays put
    #[must_use]
    pub fn stay(cell: Cell) -> Self {
        Self { cells: vec![cell] }
    }

    /// Number of cells (at least 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; kept for API symmetry with collections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True for the single-cell fallback
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.cells.len() <= 1
    }

    /// Steps taken along the path
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Final cell
    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Waypoints in world coordinates (cell centers)
    #[must_use]
    pub fn waypoints(&self, grid: &Grid) -> Vec<Vec3> {
        self.cells.iter().map(|&c| grid.cell_to_world(c)).collect()
    }

    /// Total path length in world units
    #[must_use]
    pub fn world_length(&self, grid: &Grid) -> f32 {
        let waypoints = self.waypoints(grid);
        waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// A* node for priority queue
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,
    g_cost: u32, // Cost from start
    f_cost: u32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.g_cost == other.g_cost
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; prefer deeper nodes on ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| self.g_cost.cmp(&other.g_cost))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Snap `cell` onto the grid: itself, nearest ring match, then `fallback`
fn snap(grid: &Grid, cell: Cell, fallback: Option<Cell>, snap_radius: i32) -> Option<Cell> {
    grid.nearest_walkable(cell, snap_radius)
        .or_else(|| fallback.filter(|&f| grid.is_walkable(f)))
}

/// Find a path using A*
///
/// `fallback` is tried when an endpoint is blocked and no walkable cell lies
/// within `snap_radius`.
#[must_use]
pub fn find_path(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    fallback: Option<Cell>,
    snap_radius: i32,
) -> PathResult {
    let Some(start) = snap(grid, start, fallback, snap_radius) else {
        log::warn!("Path source {start} has no walkable cell nearby");
        return PathResult::stay(start);
    };
    let Some(goal) = snap(grid, goal, fallback, snap_radius) else {
        return PathResult::stay(start);
    };
    if start == goal {
        return PathResult::stay(start);
    }

    let mut open_set = BinaryHeap::new();
    let mut closed: FxHashSet<Cell> = FxHashSet::default();
    let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut g_score: FxHashMap<Cell, u32> = FxHashMap::default();

    g_score.insert(start, 0);
    open_set.push(Node {
        cell: start,
        g_cost: 0,
        f_cost: start.manhattan(goal),
    });

    while let Some(current) = open_set.pop() {
        if current.cell == goal {
            // Reconstruct path
            let mut path = vec![goal];
            let mut curr = goal;
            while let Some(&prev) = came_from.get(&curr) {
                path.push(prev);
                curr = prev;
            }
            path.reverse();
            return PathResult { cells: path };
        }

        if !closed.insert(current.cell) {
            continue;
        }

        for next in grid.neighbors(current.cell) {
            if closed.contains(&next) {
                continue;
            }
            let tentative_g = current.g_cost + 1;
            if tentative_g < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                came_from.insert(next, current.cell);
                g_score.insert(next, tentative_g);
                open_set.push(Node {
                    cell: next,
                    g_cost: tentative_g,
                    f_cost: tentative_g + next.manhattan(goal),
                });
            }
        }
    }

    // Disconnected: stay where we are
    PathResult::stay(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MazeConfig;
    use crate::maze::{bfs_distances, generate_maze};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn open_grid(w: usize, h: usize) -> Grid {
        let mut grid = Grid::new(w, h, 1.0);
        for row in 0..h as i32 {
            for col in 0..w as i32 {
                grid.set_walkable(Cell::new(col, row), true);
            }
        }
        grid
    }

    fn assert_contiguous(path: &PathResult, grid: &Grid) {
        for pair in path.cells.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert!(grid.is_walkable(pair[1]));
        }
    }

    #[test]
    fn test_grid_pathfinding() {
        let mut grid = open_grid(10, 10);

        // Create a wall
        for y in 2..8 {
            grid.set_walkable(Cell::new(5, y), false);
        }

        let path = find_path(&grid, Cell::new(2, 5), Cell::new(8, 5), None, 3);

        assert!(path.len() > 7); // Should go around the wall
        assert_contiguous(&path, &grid);
        assert_eq!(path.goal(), Some(Cell::new(8, 5)));
    }

    #[test]
    fn test_direct_path() {
        let grid = open_grid(10, 10);

        let path = find_path(&grid, Cell::new(0, 0), Cell::new(3, 0), None, 3);

        assert_eq!(path.len(), 4); // 4 cells in a line
        assert!((path.world_length(&grid) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_path_falls_back_to_source() {
        let mut grid = open_grid(5, 5);

        // Wall off the goal
        grid.set_walkable(Cell::new(3, 2), false);
        grid.set_walkable(Cell::new(3, 4), false);
        grid.set_walkable(Cell::new(2, 3), false);
        grid.set_walkable(Cell::new(4, 3), false);

        let path = find_path(&grid, Cell::new(0, 0), Cell::new(3, 3), None, 3);

        assert_eq!(path.cells, vec![Cell::new(0, 0)]);
        assert!(path.is_trivial());
    }

    #[test]
    fn test_blocked_goal_snaps_to_nearest() {
        let grid = Grid::from_rows(&["#######", "#.....#", "#######"], 1.0);
        let path = find_path(&grid, Cell::new(1, 1), Cell::new(5, 0), None, 2);
        assert_eq!(path.goal(), Some(Cell::new(5, 1)));
    }

    #[test]
    fn test_snap_uses_fallback_then_source() {
        let grid = Grid::from_rows(&["##########", "#..######.", "##########"], 1.0);
        let far = Cell::new(9, 1);
        let path = find_path(&grid, Cell::new(1, 1), Cell::new(6, 5), Some(Cell::new(2, 1)), 1);
        assert_eq!(path.goal(), Some(Cell::new(2, 1)));

        let path = find_path(&grid, Cell::new(1, 1), far, None, 1);
        assert_eq!(path.cells, vec![Cell::new(1, 1)]);

        // Source itself off the grid and nothing nearby
        let path = find_path(&grid, Cell::new(-20, -20), far, None, 1);
        assert_eq!(path.cells, vec![Cell::new(-20, -20)]);
    }

    #[test]
    fn test_path_never_empty() {
        let mut rng = StdRng::seed_from_u64(21);
        let maze = generate_maze(&MazeConfig::default().with_size(11, 11), &mut rng);
        for _ in 0..200 {
            let a = Cell::new(rng.random_range(-3..14), rng.random_range(-3..14));
            let b = Cell::new(rng.random_range(-3..14), rng.random_range(-3..14));
            let path = find_path(&maze.grid, a, b, None, 2);
            assert!(!path.is_empty());
        }
    }

    #[test]
    fn test_astar_matches_bfs_length() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = MazeConfig {
                loop_chance: 0.15,
                ..MazeConfig::default().with_size(15, 15)
            };
            let maze = generate_maze(&config, &mut rng);
            let cells: Vec<Cell> = maze.grid.walkable_cells().collect();
            let source = cells[rng.random_range(0..cells.len())];
            let distances = bfs_distances(&maze.grid, source);
            for _ in 0..10 {
                let goal = cells[rng.random_range(0..cells.len())];
                let path = find_path(&maze.grid, source, goal, None, 2);
                assert_contiguous(&path, &maze.grid);
                assert_eq!(path.steps() as u32, distances[&goal], "seed {seed} {source}->{goal}");
            }
        }
    }
}
