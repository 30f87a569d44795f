//! Randomized maze carving
//!
//! Depth-first "recursive backtracker" run with an explicit stack so large
//! mazes cannot overflow the call stack. Rooms sit on odd coordinates and the
//! walls between them are knocked out as the walk advances.

use std::collections::VecDeque;

use rand::Rng;
use rustc_hash::FxHashMap;

use super::grid::{Cell, Grid};
use crate::core::MazeConfig;

/// A carved maze and its designated endpoints
#[derive(Debug, Clone)]
pub struct Maze {
    /// Occupancy grid
    pub grid: Grid,
    /// Where the player spawns
    pub start: Cell,
    /// The cell farthest (by walking distance) from `start`
    pub exit: Cell,
}

/// Carve a new maze
///
/// Dimensions are forced odd and at least 5 so every room has a wall ring.
pub fn generate_maze<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> Maze {
    let width = odd_at_least_five(config.cols);
    let height = odd_at_least_five(config.rows);
    let mut grid = Grid::new(width, height, config.cell_size);

    let start = Cell::new(1, 1);
    grid.set_walkable(start, true);

    let mut stack = vec![start];
    while let Some(&current) = stack.last() {
        let candidates: Vec<Cell> = [(2, 0), (-2, 0), (0, 2), (0, -2)]
            .into_iter()
            .map(|(dc, dr)| Cell::new(current.col + dc, current.row + dr))
            .filter(|&next| is_room(&grid, next) && !grid.is_walkable(next))
            .collect();

        if candidates.is_empty() {
            stack.pop();
            continue;
        }

        let next = candidates[rng.random_range(0..candidates.len())];
        let between = Cell::new(
            (current.col + next.col) / 2,
            (current.row + next.row) / 2,
        );
        grid.set_walkable(between, true);
        grid.set_walkable(next, true);
        stack.push(next);
    }

    if config.loop_chance > 0.0 {
        open_extra_passages(&mut grid, config.loop_chance, rng);
    }

    let exit = farthest_cell(&grid, start);
    log::info!(
        "Carved {}x{} maze: {} walkable cells, start {} exit {}",
        width,
        height,
        grid.walkable_count(),
        start,
        exit
    );

    Maze { grid, start, exit }
}

fn odd_at_least_five(n: usize) -> usize {
    let n = n.max(5);
    if n % 2 == 0 { n + 1 } else { n }
}

fn is_room(grid: &Grid, cell: Cell) -> bool {
    cell.col > 0
        && cell.row > 0
        && (cell.col as usize) < grid.width - 1
        && (cell.row as usize) < grid.height - 1
        && cell.col % 2 == 1
        && cell.row % 2 == 1
}

/// Knock out interior walls that separate two open cells in a straight line,
/// turning the perfect maze into one with a few loops.
fn open_extra_passages<R: Rng + ?Sized>(grid: &mut Grid, chance: f32, rng: &mut R) {
    let mut opened = 0usize;
    for row in 1..grid.height as i32 - 1 {
        for col in 1..grid.width as i32 - 1 {
            let cell = Cell::new(col, row);
            if grid.is_walkable(cell) {
                continue;
            }
            let horizontal = grid.is_walkable(Cell::new(col - 1, row))
                && grid.is_walkable(Cell::new(col + 1, row))
                && !grid.is_walkable(Cell::new(col, row - 1))
                && !grid.is_walkable(Cell::new(col, row + 1));
            let vertical = grid.is_walkable(Cell::new(col, row - 1))
                && grid.is_walkable(Cell::new(col, row + 1))
                && !grid.is_walkable(Cell::new(col - 1, row))
                && !grid.is_walkable(Cell::new(col + 1, row));
            if (horizontal || vertical) && rng.random::<f32>() < chance {
                grid.set_walkable(cell, true);
                opened += 1;
            }
        }
    }
    log::debug!("Opened {opened} extra passages");
}

/// Breadth-first walking distances from `source` to every reachable cell
#[must_use]
pub fn bfs_distances(grid: &Grid, source: Cell) -> FxHashMap<Cell, u32> {
    let mut dist = FxHashMap::default();
    if !grid.is_walkable(source) {
        return dist;
    }
    let mut queue = VecDeque::new();
    dist.insert(source, 0);
    queue.push_back(source);
    while let Some(cell) = queue.pop_front() {
        let d = dist[&cell];
        for next in grid.neighbors(cell) {
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

fn farthest_cell(grid: &Grid, source: Cell) -> Cell {
    bfs_distances(grid, source)
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map_or(source, |(cell, _)| cell)
}
