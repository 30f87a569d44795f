//! Occupancy grid for the maze
//!
//! Cells are either open (walkable) or blocked. Row `r`, column `c` maps to
//! the world XZ plane with `x` growing with columns and `z` growing with rows.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Column (x axis)
    pub col: i32,
    /// Row (z axis)
    pub row: i32,
}

impl Cell {
    /// Create a new cell coordinate
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to another cell
    #[must_use]
    pub fn manhattan(self, other: Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// The four orthogonal neighbours, walkable or not
    #[must_use]
    pub fn neighbors4(self) -> [Self; 4] {
        [
            Self::new(self.col + 1, self.row),
            Self::new(self.col - 1, self.row),
            Self::new(self.col, self.row + 1),
            Self::new(self.col, self.row - 1),
        ]
    }

    /// Cell center in cell units (col + 0.5, row + 0.5)
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.col as f32 + 0.5, self.row as f32 + 0.5)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// A 2D walkable/blocked grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Open cells (true = walkable)
    cells: Vec<bool>,
    /// World origin offset (XZ)
    pub origin: Vec2,
}

impl Grid {
    /// Create a new grid with every cell blocked
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![false; width * height],
            origin: Vec2::ZERO,
        }
    }

    /// Build a grid from text rows, `#` blocked and anything else open
    #[must_use]
    pub fn from_rows(rows: &[&str], cell_size: f32) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height, cell_size);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                grid.set_walkable(Cell::new(col as i32, row as i32), ch != '#');
            }
        }
        grid
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 {
            return None;
        }
        let (col, row) = (cell.col as usize, cell.row as usize);
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Whether the cell lies inside the grid
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Set a cell's walkability; out-of-bounds writes are ignored
    pub fn set_walkable(&mut self, cell: Cell, walkable: bool) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = walkable;
        }
    }

    /// Walkable iff in bounds and open
    #[must_use]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i])
    }

    /// Dense index for a cell, used by per-cell tables
    #[must_use]
    pub fn cell_index(&self, cell: Cell) -> Option<usize> {
        self.index(cell)
    }

    /// Convert world XZ position to grid coordinates
    #[must_use]
    pub fn world_to_cell(&self, x: f32, z: f32) -> Cell {
        let local = Vec2::new(x, z) - self.origin;
        Cell::new(
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell, y = 0)
    #[must_use]
    pub fn cell_to_world(&self, cell: Cell) -> Vec3 {
        let center = self.origin + cell.center() * self.cell_size;
        Vec3::new(center.x, 0.0, center.y)
    }

    /// Walkable orthogonal neighbours
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        cell.neighbors4()
            .into_iter()
            .filter(|&n| self.is_walkable(n))
            .collect()
    }

    /// Iterate all walkable cells in row-major order
    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).filter_map(move |col| {
                let cell = Cell::new(col as i32, row as i32);
                self.is_walkable(cell).then_some(cell)
            })
        })
    }

    /// Number of walkable cells
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&open| open).count()
    }

    /// Nearest walkable cell by expanding square rings, up to `max_radius`
    #[must_use]
    pub fn nearest_walkable(&self, cell: Cell, max_radius: i32) -> Option<Cell> {
        if self.is_walkable(cell) {
            return Some(cell);
        }
        for radius in 1..=max_radius {
            let mut best: Option<(Cell, u32)> = None;
            for dc in -radius..=radius {
                for dr in -radius..=radius {
                    if dc.abs() != radius && dr.abs() != radius {
                        continue;
                    }
                    let candidate = Cell::new(cell.col + dc, cell.row + dr);
                    if !self.is_walkable(candidate) {
                        continue;
                    }
                    let d = candidate.manhattan(cell);
                    if best.is_none_or(|(_, bd)| d < bd) {
                        best = Some((candidate, d));
                    }
                }
            }
            if let Some((found, _)) = best {
                return Some(found);
            }
        }
        None
    }
}
