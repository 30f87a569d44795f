//! Exploration heat map
//!
//! Each walkable cell carries a score in `[0, max]` meaning "how long since
//! the hunter last saw this". Seen cells drop to zero and every score climbs
//! back linearly, giving a least-recently-seen field without timestamps.

use glam::Vec2;

use crate::core::HeatConfig;
use crate::maze::{Cell, Grid, VisibilityMap};

/// Per-cell decaying "unchecked" score
#[derive(Debug, Clone)]
pub struct HeatMap {
    max_score: f32,
    regen_per_second: f32,
    width: usize,
    height: usize,
    /// `None` for blocked cells
    scores: Vec<Option<f32>>,
}

impl HeatMap {
    /// Create a map seeded from `grid`
    #[must_use]
    pub fn new(config: &HeatConfig, grid: &Grid) -> Self {
        let mut map = Self {
            max_score: config.max_score,
            regen_per_second: config.regen_per_second,
            width: 0,
            height: 0,
            scores: Vec::new(),
        };
        map.reseed(grid);
        map
    }

    /// Reset every walkable cell of `grid` to the maximum score
    pub fn reseed(&mut self, grid: &Grid) {
        let max = self.max_score;
        self.width = grid.width;
        self.height = grid.height;
        self.scores = (0..grid.height as i32)
            .flat_map(|row| (0..grid.width as i32).map(move |col| Cell::new(col, row)))
            .map(|cell| grid.is_walkable(cell).then_some(max))
            .collect();
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 {
            return None;
        }
        let (col, row) = (cell.col as usize, cell.row as usize);
        (col < self.width && row < self.height).then_some(row * self.width + col)
    }

    /// Upper bound of every score
    #[must_use]
    pub fn max_score(&self) -> f32 {
        self.max_score
    }

    /// Score of a cell; blocked and out-of-range cells score 0
    #[must_use]
    pub fn score(&self, cell: Cell) -> f32 {
        self.index(cell)
            .and_then(|i| self.scores[i])
            .unwrap_or(0.0)
    }

    /// Relax every score toward the maximum
    pub fn regenerate(&mut self, dt: f32) {
        let step = self.regen_per_second * dt.max(0.0);
        let max = self.max_score;
        for score in self.scores.iter_mut().flatten() {
            *score = (*score + step).clamp(0.0, max);
        }
    }

    /// Mark a single cell as just seen
    pub fn clear_cell(&mut self, cell: Cell) {
        if let Some(score) = self.index(cell).and_then(|i| self.scores[i].as_mut()) {
            *score = 0.0;
        }
    }

    /// Clear `from` and every cell visible from it inside the forward hemisphere
    ///
    /// `facing` is the hunter's heading on the XZ plane (x = columns, y =
    /// rows). A zero heading clears the full visible set. Returns the number
    /// of cells cleared.
    pub fn clear_visible(&mut self, from: Cell, facing: Vec2, visibility: &VisibilityMap) -> usize {
        self.clear_cell(from);
        let mut cleared = 1;
        let origin = from.center();
        for &cell in visibility.visible_from(from) {
            let to = cell.center() - origin;
            if facing.dot(to) >= 0.0 {
                self.clear_cell(cell);
                cleared += 1;
            }
        }
        cleared
    }

    /// The `k` highest-scoring walkable cells, best first, skipping `exclude`
    ///
    /// Ties break on row-major cell order so results are stable.
    #[must_use]
    pub fn top_cells(&self, k: usize, exclude: Option<Cell>) -> Vec<(Cell, f32)> {
        let mut cells: Vec<(Cell, f32)> = self
            .scores
            .iter()
            .enumerate()
            .filter_map(|(i, score)| {
                let cell = Cell::new((i % self.width) as i32, (i / self.width) as i32);
                score.map(|s| (cell, s))
            })
            .filter(|&(cell, _)| Some(cell) != exclude)
            .collect();
        cells.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| (a.0.row, a.0.col).cmp(&(b.0.row, b.0.col))));
        cells.truncate(k);
        cells
    }

    /// Iterate `(cell, score)` for every walkable cell
    pub fn iter(&self) -> impl Iterator<Item = (Cell, f32)> + '_ {
        self.scores.iter().enumerate().filter_map(|(i, score)| {
            score.map(|s| (Cell::new((i % self.width) as i32, (i / self.width) as i32), s))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cross_grid() -> Grid {
        Grid::from_rows(
            &[
                "#######", //
                "###.###", //
                "#.....#", //
                "###.###", //
                "#######",
            ],
            1.0,
        )
    }

    #[test]
    fn test_seeded_to_max() {
        let grid = cross_grid();
        let heat = HeatMap::new(&HeatConfig::default(), &grid);
        assert!((heat.score(Cell::new(3, 2)) - 0.1).abs() < f32::EPSILON);
        assert_eq!(heat.score(Cell::new(0, 0)), 0.0);
        assert_eq!(heat.score(Cell::new(-1, 40)), 0.0);
    }

    #[test]
    fn test_clear_forward_hemisphere_only() {
        let grid = cross_grid();
        let vis = VisibilityMap::build(&grid);
        let mut heat = HeatMap::new(&HeatConfig::default(), &grid);

        // Standing at the center facing +X (east)
        heat.clear_visible(Cell::new(3, 2), Vec2::X, &vis);
        assert_eq!(heat.score(Cell::new(3, 2)), 0.0);
        assert_eq!(heat.score(Cell::new(5, 2)), 0.0);
        assert_eq!(heat.score(Cell::new(4, 2)), 0.0);
        // Perpendicular cells sit exactly on the hemisphere boundary
        assert_eq!(heat.score(Cell::new(3, 1)), 0.0);
        // Behind
        assert!(heat.score(Cell::new(1, 2)) > 0.0);
        assert!(heat.score(Cell::new(2, 2)) > 0.0);
    }

    #[test]
    fn test_regenerates_linearly_and_clamps() {
        let grid = cross_grid();
        let config = HeatConfig {
            max_score: 0.1,
            regen_per_second: 0.02,
        };
        let mut heat = HeatMap::new(&config, &grid);
        heat.clear_cell(Cell::new(1, 2));
        heat.regenerate(2.0);
        assert!((heat.score(Cell::new(1, 2)) - 0.04).abs() < 1e-6);
        heat.regenerate(100.0);
        assert!((heat.score(Cell::new(1, 2)) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_top_cells_ranked() {
        let grid = cross_grid();
        let mut heat = HeatMap::new(&HeatConfig::default(), &grid);
        heat.clear_cell(Cell::new(3, 1));
        let top = heat.top_cells(3, Some(Cell::new(1, 2)));
        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|&(c, _)| c != Cell::new(3, 1) && c != Cell::new(1, 2)));
        let all = heat.top_cells(100, None);
        assert_eq!(all.last().map(|&(c, _)| c), Some(Cell::new(3, 1)));
    }

    #[test]
    fn test_heat_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(4);
        let grid = cross_grid();
        let vis = VisibilityMap::build(&grid);
        let mut heat = HeatMap::new(&HeatConfig::default(), &grid);
        let cells: Vec<Cell> = grid.walkable_cells().collect();
        for _ in 0..2000 {
            match rng.random_range(0..3) {
                0 => heat.regenerate(rng.random_range(0.0..5.0)),
                1 => {
                    let from = cells[rng.random_range(0..cells.len())];
                    let facing = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
                    heat.clear_visible(from, facing, &vis);
                }
                _ => heat.regenerate(-1.0),
            }
            for (_, score) in heat.iter() {
                assert!((0.0..=heat.max_score()).contains(&score));
            }
        }
    }
}
