//! Precomputed cell-to-cell line of sight
//!
//! Built once per maze. Every unordered pair of walkable cells is tested by
//! sampling the segment between their centers; a single blocked sample
//! rejects the pair. The relation is symmetric because each pair is tested
//! once and recorded in both directions.

use rustc_hash::{FxHashMap, FxHashSet};

use super::grid::{Cell, Grid};

/// Samples per cell unit along a sightline
pub const SAMPLES_PER_UNIT: f32 = 4.0;

#[derive(Debug, Clone, Default)]
struct VisibleSet {
    cells: Vec<Cell>,
    lookup: FxHashSet<Cell>,
}

/// Mutual visibility between walkable cells
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    entries: FxHashMap<Cell, VisibleSet>,
}

impl VisibilityMap {
    /// Build the visibility relation for every walkable cell of `grid`
    #[must_use]
    pub fn build(grid: &Grid) -> Self {
        let walkable: Vec<Cell> = grid.walkable_cells().collect();
        let mut entries: FxHashMap<Cell, VisibleSet> = walkable
            .iter()
            .map(|&cell| (cell, VisibleSet::default()))
            .collect();

        let mut pairs = 0usize;
        for (i, &a) in walkable.iter().enumerate() {
            for &b in &walkable[i + 1..] {
                if !segment_clear(grid, a, b) {
                    continue;
                }
                pairs += 1;
                for (from, to) in [(a, b), (b, a)] {
                    if let Some(set) = entries.get_mut(&from) {
                        set.cells.push(to);
                        set.lookup.insert(to);
                    }
                }
            }
        }

        log::info!(
            "Visibility map built: {} cells, {} visible pairs",
            walkable.len(),
            pairs
        );
        Self { entries }
    }

    /// Cells visible from `cell`, excluding itself; empty for blocked cells
    #[must_use]
    pub fn visible_from(&self, cell: Cell) -> &[Cell] {
        self.entries
            .get(&cell)
            .map_or(&[], |set| set.cells.as_slice())
    }

    /// Whether `to` is visible from `from`; a walkable cell sees itself
    #[must_use]
    pub fn are_visible(&self, from: Cell, to: Cell) -> bool {
        match self.entries.get(&from) {
            Some(set) => from == to || set.lookup.contains(&to),
            None => false,
        }
    }

    /// Number of cells with an entry (the walkable count at build time)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when built from a grid with no walkable cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sample the segment between two cell centers against the grid
#[must_use]
pub fn segment_clear(grid: &Grid, a: Cell, b: Cell) -> bool {
    let from = a.center();
    let to = b.center();
    let distance = from.distance(to);
    let samples = (distance * SAMPLES_PER_UNIT).ceil().max(1.0) as usize;
    (0..=samples).all(|i| {
        let t = i as f32 / samples as f32;
        let p = from.lerp(to, t);
        grid.is_walkable(Cell::new(p.x.floor() as i32, p.y.floor() as i32))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MazeConfig;
    use crate::maze::generate_maze;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_straight_corridor_visible() {
        let grid = Grid::from_rows(&["#####", "#...#", "#####"], 1.0);
        let vis = VisibilityMap::build(&grid);
        assert!(vis.are_visible(Cell::new(1, 1), Cell::new(3, 1)));
        assert_eq!(vis.visible_from(Cell::new(2, 1)).len(), 2);
    }

    #[test]
    fn test_corner_blocks_sight() {
        let grid = Grid::from_rows(&["#####", "#...#", "###.#", "###.#", "#####"], 1.0);
        let vis = VisibilityMap::build(&grid);
        assert!(!vis.are_visible(Cell::new(1, 1), Cell::new(3, 3)));
        assert!(vis.are_visible(Cell::new(3, 1), Cell::new(3, 3)));
    }

    #[test]
    fn test_blocked_cell_sees_nothing() {
        let grid = Grid::from_rows(&["#.#"], 1.0);
        let vis = VisibilityMap::build(&grid);
        assert!(!vis.are_visible(Cell::new(0, 0), Cell::new(1, 0)));
        assert!(vis.visible_from(Cell::new(0, 0)).is_empty());
        assert!(vis.are_visible(Cell::new(1, 0), Cell::new(1, 0)));
    }

    #[test]
    fn test_visibility_symmetric() {
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate_maze(&MazeConfig::default().with_size(15, 15), &mut rng);
            let vis = VisibilityMap::build(&maze.grid);
            let cells: Vec<Cell> = maze.grid.walkable_cells().collect();
            for &a in &cells {
                for &b in &cells {
                    assert_eq!(vis.are_visible(a, b), vis.are_visible(b, a), "{a} vs {b}");
                }
            }
        }
    }
}
