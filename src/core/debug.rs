//! Debug and statistics module
//!
//! Tick timing plus text renderings of the hunter's view of the maze.

use std::collections::VecDeque;
use std::time::Duration;

use crate::ai::{AgentSnapshot, HunterAgent};
use crate::maze::{Cell, MazeWorld};

/// Heat shading from cold (just seen) to hot (unchecked)
const HEAT_RAMP: [char; 5] = [' ', '.', ':', '+', '@'];

/// Simulation tick timing tracker
#[derive(Debug)]
pub struct TickStats {
    /// Tick time history for averaging
    tick_times: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average tick time in milliseconds
    avg_tick_time_ms: f32,
    /// Maximum tick time in milliseconds
    max_tick_time_ms: f32,
    /// Total ticks simulated
    total_ticks: u64,
}

impl TickStats {
    /// Create a new tick stats tracker
    pub fn new() -> Self {
        Self {
            tick_times: VecDeque::with_capacity(120),
            max_samples: 120,
            avg_tick_time_ms: 0.0,
            max_tick_time_ms: 0.0,
            total_ticks: 0,
        }
    }

    /// Record how long one agent update took
    pub fn record_tick(&mut self, elapsed: Duration) {
        self.total_ticks += 1;

        if self.tick_times.len() >= self.max_samples {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(elapsed);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.tick_times.is_empty() {
            return;
        }

        let total: Duration = self.tick_times.iter().sum();
        let max = self.tick_times.iter().max().copied().unwrap_or_default();
        let count = self.tick_times.len() as f32;

        self.avg_tick_time_ms = total.as_secs_f32() / count * 1000.0;
        self.max_tick_time_ms = max.as_secs_f32() * 1000.0;
    }

    pub fn avg_tick_time_ms(&self) -> f32 {
        self.avg_tick_time_ms
    }

    pub fn max_tick_time_ms(&self) -> f32 {
        self.max_tick_time_ms
    }

    /// Get total ticks recorded
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Ticks: {} | Update: {:.3}ms (max: {:.3})",
            self.total_ticks, self.avg_tick_time_ms, self.max_tick_time_ms
        )
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line summary of the agent
pub fn describe_agent(snapshot: &AgentSnapshot) -> String {
    let target = snapshot
        .hunt_target
        .map_or_else(|| "-".to_string(), |cell| cell.to_string());
    format!(
        "[{}] cell {} hp {:.0}/{:.0} los {} path {}/{} target {} anim {:?}",
        snapshot.mode,
        snapshot.cell,
        snapshot.health,
        snapshot.max_health,
        if snapshot.line_of_sight { "yes" } else { "no" },
        snapshot.path_index.min(snapshot.path.len()),
        snapshot.path.len(),
        target,
        snapshot.animation,
    )
}

/// Render the maze as text: walls, heat shading, the path and both actors
///
/// `H` is the hunter, `P` the player, `*` marks remaining path cells.
pub fn render_heat_map<W: MazeWorld>(agent: &HunterAgent<W>, player: Option<Cell>) -> Vec<String> {
    let grid = agent.world().maze();
    let max = agent.heat_map().max_score();
    let path = agent.path_cells();
    let remaining = path.get(agent.path_index()..).unwrap_or_default();
    let hunter = agent.state().cell;

    (0..grid.height as i32)
        .map(|row| {
            (0..grid.width as i32)
                .map(|col| {
                    let cell = Cell::new(col, row);
                    if cell == hunter {
                        'H'
                    } else if Some(cell) == player {
                        'P'
                    } else if !grid.is_walkable(cell) {
                        '#'
                    } else if remaining.contains(&cell) {
                        '*'
                    } else {
                        let level = agent.hunt_score_for_cell(cell) / max;
                        let index = (level * (HEAT_RAMP.len() - 1) as f32).round() as usize;
                        HEAT_RAMP[index.min(HEAT_RAMP.len() - 1)]
                    }
                })
                .collect()
        })
        .collect()
}

/// Debug overlay information
#[derive(Debug, Default)]
pub struct DebugInfo {
    /// Tick statistics
    pub tick_stats: TickStats,
    /// Custom debug lines
    custom_lines: Vec<String>,
}

impl DebugInfo {
    /// Create new debug info
    pub fn new() -> Self {
        Self {
            tick_stats: TickStats::new(),
            custom_lines: Vec::new(),
        }
    }

    /// Add a custom debug line
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.custom_lines.push(line.into());
    }

    /// Clear custom lines
    pub fn clear_lines(&mut self) {
        self.custom_lines.clear();
    }

    /// Get all debug lines
    pub fn get_all_lines(&self) -> Vec<String> {
        let mut lines = vec![self.tick_stats.format_stats()];
        lines.extend(self.custom_lines.iter().cloned());
        lines
    }

    /// Record a tick
    pub fn record_tick(&mut self, elapsed: Duration) {
        self.tick_stats.record_tick(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimConfig;
    use crate::maze::{Grid, MazeLevel};

    #[test]
    fn test_tick_stats_window() {
        let mut stats = TickStats::new();
        for ms in [1, 3, 2] {
            stats.record_tick(Duration::from_millis(ms));
        }
        assert_eq!(stats.total_ticks(), 3);
        assert!((stats.avg_tick_time_ms() - 2.0).abs() < 1e-3);
        assert!((stats.max_tick_time_ms() - 3.0).abs() < 1e-3);
        assert!(stats.format_stats().starts_with("Ticks: 3"));
    }

    #[test]
    fn test_debug_lines() {
        let mut debug = DebugInfo::new();
        debug.add_line("hello");
        assert_eq!(debug.get_all_lines().len(), 2);
        debug.clear_lines();
        assert_eq!(debug.get_all_lines().len(), 1);
    }

    #[test]
    fn test_render_heat_map_marks_actors() {
        let grid = Grid::from_rows(&["#######", "#.....#", "#######"], 2.0);
        let level = MazeLevel::from_grid(grid, Cell::new(1, 1), Cell::new(5, 1), 3.0);
        let agent = HunterAgent::new(level, SimConfig::default());

        let lines = render_heat_map(&agent, Some(Cell::new(1, 1)));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "#######");
        // Everything in front of the spawn has just been seen
        assert_eq!(lines[1], "#P   H#");

        let line = describe_agent(&agent.state());
        assert!(line.starts_with("[hunt] cell 5,1"));
    }
}
