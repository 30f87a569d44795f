//! Simulation configuration
//!
//! Every tuning threshold lives here as a named, serializable value.
//! Configs load from and save to RON (Rusty Object Notation) or JSON.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maze layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Columns (rounded up to odd, minimum 5)
    pub cols: usize,
    /// Rows (rounded up to odd, minimum 5)
    pub rows: usize,
    /// Cell edge length in world units
    pub cell_size: f32,
    /// Wall height in world units
    pub wall_height: f32,
    /// Chance to open a wall between two corridors, adding loops
    pub loop_chance: f32,
    /// Number of prop crates scattered in dead ends
    pub prop_count: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cols: 21,
            rows: 21,
            cell_size: 2.0,
            wall_height: 3.0,
            loop_chance: 0.05,
            prop_count: 4,
        }
    }
}

impl MazeConfig {
    /// Set the grid dimensions
    #[must_use]
    pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Set the cell size
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }
}

/// Exploration heat map parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    /// Upper bound for every score
    pub max_score: f32,
    /// Linear regeneration toward `max_score`
    pub regen_per_second: f32,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            max_score: 0.1,
            regen_per_second: 0.002,
        }
    }
}

/// Hunter agent tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub max_health: f32,
    /// Walk speed in world units per second
    pub walk_speed: f32,
    /// Speed multiplier while chasing
    pub sprint_multiplier: f32,
    /// Yaw rate in radians per second
    pub turn_speed: f32,
    pub radius: f32,
    pub height: f32,

    /// Maximum sighting distance
    pub sight_distance: f32,
    /// Half-angle of the view cone (a hemisphere at pi/2)
    pub view_half_angle: f32,
    /// Below this distance the player is sensed regardless of facing
    pub close_detection_distance: f32,

    /// Distance at which chase commits to an attack
    pub attack_start_range: f32,
    /// Distance at which the hit still lands
    pub attack_range: f32,
    /// Half-angle of the hit arc
    pub attack_arc: f32,
    /// Facing error allowed before an attack may start
    pub attack_alignment_tolerance: f32,
    pub attack_duration: f32,
    pub attack_cooldown: f32,
    pub attack_damage: f32,

    /// Seconds between exploration target picks
    pub repath_interval: f32,
    /// Cells considered when ranking exploration targets
    pub hunt_top_k: usize,
    /// Exponent `k` in `(score / path_length)^k`
    pub hunt_weight_exponent: f32,

    /// Total rotation of a search scan
    pub scan_total_angle: f32,
    /// Scan rotation rate in radians per second
    pub scan_speed: f32,

    /// Distance at which a waypoint counts as reached
    pub waypoint_tolerance: f32,
    /// Seconds without progress before a forced repath
    pub stuck_timeout: f32,
    /// Ring radius used to snap off-grid cells onto walkable ones
    pub snap_radius: i32,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            walk_speed: 2.4,
            sprint_multiplier: 1.75,
            turn_speed: 5.0,
            radius: 0.35,
            height: 1.9,
            sight_distance: 40.0,
            view_half_angle: FRAC_PI_2,
            close_detection_distance: 2.5,
            attack_start_range: 1.8,
            attack_range: 2.2,
            attack_arc: FRAC_PI_4,
            attack_alignment_tolerance: 0.2,
            attack_duration: 1.0,
            attack_cooldown: 1.2,
            attack_damage: 25.0,
            repath_interval: 4.0,
            hunt_top_k: 8,
            hunt_weight_exponent: 2.0,
            scan_total_angle: TAU,
            scan_speed: 2.5,
            waypoint_tolerance: 0.2,
            stuck_timeout: 2.5,
            snap_radius: 6,
        }
    }
}

/// Character collision parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Passes of capsule-vs-world resolution per query
    pub max_iterations: usize,
    /// Fraction of a player/hunter overlap correction given to the player
    pub player_share: f32,
    /// Player capsule height
    pub player_height: f32,
    /// Gap kept between capsule bottoms and the floor
    pub ground_clearance: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            player_share: 0.5,
            player_height: 1.7,
            ground_clearance: 0.05,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the injectable random source
    pub seed: u64,
    pub maze: MazeConfig,
    pub heat: HeatConfig,
    pub hunter: HunterConfig,
    pub collision: CollisionConfig,
}

impl SimConfig {
    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the maze parameters
    #[must_use]
    pub fn with_maze(mut self, maze: MazeConfig) -> Self {
        self.maze = maze;
        self
    }

    /// Check ranges the simulation relies on
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("maze.cell_size", self.maze.cell_size),
            ("maze.wall_height", self.maze.wall_height),
            ("heat.max_score", self.heat.max_score),
            ("hunter.max_health", self.hunter.max_health),
            ("hunter.walk_speed", self.hunter.walk_speed),
            ("hunter.sprint_multiplier", self.hunter.sprint_multiplier),
            ("hunter.turn_speed", self.hunter.turn_speed),
            ("hunter.radius", self.hunter.radius),
            ("hunter.height", self.hunter.height),
            ("hunter.attack_duration", self.hunter.attack_duration),
            ("hunter.scan_speed", self.hunter.scan_speed),
            ("collision.player_height", self.collision.player_height),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }
        if self.heat.regen_per_second < 0.0 {
            return Err(ConfigError::Invalid(
                "heat.regen_per_second must not be negative".into(),
            ));
        }
        if self.maze.cols < 5 || self.maze.rows < 5 {
            return Err(ConfigError::Invalid("maze must be at least 5x5".into()));
        }
        if !(0.0..=1.0).contains(&self.collision.player_share) {
            return Err(ConfigError::Invalid(
                "collision.player_share must be within [0, 1]".into(),
            ));
        }
        if self.hunter.hunt_top_k == 0 {
            return Err(ConfigError::Invalid("hunter.hunt_top_k must be at least 1".into()));
        }
        if self.hunter.attack_range < self.hunter.attack_start_range {
            return Err(ConfigError::Invalid(
                "hunter.attack_range must cover hunter.attack_start_range".into(),
            ));
        }
        Ok(())
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate RON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_serialization_ron() {
        let config = SimConfig::default().with_seed(99);
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("sprint_multiplier"));

        let loaded = SimConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let loaded = SimConfig::from_ron_str("(seed: 5, hunter: (attack_damage: 40.0))").unwrap();
        assert_eq!(loaded.seed, 5);
        assert!((loaded.hunter.attack_damage - 40.0).abs() < f32::EPSILON);
        assert_eq!(loaded.maze, MazeConfig::default());
    }

    #[test]
    fn test_config_serialization_json() {
        let config = SimConfig::default().with_maze(MazeConfig::default().with_size(31, 15));
        let json_str = serde_json::to_string(&config).unwrap();
        let loaded: SimConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(loaded.maze.cols, 31);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SimConfig::default();
        config.hunter.walk_speed = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("walk_speed")));

        let mut config = SimConfig::default();
        config.collision.player_share = 1.5;
        assert!(config.validate().is_err());

        assert!(matches!(
            SimConfig::from_ron_str("(seed: \"x\")"),
            Err(ConfigError::DeserializeError(_))
        ));
    }
}
