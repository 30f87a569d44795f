//! Core module
//!
//! Configuration, the hunter event queue and debug helpers

mod config;
mod debug;
mod events;

pub use config::{CollisionConfig, ConfigError, HeatConfig, HunterConfig, MazeConfig, SimConfig};
pub use debug::{DebugInfo, TickStats, describe_agent, render_heat_map};
pub use events::{EventQueue, HunterEvent};
