//! What the hunter can tell about the player this tick

use glam::{Vec2, Vec3};

use super::steering::{angle_delta, yaw_of};
use crate::core::HunterConfig;
use crate::maze::{Cell, MazeWorld};

/// Snapshot of the player as sensed by the hunter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Player world position
    pub player_position: Vec3,
    /// Player grid cell
    pub player_cell: Cell,
    /// Horizontal distance hunter -> player
    pub distance: f32,
    /// Signed yaw error from the hunter's heading to the player
    pub bearing: f32,
    /// Whether the cells see each other through the visibility map
    pub cells_visible: bool,
    /// Full line of sight: cells visible, in range, and in the view cone or close enough to sense
    pub line_of_sight: bool,
}

impl Perception {
    /// Sense the player from a hunter at `position` facing `yaw`
    #[must_use]
    pub fn sense(
        world: &dyn MazeWorld,
        config: &HunterConfig,
        position: Vec3,
        yaw: f32,
        player_position: Vec3,
    ) -> Self {
        let hunter_cell = world.world_to_cell(position.x, position.z);
        let player_cell = world.world_to_cell(player_position.x, player_position.z);
        let offset = Vec2::new(player_position.x - position.x, player_position.z - position.z);
        let distance = offset.length();
        let bearing = angle_delta(yaw, yaw_of(offset, yaw));

        let cells_visible = world.are_cells_visible(hunter_cell, player_cell);
        let sensed_close = distance < config.close_detection_distance;
        let in_cone = bearing.abs() <= config.view_half_angle;
        let line_of_sight =
            cells_visible && distance <= config.sight_distance && (sensed_close || in_cone);

        Self {
            player_position,
            player_cell,
            distance,
            bearing,
            cells_visible,
            line_of_sight,
        }
    }

    /// Whether an attack landing now would connect
    #[must_use]
    pub fn in_hit_window(&self, config: &HunterConfig) -> bool {
        self.line_of_sight && self.distance <= config.attack_range && self.bearing.abs() <= config.attack_arc
    }
}
