use bevy::prelude::*;

// --- Sub-modules for organization ---
mod components;
mod systems;

pub use components::ShowPointCloud;

use crate::prelude::{AppState, SimulationSet};

/// Beam and point-cloud gizmos plus the hotkeys for the sensor UI actions.
///
/// | Key | Action                                  |
/// |-----|-----------------------------------------|
/// | F1  | Toggle point-cloud overlay              |
/// | F2  | Activate / deactivate every sensor      |
/// | F3  | Toggle beam visibility                  |
/// | F4  | Clear every point cloud                 |
/// | F5  | Toggle map view                         |
/// | F6  | Destroy the carrier part                |
pub struct DebuggingPlugin;

impl Plugin for DebuggingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                // Hotkeys turn into lifecycle events handled this same frame.
                (
                    systems::toggle_point_cloud_overlay,
                    systems::sensor_action_hotkeys,
                    systems::toggle_map_view,
                )
                    .before(SimulationSet::Lifecycle)
                    .run_if(in_state(AppState::Running)),
                (systems::draw_lidar_beams, systems::draw_point_clouds)
                    .in_set(SimulationSet::Validation),
            ),
        );
    }
}
