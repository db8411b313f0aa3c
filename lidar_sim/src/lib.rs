// lidar_sim/src/lib.rs

use bevy::prelude::*;

use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::debugging::DebuggingPlugin;
use crate::simulation::plugins::sensors::lidar::LidarSensorPlugin;
use crate::simulation::plugins::world::spawner::WorldSpawnerPlugin;

// This prelude is for convenience for other files WITHIN the lidar_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Insert a [`ScenarioConfig`](crate::simulation::config::ScenarioConfig)
/// resource and add Avian's `PhysicsPlugins` before adding this one.
pub struct LidarSimulationPlugin;

impl Plugin for LidarSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<prelude::AppState>();
        app.add_plugins((
            // Session resources, fixed-step rate and schedule sets.
            SimulationSetupPlugin,
            // Ground, scenery, the celestial body and the carrier.
            WorldSpawnerPlugin,
            LidarSensorPlugin,
            DebuggingPlugin,
        ));
    }
}
