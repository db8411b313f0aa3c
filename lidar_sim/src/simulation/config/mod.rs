// lidar_sim/src/simulation/config/mod.rs

//! Loading and validation of scenario files.

mod serde_helpers;

pub mod structs;

use std::path::Path;

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    Figment,
};

pub use structs::{ScenarioConfig, SensorMountConfig};

/// Reads a scenario TOML file from disk.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioConfig, figment::Error> {
    let path = path.as_ref();
    info!("Loading scenario from: {}", path.display());
    let scenario: ScenarioConfig = Figment::new().merge(Toml::file(path)).extract()?;
    validate_scenario(&scenario);
    Ok(scenario)
}

/// Logs problems that would make individual sensors refuse to spawn, so they
/// surface before the scene is built.
fn validate_scenario(scenario: &ScenarioConfig) {
    if scenario.sensors.is_empty() {
        warn!("Scenario declares no [[sensors]]; nothing will be sampled.");
    }
    for mount in &scenario.sensors {
        if let Err(e) = mount.lidar.validate() {
            error!("Sensor '{}' has an invalid configuration: {}", mount.name, e);
        }
    }
    let layout = &scenario.layers;
    if layout.terrain >= 32 || layout.scenery >= 32 || layout.parts >= 32 {
        warn!(
            "Collision layers must be below 32, got terrain={} scenery={} parts={}",
            layout.terrain, layout.scenery, layout.parts
        );
    }
}
