// lidar_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. The scenario is already loaded; the scene is
    /// spawned from it on entry.
    #[default]
    SceneBuilding,

    /// The scene is built. The main simulation loop is now running.
    Running,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Ground, scenery and the celestial body.
    World,

    /// Pass 2: The carrier part the sensors hang from.
    ProcessVehicle,

    /// Pass 3: Sensor child entities.
    ProcessSensors,

    /// Pass 4: Hand over to `Running`.
    Finalize,
}

// =========================================================================
// == Main Simulation Sets ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Motion of the carrier and other scripted parts. Runs in `FixedUpdate`.
    Actuation,

    /// Per-physics-step bookkeeping that must see the settled state. Runs in
    /// `FixedPostUpdate`, after the physics step.
    StateSync,

    /// Host events and UI actions reaching the sensors. Runs in `Update`.
    Lifecycle,

    /// Per-frame beam sampling. Runs in `Update`, after `Lifecycle`.
    Sensors,

    /// Telemetry and drawing. Runs in `Update`, after `Sensors`.
    Validation,
}
