// lidar_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use avian3d::prelude::PhysicsSet;

use crate::prelude::*;
use crate::simulation::core::app_state::SimulationSet;
use crate::simulation::core::events::LidarLifecycleEvent;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::resources::{ElectricPool, SceneFlags, SessionLayout};

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // The scenario must be inserted before this plugin is added.
        let config = app
            .world()
            .get_resource::<ScenarioConfig>()
            .cloned()
            .unwrap_or_else(|| {
                warn!("No ScenarioConfig resource found; using defaults.");
                ScenarioConfig::default()
            });

        // --- 1. Session resources ---
        app.insert_resource(SimulationRng::from_seed(config.simulation.seed))
            .insert_resource(SessionLayout(config.layers.clone()))
            .insert_resource(SceneFlags(SceneContext {
                in_editor: config.scene.in_editor,
                map_view: config.scene.map_view,
            }))
            .insert_resource(ElectricPool::from_config(&config.power))
            .add_event::<LidarLifecycleEvent>();

        if !app.world().contains_resource::<ScenarioConfig>() {
            app.insert_resource(config.clone());
        }

        let simulation_frequency = if config.simulation.physics_hz > 0.0 {
            config.simulation.physics_hz
        } else {
            warn!(
                "physics_hz must be positive, got {}; falling back to 50 Hz",
                config.simulation.physics_hz
            );
            50.0
        };
        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
            1.0 / simulation_frequency,
        )));

        // --- 2. Spawning pipeline ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::World,
                SceneBuildSet::ProcessVehicle,
                SceneBuildSet::ProcessSensors,
                SceneBuildSet::Finalize,
            )
                .chain(),
        );
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            transition_to_running.in_set(SceneBuildSet::Finalize),
        );

        // --- 3. Runtime schedule ---
        app.configure_sets(
            FixedUpdate,
            SimulationSet::Actuation.run_if(in_state(AppState::Running)),
        );
        app.configure_sets(
            FixedPostUpdate,
            SimulationSet::StateSync
                .after(PhysicsSet::StepSimulation)
                .run_if(in_state(AppState::Running)),
        );
        app.configure_sets(
            Update,
            (
                SimulationSet::Lifecycle,
                SimulationSet::Sensors,
                SimulationSet::Validation,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );

        app.add_systems(
            FixedPostUpdate,
            electric_pool_recharge_system.in_set(SimulationSet::StateSync),
        );

        if let Some(limit) = config.simulation.duration_seconds {
            app.insert_resource(RunDuration(limit))
                .add_systems(Update, exit_after_duration.in_set(SimulationSet::Validation));
        }
    }
}

/// How long to run before requesting exit, in simulated seconds.
#[derive(Resource, Debug, Clone, Copy)]
struct RunDuration(f64);

/// Runs once at the end of the `OnEnter(SceneBuilding)` chain.
fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

/// Tops up the pool before the sensors draw from it on this step.
pub fn electric_pool_recharge_system(time: Res<Time>, mut pool: ResMut<ElectricPool>) {
    pool.recharge(time.delta_secs_f64());
}

fn exit_after_duration(
    time: Res<Time<Fixed>>,
    limit: Res<RunDuration>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed_secs_f64() >= limit.0 {
        info!("Reached duration of {:.1}s, exiting.", limit.0);
        exit.write(AppExit::Success);
    }
}
