// lidar_sim/examples/01_point_cloud_demo.rs

//! Two LiDAR scanners on a turning mast over a spinning field of boxes.
//!
//! To run this example:
//! `cargo run --example 01_point_cloud_demo -- --scenario assets/scenarios/lidar_demo.toml`
//!
//! Add `--headless --duration 20` to run without a window and quit after 20
//! simulated seconds; the telemetry log still reports every sensor.

use std::process::ExitCode;
use std::time::Duration;

use avian3d::prelude::*;
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::settings::{RenderCreation, WgpuSettings};
use bevy::render::RenderPlugin;
use bevy::window::ExitCondition;
use bevy::winit::WinitPlugin;
use clap::Parser;

use lidar_sim::cli::Cli;
use lidar_sim::simulation::config::load_scenario;
use lidar_sim::LidarSimulationPlugin;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --- 1. Load Simulation Configuration ---
    let mut scenario = match load_scenario(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!(
                "Failed to load scenario file at {}: {}",
                cli.scenario.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };
    if cli.duration.is_some() {
        scenario.simulation.duration_seconds = cli.duration;
    }

    let mut app = App::new();

    // --- 2. Add Core Bevy Plugins & Resources ---
    let log_plugin = LogPlugin {
        level: bevy::log::Level::INFO,
        filter: "info,wgpu_core=error,wgpu_hal=error,lidar_sim=debug,lidar_core=debug".to_string(),
        ..default()
    };

    if cli.headless {
        app.add_plugins((
            DefaultPlugins
                .set(log_plugin)
                .set(WindowPlugin {
                    primary_window: None,
                    exit_condition: ExitCondition::DontExit,
                    ..default()
                })
                .set(RenderPlugin {
                    render_creation: RenderCreation::Automatic(WgpuSettings {
                        backends: None,
                        ..default()
                    }),
                    ..default()
                })
                .disable::<WinitPlugin>(),
            ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0)),
        ));
    } else {
        app.add_plugins(DefaultPlugins.set(log_plugin))
            // Avian's collider outlines.
            .add_plugins(PhysicsDebugPlugin::default());
    }

    app.add_plugins(PhysicsPlugins::default())
        // Insert the loaded configuration before the simulation plugin reads it.
        .insert_resource(scenario)
        .insert_resource(cli);

    // --- 3. Add the Main LiDAR Simulation Plugin ---
    app.add_plugins(LidarSimulationPlugin);

    // --- 4. Run the App ---
    info!("Starting LiDAR simulation...");
    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}
