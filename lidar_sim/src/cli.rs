// lidar_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Simulated LiDAR point-cloud sensors on a turning mast.
///
/// Command-line arguments shared by every binary built on this crate.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/lidar_demo.toml")]
    pub scenario: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Stop after this many simulated seconds. Overrides the scenario.
    #[arg(long)]
    pub duration: Option<f64>,
}
