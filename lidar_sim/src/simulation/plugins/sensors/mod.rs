// lidar_sim/src/simulation/plugins/sensors/mod.rs

pub mod lidar;
pub mod raycasting;
