// lidar_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod frames;
pub mod layers;
pub mod models;
pub mod prelude;
pub mod sensor;
pub mod types;
