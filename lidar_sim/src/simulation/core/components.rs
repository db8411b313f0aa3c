// lidar_sim/src/simulation/core/components.rs

use bevy::prelude::Component;

/// Marks the celestial body whose transform defines the body frame the point
/// clouds are recorded in.
#[derive(Component, Debug, Clone)]
pub struct CelestialBody {
    pub name: String,
}

/// A part that carries sensors. Turns about world +Y at `yaw_rate` rad/s.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Carrier {
    pub yaw_rate: f32,
}

/// Collider on the terrain layer.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Terrain;

/// Collider on the scenery layer.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Scenery;
