// lidar_sim/src/simulation/config/structs.rs

use bevy::prelude::{Resource, Transform};
use lidar_core::config::LidarConfig;
use lidar_core::layers::CollisionLayout;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

use super::serde_helpers::{quat_f64_from_euler_deg_f32, vec3_f64_from_f32_array};
use crate::simulation::core::transforms::nalgebra_isometry_to_bevy_transform;

// =========================================================================
// == Top-Level Scenario Config ==
// =========================================================================

/// Everything one scenario TOML file describes.
#[derive(Resource, Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationParams,
    #[serde(default)]
    pub layers: CollisionLayout,
    #[serde(default)]
    pub scene: SceneParams,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub body: BodyConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub sensors: Vec<SensorMountConfig>,
}

impl ScenarioConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SimulationParams {
    /// Seed for the scenery scatter. `None` draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_physics_hz")]
    pub physics_hz: f64,
    /// Quit after this many seconds of simulated time.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default = "default_telemetry_period")]
    pub telemetry_period_seconds: f32,
}

fn default_physics_hz() -> f64 {
    50.0
}

fn default_telemetry_period() -> f32 {
    2.0
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: None,
            physics_hz: default_physics_hz(),
            duration_seconds: None,
            telemetry_period_seconds: default_telemetry_period(),
        }
    }
}

/// Flags the host would normally derive from which scene is loaded.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SceneParams {
    #[serde(default)]
    pub in_editor: bool,
    #[serde(default)]
    pub map_view: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PowerConfig {
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    /// Starting charge; defaults to a full pool.
    #[serde(default)]
    pub initial_charge: Option<f64>,
    /// Charge restored per second.
    #[serde(default)]
    pub recharge_rate: f64,
}

fn default_capacity() -> f64 {
    200.0
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            initial_charge: None,
            recharge_rate: 0.0,
        }
    }
}

// =========================================================================
// == World ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    #[serde(default = "default_body_name")]
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    /// Spin about the body's +Y axis.
    #[serde(default)]
    pub spin_rate_deg: f64,
}

fn default_body_name() -> String {
    "Kerbin".to_string()
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: default_body_name(),
            pose: Pose::default(),
            spin_rate_deg: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    #[serde(default = "default_ground_half_extent")]
    pub ground_half_extent: f32,
    #[serde(default = "default_obstacle_count")]
    pub obstacle_count: usize,
    #[serde(default = "default_obstacle_spread")]
    pub obstacle_spread: f32,
    /// Edge length range for the scattered boxes, `[min, max]`.
    #[serde(default = "default_obstacle_size")]
    pub obstacle_size: [f32; 2],
}

fn default_ground_half_extent() -> f32 {
    200.0
}
fn default_obstacle_count() -> usize {
    40
}
fn default_obstacle_spread() -> f32 {
    120.0
}
fn default_obstacle_size() -> [f32; 2] {
    [2.0, 12.0]
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_half_extent: default_ground_half_extent(),
            obstacle_count: default_obstacle_count(),
            obstacle_spread: default_obstacle_spread(),
            obstacle_size: default_obstacle_size(),
        }
    }
}

/// The part the sensors are mounted on.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CarrierConfig {
    #[serde(default = "default_carrier_name")]
    pub name: String,
    #[serde(default = "default_carrier_pose")]
    pub pose: Pose,
    /// Yaw rate about world +Y, so the fan sweeps the scene.
    #[serde(default)]
    pub yaw_rate_deg: f64,
}

fn default_carrier_name() -> String {
    "carrier".to_string()
}

fn default_carrier_pose() -> Pose {
    Pose {
        translation: Vector3::new(0.0, 3.0, 0.0),
        rotation: UnitQuaternion::identity(),
    }
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            name: default_carrier_name(),
            pose: default_carrier_pose(),
            yaw_rate_deg: 0.0,
        }
    }
}

// =========================================================================
// == Sensors ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SensorMountConfig {
    pub name: String,
    /// Mount pose relative to the carrier.
    #[serde(default)]
    pub mount: Pose,
    #[serde(default)]
    pub lidar: LidarConfig,
}

// =========================================================================
// == Helper Structs ==
// =========================================================================

/// A pose written as a translation plus `[roll, pitch, yaw]` in degrees.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct Pose {
    #[serde(with = "vec3_f64_from_f32_array", default = "Vector3::zeros")]
    pub translation: Vector3<f64>,
    #[serde(with = "quat_f64_from_euler_deg_f32", default = "UnitQuaternion::identity")]
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn to_bevy_transform(&self) -> Transform {
        nalgebra_isometry_to_bevy_transform(&self.to_isometry())
    }
}
