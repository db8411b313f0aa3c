// lidar_core/src/prelude.rs

// --- Core Abstractions (the contracts the host implements) ---
pub use crate::models::perception::RaycastProvider;
pub use crate::sensor::power::ResourcePool;

// --- Core Data Structures ---
pub use crate::config::{LidarConfig, ELECTRIC_CHARGE};
pub use crate::error::{LidarError, LidarResult};
pub use crate::frames::{compute_body_rotation, BodyFrame};
pub use crate::layers::{CollisionLayout, LayerMask};
pub use crate::models::perception::{Beam, HitRecord, RayCandidate, NO_HIT_DISTANCE};
pub use crate::sensor::point_cloud::{PointCloudBuffer, POINT_CLOUD_CAPACITY};
pub use crate::types::{BodyPose, CarrierPose, SceneContext, BEAM_COUNT};

// --- The Sensor ---
pub use crate::sensor::{Sensor, SensorEvent, SensorState, TickOutcome};
