// lidar_core/src/types.rs

use nalgebra::{Point3, Vector3};

/// Number of beams in the sensor's fan.
pub const BEAM_COUNT: usize = 8;

/// The world pose of the part that carries the sensor, as read from the host
/// once per sampling tick. All vectors are in WORLD space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierPose {
    /// Where the rays start.
    pub position: Point3<f64>,
    /// Un-bent beam direction (the sensor's boresight).
    pub pointing: Vector3<f64>,
    /// The carrier's forward axis. The beam fan is spread around it.
    pub forward: Vector3<f64>,
    /// The carrier's right axis. The common pitch offset rotates around it.
    pub right: Vector3<f64>,
}

/// Position and orientation of the celestial body the point cloud is
/// recorded against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Point3<f64>,
    pub up: Vector3<f64>,
    pub forward: Vector3<f64>,
}

/// Scene flags owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneContext {
    /// The vessel is being assembled in an editor; no resources are simulated.
    pub in_editor: bool,
    /// The map view is open; beams are not drawn.
    pub map_view: bool,
}
