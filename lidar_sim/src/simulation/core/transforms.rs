// lidar_sim/src/simulation/core/transforms.rs

use bevy::prelude::{
    GlobalTransform, Quat as BevyQuat, Transform as BevyTransform, Vec3 as BevyVec3,
};
use lidar_core::types::{BodyPose, CarrierPose};
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

// =========================================================================
// == Bevy <-> nalgebra Conversion Helpers ==
// =========================================================================
// The core works in the same axes as the Bevy world (Y up). These helpers only
// change precision and container type; no axis swapping happens here.

/// Converts a Bevy `Vec3` into an `f64` nalgebra vector.
pub fn bevy_vec_to_vector(v: &BevyVec3) -> Vector3<f64> {
    Vector3::new(v.x as f64, v.y as f64, v.z as f64)
}

/// Converts a Bevy `Vec3` position into an `f64` nalgebra point.
pub fn bevy_vec_to_point(v: &BevyVec3) -> Point3<f64> {
    Point3::from(bevy_vec_to_vector(v))
}

/// Converts an `f64` nalgebra vector into a Bevy `Vec3`.
pub fn vector_to_bevy_vec(v: &Vector3<f64>) -> BevyVec3 {
    BevyVec3::new(v.x as f32, v.y as f32, v.z as f32)
}

/// Converts an `f64` nalgebra point into a Bevy `Vec3`.
pub fn point_to_bevy_vec(p: &Point3<f64>) -> BevyVec3 {
    vector_to_bevy_vec(&p.coords)
}

/// Converts a nalgebra unit quaternion into a Bevy rotation.
pub fn unit_quaternion_to_bevy_quat(q: &UnitQuaternion<f64>) -> BevyQuat {
    let c = q.coords;
    BevyQuat::from_xyzw(c.x as f32, c.y as f32, c.z as f32, c.w as f32)
}

/// Converts a scenario pose into a Bevy `Transform`.
pub fn nalgebra_isometry_to_bevy_transform(iso: &Isometry3<f64>) -> BevyTransform {
    BevyTransform {
        translation: vector_to_bevy_vec(&iso.translation.vector),
        rotation: unit_quaternion_to_bevy_quat(&iso.rotation),
        scale: BevyVec3::ONE,
    }
}

// =========================================================================
// == Sensor Geometry ==
// =========================================================================

/// Reads the carrier pose of a sensor mount.
///
/// The beams leave along the mount's forward (-Z). The mount's local +Y is the
/// part's stack axis, which is the axis the fan is spread around; the tilt
/// axis is the mount's right (+X).
pub fn carrier_pose_from_transform(transform: &GlobalTransform) -> CarrierPose {
    CarrierPose {
        position: bevy_vec_to_point(&transform.translation()),
        pointing: bevy_vec_to_vector(&transform.forward()),
        forward: bevy_vec_to_vector(&transform.up()),
        right: bevy_vec_to_vector(&transform.right()),
    }
}

/// Reads a celestial body's pose. The body's `forward` is its local +Z, so an
/// untransformed body has the identity body frame.
pub fn body_pose_from_transform(transform: &GlobalTransform) -> BodyPose {
    BodyPose {
        position: bevy_vec_to_point(&transform.translation()),
        up: bevy_vec_to_vector(&transform.up()),
        forward: bevy_vec_to_vector(&transform.back()),
    }
}
