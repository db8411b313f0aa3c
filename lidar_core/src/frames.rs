// lidar_core/src/frames.rs

//! Conversion of world-space points into a celestial body's own frame.
//!
//! Points recorded against the body frame stay put while the body rotates
//! underneath the vessel, which is what makes an accumulated cloud usable.

use nalgebra::{Matrix3, Point3, Quaternion, Rotation3, UnitQuaternion, Vector3};

use crate::error::{LidarError, LidarResult};
use crate::types::BodyPose;

/// Largest |cos| allowed between a body's `up` and `forward` directions.
pub const PERPENDICULAR_TOLERANCE: f64 = 0.1;

/// Below this the trace branch of the matrix-to-quaternion conversion loses
/// precision (the basis is rotated by nearly 180 degrees).
const MIN_TRACE_RADICAND: f64 = 1e-6;

fn unit(v: &Vector3<f64>, name: &'static str) -> LidarResult<Vector3<f64>> {
    v.try_normalize(f64::EPSILON)
        .filter(|n| n.iter().all(|c| c.is_finite()))
        .ok_or(LidarError::DegenerateAxis(name))
}

/// Computes the rotation that maps world-space offsets (relative to the body's
/// position) into the body's local frame.
///
/// `up` is orthonormalized against `forward` (Gram-Schmidt) before the
/// right-handed basis `{right = up × forward, up, forward}` is turned into a
/// quaternion. That quaternion takes body axes to world axes, so its conjugate
/// is returned.
///
/// # Errors
/// [`LidarError::BodyAxesNotPerpendicular`] when
/// `|dot(normalize(up), normalize(forward))| > 0.1`, and
/// [`LidarError::DegenerateAxis`] for zero-length or non-finite input.
pub fn compute_body_rotation(
    up: &Vector3<f64>,
    forward: &Vector3<f64>,
) -> LidarResult<UnitQuaternion<f64>> {
    let forward = unit(forward, "forward")?;
    let up = unit(up, "up")?;

    let dot = up.dot(&forward);
    if dot.abs() > PERPENDICULAR_TOLERANCE {
        return Err(LidarError::BodyAxesNotPerpendicular {
            dot,
            limit: PERPENDICULAR_TOLERANCE,
        });
    }

    // |dot| <= 0.1 keeps the projected vector well away from zero length.
    let up = (up - forward * dot).normalize();
    let right = up.cross(&forward);

    let radicand = 1.0 + right.x + up.y + forward.z;
    let body_to_world = if radicand > MIN_TRACE_RADICAND {
        let w = radicand.sqrt() / 2.0;
        let r = 0.25 / w;
        Quaternion::new(
            w,
            (up.z - forward.y) * r,
            (forward.x - right.z) * r,
            (right.y - up.x) * r,
        )
    } else {
        let basis = Matrix3::from_columns(&[right, up, forward]);
        let rotation = Rotation3::from_matrix_unchecked(basis);
        *UnitQuaternion::from_rotation_matrix(&rotation).quaternion()
    };

    Ok(UnitQuaternion::new_normalize(body_to_world.conjugate()))
}

// =========================================================================
// == Body Frame ==
// =========================================================================

/// A body's frame for one tick: its world position and the world-to-body
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl BodyFrame {
    pub fn from_pose(pose: &BodyPose) -> LidarResult<Self> {
        Ok(Self {
            position: pose.position,
            rotation: compute_body_rotation(&pose.up, &pose.forward)?,
        })
    }

    /// Expresses a world-space point in body coordinates.
    pub fn to_body(&self, world: &Point3<f64>) -> Vector3<f64> {
        self.rotation * (world - self.position)
    }

    /// The inverse of [`BodyFrame::to_body`].
    pub fn to_world(&self, body: &Vector3<f64>) -> Point3<f64> {
        self.position + self.rotation.inverse() * body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-6;

    fn assert_vec_eq(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = EPS);
        assert_abs_diff_eq!(a.y, b.y, epsilon = EPS);
        assert_abs_diff_eq!(a.z, b.z, epsilon = EPS);
    }

    #[test]
    fn aligned_axes_give_identity() {
        let q = compute_body_rotation(&Vector3::y(), &Vector3::z()).unwrap();
        let mapped = q * Vector3::z();
        assert_vec_eq(&mapped, &Vector3::z());
        assert_abs_diff_eq!(q.angle(), 0.0, epsilon = EPS);
    }

    #[test]
    fn inverse_rotation_round_trips_an_offset() {
        let up = Vector3::new(0.0, 1.0, 0.0);
        let forward = Vector3::new(0.0, 0.0, 1.0);
        let q = compute_body_rotation(&up, &forward).unwrap();

        let offset = Vector3::new(3.0, -2.0, 7.5);
        let back = q.inverse() * (q * offset);
        assert_vec_eq(&back, &offset);
    }

    #[test]
    fn near_parallel_axes_are_rejected() {
        let up = Vector3::new(1.0, 0.0, 0.0);
        let err = compute_body_rotation(&up, &Vector3::new(0.99, 0.14, 0.0)).unwrap_err();
        match err {
            LidarError::BodyAxesNotPerpendicular { dot, .. } => assert!(dot > 0.9),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_length_axis_is_rejected() {
        let err = compute_body_rotation(&Vector3::zeros(), &Vector3::z()).unwrap_err();
        assert_eq!(err, LidarError::DegenerateAxis("up"));
    }

    #[test]
    fn rotated_body_maps_its_own_axes_to_canonical_axes() {
        let body = UnitQuaternion::from_euler_angles(0.3, -0.7, 1.9);
        let up = body * Vector3::y();
        let forward = body * Vector3::z();
        let q = compute_body_rotation(&up, &forward).unwrap();

        assert_vec_eq(&(q * up), &Vector3::y());
        assert_vec_eq(&(q * forward), &Vector3::z());
        assert_vec_eq(&(q * (body * Vector3::x())), &Vector3::x());
    }

    #[test]
    fn slightly_skewed_up_is_orthonormalized() {
        let q = compute_body_rotation(&Vector3::new(0.0, 1.0, 0.05), &Vector3::z()).unwrap();
        // Forward stays exact, up loses its forward component.
        assert_vec_eq(&(q * Vector3::z()), &Vector3::z());
        assert_vec_eq(&(q * Vector3::y()), &Vector3::y());
    }

    #[test]
    fn half_turn_basis_uses_the_fallback_branch() {
        // Rotated 180 degrees about up: radicand of the trace formula is zero.
        let q = compute_body_rotation(&Vector3::y(), &-Vector3::z()).unwrap();
        assert_vec_eq(&(q * -Vector3::z()), &Vector3::z());
        assert_vec_eq(&(q * -Vector3::x()), &Vector3::x());
        assert_abs_diff_eq!(q.angle(), PI, epsilon = EPS);
    }

    #[test]
    fn body_frame_is_relative_to_body_position() {
        let frame = BodyFrame::from_pose(&BodyPose {
            position: Point3::new(100.0, 0.0, 0.0),
            up: Vector3::y(),
            forward: Vector3::z(),
        })
        .unwrap();

        let local = frame.to_body(&Point3::new(101.0, 2.0, 3.0));
        assert_vec_eq(&local, &Vector3::new(1.0, 2.0, 3.0));
        let world = frame.to_world(&local);
        assert_vec_eq(&world.coords, &Vector3::new(101.0, 2.0, 3.0));
    }
}
